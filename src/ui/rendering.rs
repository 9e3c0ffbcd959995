//! Canvas rendering for the grid, connectors and nodes.
//!
//! Everything is derived from the model on every frame.

use super::canvas::to_pos;
use super::state::MindMapApp;
use crate::constants;
use crate::types::{Color, Connector, DropTarget, MindMapNode};
use eframe::egui;

fn color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgb(color.r, color.g, color.b)
}

const SELECTED_STROKE: egui::Color32 = egui::Color32::from_rgb(255, 165, 0);
const DROP_HIGHLIGHT: egui::Color32 = egui::Color32::from_rgb(60, 179, 113);

impl MindMapApp {
    /// Renders the grid, then connectors, then nodes on top.
    pub fn render_mind_map(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        if self.settings.show_grid {
            self.draw_grid(painter, canvas_rect);
        }

        let candidate = self.interaction.drag.as_ref().and_then(|d| d.candidate());

        for connector in self.map.connectors() {
            let highlighted = matches!(
                candidate,
                Some(DropTarget::Connector { parent, child })
                    if parent == connector.parent && child == connector.child
            );
            self.draw_connector(painter, &connector, highlighted);
        }

        for node in self.map.nodes() {
            let drop_target = candidate == Some(DropTarget::Node(node.id));
            self.draw_node(painter, node, drop_target);
        }
    }

    /// Draws a zoom-aware grid. Skipped when cells would be under two pixels.
    pub fn draw_grid(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let grid_size = constants::GRID_SIZE;
        let screen_grid_size = grid_size * self.canvas.zoom_factor;
        if screen_grid_size < 2.0 {
            return;
        }

        let grid_color = egui::Color32::from_rgba_unmultiplied(128, 128, 128, 32);
        let stroke = egui::Stroke::new(1.0, grid_color);

        let top_left = self.screen_to_world(canvas_rect.min);
        let bottom_right = self.screen_to_world(canvas_rect.max);

        let mut x = (top_left.x / grid_size).floor() * grid_size;
        while x <= bottom_right.x {
            let screen_x = self.world_to_screen(egui::pos2(x, 0.0)).x;
            if screen_x >= canvas_rect.min.x && screen_x <= canvas_rect.max.x {
                painter.line_segment(
                    [
                        egui::pos2(screen_x, canvas_rect.min.y),
                        egui::pos2(screen_x, canvas_rect.max.y),
                    ],
                    stroke,
                );
            }
            x += grid_size;
        }

        let mut y = (top_left.y / grid_size).floor() * grid_size;
        while y <= bottom_right.y {
            let screen_y = self.world_to_screen(egui::pos2(0.0, y)).y;
            if screen_y >= canvas_rect.min.y && screen_y <= canvas_rect.max.y {
                painter.line_segment(
                    [
                        egui::pos2(canvas_rect.min.x, screen_y),
                        egui::pos2(canvas_rect.max.x, screen_y),
                    ],
                    stroke,
                );
            }
            y += grid_size;
        }
    }

    /// Draws a connector between the two circle edges.
    pub fn draw_connector(&self, painter: &egui::Painter, connector: &Connector, highlighted: bool) {
        let (start, end) = connector.trimmed();
        let start = self.world_to_screen(to_pos(start));
        let end = self.world_to_screen(to_pos(end));

        let base = if self.settings.dark_mode {
            egui::Color32::from_gray(200)
        } else {
            egui::Color32::BLACK
        };
        let (color, width) = if highlighted {
            (DROP_HIGHLIGHT, constants::CONNECTOR_WIDTH * 2.0)
        } else {
            (base, constants::CONNECTOR_WIDTH)
        };

        painter.line_segment(
            [start, end],
            egui::Stroke::new(width * self.canvas.zoom_factor, color),
        );
    }

    /// Draws a node circle and its label.
    pub fn draw_node(&self, painter: &egui::Painter, node: &MindMapNode, drop_target: bool) {
        let center = self.world_to_screen(to_pos(node.position));
        let radius = node.radius * self.canvas.zoom_factor;
        let dragging = self.interaction.drag.as_ref().map(|d| d.node()) == Some(node.id);

        let mut fill = color32(node.style.background);
        if dragging {
            fill = fill.gamma_multiply(0.8);
        }
        painter.circle_filled(center, radius, fill);

        let (stroke_color, stroke_width) = if drop_target {
            (DROP_HIGHLIGHT, 4.0)
        } else if self.map.selected() == Some(node.id) {
            (SELECTED_STROKE, 3.0)
        } else if self.settings.dark_mode {
            (egui::Color32::from_gray(220), 1.0)
        } else {
            (egui::Color32::BLACK, 1.0)
        };
        painter.circle_stroke(center, radius, egui::Stroke::new(stroke_width, stroke_color));

        self.draw_node_text(painter, node, center, radius);
    }

    /// Renders the label centered in the circle, wrapped to the circle's width.
    fn draw_node_text(
        &self,
        painter: &egui::Painter,
        node: &MindMapNode,
        center: egui::Pos2,
        radius: f32,
    ) {
        let font_size = (node.font_size * self.canvas.zoom_factor).clamp(4.0, 96.0);
        let font_id = egui::FontId::proportional(font_size);
        let lines = self.wrap_text(&node.text, radius * 1.8, &font_id, painter);

        let line_height = painter.fonts_mut(|f| f.row_height(&font_id));
        let total_height = line_height * lines.len() as f32;
        let start_y = center.y - total_height / 2.0 + line_height / 2.0;

        for (i, line) in lines.iter().enumerate() {
            painter.text(
                egui::pos2(center.x, start_y + i as f32 * line_height),
                egui::Align2::CENTER_CENTER,
                line,
                font_id.clone(),
                color32(node.style.text),
            );
        }
    }

    /// Wraps text at word boundaries to fit `max_width`. A single word wider
    /// than `max_width` gets its own line.
    pub fn wrap_text(
        &self,
        text: &str,
        max_width: f32,
        font_id: &egui::FontId,
        painter: &egui::Painter,
    ) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return vec![text.to_string()];
        }

        let mut lines = Vec::new();
        let mut current_line = String::new();
        for word in words {
            let test_line = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{current_line} {word}")
            };

            let text_width = painter.fonts_mut(|f| {
                f.layout_no_wrap(test_line.clone(), font_id.clone(), egui::Color32::BLACK)
                    .size()
                    .x
            });

            if text_width <= max_width {
                current_line = test_line;
            } else if !current_line.is_empty() {
                lines.push(std::mem::replace(&mut current_line, word.to_string()));
            } else {
                lines.push(word.to_string());
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
        lines
    }
}
