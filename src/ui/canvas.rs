//! Canvas interaction and navigation functionality.
//!
//! This module handles canvas panning, zooming, node dragging, click selection
//! and coordinate transformations between screen and world space.

use super::state::MindMapApp;
use crate::constants;
use crate::drag::{DragOutcome, DragSession};
use crate::geometry::Point;
use crate::types::DropTarget;
use eframe::egui;

/// World position as a model point.
pub(crate) fn to_point(pos: egui::Pos2) -> Point {
    (pos.x, pos.y)
}

/// Model point as a world position.
pub(crate) fn to_pos(point: Point) -> egui::Pos2 {
    egui::pos2(point.0, point.1)
}

impl MindMapApp {
    /// Converts screen coordinates to world coordinates accounting for zoom and pan.
    pub fn screen_to_world(&self, screen_pos: egui::Pos2) -> egui::Pos2 {
        (screen_pos - self.canvas.offset) / self.canvas.zoom_factor
    }

    /// Converts world coordinates to screen coordinates accounting for zoom and pan.
    pub fn world_to_screen(&self, world_pos: egui::Pos2) -> egui::Pos2 {
        world_pos * self.canvas.zoom_factor + self.canvas.offset
    }

    /// Handles middle-click or Cmd/Ctrl+left-click canvas panning.
    ///
    /// `modifiers.command` is Cmd on macOS and Ctrl elsewhere.
    pub fn handle_canvas_panning(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let should_pan = ui.input(|i| {
            i.pointer.middle_down() || (i.pointer.primary_down() && i.modifiers.command)
        });

        if should_pan && self.interaction.drag.is_none() {
            if let Some(current_pos) = response.interact_pointer_pos() {
                if !self.interaction.is_panning {
                    self.interaction.is_panning = true;
                    self.interaction.last_pan_pos = Some(current_pos);
                } else if let Some(last_pos) = self.interaction.last_pan_pos {
                    self.canvas.offset += current_pos - last_pos;
                    self.interaction.last_pan_pos = Some(current_pos);
                }
            }
        } else {
            self.interaction.is_panning = false;
            self.interaction.last_pan_pos = None;
        }
    }

    /// Handles scroll wheel zooming around the cursor.
    ///
    /// Zoom is clamped to `MIN_ZOOM..=MAX_ZOOM` and only applies while the
    /// cursor is over the canvas.
    pub fn handle_canvas_zoom(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll_delta == 0.0 {
            return;
        }

        let mouse_pos = ui
            .input(|i| i.pointer.hover_pos())
            .or_else(|| response.interact_pointer_pos());
        let Some(mouse_pos) = mouse_pos else {
            return;
        };
        if !response.rect.contains(mouse_pos) {
            return;
        }

        let world_before = self.screen_to_world(mouse_pos);
        let zoom_delta = if scroll_delta > 0.0 { 0.025 } else { -0.025 };
        let old_zoom = self.canvas.zoom_factor;
        self.canvas.zoom_factor =
            (old_zoom + zoom_delta).clamp(constants::MIN_ZOOM, constants::MAX_ZOOM);

        // Keep the world point under the cursor fixed
        if (self.canvas.zoom_factor - old_zoom).abs() > f32::EPSILON {
            let screen_after = self.world_to_screen(world_before);
            self.canvas.offset += mouse_pos - screen_after;
        }
    }

    /// Runs the drag gesture: press on a node starts a [`DragSession`], moves
    /// update it, release commits the drop.
    pub fn handle_node_dragging(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        if self.interaction.is_panning {
            return;
        }

        let (pressed, down) = ui.input(|i| (i.pointer.primary_pressed(), i.pointer.primary_down()));

        if down {
            let Some(current_pos) = response.interact_pointer_pos() else {
                return;
            };
            let world = to_point(self.screen_to_world(current_pos));

            if let Some(session) = self.interaction.drag.as_mut() {
                session.update(&mut self.map, world);
            } else if pressed {
                if let Some(node_id) = self.map.node_at(world, None) {
                    if self.interaction.editing_node != Some(node_id) {
                        self.interaction.editing_node = None;
                    }
                    self.interaction.drag = DragSession::begin(&mut self.map, node_id, world);
                }
            }
        } else if let Some(session) = self.interaction.drag.take() {
            let dragged = session.node();
            match session.finish(&mut self.map) {
                DragOutcome::Moved | DragOutcome::Vanished => {}
                DragOutcome::Reparented(DropTarget::Node(parent)) => {
                    let label = self
                        .map
                        .node(parent)
                        .map(|n| n.text.clone())
                        .unwrap_or_default();
                    self.notifications
                        .success(format!("Node attached to '{label}'"));
                }
                DragOutcome::Reparented(DropTarget::Connector { .. }) => {
                    self.notifications.success("Node inserted into connection");
                }
                DragOutcome::Rejected(_, err) => {
                    log::debug!("drop of {dragged} refused");
                    self.notifications.warning(format!("Cannot attach node: {err}"));
                }
            }
        }
    }

    /// Click selects the node under the pointer or clears the selection;
    /// double-click opens the label editor.
    pub fn handle_canvas_clicks(&mut self, response: &egui::Response) {
        if self.interaction.is_panning {
            return;
        }
        let Some(pos) = response.interact_pointer_pos() else {
            return;
        };
        let world = to_point(self.screen_to_world(pos));

        if response.double_clicked() {
            if let Some(node_id) = self.map.node_at(world, None) {
                self.start_editing_node_text(node_id);
            }
        } else if response.clicked() {
            match self.map.node_at(world, None) {
                Some(node_id) => {
                    self.map.select(node_id);
                }
                None => {
                    self.map.clear_selection();
                    self.interaction.editing_node = None;
                }
            }
        }
    }

    /// Opens the label editor for a node.
    pub fn start_editing_node_text(&mut self, node_id: crate::types::NodeId) {
        let Some(node) = self.map.node(node_id) else {
            return;
        };
        self.interaction.temp_text = node.text.clone();
        self.interaction.editing_node = Some(node_id);
        self.interaction.focus_requested_for_edit = false;
        self.map.select(node_id);
    }

    /// Applies the label editor's text to the node and closes the editor.
    pub fn save_node_text(&mut self) {
        if let Some(node_id) = self.interaction.editing_node.take() {
            let text = self.interaction.temp_text.trim();
            if text.is_empty() {
                self.notifications.warning("Node text cannot be empty");
            } else if self.map.set_text(node_id, text) {
                self.notifications.success("Node text updated");
            }
        }
        self.interaction.temp_text.clear();
    }
}
