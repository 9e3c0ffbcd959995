//! User interface for the mind map tool.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main `MindMapApp`
//! - `canvas` - Canvas navigation, zooming, panning, and pointer interaction
//! - `rendering` - Drawing the grid, connectors and nodes
//! - `file_ops` - Map downloads and screenshots for native and WASM
//! - `notifications` - Toast messages

mod canvas;
mod file_ops;
mod notifications;
mod rendering;
mod state;


#[cfg(test)]
use notifications::NotificationLevel;
pub use state::MindMapApp;

use crate::error::MindMapError;
use crate::export::ExportFormat;
use crate::types::{Color, SizeStep};
use eframe::egui;

fn is_macos_platform() -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .and_then(|win| win.navigator().platform().ok())
            .is_some_and(|platform| platform.contains("Mac"))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        cfg!(target_os = "macos")
    }
}

/// Keyboard commands recognized on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shortcut {
    DeleteSelection,
    AddRoot,
    AddChild,
    AddSibling,
    DownloadMap,
    Screenshot,
    ToggleHelp,
}

impl Shortcut {
    fn from_input(i: &egui::InputState) -> Option<Self> {
        let m = i.modifiers;
        if i.key_pressed(egui::Key::S) && m.command {
            Some(Shortcut::DownloadMap)
        } else if i.key_pressed(egui::Key::P) && m.command {
            Some(Shortcut::Screenshot)
        } else if i.key_pressed(egui::Key::H) && m.alt {
            Some(Shortcut::ToggleHelp)
        } else if i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace) {
            Some(Shortcut::DeleteSelection)
        } else if i.key_pressed(egui::Key::Enter) || i.key_pressed(egui::Key::Tab) {
            if m.shift {
                Some(Shortcut::AddSibling)
            } else {
                Some(Shortcut::AddChild)
            }
        } else if i.key_pressed(egui::Key::R) && !m.command && !m.alt {
            Some(Shortcut::AddRoot)
        } else {
            None
        }
    }
}

fn rejection_message(err: &MindMapError) -> String {
    match err {
        MindMapError::NoSelection => "Select a node first".to_string(),
        MindMapError::RootHasNoSiblings => "Root nodes cannot have siblings".to_string(),
        other => other.to_string(),
    }
}

impl eframe::App for MindMapApp {
    /// Persist settings between restarts. The map itself is not persisted.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.settings.save(storage);
    }

    /// Lays out the toolbar, the canvas and any open dialogs.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.settings.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_pending_operations(ctx);
        self.handle_shortcuts(ctx);

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_canvas(ui);
        });

        self.draw_text_editor(ctx);
        self.draw_help_window(ctx);
        self.draw_clear_confirmation(ctx);

        self.notifications.show(ctx);
    }
}

impl MindMapApp {
    /// Dispatches keyboard shortcuts. Ignored while a text field has focus.
    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let Some(shortcut) = ctx.input(Shortcut::from_input) else {
            return;
        };
        log::debug!("shortcut {shortcut:?}");
        match shortcut {
            Shortcut::DeleteSelection => self.delete_selected(),
            Shortcut::AddRoot => self.add_root(),
            Shortcut::AddChild => self.add_child(),
            Shortcut::AddSibling => self.add_sibling(),
            Shortcut::DownloadMap => self.download_map(),
            Shortcut::Screenshot => self.take_screenshot(self.settings.export_format),
            Shortcut::ToggleHelp => self.interaction.show_help = !self.interaction.show_help,
        }
    }

    fn add_root(&mut self) {
        self.map.add_root_node();
        self.notifications.success("Root node added");
    }

    fn add_child(&mut self) {
        match self.map.add_child_node() {
            Ok(_) => self.notifications.success("Child node added"),
            Err(err) => self.notifications.warning(rejection_message(&err)),
        }
    }

    fn add_sibling(&mut self) {
        match self.map.add_sibling_node() {
            Ok(_) => self.notifications.success("Sibling node added"),
            Err(err) => self.notifications.warning(rejection_message(&err)),
        }
    }

    /// Deletes the selected node together with its descendants.
    fn delete_selected(&mut self) {
        let Some(selected) = self.map.selected() else {
            self.notifications.warning(rejection_message(&MindMapError::NoSelection));
            return;
        };
        let removed = self.map.delete_node(selected);
        if let Some(editing) = self.interaction.editing_node {
            if removed.contains(&editing) {
                self.interaction.editing_node = None;
            }
        }
        let noun = if removed.len() == 1 { "node" } else { "nodes" };
        self.notifications
            .info(format!("Deleted {} {noun}", removed.len()));
    }

    fn resize_selected(&mut self, step: SizeStep) {
        let Some(selected) = self.map.selected() else {
            self.notifications.warning(rejection_message(&MindMapError::NoSelection));
            return;
        };
        match self.map.resize_node(selected, step) {
            Ok(true) => {
                if let Some(node) = self.map.node(selected) {
                    let message = format!(
                        "Node size changed to radius {}, font {}px",
                        node.radius, node.font_size
                    );
                    self.notifications.info(message);
                }
            }
            Ok(false) => self.notifications.info("Node size is already at its limit"),
            Err(err) => self.notifications.warning(rejection_message(&err)),
        }
    }

    /// Removes every node; ids keep counting up.
    fn clear_map(&mut self) {
        self.map.clear();
        self.interaction.drag = None;
        self.interaction.editing_node = None;
        self.notifications.info("Map cleared");
    }

    /// Applies a theme color change to the defaults and, if a node is selected,
    /// to the matching color of that node only.
    fn apply_color_change(&mut self, background_changed: bool, text_changed: bool) {
        self.settings.apply_to(&mut self.map);
        match self.map.selected() {
            Some(selected) => {
                if background_changed {
                    self.map
                        .set_background(selected, self.settings.default_node_color);
                }
                if text_changed {
                    self.map
                        .set_text_color(selected, self.settings.default_text_color);
                }
                self.notifications.info("Node color updated");
            }
            None => self
                .notifications
                .info("Default color changed. Select a node to apply color."),
        }
    }

    fn reset_colors(&mut self) {
        self.settings.reset_colors();
        self.settings.apply_to(&mut self.map);
        self.notifications.info("Default colors reset");
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            if ui.button("Add Root").clicked() {
                self.add_root();
            }
            if ui.button("Clear").clicked() {
                self.interaction.confirm_clear = true;
            }

            ui.separator();

            if ui.button("Download Map").clicked() {
                self.download_map();
            }
            if ui.button("Screenshot").clicked() {
                self.take_screenshot(self.settings.export_format);
            }
            egui::ComboBox::from_id_salt("export_format")
                .selected_text(self.settings.export_format.label())
                .show_ui(ui, |ui| {
                    for format in ExportFormat::ALL {
                        ui.selectable_value(&mut self.settings.export_format, format, format.label());
                    }
                });
            ui.add(
                egui::DragValue::new(&mut self.settings.export_scale)
                    .range(0.25..=8.0)
                    .speed(0.05)
                    .prefix("Scale: "),
            );

            ui.separator();

            let mut node_rgb = rgb_array(self.settings.default_node_color);
            let mut text_rgb = rgb_array(self.settings.default_text_color);
            ui.label("Node");
            let node_changed = ui.color_edit_button_srgb(&mut node_rgb).changed();
            ui.label("Text");
            let text_changed = ui.color_edit_button_srgb(&mut text_rgb).changed();
            if node_changed || text_changed {
                self.settings.default_node_color = Color::rgb(node_rgb[0], node_rgb[1], node_rgb[2]);
                self.settings.default_text_color = Color::rgb(text_rgb[0], text_rgb[1], text_rgb[2]);
                self.apply_color_change(node_changed, text_changed);
            }
            if ui.button("Reset Colors").clicked() {
                self.reset_colors();
            }

            ui.separator();

            if ui.button("Size −").clicked() {
                self.resize_selected(SizeStep::Shrink);
            }
            if ui.button("Size +").clicked() {
                self.resize_selected(SizeStep::Grow);
            }

            ui.separator();

            ui.checkbox(&mut self.settings.dark_mode, "Dark Mode");
            ui.checkbox(&mut self.settings.show_grid, "Grid");
            let tolerance = ui.add(
                egui::DragValue::new(&mut self.settings.drop_tolerance)
                    .range(0.0..=100.0)
                    .prefix("Drop tolerance: "),
            );
            if tolerance.changed() {
                self.map.set_drop_tolerance(self.settings.drop_tolerance);
            }

            ui.separator();

            if ui.button("Shortcuts").clicked() {
                self.interaction.show_help = !self.interaction.show_help;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("Zoom: {:.0}%", self.canvas.zoom_factor * 100.0));
                ui.label(format!("Nodes: {}", self.map.len()));
            });
        });
    }

    fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        // World origin starts at the canvas' top-left corner
        if !self.canvas.initialized {
            self.canvas.offset = response.rect.min.to_vec2();
            self.canvas.initialized = true;
        }

        self.handle_canvas_panning(ui, &response);
        self.handle_canvas_zoom(ui, &response);
        self.handle_node_dragging(ui, &response);
        self.handle_canvas_clicks(&response);

        self.render_mind_map(&painter, response.rect);
    }

    fn draw_text_editor(&mut self, ctx: &egui::Context) {
        let Some(node_id) = self.interaction.editing_node else {
            return;
        };
        if !self.map.contains(node_id) {
            self.interaction.editing_node = None;
            return;
        }

        let mut save = false;
        let mut cancel = false;
        egui::Window::new("Edit Node Text")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                let response = ui.text_edit_singleline(&mut self.interaction.temp_text);
                if !self.interaction.focus_requested_for_edit {
                    response.request_focus();
                    self.interaction.focus_requested_for_edit = true;
                }
                let escaped = ui.input(|i| i.key_pressed(egui::Key::Escape));
                // Enter or clicking away commits the edit
                let blurred = response.lost_focus() && !escaped;
                if escaped {
                    cancel = true;
                }
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        save = true;
                    }
                    let cancel_button = ui.button("Cancel");
                    if cancel_button.clicked() {
                        cancel = true;
                    }
                    if blurred && !cancel_button.contains_pointer() {
                        save = true;
                    }
                });
            });

        if save {
            self.save_node_text();
        } else if cancel {
            self.interaction.editing_node = None;
            self.interaction.temp_text.clear();
        }
    }

    fn draw_help_window(&mut self, ctx: &egui::Context) {
        if !self.interaction.show_help {
            return;
        }
        let cmd = if is_macos_platform() { "Cmd" } else { "Ctrl" };
        let rows = [
            ("Delete / Backspace".to_string(), "Delete selected node and its descendants"),
            ("R".to_string(), "Add root node"),
            ("Enter / Tab".to_string(), "Add child to selected node"),
            ("Shift+Enter / Shift+Tab".to_string(), "Add sibling to selected node"),
            (format!("{cmd}+S"), "Download map as JSON"),
            (format!("{cmd}+P"), "Screenshot"),
            ("Alt+H".to_string(), "Toggle this help"),
            ("Double-click".to_string(), "Edit node text"),
            ("Drag onto node / line".to_string(), "Attach / insert node"),
            (format!("Middle drag / {cmd}+drag"), "Pan"),
            ("Wheel".to_string(), "Zoom"),
        ];

        let mut open = true;
        egui::Window::new("Keyboard Shortcuts")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("shortcut_grid").striped(true).show(ui, |ui| {
                    for (keys, action) in &rows {
                        ui.strong(keys.as_str());
                        ui.label(*action);
                        ui.end_row();
                    }
                });
            });
        if !open {
            self.interaction.show_help = false;
        }
    }

    fn draw_clear_confirmation(&mut self, ctx: &egui::Context) {
        if !self.interaction.confirm_clear {
            return;
        }
        egui::Window::new("Clear map?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("Remove every node from the map?");
                ui.horizontal(|ui| {
                    if ui.button("Clear").clicked() {
                        self.clear_map();
                        self.interaction.confirm_clear = false;
                    }
                    if ui.button("Cancel").clicked() {
                        self.interaction.confirm_clear = false;
                    }
                });
            });
    }
}

fn rgb_array(color: Color) -> [u8; 3] {
    [color.r, color.g, color.b]
}
