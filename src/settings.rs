//! Persisted UI settings.
//!
//! Stored as JSON through [`eframe::Storage`] so that the theme, default node
//! colors and export preferences survive restarts.

use crate::constants;
use crate::export::{ExportFormat, ExportOptions};
use crate::model::MindMap;
use crate::types::{Color, NodeStyle};
use serde::{Deserialize, Serialize};

/// Storage key the settings are saved under.
pub const SETTINGS_KEY: &str = "settings";

/// User preferences that outlive a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Dark visuals
    pub dark_mode: bool,
    /// Fill for newly created nodes
    pub default_node_color: Color,
    /// Label color for newly created nodes
    pub default_text_color: Color,
    /// Draw the background grid
    pub show_grid: bool,
    /// Connector hit distance while dragging, in world units
    pub drop_tolerance: f32,
    /// Format used by the screenshot button
    pub export_format: ExportFormat,
    /// Raster scale for screenshots
    pub export_scale: f32,
}

impl Default for Settings {
    fn default() -> Self {
        let style = NodeStyle::default();
        Self {
            dark_mode: false,
            default_node_color: style.background,
            default_text_color: style.text,
            show_grid: true,
            drop_tolerance: constants::DROP_TOLERANCE,
            export_format: ExportFormat::default(),
            export_scale: 2.0,
        }
    }
}

impl Settings {
    /// Reads settings from storage, falling back to defaults when absent or unreadable.
    pub fn load(storage: Option<&dyn eframe::Storage>) -> Self {
        let Some(json) = storage.and_then(|s| s.get_string(SETTINGS_KEY)) else {
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("ignoring unreadable settings: {err}");
                Self::default()
            }
        }
    }

    /// Writes settings to storage.
    pub fn save(&self, storage: &mut dyn eframe::Storage) {
        match serde_json::to_string(self) {
            Ok(json) => storage.set_string(SETTINGS_KEY, json),
            Err(err) => log::error!("failed to serialize settings: {err}"),
        }
    }

    /// Style given to new nodes.
    pub fn default_style(&self) -> NodeStyle {
        NodeStyle {
            background: self.default_node_color,
            text: self.default_text_color,
        }
    }

    /// Pushes the style and drop tolerance into the model.
    pub fn apply_to(&self, map: &mut MindMap) {
        map.set_default_style(self.default_style());
        map.set_drop_tolerance(self.drop_tolerance);
    }

    /// Restores the theme colors to the built-in pair.
    pub fn reset_colors(&mut self) {
        let style = NodeStyle::default();
        self.default_node_color = style.background;
        self.default_text_color = style.text;
    }

    /// Export options matching these settings.
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            scale: self.export_scale,
            background: Some(if self.dark_mode {
                Color::rgb(0x1e, 0x1e, 0x1e)
            } else {
                Color::WHITE
            }),
            connector_color: if self.dark_mode {
                Color::rgb(0xc8, 0xc8, 0xc8)
            } else {
                Color::BLACK
            },
            ..ExportOptions::default()
        }
    }
}
