//! # Mind Map Tool
//!
//! A visual mind map editor: circular nodes joined by parent/child connectors,
//! arranged freely on a pannable, zoomable canvas.
//!
//! ## Features
//! - Root, child and sibling creation from the keyboard or toolbar
//! - Drag a node onto another node to reparent it, or onto a connector to
//!   insert it between the two ends
//! - Cascading delete of a node and its descendants
//! - Per-node colors and size, persisted theme defaults
//! - JSON map download and PNG/JPEG/PDF screenshots

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod document;
pub mod drag;
pub mod error;
pub mod export;
pub mod geometry;
pub mod model;
pub mod settings;
pub mod types;
mod ui;

pub use document::MapDocument;
pub use drag::{DragOutcome, DragSession};
pub use error::{ExportError, MindMapError};
pub use export::{ExportFormat, ExportOptions};
pub use model::MindMap;
pub use settings::Settings;
pub use types::*;
pub use ui::MindMapApp;

/// Runs the mind map application.
///
/// Settings are restored from eframe's storage when available.
///
/// # Example
///
/// ```no_run
/// fn main() -> Result<(), eframe::Error> {
///     mindmap_tool::run_app()
/// }
/// ```
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Mind Map Tool",
        options,
        Box::new(|cc| Ok(Box::new(MindMapApp::new(cc)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_default_is_empty() {
        let app = MindMapApp::default();
        assert!(app.map.is_empty());
        assert_eq!(app.map.selected(), None);
        assert_eq!(app.settings, Settings::default());
    }

    #[test]
    fn test_app_applies_settings_to_model() {
        let settings = Settings {
            default_node_color: Color::rgb(10, 20, 30),
            drop_tolerance: 7.5,
            ..Default::default()
        };
        let app = MindMapApp::with_settings(settings);
        assert_eq!(app.map.default_style().background, Color::rgb(10, 20, 30));
        assert_eq!(app.map.drop_tolerance(), 7.5);
    }
}
