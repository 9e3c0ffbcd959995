//! Application state management structures.
//!
//! The model lives in [`MindMap`]; everything here is view state that is
//! rebuilt on every start except for [`Settings`], which is persisted.

use super::notifications::Notifications;
use crate::drag::DragSession;
use crate::export::ExportFormat;
use crate::model::MindMap;
use crate::settings::Settings;
use crate::types::NodeId;
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};

/// State related to canvas navigation.
pub struct CanvasState {
    /// Pan offset in screen space
    pub offset: egui::Vec2,
    /// Current zoom level (1.0 = 100%)
    pub zoom_factor: f32,
    /// Whether the offset has been aligned to the canvas origin yet
    pub initialized: bool,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            offset: egui::Vec2::ZERO,
            zoom_factor: 1.0,
            initialized: false,
        }
    }
}

/// State related to pointer and keyboard interaction.
#[derive(Default)]
pub struct InteractionState {
    /// Node drag in progress
    pub drag: Option<DragSession>,
    /// Whether the user is currently panning the canvas
    pub is_panning: bool,
    /// Last mouse position during panning
    pub last_pan_pos: Option<egui::Pos2>,
    /// Node whose label is being edited
    pub editing_node: Option<NodeId>,
    /// Label text while editing
    pub temp_text: String,
    /// Whether focus was already requested for the current edit session
    pub focus_requested_for_edit: bool,
    /// Keyboard shortcut overlay visibility
    pub show_help: bool,
    /// Clear-map confirmation dialog visibility
    pub confirm_clear: bool,
}

/// A download waiting to be produced at the start of the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingDownload {
    /// The map as JSON
    Map,
    /// A rendered image or document
    Screenshot(ExportFormat),
}

/// Messages sent from async save tasks back to the app.
#[derive(Debug)]
pub enum FileOperationResult {
    /// The file was written to the given location
    SaveCompleted(String),
    /// The user dismissed the dialog
    Cancelled,
    /// Saving failed
    OperationFailed(String),
}

/// State related to file output.
pub struct FileState {
    /// Download requested by a button or shortcut
    pub pending: Option<PendingDownload>,
    /// Sender handed to save tasks
    pub sender: Sender<FileOperationResult>,
    /// Receiver drained once per frame
    pub receiver: Receiver<FileOperationResult>,
}

impl Default for FileState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            pending: None,
            sender,
            receiver,
        }
    }
}

/// The main application structure.
///
/// Implements [`eframe::App`]; painting derives everything from `map` each frame.
pub struct MindMapApp {
    /// The mind map being edited
    pub map: MindMap,
    /// Persisted preferences
    pub settings: Settings,
    /// Canvas navigation state
    pub canvas: CanvasState,
    /// Pointer and keyboard state
    pub interaction: InteractionState,
    /// Download state
    pub file: FileState,
    /// Toast notifications
    pub notifications: Notifications,
}

impl Default for MindMapApp {
    fn default() -> Self {
        Self::with_settings(Settings::default())
    }
}

impl MindMapApp {
    /// Creates an empty app using the given settings.
    pub fn with_settings(settings: Settings) -> Self {
        let mut map = MindMap::new();
        settings.apply_to(&mut map);
        Self {
            map,
            settings,
            canvas: CanvasState::default(),
            interaction: InteractionState::default(),
            file: FileState::default(),
            notifications: Notifications::new(),
        }
    }

    /// Restores settings from eframe storage.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        Self::with_settings(Settings::load(cc.storage))
    }
}
