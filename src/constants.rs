//! Shared application-wide constants.
//! Centralizes tweakable values used across the model, rendering and export.

// Node dimensions
/// Default node circle radius in world units.
pub const DEFAULT_NODE_RADIUS: f32 = 30.0;
/// Smallest radius a node can be shrunk to.
pub const MIN_NODE_RADIUS: f32 = 15.0;
/// Largest radius a node can be grown to.
pub const MAX_NODE_RADIUS: f32 = 80.0;
/// Radius change per resize step.
pub const NODE_SIZE_STEP: f32 = 5.0;

// Labels
/// Default label font size in world units.
pub const DEFAULT_FONT_SIZE: f32 = 14.0;
/// Smallest label font size.
pub const MIN_FONT_SIZE: f32 = 10.0;
/// Largest label font size.
pub const MAX_FONT_SIZE: f32 = 36.0;
/// Font size change per resize step.
pub const FONT_SIZE_STEP: f32 = 2.0;

// Theme defaults
/// Default node background, light blue.
pub const DEFAULT_NODE_COLOR: &str = "#add8e6";
/// Default label color.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

// Node placement
/// Where new root nodes are placed.
pub const ROOT_POSITION: (f32, f32) = (200.0, 200.0);
/// Horizontal gap between a parent's edge and a new child.
pub const CHILD_OFFSET_X: f32 = 100.0;
/// Vertical gap between a node's edge and a new sibling.
pub const SIBLING_OFFSET_Y: f32 = 50.0;

// Drag and drop
/// Maximum distance (world units) between the pointer and a connector for it to count as a drop target.
pub const DROP_TOLERANCE: f32 = 20.0;

// Grid/drawing
/// Grid cell size in world units.
pub const GRID_SIZE: f32 = 20.0;
/// Connector stroke width in world units.
pub const CONNECTOR_WIDTH: f32 = 2.0;

// Canvas interactions
/// Zoom limits.
pub const MIN_ZOOM: f32 = 0.25;
/// Zoom limits.
pub const MAX_ZOOM: f32 = 5.0;

// Export
/// Blank space around the map in exported images.
pub const EXPORT_MARGIN: f32 = 40.0;
/// JPEG encoder quality (0-100).
pub const JPEG_QUALITY: u8 = 90;
/// A4 portrait page width in PDF points.
pub const A4_WIDTH_PT: f32 = 595.28;
/// A4 portrait page height in PDF points.
pub const A4_HEIGHT_PT: f32 = 841.89;
