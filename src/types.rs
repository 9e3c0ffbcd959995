//! Core data types and structures for the mind map tool.
//!
//! This module defines the fundamental data structures shared by the model,
//! the exporters and the UI: node identifiers, colors, styles, nodes and the
//! derived connector and drop-target values.

use crate::constants;
use crate::geometry::{self, Point};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for mind map nodes.
///
/// Allocated from a per-map monotonic counter and never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// An opaque RGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Pure black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Pure white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Creates a color from its channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Formats the color as a lowercase `#rrggbb` string.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, String> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(format!("invalid color '{hex}', expected #rrggbb"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| format!("invalid color '{hex}', expected #rrggbb"))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

/// Background and label color of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStyle {
    /// Circle fill
    pub background: Color,
    /// Label color
    pub text: Color,
}

impl Default for NodeStyle {
    /// The theme-wide default pair: light blue with black text.
    fn default() -> Self {
        Self {
            background: Color::rgb(0xad, 0xd8, 0xe6),
            text: Color::BLACK,
        }
    }
}

/// A single node in the mind map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMapNode {
    /// Unique identifier for this node
    pub id: NodeId,
    /// Label shown inside the circle
    pub text: String,
    /// Center of the node's circle in world coordinates
    pub position: Point,
    /// Parent node, `None` for roots
    pub parent: Option<NodeId>,
    /// Children in creation/reparent order
    pub children: Vec<NodeId>,
    /// Colors used to paint the node
    pub style: NodeStyle,
    /// Circle radius in world units
    pub radius: f32,
    /// Label font size in world units
    pub font_size: f32,
}

impl MindMapNode {
    /// Creates a detached node with default size.
    pub fn new(id: NodeId, text: String, position: Point, style: NodeStyle) -> Self {
        Self {
            id,
            text,
            position,
            parent: None,
            children: Vec::new(),
            style,
            radius: constants::DEFAULT_NODE_RADIUS,
            font_size: constants::DEFAULT_FONT_SIZE,
        }
    }

    /// Whether this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether `point` falls inside the node's circle.
    pub fn contains(&self, point: Point) -> bool {
        geometry::point_in_circle(point, self.position, self.radius)
    }
}

/// Direction of a node resize step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeStep {
    /// Larger circle and font
    Grow,
    /// Smaller circle and font
    Shrink,
}

impl SizeStep {
    /// `+1.0` for growth, `-1.0` for shrinking.
    pub fn sign(self) -> f32 {
        match self {
            SizeStep::Grow => 1.0,
            SizeStep::Shrink => -1.0,
        }
    }
}

/// The derived line between a parent and one of its children.
///
/// Never stored; always regenerated from the node set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    /// Parent end of the link
    pub parent: NodeId,
    /// Child end of the link
    pub child: NodeId,
    /// Parent center
    pub start: Point,
    /// Child center
    pub end: Point,
    /// Parent circle radius
    pub start_radius: f32,
    /// Child circle radius
    pub end_radius: f32,
}

impl Connector {
    /// Distance from `point` to the center-to-center segment.
    pub fn distance_to(&self, point: Point) -> f32 {
        geometry::point_to_segment_distance(point, self.start, self.end)
    }

    /// The visible part of the line, from the parent's circle edge to the child's.
    pub fn trimmed(&self) -> (Point, Point) {
        geometry::trim_to_circles(self.start, self.start_radius, self.end, self.end_radius)
    }

    /// Midpoint of the center-to-center segment.
    pub fn midpoint(&self) -> Point {
        geometry::midpoint(self.start, self.end)
    }
}

/// What a dragged node would attach to if released now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Become a child of this node
    Node(NodeId),
    /// Splice into the link between these two nodes
    Connector {
        /// Parent end of the link
        parent: NodeId,
        /// Child end of the link
        child: NodeId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let node = MindMapNode::new(
            NodeId(7),
            "Test Node".to_string(),
            (100.0, 200.0),
            NodeStyle::default(),
        );

        assert_eq!(node.text, "Test Node");
        assert_eq!(node.position, (100.0, 200.0));
        assert!(node.is_root());
        assert!(node.children.is_empty());
        assert_eq!(node.radius, constants::DEFAULT_NODE_RADIUS);
        assert_eq!(node.font_size, constants::DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_node_contains_uses_radius() {
        let mut node = MindMapNode::new(NodeId(1), "A".into(), (0.0, 0.0), NodeStyle::default());
        assert!(node.contains((0.0, 29.0)));
        assert!(!node.contains((0.0, 31.0)));

        node.radius = 50.0;
        assert!(node.contains((0.0, 31.0)));
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId(42).to_string(), "node-42");
    }

    #[test]
    fn test_color_hex_roundtrip() {
        let color = Color::from_hex("#ADD8E6").unwrap();
        assert_eq!(color, Color::rgb(0xad, 0xd8, 0xe6));
        assert_eq!(color.to_hex(), "#add8e6");
        assert_eq!("000000".parse::<Color>().unwrap(), Color::BLACK);
    }

    #[test]
    fn test_color_rejects_malformed_hex() {
        assert!(Color::from_hex("#abc").is_err());
        assert!(Color::from_hex("#gggggg").is_err());
        assert!(Color::from_hex("#ab€cd").is_err());
    }

    #[test]
    fn test_default_style_matches_theme_constants() {
        let style = NodeStyle::default();
        assert_eq!(style.background.to_hex(), constants::DEFAULT_NODE_COLOR);
        assert_eq!(style.text.to_hex(), constants::DEFAULT_TEXT_COLOR);
    }

    #[test]
    fn test_color_serializes_as_hex_string() {
        let json = serde_json::to_string(&Color::rgb(255, 0, 16)).unwrap();
        assert_eq!(json, "\"#ff0010\"");
        let parsed: Color = serde_json::from_str("\"#00ff00\"").unwrap();
        assert_eq!(parsed, Color::rgb(0, 255, 0));
    }

    #[test]
    fn test_connector_trimmed_and_distance() {
        let connector = Connector {
            parent: NodeId(1),
            child: NodeId(2),
            start: (0.0, 0.0),
            end: (100.0, 0.0),
            start_radius: 30.0,
            end_radius: 20.0,
        };
        assert_eq!(connector.trimmed(), ((30.0, 0.0), (80.0, 0.0)));
        assert_eq!(connector.distance_to((50.0, 12.0)), 12.0);
        assert_eq!(connector.midpoint(), (50.0, 0.0));
    }
}
