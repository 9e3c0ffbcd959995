//! Error types for model operations and exports.
//!
//! Model errors are never fatal: a rejected operation leaves the map untouched
//! and callers are free to ignore the `Err`. Export errors describe a missing or
//! failing external resource and are shown to the user as a notification.

use crate::types::NodeId;
use thiserror::Error;

/// Reasons a model operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MindMapError {
    /// The referenced node does not exist (it may have been deleted meanwhile).
    #[error("node {0} not found")]
    NotFound(NodeId),
    /// The operation needs a selected node.
    #[error("no node is selected")]
    NoSelection,
    /// Root nodes have no parent to share with a sibling.
    #[error("cannot add a sibling to a root node")]
    RootHasNoSiblings,
    /// A node cannot be dropped onto itself.
    #[error("node {0} cannot become its own parent")]
    SelfTarget(NodeId),
    /// The new link would make a node its own ancestor.
    #[error("moving {dragged} under {target} would create a cycle")]
    WouldCreateCycle {
        /// Node being moved
        dragged: NodeId,
        /// Proposed new parent
        target: NodeId,
    },
    /// The target already is the dragged node's parent.
    #[error("{target} already is the parent of {dragged}")]
    AlreadyChild {
        /// Node being moved
        dragged: NodeId,
        /// Its current parent
        target: NodeId,
    },
    /// The pair passed as a connector is not a direct parent/child link.
    #[error("{parent} -> {child} is not a connector")]
    NotAnEdge {
        /// Claimed parent end
        parent: NodeId,
        /// Claimed child end
        child: NodeId,
    },
    /// A node cannot be spliced into a connector it is an end of.
    #[error("node {0} is an endpoint of the connector")]
    EndpointOfEdge(NodeId),
}

/// Failures while producing an export file.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Map serialization failed.
    #[error("failed to serialize map: {0}")]
    Json(#[from] serde_json::Error),
    /// The generated SVG could not be parsed for rasterization.
    #[error("failed to parse SVG: {0}")]
    SvgParse(String),
    /// A pixmap of the requested size could not be allocated.
    #[error("failed to create {width}x{height} pixmap")]
    Pixmap {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
    },
    /// PNG encoding failed.
    #[error("failed to encode PNG: {0}")]
    PngEncode(String),
    /// JPEG encoding failed.
    #[error("failed to encode JPEG: {0}")]
    JpegEncode(#[from] image::ImageError),
    /// Writing the output failed.
    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),
    /// The platform save mechanism is unavailable.
    #[error("save dialog unavailable: {0}")]
    Dialog(String),
}
