//! The downloadable map document.
//!
//! A flat list of node records plus the id counter, written as pretty JSON.
//! Export only; there is no reader.

use crate::model::MindMap;
use crate::types::{Color, NodeId};
use serde::Serialize;

/// Default file name offered for map downloads.
pub const MAP_FILE_NAME: &str = "mindmap.json";

/// One node as it appears in the exported document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Node identifier
    pub id: NodeId,
    /// Label
    pub text: String,
    /// Center x
    pub x: f32,
    /// Center y
    pub y: f32,
    /// Parent identifier, `null` for roots
    pub parent_id: Option<NodeId>,
    /// Fill color as `#rrggbb`
    pub bg_color: Color,
    /// Label color as `#rrggbb`
    pub text_color: Color,
    /// Children in order
    pub children_ids: Vec<NodeId>,
}

/// The exported map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    /// All nodes in creation order
    pub nodes: Vec<NodeRecord>,
    /// The id the next created node would have received
    pub next_id: u64,
}

impl MapDocument {
    /// Snapshots a map.
    pub fn from_map(map: &MindMap) -> Self {
        let nodes = map
            .nodes()
            .map(|node| NodeRecord {
                id: node.id,
                text: node.text.clone(),
                x: node.position.0,
                y: node.position.1,
                parent_id: node.parent,
                bg_color: node.style.background,
                text_color: node.style.text,
                children_ids: node.children.clone(),
            })
            .collect();
        Self {
            nodes,
            next_id: map.next_id(),
        }
    }

    /// Serialize the document to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl MindMap {
    /// Serializes the map in the download format.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        MapDocument::from_map(self).to_json()
    }
}
