//! Drag gestures as explicit values.
//!
//! A [`DragSession`] is created when the pointer goes down on a node, fed every
//! pointer move, and consumed when the pointer is released. The node follows the
//! pointer during the gesture; the parent change (if any) is only committed by
//! [`DragSession::finish`].

use crate::error::MindMapError;
use crate::geometry::Point;
use crate::model::MindMap;
use crate::types::{DropTarget, NodeId};
use log::{debug, warn};

/// An in-progress node drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    node: NodeId,
    grab_offset: (f32, f32),
    origin: Point,
    candidate: Option<DropTarget>,
}

/// What releasing the pointer did.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// No drop target: the node only changed position.
    Moved,
    /// The node was attached to the target.
    Reparented(DropTarget),
    /// The target refused the node; it stays where it was dropped with its old links.
    Rejected(DropTarget, MindMapError),
    /// The node disappeared while being dragged.
    Vanished,
}

impl DragSession {
    /// Starts dragging `node`, grabbed at `pointer`. Selects the node.
    ///
    /// Returns `None` if the node does not exist.
    pub fn begin(map: &mut MindMap, node: NodeId, pointer: Point) -> Option<Self> {
        let origin = map.node(node)?.position;
        map.select(node);
        debug!("drag started on {node}");
        Some(Self {
            node,
            grab_offset: (origin.0 - pointer.0, origin.1 - pointer.1),
            origin,
            candidate: None,
        })
    }

    /// The node being dragged.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Where the node was when the drag started.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// The drop target under the pointer as of the last update.
    pub fn candidate(&self) -> Option<DropTarget> {
        self.candidate
    }

    /// Moves the node along with the pointer and re-evaluates the drop target.
    pub fn update(&mut self, map: &mut MindMap, pointer: Point) {
        let position = (pointer.0 + self.grab_offset.0, pointer.1 + self.grab_offset.1);
        if !map.move_node(self.node, position) {
            self.candidate = None;
            return;
        }
        self.candidate = map.find_drop_target(pointer, self.node);
    }

    /// Ends the gesture, committing the pending drop if there is one.
    pub fn finish(self, map: &mut MindMap) -> DragOutcome {
        if !map.contains(self.node) {
            return DragOutcome::Vanished;
        }
        let Some(target) = self.candidate else {
            return DragOutcome::Moved;
        };
        match map.apply_drop(self.node, target) {
            Ok(()) => DragOutcome::Reparented(target),
            Err(err) => {
                warn!("drop of {} rejected: {err}", self.node);
                DragOutcome::Rejected(target, err)
            }
        }
    }
}
