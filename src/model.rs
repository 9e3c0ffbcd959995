//! The in-memory mind map: nodes, parent/child links, selection, and the
//! reparent-on-drop decision procedure.
//!
//! All mutation goes through [`MindMap`] methods. Every method that changes a
//! node's parent updates the old and new parent's child lists in the same call,
//! so `children` always mirrors `parent` across the whole map.

use crate::constants;
use crate::error::MindMapError;
use crate::geometry::Point;
use crate::types::*;
use log::{debug, warn};
use std::collections::BTreeMap;

/// The mind map model.
///
/// Nodes are kept ordered by id, which is also creation order; later nodes are
/// painted on top and win hit tests.
#[derive(Debug, Clone)]
pub struct MindMap {
    nodes: BTreeMap<NodeId, MindMapNode>,
    next_id: u64,
    selected: Option<NodeId>,
    default_style: NodeStyle,
    drop_tolerance: f32,
}

impl Default for MindMap {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 1,
            selected: None,
            default_style: NodeStyle::default(),
            drop_tolerance: constants::DROP_TOLERANCE,
        }
    }
}

impl MindMap {
    /// Creates an empty map with the theme's default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the map has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a node.
    pub fn node(&self, id: NodeId) -> Option<&MindMapNode> {
        self.nodes.get(&id)
    }

    /// Whether a node with this id exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &MindMapNode> {
        self.nodes.values()
    }

    /// Root nodes in creation order.
    pub fn roots(&self) -> impl Iterator<Item = &MindMapNode> {
        self.nodes.values().filter(|n| n.is_root())
    }

    /// The id the next created node will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Style applied to nodes created without an explicit one.
    pub fn default_style(&self) -> NodeStyle {
        self.default_style
    }

    /// Changes the style for future nodes; existing nodes keep their colors.
    pub fn set_default_style(&mut self, style: NodeStyle) {
        self.default_style = style;
    }

    /// Restores the theme default style for future nodes.
    pub fn reset_default_style(&mut self) {
        self.default_style = NodeStyle::default();
    }

    /// Connector proximity threshold used by [`MindMap::find_drop_target`].
    pub fn drop_tolerance(&self) -> f32 {
        self.drop_tolerance
    }

    /// Sets the connector proximity threshold; negative values are treated as zero.
    pub fn set_drop_tolerance(&mut self, tolerance: f32) {
        self.drop_tolerance = tolerance.max(0.0);
    }

    // ----- selection -----

    /// Currently selected node.
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Selects a node. Unknown ids leave the selection unchanged and return `false`.
    pub fn select(&mut self, id: NodeId) -> bool {
        if self.nodes.contains_key(&id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    /// Drops the selection, e.g. when empty canvas is clicked.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // ----- creation -----

    /// Creates a node and selects it.
    ///
    /// A `parent` that does not resolve to an existing node is ignored and the
    /// node becomes a root. `style` falls back to the map's default style.
    pub fn create_node(
        &mut self,
        parent: Option<NodeId>,
        text: impl Into<String>,
        position: Point,
        style: Option<NodeStyle>,
    ) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        let mut node = MindMapNode::new(
            id,
            text.into(),
            position,
            style.unwrap_or(self.default_style),
        );

        if let Some(parent_id) = parent {
            match self.nodes.get_mut(&parent_id) {
                Some(parent_node) => {
                    parent_node.children.push(id);
                    node.parent = Some(parent_id);
                }
                None => warn!("parent {parent_id} not found, creating {id} as a root"),
            }
        }

        debug!("created {id} (parent: {:?})", node.parent);
        self.nodes.insert(id, node);
        self.selected = Some(id);
        id
    }

    /// Adds a root node at the default root position.
    pub fn add_root_node(&mut self) -> NodeId {
        self.create_node(None, "Root Node", constants::ROOT_POSITION, None)
    }

    /// Adds a child to the selected node, to the right of it.
    pub fn add_child_node(&mut self) -> Result<NodeId, MindMapError> {
        let parent_id = self.selected.ok_or(MindMapError::NoSelection)?;
        let parent = self
            .nodes
            .get(&parent_id)
            .ok_or(MindMapError::NotFound(parent_id))?;
        let position = (
            parent.position.0 + parent.radius + constants::CHILD_OFFSET_X,
            parent.position.1,
        );
        Ok(self.create_node(Some(parent_id), "New Child", position, None))
    }

    /// Adds a sibling of the selected node, below it.
    pub fn add_sibling_node(&mut self) -> Result<NodeId, MindMapError> {
        let current_id = self.selected.ok_or(MindMapError::NoSelection)?;
        let current = self
            .nodes
            .get(&current_id)
            .ok_or(MindMapError::NotFound(current_id))?;
        let parent_id = current.parent.ok_or(MindMapError::RootHasNoSiblings)?;
        let position = (
            current.position.0,
            current.position.1 + current.radius + constants::SIBLING_OFFSET_Y,
        );
        Ok(self.create_node(Some(parent_id), "New Sibling", position, None))
    }

    // ----- deletion -----

    /// Deletes a node and its whole subtree.
    ///
    /// Returns the removed ids in deletion order (descendants first, the node
    /// itself last); empty when `id` does not exist. If the selection was
    /// removed it moves to the former parent, else to the lowest remaining id.
    pub fn delete_node(&mut self, id: NodeId) -> Vec<NodeId> {
        let Some(former_parent) = self.nodes.get(&id).map(|n| n.parent) else {
            return Vec::new();
        };

        let removed = self.subtree_post_order(id);
        for removed_id in &removed {
            self.nodes.remove(removed_id);
        }

        if let Some(parent) = former_parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }

        if self.selected.is_some_and(|s| removed.contains(&s)) {
            self.selected = former_parent
                .filter(|p| self.nodes.contains_key(p))
                .or_else(|| self.nodes.keys().next().copied());
        }

        debug!("deleted {id} and {} descendant(s)", removed.len() - 1);
        removed
    }

    /// Removes every node. Ids keep counting up from where they were.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.selected = None;
    }

    // ----- edits -----

    /// Moves a node. Links are untouched; connectors follow on the next query.
    pub fn move_node(&mut self, id: NodeId, position: Point) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Replaces a node's label.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Replaces both colors of a node.
    pub fn set_style(&mut self, id: NodeId, style: NodeStyle) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.style = style;
                true
            }
            None => false,
        }
    }

    /// Changes a node's fill color only.
    pub fn set_background(&mut self, id: NodeId, color: Color) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.style.background = color;
                true
            }
            None => false,
        }
    }

    /// Changes a node's label color only.
    pub fn set_text_color(&mut self, id: NodeId, color: Color) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.style.text = color;
                true
            }
            None => false,
        }
    }

    /// Steps a node's radius and font size together, clamped to their ranges.
    ///
    /// Returns `Ok(false)` when both values were already at the limit.
    pub fn resize_node(&mut self, id: NodeId, step: SizeStep) -> Result<bool, MindMapError> {
        let node = self.nodes.get_mut(&id).ok_or(MindMapError::NotFound(id))?;

        let radius = (node.radius + step.sign() * constants::NODE_SIZE_STEP)
            .clamp(constants::MIN_NODE_RADIUS, constants::MAX_NODE_RADIUS);
        let font_size = (node.font_size + step.sign() * constants::FONT_SIZE_STEP)
            .clamp(constants::MIN_FONT_SIZE, constants::MAX_FONT_SIZE);

        if radius == node.radius && font_size == node.font_size {
            return Ok(false);
        }
        node.radius = radius;
        node.font_size = font_size;
        Ok(true)
    }

    // ----- tree queries -----

    /// Ancestors of a node, nearest first. Bounded by the node count.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.nodes.get(&id).and_then(|n| n.parent);
        while let Some(parent) = current {
            if chain.len() >= self.nodes.len() {
                break;
            }
            chain.push(parent);
            current = self.nodes.get(&parent).and_then(|n| n.parent);
        }
        chain
    }

    /// Whether `candidate` lies strictly below `ancestor`.
    pub fn is_descendant(&self, candidate: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(candidate).contains(&ancestor)
    }

    /// All strict descendants of a node in post-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = self.subtree_post_order(id);
        order.pop();
        order
    }

    fn subtree_post_order(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        if !self.nodes.contains_key(&id) {
            return order;
        }
        // (node, children already pushed)
        let mut stack = vec![(id, false)];
        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                order.push(current);
                continue;
            }
            stack.push((current, true));
            if let Some(node) = self.nodes.get(&current) {
                for child in node.children.iter().rev() {
                    stack.push((*child, false));
                }
            }
        }
        order
    }

    // ----- connectors -----

    /// One connector per parent/child link, in child creation order.
    pub fn connectors(&self) -> Vec<Connector> {
        self.nodes
            .values()
            .filter_map(|child| {
                let parent = self.nodes.get(&child.parent?)?;
                Some(Connector {
                    parent: parent.id,
                    child: child.id,
                    start: parent.position,
                    end: child.position,
                    start_radius: parent.radius,
                    end_radius: child.radius,
                })
            })
            .collect()
    }

    // ----- reparenting -----

    /// Makes `dragged` a child of `target`.
    ///
    /// Rejected, with the map unchanged, when either node is missing, when
    /// `target` is `dragged` or one of its descendants, or when `target`
    /// already is the parent.
    pub fn reparent(&mut self, dragged: NodeId, target: NodeId) -> Result<(), MindMapError> {
        let current_parent = self
            .nodes
            .get(&dragged)
            .ok_or(MindMapError::NotFound(dragged))?
            .parent;
        if !self.nodes.contains_key(&target) {
            return Err(MindMapError::NotFound(target));
        }
        if target == dragged {
            return Err(MindMapError::SelfTarget(dragged));
        }
        if self.is_descendant(target, dragged) {
            return Err(MindMapError::WouldCreateCycle { dragged, target });
        }
        if current_parent == Some(target) {
            return Err(MindMapError::AlreadyChild { dragged, target });
        }

        self.link(dragged, target);
        debug!("reparented {dragged} under {target}");
        Ok(())
    }

    /// Splices `dragged` into the link `edge_parent -> edge_child`.
    ///
    /// Afterwards `dragged` is a child of `edge_parent` and the parent of
    /// `edge_child`. Both new links are checked for cycles.
    pub fn reparent_onto_connector(
        &mut self,
        dragged: NodeId,
        edge_parent: NodeId,
        edge_child: NodeId,
    ) -> Result<(), MindMapError> {
        for id in [dragged, edge_parent, edge_child] {
            if !self.nodes.contains_key(&id) {
                return Err(MindMapError::NotFound(id));
            }
        }
        let is_edge = self
            .nodes
            .get(&edge_child)
            .is_some_and(|c| c.parent == Some(edge_parent));
        if !is_edge {
            return Err(MindMapError::NotAnEdge {
                parent: edge_parent,
                child: edge_child,
            });
        }
        if dragged == edge_parent || dragged == edge_child {
            return Err(MindMapError::EndpointOfEdge(dragged));
        }
        if self.is_descendant(edge_parent, dragged) {
            return Err(MindMapError::WouldCreateCycle {
                dragged,
                target: edge_parent,
            });
        }
        if self.is_descendant(edge_child, dragged) {
            return Err(MindMapError::WouldCreateCycle {
                dragged,
                target: edge_child,
            });
        }

        self.link(dragged, edge_parent);
        self.link(edge_child, dragged);
        debug!("spliced {dragged} between {edge_parent} and {edge_child}");
        Ok(())
    }

    /// Applies a drop decided by [`MindMap::find_drop_target`].
    pub fn apply_drop(&mut self, dragged: NodeId, target: DropTarget) -> Result<(), MindMapError> {
        match target {
            DropTarget::Node(target) => self.reparent(dragged, target),
            DropTarget::Connector { parent, child } => {
                self.reparent_onto_connector(dragged, parent, child)
            }
        }
    }

    /// Moves `child` under `parent`, fixing both child lists. Callers validate first.
    fn link(&mut self, child: NodeId, parent: NodeId) {
        let old_parent = self.nodes.get(&child).and_then(|n| n.parent);
        if let Some(old) = old_parent.and_then(|p| self.nodes.get_mut(&p)) {
            old.children.retain(|c| *c != child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(new_parent) = self.nodes.get_mut(&parent) {
            new_parent.children.push(child);
        }
    }

    // ----- hit testing -----

    /// Finds what a node dragged to `pointer` would be dropped onto.
    ///
    /// Nodes are hit-tested first, topmost first; otherwise the nearest
    /// connector within the drop tolerance is chosen. `excluded` (the dragged
    /// node) never matches, nor do connectors it is an end of.
    pub fn find_drop_target(&self, pointer: Point, excluded: NodeId) -> Option<DropTarget> {
        if let Some(id) = self.node_at(pointer, Some(excluded)) {
            return Some(DropTarget::Node(id));
        }

        self.connectors()
            .into_iter()
            .filter(|c| c.parent != excluded && c.child != excluded)
            .map(|c| (c.distance_to(pointer), c))
            .filter(|(d, _)| *d < self.drop_tolerance)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, c)| DropTarget::Connector {
                parent: c.parent,
                child: c.child,
            })
    }

    /// Topmost node whose circle contains `point`, skipping `excluded`.
    pub fn node_at(&self, point: Point, excluded: Option<NodeId>) -> Option<NodeId> {
        self.nodes
            .values()
            .rev()
            .filter(|n| Some(n.id) != excluded)
            .find(|n| n.contains(point))
            .map(|n| n.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Checks the two structural invariants: children mirror parents, and
    /// every parent chain reaches a root within `len` steps.
    fn assert_consistent(map: &MindMap) {
        for node in map.nodes() {
            let mut expected: Vec<NodeId> = map
                .nodes()
                .filter(|n| n.parent == Some(node.id))
                .map(|n| n.id)
                .collect();
            let mut actual = node.children.clone();
            expected.sort();
            actual.sort();
            assert_eq!(actual, expected, "children of {} out of sync", node.id);

            if let Some(parent) = node.parent {
                assert!(map.contains(parent), "{} has dangling parent", node.id);
            }

            let mut steps = 0;
            let mut current = node.parent;
            while let Some(p) = current {
                steps += 1;
                assert!(steps <= map.len(), "cycle through {}", node.id);
                current = map.node(p).and_then(|n| n.parent);
            }
        }
        if let Some(selected) = map.selected() {
            assert!(map.contains(selected));
        }
    }

    fn parent_of(map: &MindMap, id: NodeId) -> Option<NodeId> {
        map.node(id).and_then(|n| n.parent)
    }

    fn children_of(map: &MindMap, id: NodeId) -> Vec<NodeId> {
        map.node(id).map(|n| n.children.clone()).unwrap_or_default()
    }

    /// R with children A and B, and C under A.
    fn sample_tree() -> (MindMap, NodeId, NodeId, NodeId, NodeId) {
        let mut map = MindMap::new();
        let r = map.create_node(None, "R", (0.0, 0.0), None);
        let a = map.create_node(Some(r), "A", (200.0, -100.0), None);
        let b = map.create_node(Some(r), "B", (200.0, 100.0), None);
        let c = map.create_node(Some(a), "C", (400.0, -100.0), None);
        (map, r, a, b, c)
    }

    #[test]
    fn test_create_root_node() {
        let mut map = MindMap::new();
        let id = map.create_node(None, "Root", (10.0, 20.0), None);

        let node = map.node(id).unwrap();
        assert!(node.is_root());
        assert_eq!(node.text, "Root");
        assert_eq!(node.position, (10.0, 20.0));
        assert_eq!(node.style, NodeStyle::default());
        assert_eq!(map.selected(), Some(id));
        assert_eq!(map.next_id(), id.0 + 1);
    }

    #[test]
    fn test_create_child_appends_to_parent() {
        let (map, r, a, b, c) = sample_tree();
        assert_eq!(children_of(&map, r), vec![a, b]);
        assert_eq!(children_of(&map, a), vec![c]);
        assert_eq!(parent_of(&map, c), Some(a));
        assert_eq!(map.selected(), Some(c));
        assert_consistent(&map);
    }

    #[test]
    fn test_create_with_missing_parent_falls_back_to_root() {
        let mut map = MindMap::new();
        let id = map.create_node(Some(NodeId(99)), "Orphan", (0.0, 0.0), None);
        assert!(map.node(id).unwrap().is_root());
        assert_consistent(&map);
    }

    #[test]
    fn test_create_uses_explicit_or_default_style() {
        let mut map = MindMap::new();
        let custom = NodeStyle {
            background: Color::rgb(255, 0, 0),
            text: Color::WHITE,
        };
        let a = map.create_node(None, "A", (0.0, 0.0), Some(custom));
        assert_eq!(map.node(a).unwrap().style, custom);

        let themed = NodeStyle {
            background: Color::rgb(1, 2, 3),
            text: Color::rgb(4, 5, 6),
        };
        map.set_default_style(themed);
        let b = map.create_node(None, "B", (0.0, 0.0), None);
        assert_eq!(map.node(b).unwrap().style, themed);
        assert_eq!(map.node(a).unwrap().style, custom);

        map.reset_default_style();
        assert_eq!(map.default_style(), NodeStyle::default());
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut map = MindMap::new();
        let a = map.add_root_node();
        map.delete_node(a);
        map.clear();
        let b = map.add_root_node();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_add_root_child_and_sibling_placement() {
        let mut map = MindMap::new();
        let root = map.add_root_node();
        assert_eq!(map.node(root).unwrap().position, constants::ROOT_POSITION);
        assert_eq!(map.node(root).unwrap().text, "Root Node");

        let child = map.add_child_node().unwrap();
        let expected_x = constants::ROOT_POSITION.0
            + constants::DEFAULT_NODE_RADIUS
            + constants::CHILD_OFFSET_X;
        assert_eq!(map.node(child).unwrap().position, (expected_x, constants::ROOT_POSITION.1));
        assert_eq!(parent_of(&map, child), Some(root));
        assert_eq!(map.selected(), Some(child));

        let sibling = map.add_sibling_node().unwrap();
        let expected_y = constants::ROOT_POSITION.1
            + constants::DEFAULT_NODE_RADIUS
            + constants::SIBLING_OFFSET_Y;
        assert_eq!(map.node(sibling).unwrap().position, (expected_x, expected_y));
        assert_eq!(parent_of(&map, sibling), Some(root));
        assert_eq!(children_of(&map, root), vec![child, sibling]);
        assert_consistent(&map);
    }

    #[test]
    fn test_add_child_and_sibling_require_selection() {
        let mut map = MindMap::new();
        assert_eq!(map.add_child_node(), Err(MindMapError::NoSelection));
        assert_eq!(map.add_sibling_node(), Err(MindMapError::NoSelection));

        map.add_root_node();
        assert_eq!(map.add_sibling_node(), Err(MindMapError::RootHasNoSiblings));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_delete_removes_subtree_and_unlinks() {
        let (mut map, r, a, b, c) = sample_tree();
        let before = map.len();

        let removed = map.delete_node(a);

        assert_eq!(removed, vec![c, a]);
        assert_eq!(map.len(), before - 2);
        assert!(!map.contains(a));
        assert!(!map.contains(c));
        assert_eq!(children_of(&map, r), vec![b]);
        assert_consistent(&map);
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let (mut map, ..) = sample_tree();
        let before = map.len();
        assert!(map.delete_node(NodeId(1234)).is_empty());
        assert_eq!(map.len(), before);
    }

    #[test]
    fn test_delete_moves_selection_to_former_parent() {
        let (mut map, _r, a, _b, c) = sample_tree();
        assert_eq!(map.selected(), Some(c));
        map.delete_node(c);
        assert_eq!(map.selected(), Some(a));
    }

    #[test]
    fn test_delete_selected_descendant_moves_selection_to_deleted_nodes_parent() {
        let (mut map, r, a, _b, c) = sample_tree();
        map.select(c);
        map.delete_node(a);
        assert_eq!(map.selected(), Some(r));
    }

    #[test]
    fn test_delete_root_moves_selection_to_remaining_node_or_none() {
        let mut map = MindMap::new();
        let first = map.create_node(None, "First", (0.0, 0.0), None);
        let second = map.create_node(None, "Second", (100.0, 0.0), None);
        assert_eq!(map.selected(), Some(second));

        map.delete_node(second);
        assert_eq!(map.selected(), Some(first));

        map.delete_node(first);
        assert_eq!(map.selected(), None);
        assert!(map.is_empty());
    }

    #[test]
    fn test_delete_unselected_keeps_selection() {
        let (mut map, _r, a, b, _c) = sample_tree();
        map.select(b);
        map.delete_node(a);
        assert_eq!(map.selected(), Some(b));
    }

    #[test]
    fn test_move_node_keeps_links() {
        let (mut map, r, a, ..) = sample_tree();
        assert!(map.move_node(a, (-50.0, 75.0)));
        assert_eq!(map.node(a).unwrap().position, (-50.0, 75.0));
        assert_eq!(parent_of(&map, a), Some(r));

        let connector = map.connectors().into_iter().find(|c| c.child == a).unwrap();
        assert_eq!(connector.end, (-50.0, 75.0));
        assert!(!map.move_node(NodeId(500), (0.0, 0.0)));
    }

    #[test]
    fn test_text_and_color_edits() {
        let (mut map, r, ..) = sample_tree();
        assert!(map.set_text(r, "Renamed"));
        assert!(map.set_background(r, Color::rgb(10, 20, 30)));
        assert!(map.set_text_color(r, Color::WHITE));

        let node = map.node(r).unwrap();
        assert_eq!(node.text, "Renamed");
        assert_eq!(node.style.background, Color::rgb(10, 20, 30));
        assert_eq!(node.style.text, Color::WHITE);

        assert!(!map.set_text(NodeId(999), "x"));
        assert!(!map.set_style(NodeId(999), NodeStyle::default()));
    }

    #[test]
    fn test_resize_clamps_to_limits() {
        let mut map = MindMap::new();
        let id = map.add_root_node();

        assert_eq!(map.resize_node(id, SizeStep::Grow), Ok(true));
        let node = map.node(id).unwrap();
        assert_eq!(node.radius, constants::DEFAULT_NODE_RADIUS + constants::NODE_SIZE_STEP);
        assert_eq!(node.font_size, constants::DEFAULT_FONT_SIZE + constants::FONT_SIZE_STEP);

        for _ in 0..40 {
            let _ = map.resize_node(id, SizeStep::Grow);
        }
        assert_eq!(map.node(id).unwrap().radius, constants::MAX_NODE_RADIUS);
        assert_eq!(map.node(id).unwrap().font_size, constants::MAX_FONT_SIZE);
        assert_eq!(map.resize_node(id, SizeStep::Grow), Ok(false));

        for _ in 0..40 {
            let _ = map.resize_node(id, SizeStep::Shrink);
        }
        assert_eq!(map.node(id).unwrap().radius, constants::MIN_NODE_RADIUS);
        assert_eq!(map.node(id).unwrap().font_size, constants::MIN_FONT_SIZE);
        assert_eq!(map.resize_node(id, SizeStep::Shrink), Ok(false));

        assert_eq!(
            map.resize_node(NodeId(77), SizeStep::Grow),
            Err(MindMapError::NotFound(NodeId(77)))
        );
    }

    #[test]
    fn test_clear_removes_everything() {
        let (mut map, ..) = sample_tree();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.selected(), None);
        assert!(map.connectors().is_empty());
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let (map, r, a, b, c) = sample_tree();
        assert_eq!(map.ancestors(c), vec![a, r]);
        assert!(map.is_descendant(c, r));
        assert!(!map.is_descendant(r, c));
        assert!(!map.is_descendant(b, a));
        assert_eq!(map.descendants(r), vec![c, a, b]);
        assert!(map.descendants(b).is_empty());
    }

    #[test]
    fn test_connectors_follow_links() {
        let (map, r, a, b, c) = sample_tree();
        let pairs: Vec<(NodeId, NodeId)> =
            map.connectors().iter().map(|c| (c.parent, c.child)).collect();
        assert_eq!(pairs, vec![(r, a), (r, b), (a, c)]);
    }

    #[test]
    fn test_reparent_moves_between_child_lists() {
        let (mut map, r, a, b, c) = sample_tree();

        assert_eq!(map.reparent(c, b), Ok(()));

        assert_eq!(parent_of(&map, c), Some(b));
        assert!(children_of(&map, a).is_empty());
        assert_eq!(children_of(&map, b), vec![c]);
        assert_eq!(children_of(&map, r), vec![a, b]);
        assert_consistent(&map);
    }

    #[test]
    fn test_reparent_root_under_other_root() {
        let mut map = MindMap::new();
        let x = map.create_node(None, "X", (0.0, 0.0), None);
        let y = map.create_node(None, "Y", (100.0, 0.0), None);
        assert_eq!(map.reparent(x, y), Ok(()));
        assert_eq!(parent_of(&map, x), Some(y));
        assert_eq!(map.roots().count(), 1);
        assert_consistent(&map);
    }

    #[test]
    fn test_reparent_onto_descendant_is_rejected() {
        let (mut map, r, a, _b, c) = sample_tree();
        let snapshot = map.clone();

        assert_eq!(
            map.reparent(r, a),
            Err(MindMapError::WouldCreateCycle { dragged: r, target: a })
        );
        assert_eq!(
            map.reparent(r, c),
            Err(MindMapError::WouldCreateCycle { dragged: r, target: c })
        );
        assert_eq!(map.nodes().collect::<Vec<_>>(), snapshot.nodes().collect::<Vec<_>>());
    }

    #[test]
    fn test_reparent_self_current_parent_and_missing_are_rejected() {
        let (mut map, r, a, ..) = sample_tree();
        let snapshot = map.clone();

        assert_eq!(map.reparent(a, a), Err(MindMapError::SelfTarget(a)));
        assert_eq!(
            map.reparent(a, r),
            Err(MindMapError::AlreadyChild { dragged: a, target: r })
        );
        assert_eq!(map.reparent(a, NodeId(404)), Err(MindMapError::NotFound(NodeId(404))));
        assert_eq!(map.reparent(NodeId(404), a), Err(MindMapError::NotFound(NodeId(404))));
        assert_eq!(map.nodes().collect::<Vec<_>>(), snapshot.nodes().collect::<Vec<_>>());
    }

    #[test]
    fn test_splice_onto_connector() {
        let (mut map, r, a, b, c) = sample_tree();

        assert_eq!(map.reparent_onto_connector(c, r, b), Ok(()));

        assert_eq!(parent_of(&map, c), Some(r));
        assert_eq!(parent_of(&map, b), Some(c));
        assert!(children_of(&map, r).contains(&c));
        assert!(!children_of(&map, r).contains(&b));
        assert_eq!(children_of(&map, c), vec![b]);
        assert!(children_of(&map, a).is_empty());
        assert_consistent(&map);
    }

    #[test]
    fn test_splice_rejections_leave_map_unchanged() {
        let (mut map, r, a, b, c) = sample_tree();
        let snapshot = map.clone();

        assert_eq!(
            map.reparent_onto_connector(c, r, c),
            Err(MindMapError::NotAnEdge { parent: r, child: c })
        );
        assert_eq!(map.reparent_onto_connector(a, r, a), Err(MindMapError::EndpointOfEdge(a)));
        assert_eq!(map.reparent_onto_connector(r, r, b), Err(MindMapError::EndpointOfEdge(r)));
        assert_eq!(
            map.reparent_onto_connector(a, a, c),
            Err(MindMapError::EndpointOfEdge(a))
        );
        // R is an ancestor of both ends of A -> C.
        assert_eq!(
            map.reparent_onto_connector(r, a, c),
            Err(MindMapError::WouldCreateCycle { dragged: r, target: a })
        );
        assert_eq!(
            map.reparent_onto_connector(NodeId(9), r, b),
            Err(MindMapError::NotFound(NodeId(9)))
        );
        assert_eq!(map.nodes().collect::<Vec<_>>(), snapshot.nodes().collect::<Vec<_>>());
    }

    #[test]
    fn test_drop_child_onto_sibling_connector_midpoint() {
        let mut map = MindMap::new();
        let r = map.create_node(None, "R", (0.0, 0.0), None);
        let a = map.create_node(Some(r), "A", (0.0, 200.0), None);
        let b = map.create_node(Some(r), "B", (300.0, 0.0), None);

        let midpoint = map
            .connectors()
            .into_iter()
            .find(|c| c.child == b)
            .unwrap()
            .midpoint();
        map.move_node(a, midpoint);

        let target = map.find_drop_target(midpoint, a);
        assert_eq!(target, Some(DropTarget::Connector { parent: r, child: b }));
        assert_eq!(map.apply_drop(a, target.unwrap()), Ok(()));

        assert_eq!(parent_of(&map, a), Some(r));
        assert_eq!(parent_of(&map, b), Some(a));
        assert_eq!(children_of(&map, r), vec![a]);
        assert_eq!(children_of(&map, a), vec![b]);
        assert_consistent(&map);
    }

    #[test]
    fn test_find_drop_target_prefers_nodes_over_connectors() {
        let mut map = MindMap::new();
        let r = map.create_node(None, "R", (0.0, 0.0), None);
        let b = map.create_node(Some(r), "B", (400.0, 0.0), None);
        // Sits right on top of the R -> B line.
        let on_line = map.create_node(None, "OnLine", (200.0, 0.0), None);
        let dragged = map.create_node(None, "D", (0.0, 300.0), None);

        assert_eq!(
            map.find_drop_target((200.0, 5.0), dragged),
            Some(DropTarget::Node(on_line))
        );
        assert_eq!(
            map.find_drop_target((100.0, 10.0), dragged),
            Some(DropTarget::Connector { parent: r, child: b })
        );
        assert_eq!(map.find_drop_target((100.0, 25.0), dragged), None);
    }

    #[test]
    fn test_find_drop_target_excludes_dragged_node_and_its_connectors() {
        let mut map = MindMap::new();
        let r = map.create_node(None, "R", (0.0, 0.0), None);
        let a = map.create_node(Some(r), "A", (400.0, 0.0), None);
        let c = map.create_node(Some(a), "C", (400.0, 400.0), None);

        // Over A itself and over both of A's connectors.
        assert_eq!(map.find_drop_target((400.0, 0.0), a), None);
        assert_eq!(map.find_drop_target((200.0, 0.0), a), None);
        assert_eq!(map.find_drop_target((400.0, 200.0), a), None);

        // Someone else dragged over A's connectors sees them.
        assert_eq!(
            map.find_drop_target((400.0, 200.0), r),
            Some(DropTarget::Connector { parent: a, child: c })
        );
    }

    #[test]
    fn test_find_drop_target_topmost_node_wins() {
        let mut map = MindMap::new();
        let _below = map.create_node(None, "Below", (0.0, 0.0), None);
        let above = map.create_node(None, "Above", (10.0, 0.0), None);
        let dragged = map.create_node(None, "D", (500.0, 500.0), None);
        assert_eq!(map.find_drop_target((5.0, 0.0), dragged), Some(DropTarget::Node(above)));
    }

    #[test]
    fn test_find_drop_target_picks_nearest_connector_and_respects_tolerance() {
        let mut map = MindMap::new();
        let r = map.create_node(None, "R", (0.0, 0.0), None);
        let near = map.create_node(Some(r), "Near", (400.0, 0.0), None);
        let _far = map.create_node(Some(r), "Far", (400.0, 30.0), None);
        let dragged = map.create_node(None, "D", (0.0, 500.0), None);

        assert_eq!(
            map.find_drop_target((300.0, 4.0), dragged),
            Some(DropTarget::Connector { parent: r, child: near })
        );

        map.set_drop_tolerance(1.0);
        assert_eq!(map.find_drop_target((300.0, 4.0), dragged), None);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Create { parent: usize, x: f32, y: f32 },
        Delete(usize),
        Reparent(usize, usize),
        Splice(usize, usize),
        Move(usize, f32, f32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0usize..64, -500.0f32..500.0, -500.0f32..500.0)
                .prop_map(|(parent, x, y)| Op::Create { parent, x, y }),
            1 => (0usize..64).prop_map(Op::Delete),
            2 => (0usize..64, 0usize..64).prop_map(|(a, b)| Op::Reparent(a, b)),
            2 => (0usize..64, 0usize..64).prop_map(|(a, b)| Op::Splice(a, b)),
            1 => (0usize..64, -500.0f32..500.0, -500.0f32..500.0)
                .prop_map(|(i, x, y)| Op::Move(i, x, y)),
        ]
    }

    /// Maps an arbitrary index onto an existing node, if any.
    fn pick(map: &MindMap, index: usize) -> Option<NodeId> {
        let ids: Vec<NodeId> = map.nodes().map(|n| n.id).collect();
        if ids.is_empty() {
            None
        } else {
            Some(ids[index % ids.len()])
        }
    }

    proptest! {
        #[test]
        fn prop_random_edits_keep_tree_consistent(ops in proptest::collection::vec(op_strategy(), 1..60)) {
            let mut map = MindMap::new();
            for op in ops {
                match op {
                    Op::Create { parent, x, y } => {
                        let parent = if parent % 4 == 0 { None } else { pick(&map, parent) };
                        map.create_node(parent, "n", (x, y), None);
                    }
                    Op::Delete(i) => {
                        if let Some(id) = pick(&map, i) {
                            let before = map.len();
                            let descendants = map.descendants(id).len();
                            let former_parent = map.node(id).and_then(|n| n.parent);
                            map.delete_node(id);
                            prop_assert_eq!(map.len(), before - 1 - descendants);
                            if let Some(p) = former_parent {
                                prop_assert!(!map.node(p).unwrap().children.contains(&id));
                            }
                        }
                    }
                    Op::Reparent(a, b) => {
                        if let (Some(dragged), Some(target)) = (pick(&map, a), pick(&map, b)) {
                            let forbidden = dragged == target || map.is_descendant(target, dragged);
                            let result = map.reparent(dragged, target);
                            if forbidden {
                                prop_assert!(result.is_err());
                            }
                            if result.is_ok() {
                                prop_assert_eq!(map.node(dragged).unwrap().parent, Some(target));
                            }
                        }
                    }
                    Op::Splice(a, b) => {
                        if let (Some(dragged), Some(child)) = (pick(&map, a), pick(&map, b)) {
                            if let Some(parent) = map.node(child).and_then(|n| n.parent) {
                                if map.reparent_onto_connector(dragged, parent, child).is_ok() {
                                    prop_assert_eq!(map.node(dragged).unwrap().parent, Some(parent));
                                    prop_assert_eq!(map.node(child).unwrap().parent, Some(dragged));
                                }
                            }
                        }
                    }
                    Op::Move(i, x, y) => {
                        if let Some(id) = pick(&map, i) {
                            map.move_node(id, (x, y));
                        }
                    }
                }
                assert_consistent(&map);
            }
        }
    }
}
