#![forbid(unsafe_code)]

//! The root handle: arena ownership, placement and client lookup.
//!
//! # Placement
//!
//! [`Tree::place`] first runs a read-only validity pass over the whole tree:
//! every leaf must come out at least `min_leaf_width × min_leaf_height` and
//! at most the target area. Only if every leaf fits does a second pass hand
//! out geometry top-down. A rejected placement touches no client, so
//! degenerate requests (a monitor too small for the current leaf count) are
//! dropped wholesale rather than applied partially.
//!
//! The validity pass also refuses a split whose shares cannot be divided
//! without a child escaping it: a share that rounds to a negative pixel
//! count, or under [`RemainderPolicy::AbsorbLast`](crate::RemainderPolicy)
//! leading children that already overrun the extent. Such a tree stays
//! unplaceable until [`Tree::resize_child`] repairs the share.
//!
//! # Traversal
//!
//! Leaf visiting is depth-first in child order. A visitor returning
//! [`ControlFlow::Break`] stops the traversal, which is how
//! [`Tree::find_leaf`] short-circuits.

use std::ops::ControlFlow;

use rustc_hash::{FxHashMap, FxHashSet};
use tilery_core::geometry::Rect;

use crate::client::Client;
use crate::error::TreeError;
use crate::leaf::Leaf;
use crate::node::{NewNode, Node, NodeId, NodeIdAllocator, NodeKind, SizeBounds, SplitAxis};
use crate::proportion::Proportion;
use crate::settings::LayoutSettings;
use crate::split::Split;

/// A split tree of clients.
///
/// Owns every node in its arena. The tree is either empty or has exactly
/// one root node; every node in the arena is reachable from that root.
#[derive(Debug, Clone)]
pub struct Tree<C> {
    pub(crate) nodes: FxHashMap<NodeId, Node<C>>,
    pub(crate) ids: NodeIdAllocator,
    root: Option<NodeId>,
    settings: LayoutSettings,
}

impl<C> Default for Tree<C> {
    fn default() -> Self {
        Self::with_settings(LayoutSettings::default())
    }
}

impl<C> Tree<C> {
    /// An empty tree with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty tree with explicit settings.
    #[must_use]
    pub fn with_settings(settings: LayoutSettings) -> Self {
        Self {
            nodes: FxHashMap::default(),
            ids: NodeIdAllocator::default(),
            root: None,
            settings,
        }
    }

    /// Current settings.
    #[must_use]
    pub const fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Replace the settings. Takes effect at the next placement.
    pub fn set_settings(&mut self, settings: LayoutSettings) {
        self.settings = settings;
    }

    /// Root node ID, `None` when empty.
    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// True when the tree has no root.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes (splits and leaves).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Lookup a node by ID.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node<C>> {
        self.nodes.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<C>, TreeError> {
        self.nodes
            .get_mut(&id)
            .ok_or(TreeError::UnknownNode { node_id: id })
    }

    pub(crate) fn split(&self, id: NodeId) -> Result<&Split, TreeError> {
        self.nodes
            .get(&id)
            .ok_or(TreeError::UnknownNode { node_id: id })?
            .as_split()
            .ok_or(TreeError::NotASplit { node_id: id })
    }

    pub(crate) fn split_mut(&mut self, id: NodeId) -> Result<&mut Split, TreeError> {
        self.nodes
            .get_mut(&id)
            .ok_or(TreeError::UnknownNode { node_id: id })?
            .as_split_mut()
            .ok_or(TreeError::NotASplit { node_id: id })
    }

    /// Parent split of `id`.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(Node::parent)
    }

    /// Children of a split in placement order; empty for leaves and unknown
    /// IDs.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.split(id) {
            Ok(split) => split.children(),
            Err(_) => &[],
        }
    }

    /// Share of the parent's extent held by `id`.
    #[must_use]
    pub fn proportion(&self, id: NodeId) -> Option<Proportion> {
        self.nodes.get(&id).map(Node::proportion)
    }

    /// Axis of a split node.
    #[must_use]
    pub fn axis(&self, id: NodeId) -> Option<SplitAxis> {
        self.split(id).ok().map(Split::axis)
    }

    /// Client held by a leaf node.
    #[must_use]
    pub fn client(&self, id: NodeId) -> Option<&C> {
        self.nodes.get(&id)?.as_leaf().map(Leaf::client)
    }

    /// Mutable client held by a leaf node.
    pub fn client_mut(&mut self, id: NodeId) -> Option<&mut C> {
        self.nodes.get_mut(&id)?.as_leaf_mut().map(Leaf::client_mut)
    }

    /// Install a new root, tearing down any existing tree first.
    ///
    /// Returns the new root's id together with the clients of the tree it
    /// replaced, in traversal order. The root's proportion is `1.0` and
    /// never consulted.
    pub fn set_child(&mut self, node: NewNode<C>) -> Result<(NodeId, Vec<C>), TreeError> {
        let id = self.ids.allocate()?;
        let displaced = self.take_child();
        let _ = self.nodes.insert(id, Node::from_new(node, None, Proportion::FULL));
        self.root = Some(id);

        #[cfg(feature = "tracing")]
        tracing::debug!(root = %id, displaced = displaced.len(), "root set");

        Ok((id, displaced))
    }

    /// Tear down the whole tree, returning its clients in traversal order.
    pub fn take_child(&mut self) -> Vec<C> {
        let Some(root) = self.root.take() else {
            return Vec::new();
        };
        let clients = self.destroy_subtree(root);

        #[cfg(feature = "tracing")]
        tracing::debug!(root = %root, clients = clients.len(), "tree cleared");

        clients
    }

    /// Drop `id` and everything below it from the arena.
    ///
    /// Does not touch the parent's child list.
    pub(crate) fn destroy_subtree(&mut self, id: NodeId) -> Vec<C> {
        let mut clients = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(node) = self.nodes.remove(&next) else {
                continue;
            };
            match node.kind {
                NodeKind::Leaf(leaf) => clients.push(leaf.into_client()),
                NodeKind::Split(split) => stack.extend(split.children().iter().rev().copied()),
            }
        }
        clients
    }

    /// Visit every leaf under the root in placement order.
    pub fn visit_leaves<B, F>(&self, mut visit: F) -> ControlFlow<B>
    where
        F: FnMut(NodeId, &Leaf<C>) -> ControlFlow<B>,
    {
        match self.root {
            Some(root) => self.visit_leaf_nodes(root, &mut visit),
            None => ControlFlow::Continue(()),
        }
    }

    /// Visit every leaf under `node` in placement order.
    ///
    /// A split stops at the first child whose visit breaks and passes the
    /// break up.
    pub fn visit_leaf_nodes<B, F>(&self, node: NodeId, visit: &mut F) -> ControlFlow<B>
    where
        F: FnMut(NodeId, &Leaf<C>) -> ControlFlow<B>,
    {
        let Some(entry) = self.nodes.get(&node) else {
            return ControlFlow::Continue(());
        };
        match entry.kind() {
            NodeKind::Leaf(leaf) => visit(node, leaf),
            NodeKind::Split(split) => {
                for &child in split.children() {
                    self.visit_leaf_nodes(child, visit)?;
                }
                ControlFlow::Continue(())
            }
        }
    }

    /// Leaf IDs in placement order.
    #[must_use]
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let _ = self.visit_leaves::<(), _>(|id, _| {
            leaves.push(id);
            ControlFlow::Continue(())
        });
        leaves
    }

    /// Number of leaves.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.nodes.values().filter(|node| node.is_leaf()).count()
    }

    /// Audit the structure.
    ///
    /// Checks that the root has no parent, parent links agree with child
    /// lists, every non-empty split sums to one and every node is reachable
    /// from the root.
    pub fn validate(&self) -> Result<(), TreeError> {
        let mut reached: FxHashSet<NodeId> = FxHashSet::default();
        if let Some(root) = self.root {
            let node = self
                .nodes
                .get(&root)
                .ok_or(TreeError::UnknownNode { node_id: root })?;
            if let Some(parent) = node.parent() {
                return Err(TreeError::RootHasParent { root, parent });
            }

            let mut stack = vec![root];
            while let Some(id) = stack.pop() {
                if !reached.insert(id) {
                    continue;
                }
                let Some(split) = self.nodes.get(&id).and_then(Node::as_split) else {
                    continue;
                };
                let mut sum = Proportion::ZERO;
                for &child in split.children() {
                    let node = self
                        .nodes
                        .get(&child)
                        .ok_or(TreeError::UnknownNode { node_id: child })?;
                    if node.parent() != Some(id) {
                        return Err(TreeError::ParentMismatch {
                            node_id: child,
                            expected: Some(id),
                            actual: node.parent(),
                        });
                    }
                    sum += node.proportion();
                    stack.push(child);
                }
                if !split.children().is_empty() && !sum.approx_eq(Proportion::FULL) {
                    return Err(TreeError::ProportionSum {
                        split: id,
                        sum: sum.get(),
                    });
                }
            }
        }

        match self.nodes.keys().filter(|id| !reached.contains(*id)).min() {
            Some(&node_id) => Err(TreeError::UnreachableNode { node_id }),
            None => Ok(()),
        }
    }
}

impl<C: Client> Tree<C> {
    /// Lay the tree out over `area`.
    ///
    /// Returns `false` without touching any client when the tree is empty
    /// or when some leaf would fall outside
    /// `[min_leaf_width, area.width] × [min_leaf_height, area.height]`.
    pub fn place(&mut self, area: Rect) -> bool {
        let Some(root) = self.root else {
            return false;
        };

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "place",
            x = area.x,
            y = area.y,
            width = area.width,
            height = area.height
        );
        #[cfg(feature = "tracing")]
        let _guard = _span.enter();

        let bounds = SizeBounds::within(
            area,
            self.settings.min_leaf_width,
            self.settings.min_leaf_height,
        );
        if !self.fits(root, area.width, area.height, &bounds) {
            #[cfg(feature = "tracing")]
            tracing::trace!("placement rejected");
            return false;
        }

        self.move_resize(root, area);

        #[cfg(feature = "tracing")]
        tracing::trace!(leaves = self.leaf_count(), "placement applied");

        true
    }

    /// Whether every leaf under `node` satisfies `bounds` when `node` is
    /// `width × height`.
    ///
    /// Read-only. Unknown IDs never fit; an empty split always does.
    #[must_use]
    pub fn fits(&self, node: NodeId, width: u32, height: u32, bounds: &SizeBounds) -> bool {
        match self.nodes.get(&node).map(Node::kind) {
            Some(NodeKind::Leaf(_)) => bounds.contains(width, height),
            Some(NodeKind::Split(split)) => self.split_fits(split, width, height, bounds),
            None => false,
        }
    }

    /// Assign `rect` to `node` and everything below it, unchecked.
    pub(crate) fn move_resize(&mut self, node: NodeId, rect: Rect) {
        let is_leaf = match self.nodes.get(&node) {
            Some(entry) => entry.is_leaf(),
            None => return,
        };
        if !is_leaf {
            self.split_move_resize(node, rect);
        } else if let Some(leaf) = self.nodes.get_mut(&node).and_then(Node::as_leaf_mut) {
            leaf.move_resize(rect);
        }
    }

    /// The leaf holding the client identified by `id`.
    #[must_use]
    pub fn find_leaf(&self, id: C::Id) -> Option<NodeId> {
        let found = self.visit_leaves(|node, leaf| {
            if leaf.client().id() == id {
                ControlFlow::Break(node)
            } else {
                ControlFlow::Continue(())
            }
        });
        match found {
            ControlFlow::Break(node) => Some(node),
            ControlFlow::Continue(()) => None,
        }
    }

    /// Exchange the tree positions of two clients.
    ///
    /// A silent no-op if either client is not in the tree. Shape and
    /// proportions are untouched; the new geometry lands at the next
    /// [`Tree::place`].
    pub fn switch_clients(&mut self, a: C::Id, b: C::Id) {
        let (Some(first), Some(second)) = (self.find_leaf(a), self.find_leaf(b)) else {
            #[cfg(feature = "tracing")]
            tracing::trace!(?a, ?b, "switch skipped: client not in tree");
            return;
        };
        if first == second {
            return;
        }

        let Some(mut held) = self.nodes.remove(&first) else {
            return;
        };
        if let (Some(x), Some(y)) = (
            held.as_leaf_mut(),
            self.nodes.get_mut(&second).and_then(Node::as_leaf_mut),
        ) {
            x.swap_client(y);
        }
        let _ = self.nodes.insert(first, held);

        #[cfg(feature = "tracing")]
        tracing::trace!(first = %first, second = %second, "clients switched");
    }

    /// Replace `leaf` with a new split along `axis` holding it.
    ///
    /// The split takes over the leaf's slot and proportion; the leaf becomes
    /// its only child with the full share. Returns the split's ID.
    pub fn subdivide(&mut self, leaf: NodeId, axis: SplitAxis) -> Result<NodeId, TreeError> {
        let node = self
            .nodes
            .get(&leaf)
            .ok_or(TreeError::UnknownNode { node_id: leaf })?;
        if !node.is_leaf() {
            return Err(TreeError::NotALeaf { node_id: leaf });
        }
        let parent = node.parent();
        let share = node.proportion();
        let id = self.ids.allocate()?;

        match parent {
            Some(parent) => {
                let children = self.split_mut(parent)?.children_mut();
                if let Some(slot) = children.iter_mut().find(|slot| **slot == leaf) {
                    *slot = id;
                }
            }
            None => self.root = Some(id),
        }

        let mut split = Node::from_new(NewNode::Split(axis), parent, share);
        if let Some(payload) = split.as_split_mut() {
            payload.children_mut().push(leaf);
        }
        let _ = self.nodes.insert(id, split);
        let moved = self.node_mut(leaf)?;
        moved.parent = Some(id);
        moved.set_proportion(Proportion::FULL);

        #[cfg(feature = "tracing")]
        tracing::debug!(leaf = %leaf, split = %id, ?axis, "leaf subdivided");

        self.check_portions(id);
        Ok(id)
    }

    /// Remove the leaf holding `id` and hand back its client.
    ///
    /// Removing the root leaf empties the tree. `None` if the client is not
    /// in the tree.
    pub fn remove_client(&mut self, id: C::Id) -> Option<C> {
        let leaf = self.find_leaf(id)?;
        let mut clients = match self.parent(leaf) {
            Some(split) => self.remove_child(split, leaf).ok()?,
            None => self.take_child(),
        };
        clients.pop()
    }
}
