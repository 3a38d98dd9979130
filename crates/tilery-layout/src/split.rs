#![forbid(unsafe_code)]

//! Split containers: child insertion, removal and axis allotment.
//!
//! Horizontal and vertical splits share one implementation; they differ only
//! in which extent [`SplitAxis`] divides and which it inherits.
//!
//! # Rebalancing
//!
//! - **Insert**: the new child gets `1 / (n + 1)`; each of the `n` existing
//!   children gives up `new / n`. The first child gets exactly `1.0`.
//! - **Remove**: the removed child's share is handed out evenly to the
//!   remaining children.
//! - **Resize**: the target takes the requested share and its siblings are
//!   rescaled, keeping their relative sizes.
//!
//! After each of these the children must sum to one within
//! [`EPSILON`](crate::proportion::EPSILON). A violation is an internal bug
//! and panics.
//!
//! Shares are not clamped, so insertion next to a small sibling can drive it
//! below zero. Validation accepts that; placement refuses the split until a
//! resize repairs it.

use crate::client::Client;
use crate::error::TreeError;
use crate::node::{NewNode, Node, NodeId, Placement, SizeBounds, SplitAxis};
use crate::proportion::{EPSILON, Proportion};
use crate::settings::RemainderPolicy;
use crate::tree::Tree;
use tilery_core::geometry::Rect;

/// Split payload: an axis and an ordered child sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    axis: SplitAxis,
    children: Vec<NodeId>,
}

impl Split {
    pub(crate) fn new(axis: SplitAxis) -> Self {
        Self {
            axis,
            children: Vec::new(),
        }
    }

    /// The axis this split divides.
    #[must_use]
    pub const fn axis(&self) -> SplitAxis {
        self.axis
    }

    /// Children in placement order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Position of `child` in the sequence.
    #[must_use]
    pub fn position(&self, child: NodeId) -> Option<usize> {
        self.children.iter().position(|&id| id == child)
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }
}

/// Pixels allotted to each child out of `extent`, in sequence order.
///
/// `None` when the split cannot be divided without a child escaping it: a
/// share rounds to a negative pixel count, or under
/// [`RemainderPolicy::AbsorbLast`] the leading children already take more
/// than `extent`. Validity checks and placement both go through here so
/// they agree on every child's size.
pub(crate) fn allot(
    proportions: impl ExactSizeIterator<Item = Proportion>,
    extent: u32,
    policy: RemainderPolicy,
) -> Option<Vec<u32>> {
    let count = proportions.len();
    let mut sizes = Vec::with_capacity(count);
    for share in proportions {
        if share.overdraws(extent) {
            return None;
        }
        sizes.push(share.portion(extent));
    }
    if policy == RemainderPolicy::AbsorbLast && count > 0 {
        let used: u64 = sizes[..count - 1].iter().map(|&s| u64::from(s)).sum();
        let rest = u64::from(extent).checked_sub(used)?;
        sizes[count - 1] = u32::try_from(rest).unwrap_or(u32::MAX);
    }
    Some(sizes)
}

impl<C: Client> Tree<C> {
    /// Insert a new child into `split`, rebalancing its siblings.
    ///
    /// The new child gets `1 / (n + 1)` and each existing child shrinks by
    /// an equal amount. Returns the new child's ID.
    ///
    /// # Panics
    ///
    /// Panics if the children no longer sum to one afterwards.
    pub fn add_child(
        &mut self,
        split: NodeId,
        node: NewNode<C>,
        placement: Placement,
    ) -> Result<NodeId, TreeError> {
        let count = self.split(split)?.children().len();
        let id = self.ids.allocate()?;

        let share = Proportion::even(count + 1);
        if count > 0 {
            let chop = share / count;
            for sibling in self.split(split)?.children().to_vec() {
                let sibling = self.node_mut(sibling)?;
                let shrunk = sibling.proportion() - chop;
                sibling.set_proportion(shrunk);
            }
        }

        let _ = self
            .nodes
            .insert(id, Node::from_new(node, Some(split), share));
        let children = self.split_mut(split)?.children_mut();
        match placement {
            Placement::First => children.insert(0, id),
            Placement::Last => children.push(id),
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            split = %split,
            child = %id,
            ?placement,
            share = share.get(),
            siblings = count,
            "child added"
        );

        self.check_portions(split);
        Ok(id)
    }

    /// Insert a leaf for `client` into `split`.
    pub fn add_client(
        &mut self,
        split: NodeId,
        client: C,
        placement: Placement,
    ) -> Result<NodeId, TreeError> {
        self.add_child(split, NewNode::Leaf(client), placement)
    }

    /// Remove `child` from `split` and destroy its subtree.
    ///
    /// The removed share is handed out evenly to the remaining children.
    /// Returns the client handles of the destroyed subtree in traversal
    /// order. An emptied split stays in place and keeps its own proportion.
    ///
    /// Fails with [`TreeError::NotAChild`] without mutating anything if
    /// `child` is not a direct child of `split`.
    ///
    /// # Panics
    ///
    /// Panics if the remaining children no longer sum to one afterwards.
    pub fn remove_child(&mut self, split: NodeId, child: NodeId) -> Result<Vec<C>, TreeError> {
        let Some(index) = self.split(split)?.position(child) else {
            return Err(TreeError::NotAChild {
                parent: split,
                child,
            });
        };

        let _ = self.split_mut(split)?.children_mut().remove(index);
        let removed = self.node(child).map_or(Proportion::ZERO, |n| n.proportion());
        let clients = self.destroy_subtree(child);

        let remaining = self.split(split)?.children().to_vec();
        if !remaining.is_empty() {
            let leftovers = removed / remaining.len();
            for sibling in &remaining {
                let node = self.node_mut(*sibling)?;
                let grown = node.proportion() + leftovers;
                node.set_proportion(grown);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            split = %split,
            child = %child,
            share = removed.get(),
            remaining = remaining.len(),
            clients = clients.len(),
            "child removed"
        );

        self.check_portions(split);
        Ok(clients)
    }

    /// Set `child`'s share of its parent split, rescaling its siblings.
    ///
    /// Siblings keep their sizes relative to each other. If they had
    /// collapsed to nothing they split the remainder evenly. A sole child
    /// always keeps the whole extent.
    ///
    /// # Panics
    ///
    /// Panics if the children no longer sum to one afterwards.
    pub fn resize_child(&mut self, child: NodeId, share: Proportion) -> Result<(), TreeError> {
        if !share.is_unit() {
            return Err(TreeError::InvalidProportion {
                node_id: child,
                value: share.get(),
            });
        }
        let parent = self
            .node(child)
            .ok_or(TreeError::UnknownNode { node_id: child })?
            .parent();
        let Some(split) = parent else {
            return Err(TreeError::NoParentSplit { node_id: child });
        };

        let siblings: Vec<NodeId> = self
            .split(split)?
            .children()
            .iter()
            .copied()
            .filter(|&id| id != child)
            .collect();
        if siblings.is_empty() {
            return Ok(());
        }

        let before = self.node_mut(child)?.proportion();
        let rest_before = Proportion::FULL - before;
        let rest_after = Proportion::FULL - share;
        for sibling in &siblings {
            let node = self.node_mut(*sibling)?;
            let scaled = if rest_before.get() > EPSILON {
                node.proportion() * (rest_after.get() / rest_before.get())
            } else {
                rest_after / siblings.len()
            };
            node.set_proportion(scaled);
        }
        self.node_mut(child)?.set_proportion(share);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            split = %split,
            child = %child,
            before = before.get(),
            after = share.get(),
            "child resized"
        );

        self.check_portions(split);
        Ok(())
    }

    /// Assert that `split`'s children sum to one.
    ///
    /// # Panics
    ///
    /// Panics with the split ID and each child's share if they do not. An
    /// empty split is always consistent.
    pub(crate) fn check_portions(&self, split: NodeId) {
        let Ok(node) = self.split(split) else {
            return;
        };
        if node.children().is_empty() {
            return;
        }
        let shares: Vec<(NodeId, Proportion)> = node
            .children()
            .iter()
            .map(|&id| (id, self.node(id).map_or(Proportion::ZERO, |n| n.proportion())))
            .collect();
        let sum: Proportion = shares.iter().map(|(_, p)| *p).sum();
        if sum.approx_eq(Proportion::FULL) {
            return;
        }

        #[cfg(feature = "tracing")]
        tracing::error!(split = %split, sum = sum.get(), ?shares, "split proportions out of balance");

        panic!("split {split} proportions sum to {sum}, expected {}: {shares:?}", Proportion::FULL);
    }

    /// Whether every leaf under `split` fits `bounds` when the split is
    /// `width × height`.
    pub(crate) fn split_fits(
        &self,
        split: &Split,
        width: u32,
        height: u32,
        bounds: &SizeBounds,
    ) -> bool {
        let axis = split.axis();
        let Some(sizes) = self.allot_children(split, axis.extent(width, height)) else {
            return false;
        };
        split
            .children()
            .iter()
            .zip(sizes)
            .all(|(&child, allotted)| {
                let (w, h) = axis.child_size(width, height, allotted);
                self.fits(child, w, h, bounds)
            })
    }

    /// Hand each child of `split_id` its slice of `area`, in order.
    pub(crate) fn split_move_resize(&mut self, split_id: NodeId, area: Rect) {
        let Ok(split) = self.split(split_id) else {
            return;
        };
        let axis = split.axis();
        let children = split.children().to_vec();
        let Some(sizes) = self.allot_children(split, axis.extent(area.width, area.height)) else {
            return;
        };

        let mut offset = axis.origin(area);
        for (child, allotted) in children.into_iter().zip(sizes) {
            self.move_resize(child, axis.compose(area, offset, allotted));
            offset = offset.saturating_add_unsigned(allotted);
        }
    }

    fn allot_children(&self, split: &Split, extent: u32) -> Option<Vec<u32>> {
        let proportions = split
            .children()
            .iter()
            .map(|&id| self.node(id).map_or(Proportion::ZERO, |n| n.proportion()));
        allot(proportions, extent, self.settings().remainder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Window;

    fn split_tree(axis: SplitAxis) -> (Tree<Window>, NodeId) {
        let mut tree = Tree::new();
        let (root, _) = tree.set_child(NewNode::Split(axis)).expect("root split");
        (tree, root)
    }

    fn shares(tree: &Tree<Window>, split: NodeId) -> Vec<f64> {
        tree.children(split)
            .iter()
            .map(|&id| tree.proportion(id).expect("child").get())
            .collect()
    }

    fn sum(tree: &Tree<Window>, split: NodeId) -> Proportion {
        tree.children(split)
            .iter()
            .map(|&id| tree.proportion(id).expect("child"))
            .sum()
    }

    #[test]
    fn first_child_gets_full_share() {
        let (mut tree, root) = split_tree(SplitAxis::Horizontal);
        let a = tree
            .add_client(root, Window::new(1), Placement::Last)
            .expect("add");
        assert_eq!(tree.proportion(a), Some(Proportion::FULL));
    }

    #[test]
    fn insertion_rebalances_evenly() {
        let (mut tree, root) = split_tree(SplitAxis::Horizontal);
        for id in 1..=4 {
            let _ = tree
                .add_client(root, Window::new(id), Placement::Last)
                .expect("add");
            assert!(sum(&tree, root).approx_eq(Proportion::FULL));
        }
        for share in shares(&tree, root) {
            assert!((share - 0.25).abs() < EPSILON, "share={share}");
        }
    }

    #[test]
    fn insertion_shrinks_uneven_siblings_by_equal_amounts() {
        let (mut tree, root) = split_tree(SplitAxis::Vertical);
        let a = tree.add_client(root, Window::new(1), Placement::Last).expect("a");
        let _b = tree.add_client(root, Window::new(2), Placement::Last).expect("b");
        tree.resize_child(a, Proportion::new(0.8)).expect("resize");
        let _c = tree.add_client(root, Window::new(3), Placement::Last).expect("c");

        let got = shares(&tree, root);
        let third = 1.0 / 3.0;
        let chop = third / 2.0;
        assert!((got[0] - (0.8 - chop)).abs() < 1e-9);
        assert!((got[1] - (0.2 - chop)).abs() < 1e-9);
        assert!((got[2] - third).abs() < 1e-9);
    }

    #[test]
    fn placement_controls_order() {
        let (mut tree, root) = split_tree(SplitAxis::Horizontal);
        let a = tree.add_client(root, Window::new(1), Placement::Last).expect("a");
        let b = tree.add_client(root, Window::new(2), Placement::Last).expect("b");
        let c = tree.add_client(root, Window::new(3), Placement::First).expect("c");
        assert_eq!(tree.children(root), &[c, a, b]);
        assert_eq!(tree.parent(c), Some(root));
    }

    #[test]
    fn insert_then_remove_restores_siblings() {
        let (mut tree, root) = split_tree(SplitAxis::Horizontal);
        let a = tree.add_client(root, Window::new(1), Placement::Last).expect("a");
        let _b = tree.add_client(root, Window::new(2), Placement::Last).expect("b");
        tree.resize_child(a, Proportion::new(0.7)).expect("resize");
        let before = shares(&tree, root);

        let c = tree.add_client(root, Window::new(3), Placement::First).expect("c");
        let removed = tree.remove_child(root, c).expect("remove");
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, 3);

        let after = shares(&tree, root);
        assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(&after) {
            assert!((b - a).abs() < EPSILON, "before={b} after={a}");
        }
    }

    #[test]
    fn removal_spreads_share_evenly() {
        let (mut tree, root) = split_tree(SplitAxis::Horizontal);
        let a = tree.add_client(root, Window::new(1), Placement::Last).expect("a");
        let b = tree.add_client(root, Window::new(2), Placement::Last).expect("b");
        let c = tree.add_client(root, Window::new(3), Placement::Last).expect("c");
        tree.resize_child(a, Proportion::new(0.5)).expect("resize");

        let _ = tree.remove_child(root, a).expect("remove");
        assert_eq!(tree.children(root), &[b, c]);
        for share in shares(&tree, root) {
            assert!((share - 0.5).abs() < EPSILON);
        }
        assert!(tree.node(a).is_none());
    }

    #[test]
    fn removing_last_child_leaves_empty_split() {
        let (mut tree, root) = split_tree(SplitAxis::Vertical);
        let a = tree.add_client(root, Window::new(1), Placement::Last).expect("a");
        let clients = tree.remove_child(root, a).expect("remove");
        assert_eq!(clients.len(), 1);
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.root(), Some(root));
    }

    #[test]
    fn removing_a_stranger_fails_without_mutation() {
        let (mut tree, root) = split_tree(SplitAxis::Horizontal);
        let inner = tree
            .add_child(root, NewNode::Split(SplitAxis::Vertical), Placement::Last)
            .expect("inner");
        let deep = tree.add_client(inner, Window::new(1), Placement::Last).expect("deep");
        let before = shares(&tree, root);

        assert_eq!(
            tree.remove_child(root, deep),
            Err(TreeError::NotAChild {
                parent: root,
                child: deep
            })
        );
        assert_eq!(shares(&tree, root), before);
        assert_eq!(tree.parent(deep), Some(inner));
    }

    #[test]
    fn removing_a_split_destroys_its_subtree() {
        let (mut tree, root) = split_tree(SplitAxis::Horizontal);
        let _a = tree.add_client(root, Window::new(1), Placement::Last).expect("a");
        let inner = tree
            .add_child(root, NewNode::Split(SplitAxis::Vertical), Placement::Last)
            .expect("inner");
        let x = tree.add_client(inner, Window::new(2), Placement::Last).expect("x");
        let _y = tree.add_client(inner, Window::new(3), Placement::Last).expect("y");
        let nodes_before = tree.len();

        let clients = tree.remove_child(root, inner).expect("remove");
        let ids: Vec<u32> = clients.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(tree.len(), nodes_before - 3);
        assert!(tree.node(x).is_none());
        tree.validate().expect("consistent");
    }

    #[test]
    fn add_child_rejects_leaf_parent() {
        let mut tree = Tree::new();
        let (leaf, _) = tree.set_child(NewNode::Leaf(Window::new(1))).expect("root");
        assert_eq!(
            tree.add_client(leaf, Window::new(2), Placement::Last),
            Err(TreeError::NotASplit { node_id: leaf })
        );
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn resize_rescales_siblings_relatively() {
        let (mut tree, root) = split_tree(SplitAxis::Horizontal);
        let a = tree.add_client(root, Window::new(1), Placement::Last).expect("a");
        let b = tree.add_client(root, Window::new(2), Placement::Last).expect("b");
        let _c = tree.add_client(root, Window::new(3), Placement::Last).expect("c");
        tree.resize_child(a, Proportion::new(0.5)).expect("a");
        tree.resize_child(b, Proportion::new(0.2)).expect("b");

        let got = shares(&tree, root);
        // a and c split the remaining 0.8 in their prior 0.5:0.25 ratio.
        assert!((got[0] - 0.8 * (2.0 / 3.0)).abs() < 1e-9);
        assert!((got[1] - 0.2).abs() < 1e-9);
        assert!((got[2] - 0.8 * (1.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn resize_from_full_share_spreads_evenly() {
        let (mut tree, root) = split_tree(SplitAxis::Horizontal);
        let a = tree.add_client(root, Window::new(1), Placement::Last).expect("a");
        let _b = tree.add_client(root, Window::new(2), Placement::Last).expect("b");
        let _c = tree.add_client(root, Window::new(3), Placement::Last).expect("c");
        tree.resize_child(a, Proportion::FULL).expect("full");
        tree.resize_child(a, Proportion::new(0.4)).expect("back");

        let got = shares(&tree, root);
        assert!((got[1] - 0.3).abs() < 1e-9);
        assert!((got[2] - 0.3).abs() < 1e-9);
    }

    #[test]
    fn resize_sole_child_is_noop() {
        let (mut tree, root) = split_tree(SplitAxis::Horizontal);
        let a = tree.add_client(root, Window::new(1), Placement::Last).expect("a");
        tree.resize_child(a, Proportion::new(0.3)).expect("noop");
        assert_eq!(tree.proportion(a), Some(Proportion::FULL));
    }

    #[test]
    fn resize_rejects_out_of_range() {
        let (mut tree, root) = split_tree(SplitAxis::Horizontal);
        let a = tree.add_client(root, Window::new(1), Placement::Last).expect("a");
        let _b = tree.add_client(root, Window::new(2), Placement::Last).expect("b");
        for bad in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(
                tree.resize_child(a, Proportion::new(bad)),
                Err(TreeError::InvalidProportion { .. })
            ));
        }
        assert_eq!(
            tree.resize_child(root, Proportion::new(0.5)),
            Err(TreeError::NoParentSplit { node_id: root })
        );
    }

    #[test]
    #[should_panic(expected = "proportions sum to")]
    fn unbalanced_split_panics() {
        let (mut tree, root) = split_tree(SplitAxis::Horizontal);
        let a = tree.add_client(root, Window::new(1), Placement::Last).expect("a");
        tree.node_mut(a).expect("a").set_proportion(Proportion::new(0.5));
        let _ = tree.add_client(root, Window::new(2), Placement::Last);
    }

    #[test]
    fn allot_drift_and_absorb() {
        let thirds = [Proportion::even(3); 3];
        assert_eq!(
            allot(thirds.into_iter(), 100, RemainderPolicy::Drift),
            Some(vec![33, 33, 33])
        );
        assert_eq!(
            allot(thirds.into_iter(), 100, RemainderPolicy::AbsorbLast),
            Some(vec![33, 33, 34])
        );
        // Rounding up can overshoot; the last child absorbs it.
        assert_eq!(
            allot(thirds.into_iter(), 5, RemainderPolicy::Drift),
            Some(vec![2, 2, 2])
        );
        assert_eq!(
            allot(thirds.into_iter(), 5, RemainderPolicy::AbsorbLast),
            Some(vec![2, 2, 1])
        );
        assert_eq!(
            allot(std::iter::empty(), 100, RemainderPolicy::AbsorbLast),
            Some(Vec::new())
        );
    }

    #[test]
    fn allot_refuses_negative_shares() {
        let shares = [
            Proportion::new(5.0 / 6.0),
            Proportion::new(-1.0 / 6.0),
            Proportion::new(1.0 / 3.0),
        ];
        for policy in [RemainderPolicy::Drift, RemainderPolicy::AbsorbLast] {
            assert_eq!(allot(shares.into_iter(), 100, policy), None);
        }
        // Too small to round below zero.
        let noise = [Proportion::new(1.0 + 1e-12), Proportion::new(-1e-12)];
        assert_eq!(
            allot(noise.into_iter(), 100, RemainderPolicy::Drift),
            Some(vec![100, 0])
        );
    }

    #[test]
    fn absorb_last_refuses_leading_overdraw() {
        let shares = [Proportion::new(0.5), Proportion::new(0.5), Proportion::ZERO];
        assert_eq!(
            allot(shares.into_iter(), 3, RemainderPolicy::Drift),
            Some(vec![2, 2, 0])
        );
        assert_eq!(allot(shares.into_iter(), 3, RemainderPolicy::AbsorbLast), None);
        assert_eq!(
            allot(shares.into_iter(), 4, RemainderPolicy::AbsorbLast),
            Some(vec![2, 2, 0])
        );
    }

    /// Leaf, empty split, leaf: resizing the first leaf to the whole split
    /// and then inserting pushes the empty split below zero.
    fn row_with_negative_split() -> (Tree<Window>, NodeId, NodeId) {
        let (mut tree, root) = split_tree(SplitAxis::Horizontal);
        let a = tree.add_client(root, Window::new(1), Placement::Last).expect("a");
        let empty = tree
            .add_child(root, NewNode::Split(SplitAxis::Vertical), Placement::Last)
            .expect("empty");
        tree.resize_child(a, Proportion::FULL).expect("full");
        let _b = tree.add_client(root, Window::new(2), Placement::Last).expect("b");
        (tree, root, empty)
    }

    #[test]
    fn negative_share_survives_validation() {
        let (tree, root, empty) = row_with_negative_split();
        let got = shares(&tree, root);
        assert!((got[0] - 5.0 / 6.0).abs() < 1e-9);
        assert!((got[1] + 1.0 / 6.0).abs() < 1e-9);
        assert!((got[2] - 1.0 / 3.0).abs() < 1e-9);
        assert!(tree.proportion(empty).expect("empty").get() < 0.0);
        tree.validate().expect("sums still balance");
    }

    #[test]
    fn negative_share_rejects_placement_until_resized() {
        let (mut tree, root, empty) = row_with_negative_split();
        let area = Rect::new(0, 0, 100, 50);
        let bounds = SizeBounds::within(area, 1, 1);
        assert!(!tree.fits(root, 100, 50, &bounds));
        assert!(!tree.place(area));
        for leaf in tree.leaves() {
            assert!(tree.client(leaf).expect("client").calls.is_empty());
        }

        tree.resize_child(empty, Proportion::ZERO).expect("resize");
        assert!(tree.place(area));
        for leaf in tree.leaves() {
            let rect = tree.client(leaf).and_then(Window::rect).expect("placed");
            assert!(area.contains_rect(&rect), "{rect:?} escapes {area:?}");
        }
    }
}
