#![forbid(unsafe_code)]

//! Node model for the split tree.
//!
//! Nodes live in the [`Tree`](crate::Tree) arena and refer to each other by
//! [`NodeId`]. A split owns its children by id; a child's `parent` field is a
//! non-owning back-reference kept in sync by every structural mutation.

use std::fmt;

use serde::{Deserialize, Serialize};
use tilery_core::geometry::Rect;

use crate::error::TreeError;
use crate::leaf::Leaf;
use crate::proportion::Proportion;
use crate::split::Split;

// ============================================================================
// NodeId
// ============================================================================

/// Stable handle into the tree arena.
///
/// `0` is reserved/invalid so IDs are always non-zero. IDs are never reused,
/// so a handle to a removed node stays dangling instead of aliasing a newer
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Lowest valid node ID.
    pub const MIN: Self = Self(1);

    /// Create a node ID, rejecting 0.
    pub fn new(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Return the next ID, or an error on overflow.
    pub fn checked_next(self) -> Result<Self, TreeError> {
        match self.0.checked_add(1) {
            Some(next) => Ok(Self(next)),
            None => Err(TreeError::NodeIdOverflow { current: self }),
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Monotonic ID allocator owned by a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeIdAllocator {
    next: NodeId,
}

impl NodeIdAllocator {
    /// Allocate the next ID and advance.
    pub(crate) fn allocate(&mut self) -> Result<NodeId, TreeError> {
        let current = self.next;
        self.next = self.next.checked_next()?;
        Ok(current)
    }
}

impl Default for NodeIdAllocator {
    fn default() -> Self {
        Self { next: NodeId::MIN }
    }
}

// ============================================================================
// Axis
// ============================================================================

/// Orientation of a split node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitAxis {
    /// Children side by side, first child leftmost. Width is divided.
    Horizontal,
    /// Children stacked, first child on top. Height is divided.
    Vertical,
}

impl SplitAxis {
    /// The extent this axis divides out of `width × height`.
    #[inline]
    #[must_use]
    pub const fn extent(self, width: u32, height: u32) -> u32 {
        match self {
            Self::Horizontal => width,
            Self::Vertical => height,
        }
    }

    /// Child dimensions when `allotted` pixels of the divided extent are
    /// given to it; the other extent is inherited.
    #[inline]
    #[must_use]
    pub const fn child_size(self, width: u32, height: u32, allotted: u32) -> (u32, u32) {
        match self {
            Self::Horizontal => (allotted, height),
            Self::Vertical => (width, allotted),
        }
    }

    /// Origin of `area` along this axis.
    #[inline]
    #[must_use]
    pub const fn origin(self, area: Rect) -> i32 {
        match self {
            Self::Horizontal => area.x,
            Self::Vertical => area.y,
        }
    }

    /// The child rectangle starting at `offset` along this axis with
    /// `allotted` pixels; the cross-axis origin and extent come from `area`.
    #[inline]
    #[must_use]
    pub const fn compose(self, area: Rect, offset: i32, allotted: u32) -> Rect {
        match self {
            Self::Horizontal => Rect::new(offset, area.y, allotted, area.height),
            Self::Vertical => Rect::new(area.x, offset, area.width, allotted),
        }
    }

    /// The other axis.
    #[inline]
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// Where a new child goes in its split's sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Prepend: the new child becomes leftmost/topmost.
    First,
    /// Append: the new child becomes rightmost/bottommost.
    #[default]
    Last,
}

// ============================================================================
// Bounds
// ============================================================================

/// Inclusive pixel bounds every leaf must satisfy for a placement to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBounds {
    /// Narrowest acceptable width.
    pub min_width: u32,
    /// Shortest acceptable height.
    pub min_height: u32,
    /// Widest acceptable width, usually the placement area's.
    pub max_width: u32,
    /// Tallest acceptable height, usually the placement area's.
    pub max_height: u32,
}

impl SizeBounds {
    /// Bounds from explicit minimum and maximum sizes.
    #[must_use]
    pub const fn new(min_width: u32, min_height: u32, max_width: u32, max_height: u32) -> Self {
        Self {
            min_width,
            min_height,
            max_width,
            max_height,
        }
    }

    /// Bounds of at least `min_width × min_height`, at most the whole `area`.
    #[must_use]
    pub const fn within(area: Rect, min_width: u32, min_height: u32) -> Self {
        Self::new(min_width, min_height, area.width, area.height)
    }

    /// True iff `min_w <= width <= max_w` and `min_h <= height <= max_h`.
    #[inline]
    #[must_use]
    pub const fn contains(&self, width: u32, height: u32) -> bool {
        width >= self.min_width
            && height >= self.min_height
            && width <= self.max_width
            && height <= self.max_height
    }
}

// ============================================================================
// Node
// ============================================================================

/// Payload to create a node from.
///
/// Nodes are only ever created into a position (the root slot or a split),
/// so callers describe the node rather than allocate it up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewNode<C> {
    /// A leaf wrapping a client handle.
    Leaf(C),
    /// An empty split along the given axis.
    Split(SplitAxis),
}

/// Node payload variant.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind<C> {
    Split(Split),
    Leaf(Leaf<C>),
}

/// One arena slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<C> {
    pub(crate) parent: Option<NodeId>,
    pub(crate) proportion: Proportion,
    pub(crate) kind: NodeKind<C>,
}

impl<C> Node<C> {
    pub(crate) fn from_new(new: NewNode<C>, parent: Option<NodeId>, proportion: Proportion) -> Self {
        let kind = match new {
            NewNode::Leaf(client) => NodeKind::Leaf(Leaf::new(client)),
            NewNode::Split(axis) => NodeKind::Split(Split::new(axis)),
        };
        Self {
            parent,
            proportion,
            kind,
        }
    }

    /// Parent split, `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Share of the parent's extent. Meaningless for the root.
    #[must_use]
    pub const fn proportion(&self) -> Proportion {
        self.proportion
    }

    pub(crate) fn set_proportion(&mut self, proportion: Proportion) {
        self.proportion = proportion;
    }

    /// Node payload.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind<C> {
        &self.kind
    }

    /// The split payload, if this is a split.
    #[must_use]
    pub const fn as_split(&self) -> Option<&Split> {
        match &self.kind {
            NodeKind::Split(split) => Some(split),
            NodeKind::Leaf(_) => None,
        }
    }

    pub(crate) fn as_split_mut(&mut self) -> Option<&mut Split> {
        match &mut self.kind {
            NodeKind::Split(split) => Some(split),
            NodeKind::Leaf(_) => None,
        }
    }

    /// The leaf payload, if this is a leaf.
    #[must_use]
    pub const fn as_leaf(&self) -> Option<&Leaf<C>> {
        match &self.kind {
            NodeKind::Leaf(leaf) => Some(leaf),
            NodeKind::Split(_) => None,
        }
    }

    pub(crate) fn as_leaf_mut(&mut self) -> Option<&mut Leaf<C>> {
        match &mut self.kind {
            NodeKind::Leaf(leaf) => Some(leaf),
            NodeKind::Split(_) => None,
        }
    }

    /// Check if this is a leaf node.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }
}
