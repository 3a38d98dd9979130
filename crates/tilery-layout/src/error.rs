#![forbid(unsafe_code)]

//! Recoverable tree errors.
//!
//! These report misuse of the tree API (stale IDs, wrong node kinds) and are
//! returned before anything is mutated. A split whose children stop summing
//! to one after a mutation is not an error value: it is an internal bug and
//! panics at the point of detection.

use std::fmt;

use crate::node::NodeId;

/// Errors from tree construction, mutation and validation.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeError {
    UnknownNode {
        node_id: NodeId,
    },
    NotASplit {
        node_id: NodeId,
    },
    NotALeaf {
        node_id: NodeId,
    },
    NotAChild {
        parent: NodeId,
        child: NodeId,
    },
    NoParentSplit {
        node_id: NodeId,
    },
    InvalidProportion {
        node_id: NodeId,
        value: f64,
    },
    ProportionSum {
        split: NodeId,
        sum: f64,
    },
    RootHasParent {
        root: NodeId,
        parent: NodeId,
    },
    ParentMismatch {
        node_id: NodeId,
        expected: Option<NodeId>,
        actual: Option<NodeId>,
    },
    UnreachableNode {
        node_id: NodeId,
    },
    NodeIdOverflow {
        current: NodeId,
    },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode { node_id } => write!(f, "node {node_id} not found"),
            Self::NotASplit { node_id } => write!(f, "node {node_id} is not a split"),
            Self::NotALeaf { node_id } => write!(f, "node {node_id} is not a leaf"),
            Self::NotAChild { parent, child } => {
                write!(f, "node {child} is not a child of split {parent}")
            }
            Self::NoParentSplit { node_id } => {
                write!(f, "node {node_id} has no parent split")
            }
            Self::InvalidProportion { node_id, value } => write!(
                f,
                "invalid proportion {value} for node {node_id}: must be within [0, 1]"
            ),
            Self::ProportionSum { split, sum } => {
                write!(f, "children of split {split} sum to {sum}, expected 1")
            }
            Self::RootHasParent { root, parent } => {
                write!(f, "root node {root} must not have parent {parent}")
            }
            Self::ParentMismatch {
                node_id,
                expected,
                actual,
            } => write!(
                f,
                "node {node_id} parent mismatch: expected {:?}, got {:?}",
                expected.map(NodeId::get),
                actual.map(NodeId::get)
            ),
            Self::UnreachableNode { node_id } => {
                write!(f, "node {node_id} is unreachable from root")
            }
            Self::NodeIdOverflow { current } => {
                write!(f, "node id overflow after {current}")
            }
        }
    }
}

impl std::error::Error for TreeError {}
