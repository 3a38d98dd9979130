#![forbid(unsafe_code)]

//! Tunables for how a tree turns proportions into pixels.

use serde::{Deserialize, Serialize};

/// What happens to pixels lost or gained by rounding each child's share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Every child gets its own rounded share; the split may come out a few
    /// pixels short of (or past) its extent, at most one per child.
    #[default]
    Drift,
    /// The last child gets whatever the others left over.
    AbsorbLast,
}

/// Per-tree placement configuration.
///
/// Every field has a serde default, so a partial (or empty) document
/// deserializes to the values of [`LayoutSettings::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// Rounding remainder handling along each split axis.
    #[serde(default)]
    pub remainder: RemainderPolicy,
    /// Smallest leaf width a placement accepts. Default: 1.
    #[serde(default = "default_min_leaf_size")]
    pub min_leaf_width: u32,
    /// Smallest leaf height a placement accepts. Default: 1.
    #[serde(default = "default_min_leaf_size")]
    pub min_leaf_height: u32,
}

fn default_min_leaf_size() -> u32 {
    1
}

impl Default for LayoutSettings {
    fn default() -> Self {
        LayoutSettings {
            remainder: RemainderPolicy::default(),
            min_leaf_width: default_min_leaf_size(),
            min_leaf_height: default_min_leaf_size(),
        }
    }
}
