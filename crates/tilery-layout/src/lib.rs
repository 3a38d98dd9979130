#![forbid(unsafe_code)]

//! Proportional split-tree layouts for tiling window managers.
//!
//! A [`Tree`] divides a monitor area among clients. Interior nodes are
//! [`Split`]s that cut their area along one [`SplitAxis`]; each child holds a
//! [`Proportion`] of that cut and the shares of a split's children always sum
//! to one. Leaves hold one [`Client`] each.
//!
//! ```text
//!   Horizontal split           Vertical split
//!  +---------+---------+      +-------------------+
//!  |         |         |      |       first       |
//!  |  first  |  second |      +-------------------+
//!  |         |         |      |      second       |
//!  +---------+---------+      +-------------------+
//! ```
//!
//! [`Tree::place`] turns shares into pixels. It refuses the whole placement
//! if any leaf would come out smaller than the configured minimum or larger
//! than the target area, so clients never see a half-applied layout.
//!
//! With the default `tracing` feature, mutations log at `debug` and
//! placements at `trace` under a `place` span.

pub mod client;
pub mod error;
pub mod leaf;
pub mod node;
pub mod proportion;
pub mod settings;
pub mod split;
pub mod tree;

#[cfg(test)]
mod test_support;

pub use client::Client;
pub use error::TreeError;
pub use leaf::Leaf;
pub use node::{NewNode, Node, NodeId, NodeKind, Placement, SizeBounds, SplitAxis};
pub use proportion::{EPSILON, Proportion};
pub use settings::{LayoutSettings, RemainderPolicy};
pub use split::Split;
pub use tilery_core::geometry::Rect;
pub use tree::Tree;
