#![forbid(unsafe_code)]

//! The capability the layout tree consumes from managed windows.

use std::fmt;

use tilery_core::geometry::Rect;

/// A managed window as seen by the layout tree.
///
/// The tree never owns a window's lifecycle. `Self` is whatever handle the
/// window manager hands out (an ID wrapper, an `Rc`, a proxy), and two
/// handles refer to the same window iff their [`Client::id`]s are equal.
pub trait Client {
    /// Identity used to locate a client's leaf.
    type Id: Copy + Eq + fmt::Debug;

    /// This window's identity.
    fn id(&self) -> Self::Id;

    /// Switch to tiled (non-floating) decorations. Must be idempotent.
    fn frame_tile(&mut self);

    /// Move and resize to exactly `rect`. Called again with the same
    /// rectangle on every placement.
    fn move_resize(&mut self, rect: Rect);
}
