#![forbid(unsafe_code)]

//! Terminal nodes: one client each.

use tilery_core::geometry::Rect;

use crate::client::Client;

/// Leaf payload wrapping a client handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf<C> {
    client: C,
}

impl<C> Leaf<C> {
    pub(crate) const fn new(client: C) -> Self {
        Self { client }
    }

    /// The client shown in this leaf.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    pub(crate) fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub(crate) fn into_client(self) -> C {
        self.client
    }

    pub(crate) fn swap_client(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.client, &mut other.client);
    }
}

impl<C: Client> Leaf<C> {
    /// Tile the client, then give it `rect`.
    ///
    /// The frame switch comes first so the client lays out its decorations
    /// for the new geometry.
    pub(crate) fn move_resize(&mut self, rect: Rect) {
        self.client.frame_tile();
        self.client.move_resize(rect);
    }
}
