//! Recording client used by unit tests.

use tilery_core::geometry::Rect;

use crate::client::Client;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Call {
    FrameTile,
    MoveResize(Rect),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Window {
    pub(crate) id: u32,
    pub(crate) calls: Vec<Call>,
}

impl Window {
    pub(crate) fn new(id: u32) -> Self {
        Self {
            id,
            calls: Vec::new(),
        }
    }

    /// The last rectangle this window was given.
    pub(crate) fn rect(&self) -> Option<Rect> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::MoveResize(rect) => Some(*rect),
            Call::FrameTile => None,
        })
    }
}

impl Client for Window {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }

    fn frame_tile(&mut self) {
        self.calls.push(Call::FrameTile);
    }

    fn move_resize(&mut self, rect: Rect) {
        self.calls.push(Call::MoveResize(rect));
    }
}
