//! User-triggered point forces and spawns.
//!
//! Requests can arrive at any time between frames. Spawn and repulsion are
//! one-shots consumed by the next frame; attraction stays active until it is
//! cleared or toggled off.

use glam::Vec2;

/// Requests consumed by one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameRequests {
    pub spawn: Option<Vec2>,
    pub repulsion: Option<Vec2>,
    pub attraction: Option<Vec2>,
}

#[derive(Debug, Default)]
pub struct Interactions {
    spawn: Option<Vec2>,
    repulsion: Option<Vec2>,
    attraction: Option<Vec2>,
}

impl Interactions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a prey spawn. Several requests before the next frame coalesce
    /// into one; the latest position wins.
    pub fn request_spawn(&mut self, position: Vec2) {
        self.spawn = Some(position);
    }

    /// Queues a repulsion pulse for the next frame only.
    pub fn request_repulsion(&mut self, position: Vec2) {
        self.repulsion = Some(position);
    }

    pub fn set_attraction(&mut self, position: Vec2) {
        self.attraction = Some(position);
    }

    pub fn clear_attraction(&mut self) {
        self.attraction = None;
    }

    /// Turns attraction on at `position`, or off if it is already on.
    ///
    /// ### Returns
    /// `true` if attraction is active after the call.
    pub fn toggle_attraction(&mut self, position: Vec2) -> bool {
        self.attraction = match self.attraction {
            Some(_) => None,
            None => Some(position),
        };
        self.attraction.is_some()
    }

    pub fn attraction(&self) -> Option<Vec2> {
        self.attraction
    }

    pub fn has_pending_spawn(&self) -> bool {
        self.spawn.is_some()
    }

    /// Takes this frame's requests, clearing the one-shots.
    pub fn take_frame(&mut self) -> FrameRequests {
        FrameRequests {
            spawn: self.spawn.take(),
            repulsion: self.repulsion.take(),
            attraction: self.attraction,
        }
    }
}
