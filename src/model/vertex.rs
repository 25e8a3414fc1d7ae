//! Vertex data and handle.

use serde::{Deserialize, Serialize};

use super::FourVector;

/// Opaque vertex handle, bound to the arena of one [`Event`](crate::Event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexRef {
    pub(crate) arena: u64,
    pub(crate) slot: u32,
}

/// Plain per-vertex data.
///
/// A zero `position` means "not set"; the effective position is then
/// inherited from ancestor vertices or the event.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VertexData {
    pub status: i32,
    pub position: FourVector,
}

impl VertexData {
    pub fn new(position: FourVector) -> Self {
        Self { status: 0, position }
    }

    pub fn with_status(mut self, status: i32) -> Self {
        self.status = status;
        self
    }

    pub fn has_set_position(&self) -> bool {
        !self.position.is_zero()
    }

    /// No status and no position.
    pub fn is_zero(&self) -> bool {
        self.status == 0 && self.position.is_zero()
    }
}
