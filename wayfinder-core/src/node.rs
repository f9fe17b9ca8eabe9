//! Node handles.

use std::fmt;

/// Identifier for a presentable held by a navigator.
///
/// A small, copyable handle made of a slot index and a generation counter.
/// Parent links and navigation stacks store these handles instead of owning
/// pointers, so the owning direction (parent owns child) stays explicit.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; every `NodeId` pointing at it becomes stale.
/// - On reuse of a freed slot, its generation is incremented, so a stale
///   handle never aliases the new occupant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Build a handle from its raw parts.
    ///
    /// Only node tables should call this; a fabricated handle is simply stale.
    pub const fn from_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index.
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Generation of the slot at the time the handle was issued.
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}
