//! Transition primitives.
//!
//! An [`Animator`] is the bridge to a concrete presentation technology. The
//! navigator has already updated the logical navigation state when it calls a
//! primitive; the primitive only performs the visual effect and fires the
//! [`Completion`] exactly once when done. Units passed here are display units
//! (coordinators already resolved to their root unit).

use crate::completion::Completion;
use wayfinder_core::NodeId;

/// Backend that performs the visual side of transitions.
pub trait Animator {
    /// Show `unit` on top of `container`'s stack.
    fn push(&mut self, container: NodeId, unit: NodeId, done: Completion);

    /// Present `unit` modally over `container`.
    fn present(&mut self, container: NodeId, unit: NodeId, animated: bool, done: Completion);

    /// Remove `unit` from the top of `container`'s stack.
    fn pop(&mut self, container: NodeId, unit: NodeId, done: Completion);

    /// Remove `units` (top first) from `container`'s stack.
    fn pop_to_root(&mut self, container: NodeId, units: &[NodeId], done: Completion);

    /// Dismiss `unit`, presented by `container`.
    fn dismiss(&mut self, container: NodeId, unit: NodeId, done: Completion);

    /// Display `unit` as `container`'s only content, replacing `previous`.
    fn set_root(&mut self, container: NodeId, unit: NodeId, previous: &[NodeId], done: Completion);

    /// Make `container` active and visible.
    fn activate(&mut self, container: NodeId) {
        let _ = container;
    }

    /// Release the resources of a unit that was replaced as a root.
    fn teardown(&mut self, unit: NodeId) {
        let _ = unit;
    }
}

/// Animator with no visual side: every primitive completes immediately.
///
/// Suitable for headless hosts and tests that only care about logical state.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstantAnimator;

impl Animator for InstantAnimator {
    fn push(&mut self, _container: NodeId, _unit: NodeId, done: Completion) {
        done.complete();
    }

    fn present(&mut self, _container: NodeId, _unit: NodeId, _animated: bool, done: Completion) {
        done.complete();
    }

    fn pop(&mut self, _container: NodeId, _unit: NodeId, done: Completion) {
        done.complete();
    }

    fn pop_to_root(&mut self, _container: NodeId, _units: &[NodeId], done: Completion) {
        done.complete();
    }

    fn dismiss(&mut self, _container: NodeId, _unit: NodeId, done: Completion) {
        done.complete();
    }

    fn set_root(
        &mut self,
        _container: NodeId,
        _unit: NodeId,
        _previous: &[NodeId],
        done: Completion,
    ) {
        done.complete();
    }
}
