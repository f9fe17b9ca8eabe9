//! Testing utilities for Wayfinder.
//!
//! # Features
//!
//! - [`RecordingAnimator`]: an animator that records every primitive and can
//!   hold completions until the test releases them
//! - [`SpyUnit`]: a presentable that records every hook it receives

use crate::{animator::Animator, completion::Completion};
use std::{cell::RefCell, collections::VecDeque, rc::Rc};
use wayfinder_core::{ChildDisposition, NodeId, Presentable, TransitionKind};

// ============================================================================
// Recording Animator
// ============================================================================

/// Whether an [`AnimatorEvent`] marks the start or the end of a primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// The navigator invoked the primitive.
    Start,
    /// The primitive fired its completion.
    End,
}

/// One entry in a [`RecordingAnimator`]'s log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimatorEvent {
    /// Start or end.
    pub phase: Phase,
    /// Which primitive.
    pub kind: TransitionKind,
    /// Container the primitive acted on.
    pub container: NodeId,
    /// Display unit shown or removed.
    pub unit: NodeId,
}

impl AnimatorEvent {
    /// Create an event.
    pub fn new(phase: Phase, kind: TransitionKind, container: NodeId, unit: NodeId) -> Self {
        Self {
            phase,
            kind,
            container,
            unit,
        }
    }
}

struct Held {
    kind: TransitionKind,
    container: NodeId,
    unit: NodeId,
    done: Completion,
}

#[derive(Default)]
struct RecorderState {
    manual: bool,
    events: Vec<AnimatorEvent>,
    held: VecDeque<Held>,
    torn_down: Vec<NodeId>,
    activated: Vec<NodeId>,
}

/// An animator that records all primitives it is asked to run.
///
/// Clones share the same log, so keep one clone in the test and hand the
/// other to the navigator.
///
/// # Example
///
/// ```rust,ignore
/// let animator = RecordingAnimator::manual();
/// let mut nav = Navigator::new(animator.clone());
///
/// nav.perform(anchor, Transition::push(unit), |_| {})?;
/// assert_eq!(animator.held(), 1);
///
/// animator.finish_next();
/// nav.run_pending();
/// ```
#[derive(Clone, Default)]
pub struct RecordingAnimator {
    state: Rc<RefCell<RecorderState>>,
}

impl RecordingAnimator {
    /// Animator whose primitives complete immediately.
    pub fn immediate() -> Self {
        Self::default()
    }

    /// Animator that holds completions until [`finish_next`](Self::finish_next)
    /// or [`finish_all`](Self::finish_all).
    pub fn manual() -> Self {
        let animator = Self::default();
        animator.state.borrow_mut().manual = true;
        animator
    }

    /// Get a clone of the recorded events.
    pub fn events(&self) -> Vec<AnimatorEvent> {
        self.state.borrow().events.clone()
    }

    /// Number of primitives of `kind` that were started.
    pub fn starts(&self, kind: TransitionKind) -> usize {
        self.state
            .borrow()
            .events
            .iter()
            .filter(|event| event.phase == Phase::Start && event.kind == kind)
            .count()
    }

    /// Number of completions being held.
    pub fn held(&self) -> usize {
        self.state.borrow().held.len()
    }

    /// Units passed to [`Animator::teardown`], in order.
    pub fn torn_down(&self) -> Vec<NodeId> {
        self.state.borrow().torn_down.clone()
    }

    /// Containers passed to [`Animator::activate`], in order.
    pub fn activated(&self) -> Vec<NodeId> {
        self.state.borrow().activated.clone()
    }

    /// Fire the oldest held completion. Returns `false` if none was held.
    pub fn finish_next(&self) -> bool {
        let held = {
            let mut state = self.state.borrow_mut();
            let Some(held) = state.held.pop_front() else {
                return false;
            };
            state.events.push(AnimatorEvent::new(
                Phase::End,
                held.kind,
                held.container,
                held.unit,
            ));
            held
        };
        held.done.complete();
        true
    }

    /// Fire every held completion, oldest first.
    pub fn finish_all(&self) -> usize {
        let mut finished = 0;
        while self.finish_next() {
            finished += 1;
        }
        finished
    }

    /// Drop every held completion without firing it.
    pub fn abandon_all(&self) -> usize {
        let held: Vec<Held> = self.state.borrow_mut().held.drain(..).collect();
        held.len()
    }

    /// Clear the event log.
    pub fn clear(&self) {
        self.state.borrow_mut().events.clear();
    }

    fn record(&self, kind: TransitionKind, container: NodeId, unit: NodeId, done: Completion) {
        let mut state = self.state.borrow_mut();
        state
            .events
            .push(AnimatorEvent::new(Phase::Start, kind, container, unit));
        if state.manual {
            state.held.push_back(Held {
                kind,
                container,
                unit,
                done,
            });
            return;
        }
        state
            .events
            .push(AnimatorEvent::new(Phase::End, kind, container, unit));
        drop(state);
        done.complete();
    }
}

impl std::fmt::Debug for RecordingAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RecordingAnimator")
            .field("manual", &state.manual)
            .field("events", &state.events.len())
            .field("held", &state.held.len())
            .finish()
    }
}

impl Animator for RecordingAnimator {
    fn push(&mut self, container: NodeId, unit: NodeId, done: Completion) {
        self.record(TransitionKind::Push, container, unit, done);
    }

    fn present(&mut self, container: NodeId, unit: NodeId, _animated: bool, done: Completion) {
        self.record(TransitionKind::Present, container, unit, done);
    }

    fn pop(&mut self, container: NodeId, unit: NodeId, done: Completion) {
        self.record(TransitionKind::Pop, container, unit, done);
    }

    fn pop_to_root(&mut self, container: NodeId, units: &[NodeId], done: Completion) {
        let unit = units.first().copied().unwrap_or(container);
        self.record(TransitionKind::PopToRoot, container, unit, done);
    }

    fn dismiss(&mut self, container: NodeId, unit: NodeId, done: Completion) {
        self.record(TransitionKind::Dismiss, container, unit, done);
    }

    fn set_root(&mut self, container: NodeId, unit: NodeId, _previous: &[NodeId], done: Completion) {
        self.record(TransitionKind::SetRoot, container, unit, done);
    }

    fn activate(&mut self, container: NodeId) {
        self.state.borrow_mut().activated.push(container);
    }

    fn teardown(&mut self, unit: NodeId) {
        self.state.borrow_mut().torn_down.push(unit);
    }
}

// ============================================================================
// Spy Unit
// ============================================================================

/// A hook received by a [`SpyUnit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookCall {
    /// [`Presentable::presented`].
    Presented(Option<NodeId>),
    /// [`Presentable::register_parent`].
    RegisterParent(NodeId),
    /// [`Presentable::child_transition_completed`].
    ChildTransitionCompleted(NodeId),
    /// [`Presentable::dismissed`].
    Dismissed,
    /// [`Presentable::child_added`].
    ChildAdded(NodeId),
    /// [`Presentable::child_removed`].
    ChildRemoved(NodeId),
}

/// Shared view of a [`SpyUnit`]'s hook log.
///
/// Stays readable after the spy has been moved into a navigator.
#[derive(Clone, Debug, Default)]
pub struct SpyLog(Rc<RefCell<Vec<HookCall>>>);

impl SpyLog {
    /// Get a clone of the recorded calls.
    pub fn calls(&self) -> Vec<HookCall> {
        self.0.borrow().clone()
    }

    /// Number of recorded calls equal to `call`.
    pub fn count(&self, call: HookCall) -> usize {
        self.0.borrow().iter().filter(|&&c| c == call).count()
    }

    /// Number of `presented` calls, whatever the origin.
    pub fn presented(&self) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|c| matches!(c, HookCall::Presented(_)))
            .count()
    }

    /// Clear all recorded calls.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn push(&self, call: HookCall) {
        self.0.borrow_mut().push(call);
    }
}

/// A presentable that records every hook it receives.
#[derive(Debug, Default)]
pub struct SpyUnit {
    log: SpyLog,
    disposition: ChildDisposition,
    root: Option<NodeId>,
}

impl SpyUnit {
    /// Create a spy that keeps its children.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `child_transition_completed` with `disposition`.
    pub fn with_disposition(mut self, disposition: ChildDisposition) -> Self {
        self.disposition = disposition;
        self
    }

    /// Display through `root` instead of itself.
    pub fn with_root(mut self, root: NodeId) -> Self {
        self.root = Some(root);
        self
    }

    /// Shared handle to the hook log.
    pub fn log(&self) -> SpyLog {
        self.log.clone()
    }
}

impl Presentable for SpyUnit {
    fn root_unit(&self) -> Option<NodeId> {
        self.root
    }

    fn presented(&mut self, from: Option<NodeId>) {
        self.log.push(HookCall::Presented(from));
    }

    fn register_parent(&mut self, parent: NodeId) {
        self.log.push(HookCall::RegisterParent(parent));
    }

    fn child_transition_completed(&mut self, child: NodeId) -> ChildDisposition {
        self.log.push(HookCall::ChildTransitionCompleted(child));
        self.disposition
    }

    fn dismissed(&mut self) {
        self.log.push(HookCall::Dismissed);
    }

    fn child_added(&mut self, child: NodeId) {
        self.log.push(HookCall::ChildAdded(child));
    }

    fn child_removed(&mut self, child: NodeId) {
        self.log.push(HookCall::ChildRemoved(child));
    }
}
