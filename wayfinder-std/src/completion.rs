//! Single-fire completion handles.
//!
//! Transition primitives receive a [`Completion`] and fire it once the visual
//! effect has finished. Firing does not run any navigator code directly; it
//! posts the task id to a ready queue that the navigator drains on its next
//! turn ([`Navigator::run_pending`](crate::Navigator::run_pending)). That keeps
//! primitives that complete synchronously from re-entering the navigator while
//! it is mid-mutation.
//!
//! A completion is consumed by [`Completion::complete`], so it cannot fire
//! twice. Dropping it unfired posts an abandonment instead, and the waiting
//! continuation is discarded without running.

use std::{cell::RefCell, collections::VecDeque, fmt, rc::Rc};

/// Identifier of a pending continuation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    Fire(TaskId),
    Abandon(TaskId),
}

/// Shared queue of fired or abandoned tasks.
#[derive(Clone, Default)]
pub(crate) struct ReadyQueue(Rc<RefCell<VecDeque<Signal>>>);

impl ReadyQueue {
    pub(crate) fn post(&self, signal: Signal) {
        self.0.borrow_mut().push_back(signal);
    }

    pub(crate) fn pop(&self) -> Option<Signal> {
        self.0.borrow_mut().pop_front()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Handle a transition primitive fires when its effect has finished.
#[must_use = "dropping a Completion abandons the transition waiting on it"]
pub struct Completion {
    task: TaskId,
    queue: ReadyQueue,
    armed: bool,
}

impl Completion {
    pub(crate) fn new(task: TaskId, queue: ReadyQueue) -> Self {
        Self {
            task,
            queue,
            armed: true,
        }
    }

    /// The task this completion resumes.
    pub fn task(&self) -> TaskId {
        self.task
    }

    /// Report that the effect has finished.
    pub fn complete(mut self) {
        self.armed = false;
        self.queue.post(Signal::Fire(self.task));
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.armed {
            self.queue.post(Signal::Abandon(self.task));
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("task", &self.task)
            .field("armed", &self.armed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_posts_fire_once() {
        let queue = ReadyQueue::default();
        Completion::new(TaskId(1), queue.clone()).complete();
        assert_eq!(queue.pop(), Some(Signal::Fire(TaskId(1))));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_drop_posts_abandon() {
        let queue = ReadyQueue::default();
        drop(Completion::new(TaskId(2), queue.clone()));
        assert_eq!(queue.pop(), Some(Signal::Abandon(TaskId(2))));
        assert!(queue.is_empty());
    }
}
