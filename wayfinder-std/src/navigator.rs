//! # Navigator
//!
//! The [`Navigator`] owns the node table, the transition primitives and the
//! pending continuations. Every operation runs on the one thread that owns the
//! view hierarchy; nothing here is `Send`.
//!
//! # Continuations
//!
//! Completions are explicit callbacks taking `&mut Navigator`. A continuation
//! waiting on a primitive is parked under a [`TaskId`] and resumed when the
//! primitive fires its [`Completion`]. If the anchor a continuation belongs to
//! is removed first, the continuation is dropped and never runs.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut nav = Navigator::new(InstantAnimator);
//! let window = nav.insert(Window::new("main"));
//! let app = nav.spawn_coordinator(Coordinator::new(app_router), Screen::new("home"))?;
//! nav.set_root(app, window)?;
//! nav.trigger(app, AppRoute::Settings, |_| {})?;
//! ```

use crate::{
    animator::Animator,
    completion::{Completion, ReadyQueue, Signal, TaskId},
    config::NavigatorConfig,
    signal::TransitionSignal,
    stage::Stage,
};
use futures::channel::oneshot;
use std::collections::HashMap;
use wayfinder_core::{
    AnyRoute, ChildDisposition, NavigationError, NodeId, Presentable, Route, Transition,
};

/// A callback resumed once a transition has finished.
pub type Continuation = Box<dyn FnOnce(&mut Navigator)>;

struct Pending {
    anchor: NodeId,
    then: Continuation,
}

/// Executes transitions against a tree of presentables.
pub struct Navigator {
    pub(crate) stage: Stage,
    pub(crate) animator: Box<dyn Animator>,
    pub(crate) config: NavigatorConfig,
    ready: ReadyQueue,
    pending: HashMap<TaskId, Pending>,
    next_task: u64,
    /// Nesting of engine calls and run-loop turns; only depth 0 drains.
    pub(crate) depth: usize,
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("stage", &self.stage)
            .field("config", &self.config)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl Navigator {
    /// Create a navigator with the default configuration.
    pub fn new(animator: impl Animator + 'static) -> Self {
        Self::with_config(animator, NavigatorConfig::default())
    }

    /// Create a navigator with an explicit configuration.
    pub fn with_config(animator: impl Animator + 'static, config: NavigatorConfig) -> Self {
        Self {
            stage: Stage::new(),
            animator: Box::new(animator),
            config,
            ready: ReadyQueue::default(),
            pending: HashMap::new(),
            next_task: 0,
            depth: 0,
        }
    }

    /// Read-only view of the node table.
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Active configuration.
    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Node table
    // ------------------------------------------------------------------------

    /// Insert a top-level presentable.
    pub fn insert(&mut self, presentable: impl Presentable) -> NodeId {
        self.stage.insert(None, Box::new(presentable))
    }

    /// Insert a presentable owned by `owner`.
    pub fn insert_child(
        &mut self,
        owner: NodeId,
        presentable: impl Presentable,
    ) -> Result<NodeId, NavigationError> {
        self.ensure(owner)?;
        let id = self.stage.insert(Some(owner), Box::new(presentable));
        self.notify_child_added(owner, id);
        Ok(id)
    }

    /// Transfer ownership of `child` to `owner`.
    pub fn add_child(&mut self, owner: NodeId, child: NodeId) -> Result<(), NavigationError> {
        self.ensure(owner)?;
        self.ensure(child)?;
        if owner == child || self.stage.owner(child) == Some(owner) {
            return Ok(());
        }
        let previous = self.stage.adopt(Some(owner), child);
        if let Some(previous) = previous {
            if let Some(p) = self.stage.get_mut(previous) {
                p.child_removed(child);
            }
        }
        self.notify_child_added(owner, child);
        Ok(())
    }

    /// Remove `id` and everything it owns.
    ///
    /// Removed nodes disappear from every stack and modal slot. Continuations
    /// anchored at them are dropped without running.
    pub fn remove(&mut self, id: NodeId) -> Result<(), NavigationError> {
        self.ensure(id)?;
        let owner = self.stage.owner(id);
        let removed = self.stage.remove(id);
        let gone: Vec<NodeId> = removed.iter().map(|(id, _)| *id).collect();
        self.pending.retain(|_, pending| !gone.contains(&pending.anchor));
        tracing::debug!(node = %id, released = gone.len(), "removed node");
        drop(removed);
        if let Some(owner) = owner {
            if let Some(p) = self.stage.get_mut(owner) {
                p.child_removed(id);
            }
        }
        Ok(())
    }

    /// Whether `id` is live.
    pub fn contains(&self, id: NodeId) -> bool {
        self.stage.contains(id)
    }

    /// Borrow the presentable at `id` as a `T`.
    pub fn get<T: Presentable>(&self, id: NodeId) -> Option<&T> {
        self.stage.downcast_ref::<T>(id)
    }

    /// Mutably borrow the presentable at `id` as a `T`.
    pub fn get_mut<T: Presentable>(&mut self, id: NodeId) -> Option<&mut T> {
        self.stage.downcast_mut::<T>(id)
    }

    /// Registered parent of `id`.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.stage.parent(id)
    }

    /// Register `parent` as the parent of `child`, superseding any previous
    /// registration.
    ///
    /// Transitions do this automatically for every unit they show.
    pub fn register_parent(&mut self, child: NodeId, parent: NodeId) -> Result<(), NavigationError> {
        self.ensure(child)?;
        self.ensure(parent)?;
        self.stage.set_parent(child, parent);
        if let Some(p) = self.stage.get_mut(child) {
            p.register_parent(parent);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Routing
    // ------------------------------------------------------------------------

    /// Map `route` on `node` without performing anything.
    ///
    /// # Panics
    ///
    /// If `node` is not a router for `R`.
    pub fn prepare<R: Route>(&self, node: NodeId, route: &R) -> Result<Transition, NavigationError> {
        self.prepare_any(node, route)
    }

    /// Erased form of [`Navigator::prepare`].
    ///
    /// # Panics
    ///
    /// If `node` cannot map routes of this type.
    pub fn prepare_any(
        &self,
        node: NodeId,
        route: &dyn AnyRoute,
    ) -> Result<Transition, NavigationError> {
        let presentable = self.stage.get(node).ok_or(NavigationError::UnknownNode(node))?;
        match presentable.transition_for(route) {
            Some(transition) => Ok(transition),
            None => panic!("node {node} is not a router for route `{}`", route.name()),
        }
    }

    /// Map `route` on `node`, perform the transition from `node`, then run
    /// `completion`.
    ///
    /// When the transition finishes, `node`'s registered parent is told via
    /// [`Presentable::child_transition_completed`].
    ///
    /// # Panics
    ///
    /// If `node` is not a router for `R`.
    pub fn trigger<R, F>(&mut self, node: NodeId, route: R, completion: F) -> Result<(), NavigationError>
    where
        R: Route,
        F: FnOnce(&mut Navigator) + 'static,
    {
        self.trigger_erased(node, Box::new(route), Some(Box::new(completion)))
    }

    /// Erased form of [`Navigator::trigger`] without a completion.
    pub fn trigger_any(&mut self, node: NodeId, route: Box<dyn AnyRoute>) -> Result<(), NavigationError> {
        self.trigger_erased(node, route, None)
    }

    /// Trigger `route` and get a future resolving when it completes.
    ///
    /// Resolves to [`NavigationError::Abandoned`] if the transition can no
    /// longer complete (its anchor was removed or a primitive dropped its
    /// completion).
    pub fn trigger_signal<R: Route>(
        &mut self,
        node: NodeId,
        route: R,
    ) -> Result<TransitionSignal, NavigationError> {
        let (tx, rx) = oneshot::channel();
        self.trigger(node, route, move |_| {
            let _ = tx.send(());
        })?;
        Ok(TransitionSignal::new(rx))
    }

    pub(crate) fn trigger_erased(
        &mut self,
        node: NodeId,
        route: Box<dyn AnyRoute>,
        completion: Option<Continuation>,
    ) -> Result<(), NavigationError> {
        let transition = self.prepare_any(node, &*route)?;
        tracing::debug!(
            node = %node,
            route = route.name(),
            kind = %transition.kind(),
            "trigger"
        );
        self.execute(
            node,
            transition,
            Box::new(move |nav: &mut Navigator| {
                if let Some(completion) = completion {
                    completion(nav);
                }
                nav.forward_completion(node);
            }),
        );
        self.drain_if_configured();
        Ok(())
    }

    /// Perform `transition` from `anchor` directly, skipping route mapping.
    ///
    /// No parent is notified; this is the raw engine entry point.
    pub fn perform<F>(&mut self, anchor: NodeId, transition: Transition, completion: F) -> Result<(), NavigationError>
    where
        F: FnOnce(&mut Navigator) + 'static,
    {
        self.ensure(anchor)?;
        self.execute(anchor, transition, Box::new(completion));
        self.drain_if_configured();
        Ok(())
    }

    /// Install `node` as the sole content of `container`.
    ///
    /// Assigns the new root, activates the container, calls
    /// `presented(from: container)` on `node`, then detaches the previous
    /// content. Tearing the previous content down is deferred to the next turn.
    pub fn set_root(&mut self, node: NodeId, container: NodeId) -> Result<(), NavigationError> {
        self.ensure(node)?;
        self.ensure(container)?;
        if node == container || self.stage.root_unit(node) == container {
            return Err(NavigationError::InvalidContainer(container));
        }
        if self.stage.stack(container) == [node] {
            tracing::debug!(node = %node, container = %container, "already the root; ignored");
            return Ok(());
        }

        let previous = self.stage.replace_stack(container, node);
        let display = self.stage.root_unit(node);
        let previous_units: Vec<NodeId> = previous.iter().map(|&id| self.stage.root_unit(id)).collect();
        let done = self.completion(container, Box::new(|_| {}));
        self.animator.set_root(container, display, &previous_units, done);
        self.animator.activate(container);
        self.stage.set_visible(container, true);
        if let Some(p) = self.stage.get_mut(node) {
            p.presented(Some(container));
        }
        tracing::debug!(node = %node, container = %container, replaced = previous.len(), "set root");

        self.retire(container, previous);
        self.drain_if_configured();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Run loop
    // ------------------------------------------------------------------------

    /// Resume every continuation whose completion has fired.
    ///
    /// Returns the number of continuations that ran. Continuations scheduled
    /// while draining run in the same call.
    pub fn run_pending(&mut self) -> usize {
        self.depth += 1;
        let mut ran = 0;
        while let Some(signal) = self.ready.pop() {
            match signal {
                Signal::Fire(task) => {
                    let Some(pending) = self.pending.remove(&task) else {
                        continue;
                    };
                    if !self.stage.contains(pending.anchor) {
                        tracing::trace!(%task, anchor = %pending.anchor, "anchor gone; continuation dropped");
                        continue;
                    }
                    tracing::trace!(%task, "continuation resumed");
                    (pending.then)(self);
                    ran += 1;
                }
                Signal::Abandon(task) => {
                    if self.pending.remove(&task).is_some() {
                        tracing::trace!(%task, "completion dropped unfired");
                    }
                }
            }
        }
        self.depth -= 1;
        ran
    }

    /// Number of continuations waiting on a completion.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is waiting and nothing is ready to run.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.ready.is_empty()
    }

    // ------------------------------------------------------------------------
    // Internals shared with the engine
    // ------------------------------------------------------------------------

    /// Park `then` until the returned completion fires.
    pub(crate) fn completion(&mut self, anchor: NodeId, then: Continuation) -> Completion {
        let task = TaskId(self.next_task);
        self.next_task += 1;
        self.pending.insert(task, Pending { anchor, then });
        Completion::new(task, self.ready.clone())
    }

    /// Run `then` on the next turn of the run loop.
    pub(crate) fn defer(&mut self, anchor: NodeId, then: Continuation) {
        self.completion(anchor, then).complete();
    }

    /// Drain ready continuations, unless called from inside the engine or
    /// the run loop; the outermost call drains.
    pub(crate) fn drain_if_configured(&mut self) {
        if self.config.drain_on_trigger && self.depth == 0 {
            self.run_pending();
        }
    }

    pub(crate) fn ensure(&self, id: NodeId) -> Result<(), NavigationError> {
        if self.stage.contains(id) {
            Ok(())
        } else {
            Err(NavigationError::UnknownNode(id))
        }
    }

    fn notify_child_added(&mut self, owner: NodeId, child: NodeId) {
        if let Some(p) = self.stage.get_mut(owner) {
            p.child_added(child);
        }
    }

    /// Tell `child`'s registered parent that a transition on `child` finished,
    /// and apply the parent's decision.
    fn forward_completion(&mut self, child: NodeId) {
        let Some(parent) = self.stage.parent(child) else {
            return;
        };
        let Some(p) = self.stage.get_mut(parent) else {
            tracing::trace!(child = %child, parent = %parent, "parent gone; completion not forwarded");
            return;
        };
        let disposition = p.child_transition_completed(child);
        let release = match disposition {
            ChildDisposition::Keep => false,
            ChildDisposition::Release => true,
            ChildDisposition::ReleaseIfDetached => !self.stage.is_displayed(child),
        };
        if release && self.stage.owner(child) == Some(parent) {
            tracing::debug!(child = %child, parent = %parent, "releasing child");
            let _ = self.remove(child);
        }
    }
}
