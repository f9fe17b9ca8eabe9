//! Transition execution.
//!
//! Every step follows the same shape: update the logical navigation state in
//! the stage, run the presentable hooks (parent registration strictly before
//! `presented`), then hand the visual effect to the animator together with a
//! completion that resumes the caller's continuation.
//!
//! Requests that make no sense for the current state (pop with a single-entry
//! stack, dismiss with nothing presented, showing a unit that is already
//! displayed) are ignored: nothing is mutated, no hook runs, and the
//! continuation runs immediately.

use crate::navigator::{Continuation, Navigator};
use std::{cell::RefCell, collections::VecDeque, rc::Rc};
use wayfinder_core::{NodeId, Transition, TransitionKind, Unit};

impl Navigator {
    /// Execute `transition` from `anchor`, then run `then` exactly once.
    ///
    /// If `anchor` is gone, `then` never runs.
    pub(crate) fn execute(&mut self, anchor: NodeId, transition: Transition, then: Continuation) {
        self.depth += 1;
        self.execute_step(anchor, transition, then);
        self.depth -= 1;
    }

    fn execute_step(&mut self, anchor: NodeId, transition: Transition, then: Continuation) {
        if !self.stage.contains(anchor) {
            tracing::debug!(anchor = %anchor, kind = %transition.kind(), "anchor gone; transition dropped");
            return;
        }
        match transition {
            Transition::None => then(self),
            Transition::Push(unit) => self.push_unit(anchor, unit, then),
            Transition::Present { unit, animated } => self.present_unit(anchor, unit, animated, then),
            Transition::Pop => self.pop_unit(anchor, then),
            Transition::PopToRoot => self.pop_to_root(anchor, then),
            Transition::Dismiss => self.dismiss_unit(anchor, then),
            Transition::SetRoot(unit) => self.replace_root(anchor, unit, then),
            Transition::Multiple(steps) => self.run_sequence(anchor, steps.into(), then),
            Transition::Independent(steps) => self.run_group(anchor, steps, then),
            Transition::Reroute { router, route } => {
                if !self.stage.contains(router) {
                    return self.ignore(anchor, TransitionKind::Reroute, "router is gone", then);
                }
                tracing::debug!(anchor = %anchor, router = %router, route = route.name(), "reroute");
                if let Err(error) = self.trigger_erased(router, route, Some(then)) {
                    tracing::debug!(anchor = %anchor, router = %router, %error, "reroute failed");
                }
            }
        }
    }

    fn run_sequence(&mut self, anchor: NodeId, mut steps: VecDeque<Transition>, then: Continuation) {
        let Some(step) = steps.pop_front() else {
            then(self);
            return;
        };
        self.execute(
            anchor,
            step,
            Box::new(move |nav: &mut Navigator| nav.run_sequence(anchor, steps, then)),
        );
    }

    fn run_group(&mut self, anchor: NodeId, steps: Vec<Transition>, then: Continuation) {
        if steps.is_empty() {
            then(self);
            return;
        }
        let remaining = Rc::new(RefCell::new(steps.len()));
        let then = Rc::new(RefCell::new(Some(then)));
        for step in steps {
            let remaining = Rc::clone(&remaining);
            let then = Rc::clone(&then);
            self.execute(
                anchor,
                step,
                Box::new(move |nav: &mut Navigator| {
                    let left = {
                        let mut remaining = remaining.borrow_mut();
                        *remaining -= 1;
                        *remaining
                    };
                    if left == 0 {
                        let finish = then.borrow_mut().take();
                        if let Some(finish) = finish {
                            finish(nav);
                        }
                    }
                }),
            );
        }
    }

    fn push_unit(&mut self, anchor: NodeId, unit: Unit, then: Continuation) {
        let container = self.stage.root_unit(anchor);
        let Some(node) = self.realize(anchor, unit) else {
            return self.ignore(anchor, TransitionKind::Push, "unit is gone", then);
        };
        if node == anchor || node == container || self.stage.is_displayed(node) {
            return self.ignore(anchor, TransitionKind::Push, "unit is already displayed", then);
        }

        self.stage.push(container, node);
        self.attach(anchor, node);
        let display = self.stage.root_unit(node);
        tracing::debug!(anchor = %anchor, container = %container, unit = %node, "push");
        let done = self.completion(anchor, then);
        self.animator.push(container, display, done);
    }

    fn present_unit(&mut self, anchor: NodeId, unit: Unit, animated: bool, then: Continuation) {
        let container = self.stage.root_unit(anchor);
        if self.stage.modal(container).is_some() {
            return self.ignore(anchor, TransitionKind::Present, "already presenting", then);
        }
        let Some(node) = self.realize(anchor, unit) else {
            return self.ignore(anchor, TransitionKind::Present, "unit is gone", then);
        };
        if node == anchor || node == container || self.stage.is_displayed(node) {
            return self.ignore(anchor, TransitionKind::Present, "unit is already displayed", then);
        }

        self.stage.present(container, node);
        self.attach(anchor, node);
        let display = self.stage.root_unit(node);
        tracing::debug!(anchor = %anchor, container = %container, unit = %node, animated, "present");
        let done = self.completion(anchor, then);
        self.animator.present(container, display, animated, done);
    }

    fn pop_unit(&mut self, anchor: NodeId, then: Continuation) {
        let container = self.stage.root_unit(anchor);
        let Some(node) = self.stage.pop(container) else {
            return self.ignore(anchor, TransitionKind::Pop, "nothing to pop", then);
        };
        self.notify_dismissed(node);
        let display = self.stage.root_unit(node);
        tracing::debug!(anchor = %anchor, container = %container, unit = %node, "pop");
        let then = release_after(vec![node], then);
        let done = self.completion(anchor, then);
        self.animator.pop(container, display, done);
    }

    fn pop_to_root(&mut self, anchor: NodeId, then: Continuation) {
        let container = self.stage.root_unit(anchor);
        let popped = self.stage.pop_to_root(container);
        if popped.is_empty() {
            return self.ignore(anchor, TransitionKind::PopToRoot, "nothing to pop", then);
        }
        for &node in &popped {
            self.notify_dismissed(node);
        }
        let displays: Vec<NodeId> = popped.iter().map(|&id| self.stage.root_unit(id)).collect();
        tracing::debug!(anchor = %anchor, container = %container, popped = popped.len(), "pop to root");
        let then = release_after(popped, then);
        let done = self.completion(anchor, then);
        self.animator.pop_to_root(container, &displays, done);
    }

    fn dismiss_unit(&mut self, anchor: NodeId, then: Continuation) {
        let container = self.stage.root_unit(anchor);
        let presenter = if self.stage.modal(container).is_some() {
            Some(container)
        } else {
            self.stage
                .presenter(anchor)
                .or_else(|| self.stage.presenter(container))
        };
        let Some(presenter) = presenter else {
            return self.ignore(anchor, TransitionKind::Dismiss, "nothing presented", then);
        };

        let dismissed = self.stage.dismiss_from(presenter);
        let Some(&bottom) = dismissed.first() else {
            return self.ignore(anchor, TransitionKind::Dismiss, "nothing presented", then);
        };
        for &node in &dismissed {
            self.notify_dismissed(node);
        }
        let display = self.stage.root_unit(bottom);
        tracing::debug!(anchor = %anchor, presenter = %presenter, unit = %bottom, "dismiss");
        let then = release_after(dismissed, then);
        let done = self.completion(anchor, then);
        self.animator.dismiss(presenter, display, done);
    }

    fn replace_root(&mut self, anchor: NodeId, unit: Unit, then: Continuation) {
        let container = self.stage.root_unit(anchor);
        let Some(node) = self.realize(anchor, unit) else {
            return self.ignore(anchor, TransitionKind::SetRoot, "unit is gone", then);
        };
        if node == anchor || node == container || self.stage.stack(container) == [node] {
            return self.ignore(anchor, TransitionKind::SetRoot, "unit is already the root", then);
        }

        let previous = self.stage.replace_stack(container, node);
        self.attach(anchor, node);
        let display = self.stage.root_unit(node);
        let previous_units: Vec<NodeId> =
            previous.iter().map(|&id| self.stage.root_unit(id)).collect();
        tracing::debug!(anchor = %anchor, container = %container, unit = %node, replaced = previous.len(), "set root");
        let done = self.completion(anchor, then);
        self.animator.set_root(container, display, &previous_units, done);
        self.retire(container, previous);
    }

    /// Detach replaced roots now; tear them down on the next turn.
    pub(crate) fn retire(&mut self, container: NodeId, previous: Vec<NodeId>) {
        if previous.is_empty() {
            return;
        }
        for &old in &previous {
            self.notify_dismissed(old);
        }
        self.defer(
            container,
            Box::new(move |nav: &mut Navigator| {
                for old in previous {
                    nav.teardown(container, old);
                }
            }),
        );
    }

    fn teardown(&mut self, container: NodeId, old: NodeId) {
        if !self.stage.contains(old) || self.stage.is_displayed(old) {
            return;
        }
        let unit = self.stage.root_unit(old);
        for presented in self.stage.dismiss_from(unit) {
            self.notify_dismissed(presented);
        }
        self.animator.teardown(unit);
        match self.stage.owner(old) {
            None => {
                tracing::debug!(container = %container, unit = %old, "discarding replaced root");
                let _ = self.remove(old);
            }
            Some(_) if self.stage.is_transient(old) => {
                tracing::debug!(container = %container, unit = %old, "discarding replaced root");
                let _ = self.remove(old);
            }
            Some(owner) if owner == container => {
                tracing::debug!(container = %container, unit = %old, "discarding replaced root");
                let _ = self.remove(old);
            }
            Some(_) => {}
        }
    }

    /// Resolve a unit to a live node, instantiating factories under `anchor`.
    fn realize(&mut self, anchor: NodeId, unit: Unit) -> Option<NodeId> {
        match unit {
            Unit::Node(id) => self.stage.contains(id).then_some(id),
            Unit::Factory(factory) => {
                let id = self.stage.insert(Some(anchor), factory.build());
                self.stage.mark_transient(id);
                tracing::trace!(anchor = %anchor, unit = %id, label = factory.label(), "instantiated unit");
                if let Some(p) = self.stage.get_mut(anchor) {
                    p.child_added(id);
                }
                Some(id)
            }
        }
    }

    /// Register `parent` on `node`, then report the presentation.
    fn attach(&mut self, parent: NodeId, node: NodeId) {
        self.stage.set_parent(node, parent);
        if let Some(p) = self.stage.get_mut(node) {
            p.register_parent(parent);
            p.presented(Some(parent));
        }
    }

    /// Remove factory-built units that are no longer displayed.
    fn release_transient(&mut self, nodes: &[NodeId]) {
        for &node in nodes {
            if self.stage.is_transient(node) && !self.stage.is_displayed(node) {
                tracing::trace!(unit = %node, "releasing transient unit");
                let _ = self.remove(node);
            }
        }
    }

    fn notify_dismissed(&mut self, node: NodeId) {
        if let Some(p) = self.stage.get_mut(node) {
            p.dismissed();
        }
    }

    fn ignore(&mut self, anchor: NodeId, kind: TransitionKind, reason: &'static str, then: Continuation) {
        tracing::debug!(anchor = %anchor, %kind, reason, "illegal transition ignored");
        then(self);
    }
}

/// Wrap `then` so the given units are released before it runs.
fn release_after(nodes: Vec<NodeId>, then: Continuation) -> Continuation {
    Box::new(move |nav: &mut Navigator| {
        nav.release_transient(&nodes);
        then(nav);
    })
}

#[cfg(test)]
mod tests {
    use crate::{
        coordinator::Coordinator,
        navigator::Navigator,
        testing::{AnimatorEvent, HookCall, Phase, SpyLog, SpyUnit, RecordingAnimator},
    };
    use std::{cell::Cell, rc::Rc};
    use wayfinder_core::{NodeId, Presentable, Route, Transition, TransitionKind, UnitFactory};

    #[derive(Debug, Clone, PartialEq)]
    struct Open;

    impl Route for Open {}

    fn open_router(_: &Open) -> Transition {
        Transition::push(UnitFactory::new("opened", SpyUnit::new))
    }

    fn spawn_router(nav: &mut Navigator) -> NodeId {
        nav.spawn_coordinator(Coordinator::new(open_router as fn(&Open) -> Transition), SpyUnit::new())
            .unwrap()
    }

    /// Records how many calls `log` held when it was presented.
    struct Witness {
        log: SpyLog,
        seen: Rc<Cell<Option<usize>>>,
    }

    impl Presentable for Witness {
        fn presented(&mut self, _from: Option<NodeId>) {
            self.seen.set(Some(self.log.calls().len()));
        }
    }

    fn counter() -> (Rc<Cell<usize>>, impl FnOnce(&mut Navigator) + 'static) {
        let count = Rc::new(Cell::new(0));
        let hook = Rc::clone(&count);
        (count, move |_: &mut Navigator| hook.set(hook.get() + 1))
    }

    #[test]
    fn test_empty_multiple_completes_without_mutation() {
        let animator = RecordingAnimator::immediate();
        let mut nav = Navigator::new(animator.clone());
        let anchor = nav.insert(SpyUnit::new());
        let (count, done) = counter();

        nav.perform(anchor, Transition::multiple([]), done).unwrap();

        assert_eq!(count.get(), 1);
        assert!(animator.events().is_empty());
        assert!(nav.stage().stack(anchor).is_empty());
    }

    #[test]
    fn test_multiple_waits_for_each_step() {
        let animator = RecordingAnimator::manual();
        let mut nav = Navigator::new(animator.clone());
        let anchor = nav.insert(SpyUnit::new());
        let first = nav.insert(SpyUnit::new());
        let second = nav.insert(SpyUnit::new());
        let (count, done) = counter();

        nav.perform(
            anchor,
            Transition::multiple([Transition::push(first), Transition::push(second)]),
            done,
        )
        .unwrap();
        assert_eq!(animator.events(), vec![AnimatorEvent::new(Phase::Start, TransitionKind::Push, anchor, first)]);

        assert!(animator.finish_next());
        nav.run_pending();
        assert!(animator.finish_next());
        nav.run_pending();

        assert_eq!(
            animator.events(),
            vec![
                AnimatorEvent::new(Phase::Start, TransitionKind::Push, anchor, first),
                AnimatorEvent::new(Phase::End, TransitionKind::Push, anchor, first),
                AnimatorEvent::new(Phase::Start, TransitionKind::Push, anchor, second),
                AnimatorEvent::new(Phase::End, TransitionKind::Push, anchor, second),
            ]
        );
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_independent_group_completes_after_all_steps() {
        let animator = RecordingAnimator::manual();
        let mut nav = Navigator::new(animator.clone());
        let anchor = nav.insert(SpyUnit::new());
        let root = nav.insert(SpyUnit::new());
        let sheet = nav.insert(SpyUnit::new());
        let (count, done) = counter();

        nav.perform(
            anchor,
            Transition::independent([Transition::set_root(root), Transition::present(sheet)]),
            done,
        )
        .unwrap();
        assert_eq!(animator.held(), 2);

        animator.finish_next();
        nav.run_pending();
        assert_eq!(count.get(), 0);
        animator.finish_next();
        nav.run_pending();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_dismiss_with_nothing_presented_is_inert() {
        let animator = RecordingAnimator::immediate();
        let mut nav = Navigator::new(animator.clone());
        let spy = SpyUnit::new();
        let log = spy.log();
        let anchor = nav.insert(spy);
        let (count, done) = counter();

        nav.perform(anchor, Transition::Dismiss, done).unwrap();
        nav.perform(anchor, Transition::Pop, |_| {}).unwrap();

        assert_eq!(count.get(), 1);
        assert!(log.calls().is_empty());
        assert!(animator.events().is_empty());
        assert_eq!(nav.stage().modal(anchor), None);
    }

    #[test]
    fn test_push_registers_parent_before_presented() {
        let mut nav = Navigator::new(RecordingAnimator::immediate());
        let anchor = nav.insert(SpyUnit::new());
        let spy = SpyUnit::new();
        let log = spy.log();
        let unit = nav.insert(spy);

        nav.perform(anchor, Transition::push(unit), |_| {}).unwrap();

        assert_eq!(
            log.calls(),
            vec![HookCall::RegisterParent(anchor), HookCall::Presented(Some(anchor))]
        );
        assert_eq!(nav.parent(unit), Some(anchor));
    }

    #[test]
    fn test_pop_keeps_parent_link() {
        let mut nav = Navigator::new(RecordingAnimator::immediate());
        let anchor = nav.insert(SpyUnit::new());
        let root = nav.insert(SpyUnit::new());
        let top = nav.insert(SpyUnit::new());

        nav.perform(anchor, Transition::set_root(root).then(Transition::push(top)), |_| {})
            .unwrap();
        nav.perform(anchor, Transition::Pop, |_| {}).unwrap();

        assert_eq!(nav.stage().stack(anchor), &[root]);
        assert_eq!(nav.parent(top), Some(anchor));
        assert!(!nav.stage().is_displayed(top));
    }

    #[test]
    fn test_factory_units_are_owned_by_anchor() {
        let mut nav = Navigator::new(RecordingAnimator::immediate());
        let anchor = nav.insert(SpyUnit::new());
        let factory = UnitFactory::new("detail", SpyUnit::new);

        nav.perform(anchor, Transition::push(factory.clone()), |_| {}).unwrap();
        nav.perform(anchor, Transition::push(factory), |_| {}).unwrap();

        let children = nav.stage().children(anchor).to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(nav.stage().stack(anchor), children.as_slice());
    }

    #[test]
    fn test_removed_anchor_never_completes() {
        let animator = RecordingAnimator::manual();
        let mut nav = Navigator::new(animator.clone());
        let anchor = nav.insert(SpyUnit::new());
        let unit = nav.insert(SpyUnit::new());
        let (count, done) = counter();

        nav.perform(anchor, Transition::push(unit), done).unwrap();
        nav.remove(anchor).unwrap();
        animator.finish_all();
        nav.run_pending();

        assert_eq!(count.get(), 0);
        assert!(nav.is_idle());
    }

    #[test]
    fn test_present_twice_is_ignored() {
        let animator = RecordingAnimator::immediate();
        let mut nav = Navigator::new(animator.clone());
        let anchor = nav.insert(SpyUnit::new());
        let first = nav.insert(SpyUnit::new());
        let second = nav.insert(SpyUnit::new());

        nav.perform(anchor, Transition::present(first), |_| {}).unwrap();
        nav.perform(anchor, Transition::present(second), |_| {}).unwrap();

        assert_eq!(nav.stage().modal(anchor), Some(first));
        assert_eq!(nav.parent(second), None);
        assert_eq!(animator.starts(TransitionKind::Present), 1);
    }

    #[test]
    fn test_reroute_triggers_on_target_router() {
        let mut nav = Navigator::new(RecordingAnimator::immediate());
        let anchor = nav.insert(SpyUnit::new());
        let parent_spy = SpyUnit::new();
        let parent_log = parent_spy.log();
        let parent = nav.insert(parent_spy);
        let router = spawn_router(&mut nav);
        nav.register_parent(router, parent).unwrap();
        let (count, done) = counter();

        nav.perform(anchor, Transition::reroute(router, Open), done).unwrap();

        assert_eq!(count.get(), 1);
        assert_eq!(parent_log.count(HookCall::ChildTransitionCompleted(router)), 1);
        let container = nav.stage().root_unit(router);
        assert_eq!(nav.stage().stack(container).len(), 1);
        assert!(nav.stage().stack(anchor).is_empty());
    }

    #[test]
    fn test_reroute_to_removed_router_is_ignored() {
        let mut nav = Navigator::new(RecordingAnimator::immediate());
        let anchor = nav.insert(SpyUnit::new());
        let router = spawn_router(&mut nav);
        nav.remove(router).unwrap();
        let later = nav.insert(SpyUnit::new());
        let (count, done) = counter();

        nav.perform(
            anchor,
            Transition::multiple([Transition::reroute(router, Open), Transition::push(later)]),
            done,
        )
        .unwrap();

        assert_eq!(count.get(), 1);
        assert_eq!(nav.stage().stack(anchor), &[later]);
        assert!(nav.is_idle());
    }

    #[test]
    fn test_pop_to_root_pops_every_entry_above_root() {
        let animator = RecordingAnimator::immediate();
        let mut nav = Navigator::new(animator.clone());
        let anchor = nav.insert(SpyUnit::new());
        let spies = [SpyUnit::new(), SpyUnit::new(), SpyUnit::new()];
        let logs: Vec<SpyLog> = spies.iter().map(SpyUnit::log).collect();
        let [a, b, c] = spies.map(|spy| nav.insert(spy));
        nav.perform(
            anchor,
            Transition::set_root(a).then(Transition::push(b)).then(Transition::push(c)),
            |_| {},
        )
        .unwrap();
        animator.clear();
        let (count, done) = counter();

        nav.perform(anchor, Transition::PopToRoot, done).unwrap();

        assert_eq!(count.get(), 1);
        assert_eq!(nav.stage().stack(anchor), &[a]);
        assert_eq!(logs[0].count(HookCall::Dismissed), 0);
        assert_eq!(logs[1].count(HookCall::Dismissed), 1);
        assert_eq!(logs[2].count(HookCall::Dismissed), 1);
        assert_eq!(
            animator.events(),
            vec![
                AnimatorEvent::new(Phase::Start, TransitionKind::PopToRoot, anchor, c),
                AnimatorEvent::new(Phase::End, TransitionKind::PopToRoot, anchor, c),
            ]
        );
        assert!(nav.contains(b) && nav.contains(c));
        assert_eq!(nav.parent(c), Some(anchor));
    }

    #[test]
    fn test_factory_units_are_released_after_removal() {
        let mut nav = Navigator::new(RecordingAnimator::immediate());
        let anchor = nav.insert(SpyUnit::new());
        let root = nav.insert(SpyUnit::new());
        nav.perform(anchor, Transition::set_root(root), |_| {}).unwrap();
        let factory = UnitFactory::new("detail", SpyUnit::new);
        let live = nav.stage().len();

        for _ in 0..10 {
            nav.perform(anchor, Transition::push(factory.clone()), |_| {}).unwrap();
            nav.perform(anchor, Transition::Pop, |_| {}).unwrap();
            nav.perform(anchor, Transition::present(factory.clone()), |_| {}).unwrap();
            nav.perform(anchor, Transition::Dismiss, |_| {}).unwrap();
        }
        assert_eq!(nav.stage().len(), live);

        nav.perform(anchor, Transition::set_root(factory.clone()), |_| {}).unwrap();
        nav.perform(anchor, Transition::set_root(factory), |_| {}).unwrap();
        assert_eq!(nav.stage().len(), live);
        assert!(!nav.contains(root));
        assert_eq!(nav.stage().children(anchor), nav.stage().stack(anchor));
    }

    #[test]
    fn test_group_steps_all_start_before_draining() {
        let mut nav = Navigator::new(RecordingAnimator::immediate());
        let anchor = nav.insert(SpyUnit::new());
        let parent_spy = SpyUnit::new();
        let parent_log = parent_spy.log();
        let parent = nav.insert(parent_spy);
        let router = spawn_router(&mut nav);
        nav.register_parent(router, parent).unwrap();
        let seen = Rc::new(Cell::new(None));
        let witness = nav.insert(Witness {
            log: parent_log.clone(),
            seen: Rc::clone(&seen),
        });

        nav.perform(
            anchor,
            Transition::independent([Transition::reroute(router, Open), Transition::push(witness)]),
            |_| {},
        )
        .unwrap();

        assert_eq!(seen.get(), Some(0));
        assert_eq!(parent_log.count(HookCall::ChildTransitionCompleted(router)), 1);
    }
}
