//! # Coordinator
//!
//! A coordinator is a router that is also presentable. It owns one root unit
//! for its whole life, and child coordinators through the navigator's
//! ownership links. When a transition triggered on a child completes, the
//! coordinator (as the child's registered parent) decides whether to release
//! it: by default, a child that is no longer displayed anywhere is released.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized -> Rooted -> Active <-> ChildrenActive
//!                              \            /
//!                               -> Completed
//! ```

use crate::navigator::Navigator;
use std::{any::TypeId, fmt, marker::PhantomData};
use wayfinder_core::{
    AnyRoute, ChildDisposition, NavigationError, NodeId, Presentable, Route, Router, Transition,
    prepare_erased,
};

/// Lifecycle state of a [`Coordinator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinatorState {
    /// No root unit yet.
    Uninitialized,
    /// Root unit assigned, never shown.
    Rooted,
    /// Shown, no children.
    Active,
    /// Shown, owning at least one child.
    ChildrenActive,
    /// Removed from display.
    Completed,
}

/// Router for routes of type `R` that is itself presentable.
pub struct Coordinator<R: Route, M: Router<R>> {
    router: M,
    root: Option<NodeId>,
    state: CoordinatorState,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    delegates: Vec<(TypeId, NodeId)>,
    release_detached: bool,
    _route: PhantomData<fn(&R)>,
}

impl<R: Route, M: Router<R>> Coordinator<R, M> {
    /// Create a coordinator without a root unit.
    pub fn new(router: M) -> Self {
        Self {
            router,
            root: None,
            state: CoordinatorState::Uninitialized,
            parent: None,
            children: Vec::new(),
            delegates: Vec::new(),
            release_detached: true,
            _route: PhantomData,
        }
    }

    /// Create a coordinator with its root unit.
    pub fn with_root(router: M, root: NodeId) -> Self {
        let mut coordinator = Self::new(router);
        coordinator.root = Some(root);
        coordinator.state = CoordinatorState::Rooted;
        coordinator
    }

    /// Route every route of type `D` to `node` instead of handling it here.
    pub fn delegate<D: Route>(mut self, node: NodeId) -> Self {
        self.delegates.retain(|(ty, _)| *ty != TypeId::of::<D>());
        self.delegates.push((TypeId::of::<D>(), node));
        self
    }

    /// Keep children after their transitions complete, even when detached.
    pub fn retain_children(mut self) -> Self {
        self.release_detached = false;
        self
    }

    /// Assign the root unit. Allowed once.
    pub fn set_root_unit(&mut self, root: NodeId) -> Result<(), NavigationError> {
        if let Some(current) = self.root {
            return Err(NavigationError::RootAlreadySet { current });
        }
        self.root = Some(root);
        if self.state == CoordinatorState::Uninitialized {
            self.state = CoordinatorState::Rooted;
        }
        Ok(())
    }

    /// The mapping this coordinator uses.
    pub fn router(&self) -> &M {
        &self.router
    }

    /// The root unit, once assigned.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Registered parent.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Owned child nodes, in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Map a route without performing it.
    pub fn prepare(&self, route: &R) -> Transition {
        self.router.prepare_transition(route)
    }
}

impl<R, M> Presentable for Coordinator<R, M>
where
    R: Route,
    M: Router<R> + 'static,
{
    fn root_unit(&self) -> Option<NodeId> {
        self.root
    }

    fn router_for(&self, this: NodeId, route: &dyn AnyRoute) -> Option<NodeId> {
        if route.is::<R>() {
            return Some(this);
        }
        let ty = route.route_type();
        self.delegates
            .iter()
            .find(|(delegated, _)| *delegated == ty)
            .map(|&(_, node)| node)
    }

    fn transition_for(&self, route: &dyn AnyRoute) -> Option<Transition> {
        prepare_erased::<R, M>(&self.router, route)
    }

    fn presented(&mut self, _from: Option<NodeId>) {
        self.state = if self.children.is_empty() {
            CoordinatorState::Active
        } else {
            CoordinatorState::ChildrenActive
        };
    }

    fn register_parent(&mut self, parent: NodeId) {
        self.parent = Some(parent);
    }

    fn child_transition_completed(&mut self, _child: NodeId) -> ChildDisposition {
        if self.release_detached {
            ChildDisposition::ReleaseIfDetached
        } else {
            ChildDisposition::Keep
        }
    }

    fn dismissed(&mut self) {
        self.state = CoordinatorState::Completed;
    }

    fn child_added(&mut self, child: NodeId) {
        if Some(child) == self.root || self.children.contains(&child) {
            return;
        }
        self.children.push(child);
        if self.state == CoordinatorState::Active {
            self.state = CoordinatorState::ChildrenActive;
        }
    }

    fn child_removed(&mut self, child: NodeId) {
        self.children.retain(|&id| id != child);
        if self.children.is_empty() && self.state == CoordinatorState::ChildrenActive {
            self.state = CoordinatorState::Active;
        }
    }
}

impl<R: Route, M: Router<R>> fmt::Debug for Coordinator<R, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("route", &std::any::type_name::<R>())
            .field("root", &self.root)
            .field("state", &self.state)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish()
    }
}

impl Navigator {
    /// Insert `coordinator` together with a root unit it owns.
    ///
    /// Fails if the coordinator already has a root.
    pub fn spawn_coordinator<R, M>(
        &mut self,
        coordinator: Coordinator<R, M>,
        root: impl Presentable,
    ) -> Result<NodeId, NavigationError>
    where
        R: Route,
        M: Router<R> + 'static,
    {
        if let Some(current) = coordinator.root() {
            return Err(NavigationError::RootAlreadySet { current });
        }
        let id = self.insert(coordinator);
        let root = self.stage.insert(Some(id), Box::new(root));
        if let Some(coordinator) = self.stage.downcast_mut::<Coordinator<R, M>>(id) {
            coordinator.set_root_unit(root)?;
        }
        Ok(id)
    }

    /// Insert `coordinator` as a child owned by `owner`, with a root unit it owns.
    pub fn spawn_child_coordinator<R, M>(
        &mut self,
        owner: NodeId,
        coordinator: Coordinator<R, M>,
        root: impl Presentable,
    ) -> Result<NodeId, NavigationError>
    where
        R: Route,
        M: Router<R> + 'static,
    {
        self.ensure(owner)?;
        let id = self.spawn_coordinator(coordinator, root)?;
        self.add_child(owner, id)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        testing::{SpyUnit, RecordingAnimator},
        units::Screen,
    };
    use wayfinder_core::{MappingTable, UnitFactory};

    #[derive(Debug, Clone, PartialEq)]
    enum ListRoute {
        Detail,
        Close,
    }

    impl Route for ListRoute {}

    #[derive(Debug, Clone, PartialEq)]
    struct ProfileRoute;

    impl Route for ProfileRoute {}

    type ProfileCoordinator = Coordinator<ProfileRoute, MappingTable<ProfileRoute>>;

    fn list_router(route: &ListRoute) -> Transition {
        match route {
            ListRoute::Detail => Transition::push(UnitFactory::new("detail", || Screen::new("detail"))),
            ListRoute::Close => Transition::Dismiss,
        }
    }

    #[test]
    fn test_root_is_set_once() {
        let mut coordinator = Coordinator::new(list_router as fn(&ListRoute) -> Transition);
        let first = NodeId::from_parts(1, 1);
        assert_eq!(coordinator.state(), CoordinatorState::Uninitialized);
        coordinator.set_root_unit(first).unwrap();
        assert_eq!(coordinator.state(), CoordinatorState::Rooted);
        assert_eq!(
            coordinator.set_root_unit(NodeId::from_parts(2, 1)),
            Err(NavigationError::RootAlreadySet { current: first })
        );
        assert_eq!(coordinator.root(), Some(first));
    }

    #[test]
    fn test_router_for_own_and_delegated_routes() {
        let this = NodeId::from_parts(0, 1);
        let profile = NodeId::from_parts(9, 1);
        let coordinator = Coordinator::new(list_router as fn(&ListRoute) -> Transition)
            .delegate::<ProfileRoute>(profile);

        assert_eq!(coordinator.router_for(this, &ListRoute::Detail), Some(this));
        assert_eq!(coordinator.router_for(this, &ProfileRoute), Some(profile));
        assert_eq!(
            coordinator.transition_for(&ListRoute::Close),
            Some(Transition::Dismiss)
        );
        assert_eq!(coordinator.transition_for(&ProfileRoute), None);
    }

    #[test]
    fn test_lifecycle_through_navigator() {
        let mut nav = Navigator::new(RecordingAnimator::immediate());
        let window = nav.insert(Screen::new("window"));
        let parent = nav
            .spawn_coordinator(
                ProfileCoordinator::new(MappingTable::new()),
                Screen::new("parent root"),
            )
            .unwrap();
        nav.set_root(parent, window).unwrap();

        let child = nav
            .spawn_child_coordinator(
                parent,
                Coordinator::new(list_router as fn(&ListRoute) -> Transition),
                Screen::new("list"),
            )
            .unwrap();
        let parent_state = nav
            .get::<ProfileCoordinator>(parent)
            .map(Coordinator::state);
        assert_eq!(parent_state, Some(CoordinatorState::ChildrenActive));

        nav.perform(parent, Transition::present(child), |_| {}).unwrap();
        let state = nav
            .get::<Coordinator<ListRoute, fn(&ListRoute) -> Transition>>(child)
            .map(|c| (c.state(), c.parent()));
        assert_eq!(state, Some((CoordinatorState::Active, Some(parent))));

        nav.trigger(child, ListRoute::Close, |_| {}).unwrap();
        assert!(!nav.contains(child), "detached child is released");
        let parent_state = nav
            .get::<ProfileCoordinator>(parent)
            .map(Coordinator::state);
        assert_eq!(parent_state, Some(CoordinatorState::Active));
    }

    #[test]
    fn test_retained_children_survive_dismissal() {
        let mut nav = Navigator::new(RecordingAnimator::immediate());
        let parent = nav
            .spawn_coordinator(
                ProfileCoordinator::new(MappingTable::new()).retain_children(),
                Screen::new("root"),
            )
            .unwrap();
        let child = nav
            .spawn_child_coordinator(
                parent,
                Coordinator::new(list_router as fn(&ListRoute) -> Transition),
                Screen::new("list"),
            )
            .unwrap();

        nav.perform(parent, Transition::present(child), |_| {}).unwrap();
        nav.trigger(child, ListRoute::Close, |_| {}).unwrap();

        assert!(nav.contains(child));
        let state = nav
            .get::<Coordinator<ListRoute, fn(&ListRoute) -> Transition>>(child)
            .map(Coordinator::state);
        assert_eq!(state, Some(CoordinatorState::Completed));
    }

    #[test]
    fn test_presented_root_unit_is_displayed() {
        let mut nav = Navigator::new(RecordingAnimator::immediate());
        let anchor = nav.insert(SpyUnit::new());
        let root_spy = SpyUnit::new();
        let root_log = root_spy.log();
        let coordinator = nav
            .spawn_coordinator(Coordinator::new(list_router as fn(&ListRoute) -> Transition), root_spy)
            .unwrap();

        nav.perform(anchor, Transition::push(coordinator), |_| {}).unwrap();
        nav.trigger(coordinator, ListRoute::Detail, |_| {}).unwrap();

        let root = nav.stage().root_unit(coordinator);
        assert_eq!(nav.stage().stack(anchor), &[coordinator]);
        assert_eq!(nav.stage().stack(root).len(), 1);
        assert!(root_log.calls().is_empty());
    }
}
