//! # Mapping Layer (Router)
//!
//! A router turns routes of exactly one type into transitions. The mapping is
//! a pure function: it must not touch navigation state, and asking twice for
//! the same route yields equal transitions.
//!
//! Executing the transition (and chaining completions) belongs to the
//! navigator in `wayfinder-std`. Keeping the two apart is what lets
//! "context trigger" return a transition without performing it.

use crate::{
    route::{AnyRoute, Route},
    transition::Transition,
};

/// Maps routes of type `R` to transitions.
///
/// Any `Fn(&R) -> Transition` closure is a router.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot map routes of type `{R}`",
    label = "missing `Router` implementation",
    note = "Implement `Router<{R}>` to map routes into transitions."
)]
pub trait Router<R: Route> {
    /// Resolve `route` into the transition to perform.
    ///
    /// Routes outside the router's domain are programming errors; implementations
    /// should panic rather than return a fallback.
    fn prepare_transition(&self, route: &R) -> Transition;
}

impl<R, F> Router<R> for F
where
    R: Route,
    F: Fn(&R) -> Transition,
{
    fn prepare_transition(&self, route: &R) -> Transition {
        self(route)
    }
}

/// Map an erased route through a typed router.
///
/// Returns `None` when the route is not an `R`.
pub fn prepare_erased<R, T>(router: &T, route: &dyn AnyRoute) -> Option<Transition>
where
    R: Route,
    T: Router<R> + ?Sized,
{
    route
        .downcast_ref::<R>()
        .map(|route| router.prepare_transition(route))
}

/// A router backed by a fixed route → transition table.
///
/// Lookups compare routes structurally. Asking for a route that is not in the
/// table panics.
#[derive(Clone, Debug)]
pub struct MappingTable<R> {
    entries: Vec<(R, Transition)>,
}

impl<R: Route> MappingTable<R> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an entry. A later entry for an equal route shadows earlier ones.
    pub fn with(mut self, route: R, transition: Transition) -> Self {
        self.entries.push((route, transition));
        self
    }

    /// Whether the table can map `route`.
    pub fn contains(&self, route: &R) -> bool {
        self.entries.iter().any(|(known, _)| known == route)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R: Route> Default for MappingTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Route> Router<R> for MappingTable<R> {
    fn prepare_transition(&self, route: &R) -> Transition {
        match self.entries.iter().rev().find(|(known, _)| known == route) {
            Some((_, transition)) => transition.clone(),
            None => panic!(
                "route {route:?} ({}) is not part of this mapping table",
                route.route_name()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeId;

    #[derive(Debug, Clone, PartialEq)]
    enum HomeRoute {
        Feed,
        Detail(u32),
    }

    impl Route for HomeRoute {}

    #[derive(Debug, Clone, PartialEq)]
    struct OtherRoute;

    impl Route for OtherRoute {}

    fn table() -> MappingTable<HomeRoute> {
        MappingTable::new()
            .with(HomeRoute::Feed, Transition::PopToRoot)
            .with(HomeRoute::Detail(1), Transition::push(NodeId::from_parts(4, 1)))
    }

    #[test]
    fn test_table_mapping_is_deterministic() {
        let table = table();
        let route = HomeRoute::Detail(1);
        assert_eq!(
            table.prepare_transition(&route),
            table.prepare_transition(&route)
        );
        assert_eq!(table.prepare_transition(&HomeRoute::Feed), Transition::PopToRoot);
        assert_eq!(table.len(), 2);
    }

    #[test]
    #[should_panic(expected = "is not part of this mapping table")]
    fn test_table_unknown_route_panics() {
        let _ = table().prepare_transition(&HomeRoute::Detail(99));
    }

    #[test]
    fn test_closure_router_and_erasure() {
        let router = |route: &HomeRoute| match route {
            HomeRoute::Feed => Transition::Pop,
            HomeRoute::Detail(_) => Transition::Dismiss,
        };
        let erased: Box<dyn AnyRoute> = Box::new(HomeRoute::Feed);
        assert_eq!(
            prepare_erased::<HomeRoute, _>(&router, &*erased),
            Some(Transition::Pop)
        );

        let foreign: Box<dyn AnyRoute> = Box::new(OtherRoute);
        assert_eq!(prepare_erased::<HomeRoute, _>(&router, &*foreign), None);
    }
}
