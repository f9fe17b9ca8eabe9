//! # Intent Layer (Route)
//!
//! Routes are immutable values describing a navigation intent ("show the
//! detail screen for item 7"). Identity is structural: two routes are the same
//! iff they compare equal.
//!
//! Routers are statically bound to one route type. Only the deep-link
//! dispatcher, which must offer one route to routers of many families, works
//! with the erased form [`AnyRoute`].

use std::{
    any::{Any, TypeId},
    fmt::Debug,
};

/// A strongly typed navigation intent.
///
/// Usually derived with `#[derive(Route)]` from the `wayfinder` facade.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a navigation route",
    label = "missing `Route` implementation",
    note = "Add `#[derive(Route)]` or `impl Route for {Self} {{}}`."
)]
pub trait Route: Any + Clone + Debug + PartialEq {
    /// Name used in diagnostics and logs.
    fn route_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Object-safe, type-erased view of a [`Route`].
pub trait AnyRoute: Any + Debug {
    /// Diagnostic name of the underlying route.
    fn name(&self) -> &'static str;

    /// `TypeId` of the concrete route type.
    fn route_type(&self) -> TypeId;

    /// Structural equality across the erasure boundary.
    ///
    /// Routes of different types are never equal.
    fn dyn_eq(&self, other: &dyn AnyRoute) -> bool;

    /// Clone into a new box.
    fn clone_route(&self) -> Box<dyn AnyRoute>;
}

impl<R: Route> AnyRoute for R {
    fn name(&self) -> &'static str {
        self.route_name()
    }

    fn route_type(&self) -> TypeId {
        TypeId::of::<R>()
    }

    fn dyn_eq(&self, other: &dyn AnyRoute) -> bool {
        other.downcast_ref::<R>().is_some_and(|other| other == self)
    }

    fn clone_route(&self) -> Box<dyn AnyRoute> {
        Box::new(self.clone())
    }
}

impl dyn AnyRoute {
    /// Whether the erased route is an `R`.
    pub fn is<R: Route>(&self) -> bool {
        self.route_type() == TypeId::of::<R>()
    }

    /// Recover the concrete route.
    pub fn downcast_ref<R: Route>(&self) -> Option<&R> {
        (self as &dyn Any).downcast_ref::<R>()
    }
}

impl PartialEq for dyn AnyRoute {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other)
    }
}

impl Clone for Box<dyn AnyRoute> {
    fn clone(&self) -> Self {
        self.clone_route()
    }
}
