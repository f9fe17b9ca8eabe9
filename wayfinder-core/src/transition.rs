//! # Effect Layer (Transition)
//!
//! A [`Transition`] is an inert description of a presentation or dismissal
//! effect. Routers produce them; a navigator executes them against an anchor.
//!
//! Units referenced by a transition are either nodes that already exist
//! ([`Unit::Node`]) or factories the navigator instantiates at execution time
//! ([`Unit::Factory`]). Factories keep route mapping pure: building the
//! transition never touches the node table.

use crate::{node::NodeId, presentable::Presentable, route::AnyRoute};
use std::{fmt, rc::Rc};

/// Something a transition shows.
#[derive(Clone, Debug, PartialEq)]
pub enum Unit {
    /// An existing node.
    Node(NodeId),
    /// A unit created when the transition runs, owned by the anchor.
    Factory(UnitFactory),
}

impl From<NodeId> for Unit {
    fn from(id: NodeId) -> Self {
        Unit::Node(id)
    }
}

impl From<UnitFactory> for Unit {
    fn from(factory: UnitFactory) -> Self {
        Unit::Factory(factory)
    }
}

/// Deferred constructor for a presentable.
///
/// Two factories are equal only if they are clones of the same factory, so a
/// router that keeps its factories in a table maps a route to equal
/// transitions every time.
#[derive(Clone)]
pub struct UnitFactory {
    label: &'static str,
    build: Rc<dyn Fn() -> Box<dyn Presentable>>,
}

impl UnitFactory {
    /// Create a factory.
    pub fn new<P, F>(label: &'static str, build: F) -> Self
    where
        P: Presentable,
        F: Fn() -> P + 'static,
    {
        Self {
            label,
            build: Rc::new(move || Box::new(build()) as Box<dyn Presentable>),
        }
    }

    /// Label used in logs.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Instantiate a fresh unit.
    pub fn build(&self) -> Box<dyn Presentable> {
        (self.build)()
    }
}

impl PartialEq for UnitFactory {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.build, &other.build)
    }
}

impl fmt::Debug for UnitFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UnitFactory").field(&self.label).finish()
    }
}

/// A presentation or dismissal effect.
///
/// Illegal requests (popping a single-entry stack, dismissing when nothing is
/// presented) are not errors: the navigator treats them as no-ops and
/// completes immediately.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Transition {
    /// Do nothing; completes immediately.
    #[default]
    None,
    /// Push onto the anchor's navigation stack.
    Push(Unit),
    /// Present modally over the anchor.
    Present {
        /// What to present.
        unit: Unit,
        /// Whether the backend should animate.
        animated: bool,
    },
    /// Pop the top of the anchor's navigation stack.
    Pop,
    /// Pop everything above the stack's first entry.
    PopToRoot,
    /// Dismiss what the anchor presents, or the anchor itself if it was presented.
    Dismiss,
    /// Replace the anchor's whole stack with one unit.
    SetRoot(Unit),
    /// Run steps strictly in order, each after the previous one completed.
    Multiple(Vec<Transition>),
    /// Start all steps at once; complete when every step has completed.
    Independent(Vec<Transition>),
    /// Trigger a route on another router node.
    Reroute {
        /// Node that maps and performs the route.
        router: NodeId,
        /// Route to trigger.
        route: Box<dyn AnyRoute>,
    },
}

impl Transition {
    /// Push a unit.
    pub fn push(unit: impl Into<Unit>) -> Self {
        Transition::Push(unit.into())
    }

    /// Present a unit with animation.
    pub fn present(unit: impl Into<Unit>) -> Self {
        Transition::Present {
            unit: unit.into(),
            animated: true,
        }
    }

    /// Present a unit with explicit animation choice.
    pub fn present_with(unit: impl Into<Unit>, animated: bool) -> Self {
        Transition::Present {
            unit: unit.into(),
            animated,
        }
    }

    /// Replace the stack with a unit.
    pub fn set_root(unit: impl Into<Unit>) -> Self {
        Transition::SetRoot(unit.into())
    }

    /// Sequential group.
    pub fn multiple(steps: impl IntoIterator<Item = Transition>) -> Self {
        Transition::Multiple(steps.into_iter().collect())
    }

    /// Independent group.
    pub fn independent(steps: impl IntoIterator<Item = Transition>) -> Self {
        Transition::Independent(steps.into_iter().collect())
    }

    /// Trigger `route` on `router` as part of a transition.
    pub fn reroute(router: NodeId, route: impl AnyRoute) -> Self {
        Transition::Reroute {
            router,
            route: Box::new(route),
        }
    }

    /// Chain `next` after `self`.
    ///
    /// Flattens into an existing [`Transition::Multiple`] instead of nesting.
    pub fn then(self, next: Transition) -> Self {
        match self {
            Transition::None => next,
            Transition::Multiple(mut steps) => {
                steps.push(next);
                Transition::Multiple(steps)
            }
            other => Transition::Multiple(vec![other, next]),
        }
    }

    /// The kind of this transition.
    pub fn kind(&self) -> TransitionKind {
        match self {
            Transition::None => TransitionKind::None,
            Transition::Push(_) => TransitionKind::Push,
            Transition::Present { .. } => TransitionKind::Present,
            Transition::Pop => TransitionKind::Pop,
            Transition::PopToRoot => TransitionKind::PopToRoot,
            Transition::Dismiss => TransitionKind::Dismiss,
            Transition::SetRoot(_) => TransitionKind::SetRoot,
            Transition::Multiple(_) => TransitionKind::Multiple,
            Transition::Independent(_) => TransitionKind::Independent,
            Transition::Reroute { .. } => TransitionKind::Reroute,
        }
    }

    /// Every unit this transition shows, in execution order.
    pub fn units(&self) -> Vec<&Unit> {
        let mut out = Vec::new();
        self.collect_units(&mut out);
        out
    }

    fn collect_units<'a>(&'a self, out: &mut Vec<&'a Unit>) {
        match self {
            Transition::Push(unit) | Transition::SetRoot(unit) => out.push(unit),
            Transition::Present { unit, .. } => out.push(unit),
            Transition::Multiple(steps) | Transition::Independent(steps) => {
                for step in steps {
                    step.collect_units(out);
                }
            }
            Transition::None
            | Transition::Pop
            | Transition::PopToRoot
            | Transition::Dismiss
            | Transition::Reroute { .. } => {}
        }
    }
}

/// Discriminant of a [`Transition`], for logs and recorders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// [`Transition::None`]
    None,
    /// [`Transition::Push`]
    Push,
    /// [`Transition::Present`]
    Present,
    /// [`Transition::Pop`]
    Pop,
    /// [`Transition::PopToRoot`]
    PopToRoot,
    /// [`Transition::Dismiss`]
    Dismiss,
    /// [`Transition::SetRoot`]
    SetRoot,
    /// [`Transition::Multiple`]
    Multiple,
    /// [`Transition::Independent`]
    Independent,
    /// [`Transition::Reroute`]
    Reroute,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransitionKind::None => "none",
            TransitionKind::Push => "push",
            TransitionKind::Present => "present",
            TransitionKind::Pop => "pop",
            TransitionKind::PopToRoot => "pop_to_root",
            TransitionKind::Dismiss => "dismiss",
            TransitionKind::SetRoot => "set_root",
            TransitionKind::Multiple => "multiple",
            TransitionKind::Independent => "independent",
            TransitionKind::Reroute => "reroute",
        };
        f.write_str(name)
    }
}
