//! # wayfinder - Route-driven Navigation
//!
//! `wayfinder` separates *where* an app navigates from *how* it gets there.
//! Feature code triggers strongly typed routes; routers map them to
//! transitions; a navigator executes the transitions against a tree of
//! presentables through an animator supplied by the host.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wayfinder::prelude::*;
//!
//! #[derive(Clone, Debug, PartialEq, Route)]
//! enum AppRoute {
//!     Home,
//!     Settings,
//! }
//!
//! fn app_router(route: &AppRoute) -> Transition {
//!     match route {
//!         AppRoute::Home => Transition::PopToRoot,
//!         AppRoute::Settings => Transition::push(UnitFactory::new("settings", || Screen::new("settings"))),
//!     }
//! }
//!
//! let mut nav = Navigator::new(InstantAnimator);
//! let window = nav.insert(Window::new("main"));
//! let app = nav.spawn_coordinator(Coordinator::new(app_router as fn(&AppRoute) -> Transition), Screen::new("home"))?;
//! nav.set_root(app, window)?;
//! nav.trigger(app, AppRoute::Settings, |_| {})?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use wayfinder_core::{
    // Routes
    AnyRoute,
    // Presentables
    ChildDisposition,
    // Errors
    DispatchError,
    // Mapping
    MappingTable,
    NavigationError,
    NodeId,
    Presentable,
    Route,
    Router,
    // Transitions
    Transition,
    TransitionKind,
    Unit,
    UnitFactory,
    prepare_erased,
};

pub use wayfinder_std::{
    Animator, ChainReport, Completion, Continuation, Coordinator, CoordinatorState, DeepLink,
    InstantAnimator, Navigator, NavigatorConfig, Screen, Stage, TaskId, TransitionSignal, Window,
};

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use wayfinder_std::testing::*;
}

/// Prelude module - common imports for Wayfinder.
///
/// # Usage
///
/// ```rust,ignore
/// use wayfinder::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Coordinator, InstantAnimator, MappingTable, NavigationError, Navigator, NodeId,
        Presentable, Route, Router, Screen, Transition, UnitFactory, Window,
    };
}

#[cfg(feature = "macros")]
pub use wayfinder_macros::Route;
