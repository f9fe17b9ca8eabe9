//! # wayfinder-core
//!
//! Core traits for the Wayfinder navigation framework.
//!
//! This crate has minimal dependencies and is meant to be imported by
//! presentation backends and feature modules that only need to describe
//! navigation, not execute it.
//!
//! # Layers
//!
//! ## Intent ([`Route`])
//!
//! A route is a plain, strongly typed value saying *where* to go. It carries no
//! behaviour. Routes compare structurally, and [`AnyRoute`] erases them for the
//! deep-link boundary where different route families meet.
//!
//! ## Effect ([`Transition`])
//!
//! A transition says *how* to get there: push, present, pop, dismiss, set-root,
//! or an ordered/independent group of those. Transitions are inert values.
//!
//! ## Mapping ([`Router`])
//!
//! A router is a pure function from its route type to a transition. Executing
//! the transition is left to a navigator (see `wayfinder-std`).
//!
//! ## Capability ([`Presentable`])
//!
//! Anything that can be shown. Every hook has a no-op default so plain screens
//! implement the trait with an empty `impl` block.
//!
//! # Error Types
//!
//! - [`NavigationError`] - Top-level error type
//! - [`DispatchError`] - Deep-link dispatch failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod node;
mod presentable;
mod route;
mod router;
mod transition;

// Re-exports
pub use error::{DispatchError, NavigationError};
pub use node::NodeId;
pub use presentable::{ChildDisposition, Presentable};
pub use route::{AnyRoute, Route};
pub use router::{MappingTable, Router, prepare_erased};
pub use transition::{Transition, TransitionKind, Unit, UnitFactory};
