//! Error types for Wayfinder.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`NavigationError`] - Top-level error type for navigator operations
//! - [`DispatchError`] - Deep-link dispatch failures
//!
//! Illegal transitions (popping an empty stack, double dismiss) are not
//! errors at all; they are no-ops. Mapping a route a router does not know is a
//! programming error and panics.

use crate::node::NodeId;
use thiserror::Error;

/// Top-level error type for navigator operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// The node handle is stale or was never issued.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// A coordinator's root unit can be set only once.
    #[error("coordinator root already set to {current}")]
    RootAlreadySet {
        /// The root unit already installed.
        current: NodeId,
    },

    /// A node cannot host itself as content.
    #[error("node {0} cannot be its own container")]
    InvalidContainer(NodeId),

    /// The completion was dropped without firing; its anchor is gone.
    #[error("transition was abandoned before it completed")]
    Abandoned,

    /// A deep link could not be dispatched.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Errors produced by deep-link dispatch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No node on the active path could handle the route.
    #[error("no router on the active path handles route `{route}`")]
    Unhandled {
        /// Diagnostic name of the route.
        route: &'static str,
    },
}
