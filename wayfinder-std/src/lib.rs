//! # wayfinder-std
//!
//! Standard execution layer for the Wayfinder navigation framework.
//!
//! This crate provides:
//! - **Node table**: [`Stage`], the arena holding every presentable
//! - **Execution**: [`Navigator`], driving transitions through an [`Animator`]
//! - **Coordinators**: [`Coordinator`], a router that is itself presentable
//! - **Deep links**: [`Navigator::deep_link`], walking the active path
//! - **Async**: [`TransitionSignal`], a future for a triggered transition
//! - **Testing**: [`testing::RecordingAnimator`], [`testing::SpyUnit`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use wayfinder_core;

// Modules
pub mod animator;
pub mod completion;
pub mod config;
pub mod coordinator;
pub mod deep_link;
mod engine;
pub mod navigator;
pub mod signal;
pub mod stage;
pub mod testing;
pub mod units;

pub use animator::{Animator, InstantAnimator};
pub use completion::{Completion, TaskId};
pub use config::NavigatorConfig;
pub use coordinator::{Coordinator, CoordinatorState};
pub use deep_link::{ChainReport, DeepLink};
pub use navigator::{Continuation, Navigator};
pub use signal::TransitionSignal;
pub use stage::Stage;
pub use units::{Screen, Window};
