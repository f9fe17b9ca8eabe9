//! Plain presentables for hosts without a view layer of their own.

use wayfinder_core::Presentable;

/// Top-level container that holds exactly one root.
///
/// Whether it is showing is tracked by the stage
/// ([`Stage::is_visible`](crate::Stage::is_visible)).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Window {
    title: String,
}

impl Window {
    /// Create a window.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Window title.
    pub fn title(&self) -> &str {
        &self.title
    }
}

impl Presentable for Window {}

/// A leaf screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screen {
    title: String,
}

impl Screen {
    /// Create a screen.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Screen title.
    pub fn title(&self) -> &str {
        &self.title
    }
}

impl Presentable for Screen {}
