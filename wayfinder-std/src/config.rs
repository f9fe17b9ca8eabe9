//! Navigator configuration.

/// Settings for a [`Navigator`](crate::Navigator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorConfig {
    /// Upper bound on nodes visited by one deep-link walk. Default is 64.
    pub max_dispatch_depth: usize,
    /// Run ready continuations before returning from `trigger`, `perform`,
    /// `set_root` and deep-link calls. Default is `true`.
    ///
    /// With this off, the host calls `run_pending` from its own event loop.
    pub drain_on_trigger: bool,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigatorConfig {
    /// Default configuration.
    pub const fn new() -> Self {
        Self {
            max_dispatch_depth: 64,
            drain_on_trigger: true,
        }
    }

    /// Set the deep-link depth bound.
    pub const fn with_max_dispatch_depth(mut self, depth: usize) -> Self {
        self.max_dispatch_depth = depth;
        self
    }

    /// Set whether calls drain ready continuations before returning.
    pub const fn with_drain_on_trigger(mut self, drain: bool) -> Self {
        self.drain_on_trigger = drain;
        self
    }
}
