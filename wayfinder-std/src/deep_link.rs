//! # Deep-link Dispatch
//!
//! A deep link is a route arriving from outside (a URL, a notification) that
//! must be handled by whichever router in the active part of the tree knows
//! its type.
//!
//! # Algorithm
//!
//! Starting at a node, ask [`Presentable::router_for`]. If it names a router,
//! trigger the route there and stop. Otherwise descend to the node's active
//! child (what it presents modally, else the top of its stack) and repeat.
//! The walk is resolved from the top: a node that can handle the route wins
//! over any descendant that could too.
//!
//! An unhandled route is a status, not an error: the caller decides whether to
//! fall back to a default route.
//!
//! [`Presentable::router_for`]: wayfinder_core::Presentable::router_for

use crate::navigator::{Continuation, Navigator};
use std::{cell::RefCell, collections::VecDeque, rc::Rc};
use wayfinder_core::{AnyRoute, DispatchError, NavigationError, NodeId, Route};

/// Outcome of one deep-link dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum DeepLink {
    /// `router` handled the route.
    Handled {
        /// Node the route was triggered on.
        router: NodeId,
        /// Nodes asked, in walk order.
        visited: Vec<NodeId>,
    },
    /// No node on the active path handled the route.
    Unhandled {
        /// Nodes asked, in walk order.
        visited: Vec<NodeId>,
    },
}

impl DeepLink {
    /// Whether some router handled the route.
    pub fn is_handled(&self) -> bool {
        matches!(self, DeepLink::Handled { .. })
    }

    /// Router that handled the route.
    pub fn router(&self) -> Option<NodeId> {
        match self {
            DeepLink::Handled { router, .. } => Some(*router),
            DeepLink::Unhandled { .. } => None,
        }
    }

    /// Nodes asked, in walk order.
    pub fn visited(&self) -> &[NodeId] {
        match self {
            DeepLink::Handled { visited, .. } | DeepLink::Unhandled { visited } => visited,
        }
    }

    /// Convert into a `Result`, naming `route` in the error.
    pub fn into_result(self, route: &dyn AnyRoute) -> Result<NodeId, DispatchError> {
        match self {
            DeepLink::Handled { router, .. } => Ok(router),
            DeepLink::Unhandled { .. } => Err(DispatchError::Unhandled { route: route.name() }),
        }
    }
}

/// Progress of a [`Navigator::deep_link_chain`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChainReport {
    /// Routers that handled each route, in order.
    pub handled: Vec<NodeId>,
    /// The first route no router handled; later routes were not attempted.
    pub unhandled: Option<Box<dyn AnyRoute>>,
}

impl ChainReport {
    /// Whether every route was handled.
    pub fn is_complete(&self) -> bool {
        self.unhandled.is_none()
    }
}

type ChainDone = Box<dyn FnOnce(&mut Navigator, ChainReport)>;

impl Navigator {
    /// Find the router for `route` without triggering anything.
    pub fn locate(&self, start: NodeId, route: &dyn AnyRoute) -> DeepLink {
        let mut visited = Vec::new();
        let mut node = start;
        for _ in 0..self.config.max_dispatch_depth {
            let Some(presentable) = self.stage.get(node) else {
                break;
            };
            visited.push(node);
            match presentable.router_for(node, route) {
                Some(router) if self.stage.contains(router) => {
                    return DeepLink::Handled { router, visited };
                }
                Some(router) => {
                    tracing::debug!(node = %node, router = %router, route = route.name(), "stale router skipped");
                }
                None => {}
            }
            match self.stage.active_child(node) {
                Some(next) if !visited.contains(&next) => node = next,
                _ => return DeepLink::Unhandled { visited },
            }
        }
        if visited.len() >= self.config.max_dispatch_depth {
            tracing::warn!(
                start = %start,
                route = route.name(),
                limit = self.config.max_dispatch_depth,
                "deep link walk hit the depth limit"
            );
        }
        DeepLink::Unhandled { visited }
    }

    /// Dispatch `route` into the tree below `start`.
    ///
    /// # Panics
    ///
    /// If the node named by `router_for` cannot map the route.
    pub fn deep_link<R: Route>(&mut self, start: NodeId, route: R) -> Result<DeepLink, NavigationError> {
        self.deep_link_any(start, Box::new(route), None)
    }

    /// Erased form of [`Navigator::deep_link`], with an optional completion
    /// run after the handling router's transition finishes.
    pub fn deep_link_any(
        &mut self,
        start: NodeId,
        route: Box<dyn AnyRoute>,
        completion: Option<Continuation>,
    ) -> Result<DeepLink, NavigationError> {
        self.ensure(start)?;
        let outcome = self.locate(start, &*route);
        match &outcome {
            DeepLink::Handled { router, visited } => {
                tracing::info!(route = route.name(), router = %router, depth = visited.len(), "deep link handled");
                self.trigger_erased(*router, route, completion)?;
            }
            DeepLink::Unhandled { visited } => {
                tracing::info!(route = route.name(), depth = visited.len(), "deep link unhandled");
            }
        }
        Ok(outcome)
    }

    /// Dispatch `routes` one after another.
    ///
    /// The first route is dispatched from `start`; every later route from the
    /// router that handled the previous one, once its transition completed.
    /// Stops at the first unhandled route. `completion` receives the report.
    pub fn deep_link_chain<F>(
        &mut self,
        start: NodeId,
        routes: Vec<Box<dyn AnyRoute>>,
        completion: F,
    ) -> Result<(), NavigationError>
    where
        F: FnOnce(&mut Navigator, ChainReport) + 'static,
    {
        self.ensure(start)?;
        self.chain_step(start, routes.into(), Vec::new(), Box::new(completion));
        self.drain_if_configured();
        Ok(())
    }

    fn chain_step(
        &mut self,
        from: NodeId,
        mut routes: VecDeque<Box<dyn AnyRoute>>,
        handled: Vec<NodeId>,
        done: ChainDone,
    ) {
        let Some(route) = routes.pop_front() else {
            done(self, ChainReport { handled, unhandled: None });
            return;
        };
        let router = match self.locate(from, &*route) {
            DeepLink::Handled { router, .. } => router,
            DeepLink::Unhandled { .. } => {
                tracing::info!(route = route.name(), step = handled.len(), "deep link chain stopped");
                done(self, ChainReport { handled, unhandled: Some(route) });
                return;
            }
        };
        let step = handled.len();
        let pending = Rc::new(RefCell::new(Some((routes, handled, done))));
        let resume = Rc::clone(&pending);
        let next: Continuation = Box::new(move |nav: &mut Navigator| {
            let state = resume.borrow_mut().take();
            if let Some((routes, mut handled, done)) = state {
                handled.push(router);
                nav.chain_step(router, routes, handled, done);
            }
        });
        if let Err(error) = self.trigger_erased(router, route.clone(), Some(next)) {
            tracing::debug!(router = %router, %error, step, "deep link chain router vanished");
            let state = pending.borrow_mut().take();
            if let Some((_, handled, done)) = state {
                done(self, ChainReport { handled, unhandled: Some(route) });
            }
        }
    }
}
