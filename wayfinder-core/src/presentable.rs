//! # Capability Layer (Presentable)
//!
//! Anything that can be shown to the user: a plain screen, a container such as
//! a window, or a coordinator. Every method has a default, so a leaf screen is
//! just `impl Presentable for MyScreen {}`.
//!
//! Presentables never hold references to each other. Relationships (who
//! presented whom, who is whose parent) are kept by the navigator as
//! [`NodeId`] handles and reported to the presentable through the hooks below.

use crate::{node::NodeId, route::AnyRoute, transition::Transition};
use std::any::Any;

/// What a parent wants done with a child whose transition just completed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChildDisposition {
    /// Keep owning the child.
    #[default]
    Keep,
    /// Release the child if it is no longer displayed anywhere.
    ReleaseIfDetached,
    /// Release the child unconditionally.
    Release,
}

/// A thing that can be shown.
pub trait Presentable: Any {
    /// The unit that actually gets displayed when this presentable is shown.
    ///
    /// `None` means the presentable displays itself. Coordinators return their
    /// root unit.
    fn root_unit(&self) -> Option<NodeId> {
        None
    }

    /// Which router, if any, can trigger `route` on behalf of this node.
    ///
    /// `this` is the node this presentable is stored at. Returning a different
    /// node delegates the route to it. The deep-link dispatcher asks this at
    /// every level it walks.
    fn router_for(&self, this: NodeId, route: &dyn AnyRoute) -> Option<NodeId> {
        let _ = (this, route);
        None
    }

    /// Map `route` into a transition, if this presentable is a router for its
    /// type.
    ///
    /// Must be pure: no navigation state may change.
    fn transition_for(&self, route: &dyn AnyRoute) -> Option<Transition> {
        let _ = route;
        None
    }

    /// Called once per presentation event, after the parent was registered.
    ///
    /// `from` is the node this was shown from: an anchor, a container, or
    /// `None` when no context is known.
    fn presented(&mut self, from: Option<NodeId>) {
        let _ = from;
    }

    /// Called when a node presents this one. Last registration wins.
    fn register_parent(&mut self, parent: NodeId) {
        let _ = parent;
    }

    /// Called on the registered parent when a transition triggered on `child`
    /// has completed.
    fn child_transition_completed(&mut self, child: NodeId) -> ChildDisposition {
        let _ = child;
        ChildDisposition::Keep
    }

    /// Called when this presentable stops being displayed (popped, dismissed,
    /// or replaced as a root).
    fn dismissed(&mut self) {}

    /// Called when this node becomes the owner of `child`.
    fn child_added(&mut self, child: NodeId) {
        let _ = child;
    }

    /// Called when an owned `child` is released.
    fn child_removed(&mut self, child: NodeId) {
        let _ = child;
    }
}

impl dyn Presentable {
    /// Borrow as the concrete type.
    pub fn downcast_ref<T: Presentable>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }

    /// Mutably borrow as the concrete type.
    pub fn downcast_mut<T: Presentable>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut::<T>()
    }
}
