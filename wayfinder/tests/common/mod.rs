#![allow(dead_code)]

use std::{cell::Cell, rc::Rc};
use wayfinder::{
    Coordinator, Navigator, NodeId, Route, Screen, Transition, UnitFactory, Window,
    testing::RecordingAnimator,
};

// ============================================================================
// Test Route Types
// ============================================================================

#[derive(Clone, Debug, PartialEq, Route)]
pub enum AppRoute {
    Home,
    Settings,
    Close,
}

#[derive(Clone, Debug, PartialEq, Route)]
#[route(name = "inbox")]
pub enum InboxRoute {
    List,
    Thread(u32),
}

#[derive(Clone, Debug, PartialEq, Route)]
#[route(name = "profile")]
pub struct ProfileRoute {
    pub user: u64,
}

// ============================================================================
// Routers
// ============================================================================

pub type AppCoordinator = Coordinator<AppRoute, fn(&AppRoute) -> Transition>;

pub fn app_router(route: &AppRoute) -> Transition {
    match route {
        AppRoute::Home => Transition::PopToRoot,
        AppRoute::Settings => {
            Transition::push(UnitFactory::new("settings", || Screen::new("settings")))
        }
        AppRoute::Close => Transition::Dismiss,
    }
}

pub fn app_coordinator() -> AppCoordinator {
    Coordinator::new(app_router as fn(&AppRoute) -> Transition)
}

/// Inbox router counting how often it was asked for a transition.
pub fn counting_inbox_router() -> (Rc<Cell<usize>>, impl Fn(&InboxRoute) -> Transition + 'static)
{
    let count = Rc::new(Cell::new(0));
    let calls = Rc::clone(&count);
    let router = move |route: &InboxRoute| {
        calls.set(calls.get() + 1);
        match route {
            InboxRoute::List => Transition::PopToRoot,
            InboxRoute::Thread(_) => {
                Transition::push(UnitFactory::new("thread", || Screen::new("thread")))
            }
        }
    };
    (count, router)
}

// ============================================================================
// Fixtures
// ============================================================================

/// A navigator with a window showing an app coordinator.
pub struct App {
    pub nav: Navigator,
    pub animator: RecordingAnimator,
    pub window: NodeId,
    pub root: NodeId,
}

pub fn launch(animator: RecordingAnimator) -> App {
    let mut nav = Navigator::new(animator.clone());
    let window = nav.insert(Window::new("main"));
    let root = nav
        .spawn_coordinator(app_coordinator(), Screen::new("home"))
        .unwrap();
    nav.set_root(root, window).unwrap();
    App {
        nav,
        animator,
        window,
        root,
    }
}

pub fn counter() -> (Rc<Cell<usize>>, impl FnOnce(&mut Navigator) + 'static) {
    let count = Rc::new(Cell::new(0));
    let hook = Rc::clone(&count);
    (count, move |_: &mut Navigator| hook.set(hook.get() + 1))
}
