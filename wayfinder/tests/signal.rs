//! Awaiting triggered transitions.

mod common;

use common::{AppRoute, launch};
use wayfinder::{NavigationError, Screen, testing::RecordingAnimator};

#[tokio::test]
async fn test_signal_resolves_after_completion() {
    let mut app = launch(RecordingAnimator::manual());
    app.animator.finish_all();
    app.nav.run_pending();

    let mut signal = app.nav.trigger_signal(app.root, AppRoute::Settings).unwrap();
    assert_eq!(signal.try_resolve(), None);

    app.animator.finish_all();
    app.nav.run_pending();

    assert_eq!(signal.await, Ok(()));
}

#[tokio::test]
async fn test_signal_reports_abandoned_transition() {
    let mut app = launch(RecordingAnimator::manual());
    let child = app
        .nav
        .spawn_child_coordinator(app.root, common::app_coordinator(), Screen::new("child"))
        .unwrap();

    let signal = app.nav.trigger_signal(child, AppRoute::Settings).unwrap();
    app.nav.remove(child).unwrap();

    assert_eq!(signal.await, Err(NavigationError::Abandoned));
}

#[tokio::test]
async fn test_dropped_completion_abandons_signal() {
    let mut app = launch(RecordingAnimator::manual());
    app.animator.finish_all();
    app.nav.run_pending();

    let signal = app.nav.trigger_signal(app.root, AppRoute::Settings).unwrap();
    assert_eq!(app.animator.abandon_all(), 1);
    app.nav.run_pending();

    assert_eq!(signal.await, Err(NavigationError::Abandoned));
    assert!(app.nav.is_idle());
}
