//! Awaitable transition completion.

use futures::channel::oneshot;
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use wayfinder_core::NavigationError;

/// Future resolving when a triggered transition completes.
///
/// Resolves to [`NavigationError::Abandoned`] when the continuation is
/// dropped instead (anchor removed, or a primitive dropped its completion).
/// The navigator must keep being driven for this to resolve.
#[must_use = "futures do nothing unless polled"]
#[derive(Debug)]
pub struct TransitionSignal {
    rx: oneshot::Receiver<()>,
}

impl TransitionSignal {
    pub(crate) fn new(rx: oneshot::Receiver<()>) -> Self {
        Self { rx }
    }

    /// Non-blocking check: `Some` once the transition completed or was
    /// abandoned.
    pub fn try_resolve(&mut self) -> Option<Result<(), NavigationError>> {
        match self.rx.try_recv() {
            Ok(Some(())) => Some(Ok(())),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(NavigationError::Abandoned)),
        }
    }
}

impl Future for TransitionSignal {
    type Output = Result<(), NavigationError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.map_err(|oneshot::Canceled| NavigationError::Abandoned))
    }
}
