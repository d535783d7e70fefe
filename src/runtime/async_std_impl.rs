//! async-std runtime implementation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};
use std::time::Duration;

/// Handle to a task spawned on async-std.
pub struct JoinHandle<T>(Mutex<Option<async_std::task::JoinHandle<T>>>);

impl<T: Send + 'static> JoinHandle<T> {
    /// Stop the task. Awaiting the handle afterwards yields `None`.
    pub fn abort(&self) {
        let handle = self
            .0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            // cancellation is async on async-std
            async_std::task::spawn(async move {
                handle.cancel().await;
            });
        }
    }
}

impl<T> Future for JoinHandle<T> {
    type Output = Option<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self
            .0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match slot.as_mut() {
            Some(handle) => Pin::new(handle).poll(cx).map(Some),
            None => Poll::Ready(None),
        }
    }
}

pub(super) async fn sleep(duration: Duration) {
    async_std::task::sleep(duration).await
}

pub(super) fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    JoinHandle(Mutex::new(Some(async_std::task::spawn(future))))
}
