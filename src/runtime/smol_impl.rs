//! smol runtime implementation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};
use std::time::Duration;

/// Handle to a task spawned on smol.
pub struct JoinHandle<T>(Mutex<Option<smol::Task<T>>>);

impl<T> JoinHandle<T> {
    /// Stop the task. smol cancels a task when its handle is dropped, so
    /// awaiting afterwards yields `None`.
    pub fn abort(&self) {
        let task = self
            .0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        drop(task);
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
            Some(task) => Pin::new(task).poll(cx).map(Some),
            None => Poll::Ready(None),
        }
    }
}

impl<T> Drop for JoinHandle<T> {
    fn drop(&mut self) {
        // Dropping a smol task cancels it; keep it running in the background.
        if let Some(task) = self
            .0
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take()
        {
            task.detach();
        }
    }
}

pub(super) async fn sleep(duration: Duration) {
    smol::Timer::after(duration).await;
}

pub(super) fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    JoinHandle(Mutex::new(Some(smol::spawn(future))))
}
