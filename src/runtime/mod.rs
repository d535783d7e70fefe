//! Runtime-agnostic async abstractions.
//!
//! The bulb controller needs an async mutex, a way to run its inbound event
//! pump in the background, and a timer. Each is provided by whichever runtime
//! feature is enabled.
//!
//! # Feature Flags
//!
//! - `runtime-tokio` (default) - Use the tokio runtime
//! - `runtime-async-std` - Use the async-std runtime
//! - `runtime-smol` - Use the smol runtime
//!
//! The `mqtt` feature always needs `runtime-tokio`, since the MQTT client is
//! built on it.

use std::future::Future;
use std::time::Duration;

#[cfg(feature = "runtime-tokio")]
mod tokio_impl;

#[cfg(feature = "runtime-async-std")]
mod async_std_impl;

#[cfg(feature = "runtime-smol")]
mod smol_impl;

#[cfg(feature = "runtime-tokio")]
use tokio_impl as imp;

#[cfg(feature = "runtime-async-std")]
use async_std_impl as imp;

#[cfg(feature = "runtime-smol")]
use smol_impl as imp;

pub use imp::JoinHandle;

// Async mutex re-export
#[cfg(feature = "runtime-tokio")]
pub use tokio::sync::Mutex;

#[cfg(feature = "runtime-async-std")]
pub use async_std::sync::Mutex;

#[cfg(feature = "runtime-smol")]
pub use async_lock::Mutex;

/// Sleep for the specified duration.
pub async fn sleep(duration: Duration) {
    imp::sleep(duration).await
}

/// Run a future as a detached background task.
///
/// The returned handle can be awaited for the task's output or used to stop
/// it early.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    imp::spawn(future)
}

// Compile-time check to ensure exactly one runtime is selected
#[cfg(not(any(
    feature = "runtime-tokio",
    feature = "runtime-async-std",
    feature = "runtime-smol"
)))]
compile_error!(
    "One of \"runtime-tokio\", \"runtime-async-std\", or \"runtime-smol\" features must be enabled"
);

#[cfg(all(feature = "runtime-tokio", feature = "runtime-async-std"))]
compile_error!("Features \"runtime-tokio\" and \"runtime-async-std\" are mutually exclusive");

#[cfg(all(feature = "runtime-tokio", feature = "runtime-smol"))]
compile_error!("Features \"runtime-tokio\" and \"runtime-smol\" are mutually exclusive");

#[cfg(all(feature = "runtime-async-std", feature = "runtime-smol"))]
compile_error!("Features \"runtime-async-std\" and \"runtime-smol\" are mutually exclusive");
