//! Task spawning and timer seams.
//!
//! The web build spawns onto the browser event loop and sleeps with
//! `gloo-timers`; tests drive everything from a `futures` local pool.

use std::future::Future;

use futures::future::{self, Either, LocalBoxFuture};

/// Runs detached tasks on the single-threaded event loop.
pub trait Spawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// Produces sleep futures.
pub trait Timer {
    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()>;
}

/// Result of racing a future against a timeout.
#[derive(Debug, PartialEq, Eq)]
pub enum RaceResult<T> {
    /// The future completed before the timeout.
    Completed(T),
    /// The timeout fired first; the future was dropped.
    TimedOut,
}

/// Race a future against a timeout.
///
/// The losing future is dropped, so any resources it owns are released.
pub async fn race_with_timeout<F>(task: F, timer: &dyn Timer, timeout_ms: u32) -> RaceResult<F::Output>
where
    F: Future,
{
    let task = std::pin::pin!(task);
    match future::select(task, timer.sleep(timeout_ms)).await {
        Either::Left((output, _)) => RaceResult::Completed(output),
        Either::Right(((), _)) => RaceResult::TimedOut,
    }
}
