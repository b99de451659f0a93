use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::{
    sync::Notify,
    task::{JoinError, JoinHandle},
};

/// What a poll callback wants to happen next.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Poll again after the interval.
    Continue,
    /// Nothing left to watch, stop the poller.
    Done,
}

/// A task polling something periodically in the background.
/// It stops by itself once the callback reports [`PollOutcome::Done`], or can be
/// cancelled or triggered early. Dropping the poller aborts the task.
pub struct Poller {
    task_handle: JoinHandle<u64>,
    signal: Arc<Notify>,
}

impl Poller {
    /// Run `poll` straight away, then every `interval` until it reports `Done`.
    pub fn spawn<F, Fut>(interval: Duration, mut poll: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = PollOutcome> + Send + 'static,
    {
        // Create the synchronisation signal.
        let signal = Arc::new(Notify::new());

        let task_signal = signal.clone();
        let task_handle = tokio::spawn(async move {
            let mut rounds: u64 = 0;
            loop {
                rounds += 1;
                if poll().await == PollOutcome::Done {
                    debug!("Poller finished after {rounds} rounds");
                    return rounds;
                }
                // Wait for the interval, or for an early trigger.
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = task_signal.notified() => {}
                }
            }
        });

        Self {
            task_handle,
            signal,
        }
    }

    /// Poll now instead of waiting till the end of the current interval.
    pub fn trigger_now(&self) {
        self.signal.notify_one();
    }

    pub fn is_finished(&self) -> bool {
        self.task_handle.is_finished()
    }

    /// Stop polling. Returns true iff the poller had already finished by itself.
    pub async fn cancel(mut self) -> bool {
        self.task_handle.abort();
        (&mut self.task_handle).await.is_ok()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.task_handle.abort();
    }
}

/// Implement `Future` for `Poller` so we can directly `await` it.
/// Resolves to the number of polls run.
impl Future for Poller {
    type Output = Result<u64, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.task_handle).poll(cx)
    }
}
