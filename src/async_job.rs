//! Handle to a background task spawned on the tokio runtime.
//!
//! The owner can either poll it from an event loop or await it.

use crate::error::{RewardError, RewardResult};
use std::future::Future;
use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};

pub struct AsyncJob<T> {
    receiver: Option<oneshot::Receiver<RewardResult<T>>>,
}

impl<T: Send + 'static> AsyncJob<T> {
    /// Spawn `future` on `runtime`. Works from any thread, inside a runtime
    /// context or not.
    pub fn spawn_on<F>(runtime: &Handle, future: F) -> Self
    where
        F: Future<Output = RewardResult<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        runtime.spawn(async move {
            let _ = tx.send(future.await);
        });
        Self::new(rx)
    }
}

impl<T> AsyncJob<T> {
    pub fn new(receiver: oneshot::Receiver<RewardResult<T>>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }

    /// Poll the job for completion
    /// Returns Some(result) if the job has completed, None if still running
    pub fn poll(&mut self) -> Option<RewardResult<T>> {
        if let Some(rx) = &mut self.receiver {
            match rx.try_recv() {
                Ok(res) => {
                    self.receiver = None;
                    return Some(res);
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Closed) => {
                    self.receiver = None;
                    return Some(Err(worker_lost()));
                }
            }
        }
        None
    }

    /// Wait for the job to finish. Returns `None` if it already reported.
    pub async fn wait(&mut self) -> Option<RewardResult<T>> {
        let rx = self.receiver.take()?;
        Some(rx.await.unwrap_or_else(|_| Err(worker_lost())))
    }
}

fn worker_lost() -> RewardError {
    RewardError::Transaction("worker task ended without reporting a result".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_returns_result() {
        let mut job = AsyncJob::spawn_on(&Handle::current(), async { Ok(5u32) });
        assert_eq!(job.wait().await, Some(Ok(5)));
        assert_eq!(job.wait().await, None);
        assert_eq!(job.poll(), None);
    }

    #[test]
    fn test_spawn_from_outside_the_runtime() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        // No runtime context on this thread; the handle carries it
        let mut job = AsyncJob::spawn_on(rt.handle(), async { Ok(7u32) });
        assert_eq!(rt.block_on(job.wait()), Some(Ok(7)));
    }

    #[tokio::test]
    async fn test_poll_empty_then_ready() {
        let (tx, rx) = oneshot::channel();
        let mut job = AsyncJob::<u32>::new(rx);
        assert_eq!(job.poll(), None);
        tx.send(Err(RewardError::UserRejected)).unwrap();
        assert_eq!(job.poll(), Some(Err(RewardError::UserRejected)));
        assert_eq!(job.poll(), None);
    }

    #[test]
    fn test_dropped_sender_reports_failure() {
        let (tx, rx) = oneshot::channel::<RewardResult<u32>>();
        let mut job = AsyncJob::new(rx);
        drop(tx);
        assert!(matches!(job.poll(), Some(Err(RewardError::Transaction(_)))));
        assert_eq!(job.poll(), None);
    }

    #[test]
    fn test_panicking_task_reports_failure() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let result = rt.block_on(async {
            let mut job = AsyncJob::<u32>::spawn_on(&Handle::current(), async {
                if true {
                    panic!("boom");
                }
                Ok(0)
            });
            job.wait().await
        });
        assert!(matches!(result, Some(Err(RewardError::Transaction(_)))));
    }
}
