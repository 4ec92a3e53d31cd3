//! Fixed-size worker pool for blocking calls.
//!
//! A semaphore bounds how many jobs run at once; each admitted job runs on a
//! tokio blocking thread. Callers beyond capacity wait in FIFO order for a
//! permit, optionally bounded by `max_queued`.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::Instant;

use crate::types::{Error, Result};

/// Bounded pool of blocking workers.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
    max_queued: Option<usize>,
    queued: Arc<AtomicUsize>,
}

/// Decrements the queue counter when the caller stops waiting, including
/// when its future is dropped.
struct QueueSlot<'a>(&'a AtomicUsize);

impl Drop for QueueSlot<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl WorkerPool {
    pub fn new(size: usize, max_queued: Option<usize>) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
            max_queued,
            queued: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of workers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Jobs currently holding a worker.
    pub fn in_flight(&self) -> usize {
        if self.permits.is_closed() {
            return 0;
        }
        self.size - self.permits.available_permits()
    }

    /// Callers waiting for a free worker.
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    /// Stop admitting jobs. Running jobs finish; waiting callers fail.
    pub fn close(&self) {
        self.permits.close();
    }

    /// Run `job` on a worker and await its result.
    ///
    /// `timeout` covers both waiting for a free worker and the job itself.
    /// The worker permit moves into the blocking closure, so if the caller
    /// stops waiting (timeout, dropped request) the job keeps its worker
    /// until it returns and the result is discarded.
    pub async fn submit<F, T>(&self, job: F, timeout: Option<Duration>) -> Result<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let deadline = timeout.map(Deadline::after);

        let permit = {
            let waiting = self.queued.fetch_add(1, Ordering::SeqCst);
            let _slot = QueueSlot(&self.queued);
            if let Some(limit) = self.max_queued {
                if waiting >= limit && self.permits.available_permits() == 0 {
                    return Err(Error::unavailable(format!(
                        "worker pool exhausted ({} running, {} waiting)",
                        self.size, waiting
                    )));
                }
            }
            let acquire = self.permits.clone().acquire_owned();
            let acquired = match &deadline {
                Some(deadline) => deadline.wait(acquire).await?,
                None => acquire.await,
            };
            acquired.map_err(|_| Error::unavailable("worker pool is shut down"))?
        };

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        });

        let joined = match &deadline {
            Some(deadline) => deadline.wait(handle).await?,
            None => handle.await,
        };

        joined.map_err(|e| {
            tracing::error!("Worker thread failed: {}", e);
            Error::internal(format!("worker thread failed: {e}"))
        })
    }
}

/// A single time limit shared by every step of one submission.
struct Deadline {
    at: Instant,
    limit: Duration,
}

impl Deadline {
    fn after(limit: Duration) -> Self {
        Self {
            at: Instant::now() + limit,
            limit,
        }
    }

    async fn wait<F: Future>(&self, future: F) -> Result<F::Output> {
        tokio::time::timeout_at(self.at, future).await.map_err(|_| {
            Error::timeout(format!("no result after {:.1}s", self.limit.as_secs_f64()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_submit_returns_job_output() {
        let pool = WorkerPool::new(2, None);
        let value = pool.submit(|| 40 + 2, None).await.unwrap();
        assert_eq!(value, 42);
        assert_eq!(pool.in_flight(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_never_exceeds_pool_size() {
        let pool = WorkerPool::new(2, None);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let jobs = (0..6).map(|_| {
            let running = running.clone();
            let peak = peak.clone();
            let pool = pool.clone();
            async move {
                pool.submit(
                    move || {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(50));
                        running.fetch_sub(1, Ordering::SeqCst);
                    },
                    None,
                )
                .await
            }
        });

        for result in futures::future::join_all(jobs).await {
            result.unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_keeps_worker_busy() {
        let pool = WorkerPool::new(1, None);
        let started = Instant::now();
        let err = pool
            .submit(
                || std::thread::sleep(Duration::from_millis(300)),
                Some(Duration::from_millis(20)),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout(_)));
        assert!(started.elapsed() < Duration::from_millis(250));
        // The orphaned job still holds the only worker.
        assert_eq!(pool.in_flight(), 1);

        let value = pool.submit(|| "next", None).await.unwrap();
        assert_eq!(value, "next");
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timeout_covers_wait_for_worker() {
        let pool = WorkerPool::new(1, None);
        let busy = {
            let pool = pool.clone();
            tokio::spawn(async move {
                pool.submit(|| std::thread::sleep(Duration::from_millis(800)), None)
                    .await
            })
        };
        while pool.in_flight() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let started = Instant::now();
        let err = pool
            .submit(|| (), Some(Duration::from_millis(50)))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout(_)));
        assert!(started.elapsed() < Duration::from_millis(300));
        assert_eq!(pool.queued(), 0);
        busy.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_closed_pool_rejects_jobs() {
        let pool = WorkerPool::new(1, None);
        pool.close();
        let err = pool.submit(|| (), None).await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
        assert!(pool.is_closed());
    }

    #[tokio::test]
    async fn test_queue_limit_rejects_overflow() {
        let pool = WorkerPool::new(1, Some(0));
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

        let busy = {
            let pool = pool.clone();
            tokio::spawn(async move {
                pool.submit(
                    move || {
                        let _ = release_rx.recv();
                    },
                    None,
                )
                .await
            })
        };

        while pool.in_flight() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let err = pool.submit(|| (), None).await.unwrap_err();
        assert!(err.to_string().contains("worker pool exhausted"));
        assert_eq!(pool.queued(), 0);

        release_tx.send(()).unwrap();
        busy.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_panicking_job_is_internal_error() {
        let pool = WorkerPool::new(1, None);
        let err = pool
            .submit(|| -> u32 { panic!("sdk exploded") }, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Internal(_)));

        // The permit is released even though the job panicked.
        assert_eq!(pool.submit(|| 7, None).await.unwrap(), 7);
    }
}
