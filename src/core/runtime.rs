//! Dedicated worker runtime for fan-out scan work

use std::future::Future;
use std::io;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;
use tracing::info;

pub const DEFAULT_POOL_SIZE: usize = 60;
pub const WORKER_THREAD_NAME: &str = "ob-worker";

/// Fixed-size multi-thread runtime owned by the scanner.
///
/// Work spawned here runs off the caller's runtime, so a large scan does not
/// starve request handling. Dropping the pool shuts it down without waiting
/// for in-flight tasks.
pub struct WorkerPool {
    runtime: Option<Runtime>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> io::Result<Self> {
        let size = size.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(size)
            .thread_name(WORKER_THREAD_NAME)
            .enable_all()
            .build()?;

        info!(
            size = size,
            "WorkerPool: started with {} worker threads",
            size
        );

        Ok(Self {
            runtime: Some(runtime),
            size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Spawn a future onto the pool. Returns `None` once the pool is shut down.
    pub fn spawn<F>(&self, future: F) -> Option<JoinHandle<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.runtime.as_ref().map(|rt| rt.spawn(future))
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
            info!("WorkerPool: shut down");
        }
    }
}
