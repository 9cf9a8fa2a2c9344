//! Host plumbing: HTTP API, refresh scheduler and the scan worker runtime

pub mod http;
pub mod runtime;
pub mod scheduler;

pub use http::{create_router, start_server, AppState};
pub use runtime::WorkerPool;
pub use scheduler::{interval_to_cron, RefreshScheduler, SchedulerError};
