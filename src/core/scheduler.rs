//! Cron-based scheduler for periodic table refreshes

use crate::monitor::Monitor;
use cron::Schedule;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerError {
    Disabled,
    InvalidCron { expression: String, message: String },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::Disabled => write!(f, "scheduler disabled: interval is 0"),
            SchedulerError::InvalidCron {
                expression,
                message,
            } => write!(f, "invalid cron expression '{}': {}", expression, message),
        }
    }
}

impl std::error::Error for SchedulerError {}

/// Cron expression (with seconds field) firing every `interval_seconds`.
pub fn interval_to_cron(interval_seconds: u64) -> String {
    if interval_seconds >= 60 {
        format!("0 */{} * * * *", interval_seconds / 60)
    } else {
        format!("*/{} * * * * *", interval_seconds)
    }
}

/// Runs [`Monitor::refresh_tables`] on every cron tick.
pub struct RefreshScheduler {
    monitor: Arc<Monitor>,
    schedule: Schedule,
    handle: Arc<RwLock<Option<JoinHandle<()>>>>,
}

impl RefreshScheduler {
    /// `interval_seconds` of 0 disables the scheduler.
    pub fn new(monitor: Arc<Monitor>, interval_seconds: u64) -> Result<Self, SchedulerError> {
        if interval_seconds == 0 {
            return Err(SchedulerError::Disabled);
        }

        let cron_expr = interval_to_cron(interval_seconds);
        let schedule =
            Schedule::from_str(&cron_expr).map_err(|e| SchedulerError::InvalidCron {
                expression: cron_expr.clone(),
                message: e.to_string(),
            })?;

        info!(
            interval = interval_seconds,
            cron = %cron_expr,
            "RefreshScheduler: created with interval {}s (cron: {})",
            interval_seconds,
            cron_expr
        );

        Ok(Self {
            monitor,
            schedule,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    /// Start ticking. Calling it while already running is a no-op.
    pub async fn start(&self) {
        let mut slot = self.handle.write().await;
        if slot.is_some() {
            debug!("RefreshScheduler: already running");
            return;
        }

        let monitor = self.monitor.clone();
        let schedule = self.schedule.clone();
        *slot = Some(tokio::spawn(async move {
            info!("RefreshScheduler: started, waiting for cron schedule...");
            loop {
                match schedule.upcoming(chrono::Utc).next() {
                    Some(next_tick) => {
                        let wait = (next_tick - chrono::Utc::now()).to_std().unwrap_or_default();
                        tokio::time::sleep(wait).await;
                    }
                    None => {
                        tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                        continue;
                    }
                }

                debug!("RefreshScheduler: cron tick");
                monitor.refresh_tables().await;
            }
        }));
        info!("RefreshScheduler: started successfully");
    }

    pub async fn stop(&self) {
        if let Some(handle) = self.handle.write().await.take() {
            handle.abort();
            info!("RefreshScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }
}
