//! Detached side effects: spawned, never joined, failures only reach the log.

use std::future::Future;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum SideEffectError {
    #[error("storage upload of {object_id} failed: {reason}")]
    StorageWriteFailed { object_id: String, reason: String },

    #[error("search indexing of resume {resume_id} failed: {reason}")]
    IndexWriteFailed { resume_id: i64, reason: String },

    #[error("analytics emission for resume {resume_id} failed: {reason}")]
    AnalyticsEmitFailed { resume_id: i64, reason: String },
}

/// Spawns fire-and-forget tasks. A task's `Err` goes to the failure channel, never to the caller.
#[derive(Clone)]
pub struct BackgroundTasks {
    failures: UnboundedSender<SideEffectError>,
}

impl BackgroundTasks {
    pub fn new() -> (Self, UnboundedReceiver<SideEffectError>) {
        let (failures, rx) = mpsc::unbounded_channel();
        (Self { failures }, rx)
    }

    pub fn spawn<F>(&self, name: &'static str, task: F)
    where
        F: Future<Output = Result<(), SideEffectError>> + Send + 'static,
    {
        let failures = self.failures.clone();
        tokio::spawn(async move {
            let started = Instant::now();
            match task.await {
                Ok(()) => debug!(
                    "Background task '{}' finished in {}ms",
                    name,
                    started.elapsed().as_millis()
                ),
                Err(e) => {
                    if let Err(unsent) = failures.send(e) {
                        error!("Background task '{}' failed: {}", name, unsent.0);
                    }
                }
            }
        });
    }
}

/// Drains the failure channel into the log until every sender is dropped.
pub fn spawn_failure_logger(mut failures: UnboundedReceiver<SideEffectError>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(failure) = failures.recv().await {
            error!("Background side effect failed: {failure}");
        }
    })
}
