use crate::core_listener::listener::{FileEvent, FileListener, StatisticsEvent, StatisticsListener};
use crate::session::SessionId;
use log::{error, warn};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::task;
use tokio::time::timeout;

/// Fans completed actions out to the registered listeners.
///
/// Each listener call runs on the blocking pool under a timeout. A
/// listener that panics or overruns is logged and skipped; the caller
/// never sees the failure.
pub struct Notifier {
    file_listeners: RwLock<Vec<Arc<dyn FileListener>>>,
    statistics_listeners: RwLock<Vec<Arc<dyn StatisticsListener>>>,
    listener_timeout: Duration,
}

impl Notifier {
    pub fn new(listener_timeout: Duration) -> Self {
        Self {
            file_listeners: RwLock::new(Vec::new()),
            statistics_listeners: RwLock::new(Vec::new()),
            listener_timeout,
        }
    }

    pub fn add_file_listener(&self, listener: Arc<dyn FileListener>) {
        self.file_listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn add_statistics_listener(&self, listener: Arc<dyn StatisticsListener>) {
        self.statistics_listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// File listeners first, then the matching statistics counter.
    pub async fn file_event(&self, event: FileEvent, file: &Path, session_id: SessionId) {
        let listeners = self
            .file_listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for listener in listeners {
            let file: PathBuf = file.to_path_buf();
            self.run_isolated(&format!("{:?}", event), move || {
                event.deliver(listener.as_ref(), &file, session_id)
            })
            .await;
        }

        self.statistics_event(event.into()).await;
    }

    pub async fn statistics_event(&self, event: StatisticsEvent) {
        let listeners = self
            .statistics_listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for listener in listeners {
            self.run_isolated(&format!("{:?}", event), move || event.deliver(listener.as_ref()))
                .await;
        }
    }

    async fn run_isolated<F>(&self, what: &str, call: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match timeout(self.listener_timeout, task::spawn_blocking(call)).await {
            Ok(Ok(())) => {}
            Ok(Err(join_error)) => {
                error!("Listener failed during {} notification: {}", what, join_error);
            }
            Err(_) => {
                warn!(
                    "Listener exceeded {:?} during {} notification, not waiting for it",
                    self.listener_timeout, what
                );
            }
        }
    }
}
