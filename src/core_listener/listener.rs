use crate::session::SessionId;
use std::path::Path;

/// Per-file notifications, fired after the action has completed.
pub trait FileListener: Send + Sync {
    fn notify_upload(&self, file: &Path, session_id: SessionId);
    fn notify_download(&self, file: &Path, session_id: SessionId);
    fn notify_delete(&self, file: &Path, session_id: SessionId);
}

/// Aggregate counters only; no arguments.
pub trait StatisticsListener: Send + Sync {
    fn notify_upload(&self);
    fn notify_download(&self);
    fn notify_delete(&self);
    fn notify_login(&self);
    fn notify_logout(&self);
    fn notify_connection(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEvent {
    Upload,
    Download,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticsEvent {
    Upload,
    Download,
    Delete,
    Login,
    Logout,
    Connection,
}

impl From<FileEvent> for StatisticsEvent {
    fn from(event: FileEvent) -> Self {
        match event {
            FileEvent::Upload => StatisticsEvent::Upload,
            FileEvent::Download => StatisticsEvent::Download,
            FileEvent::Delete => StatisticsEvent::Delete,
        }
    }
}

impl FileEvent {
    pub fn deliver(self, listener: &dyn FileListener, file: &Path, session_id: SessionId) {
        match self {
            FileEvent::Upload => listener.notify_upload(file, session_id),
            FileEvent::Download => listener.notify_download(file, session_id),
            FileEvent::Delete => listener.notify_delete(file, session_id),
        }
    }
}

impl StatisticsEvent {
    pub fn deliver(self, listener: &dyn StatisticsListener) {
        match self {
            StatisticsEvent::Upload => listener.notify_upload(),
            StatisticsEvent::Download => listener.notify_download(),
            StatisticsEvent::Delete => listener.notify_delete(),
            StatisticsEvent::Login => listener.notify_login(),
            StatisticsEvent::Logout => listener.notify_logout(),
            StatisticsEvent::Connection => listener.notify_connection(),
        }
    }
}
