// Server-wide transfer statistics

use crate::core_listener::listener::StatisticsListener;
use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicU64, Ordering};

/// Aggregate counters, shared by every connection.
#[derive(Debug)]
pub struct ServerStatistics {
    started_at: DateTime<Local>,
    uploads: AtomicU64,
    downloads: AtomicU64,
    deletes: AtomicU64,
    logins: AtomicU64,
    logouts: AtomicU64,
    total_connections: AtomicU64,
    current_connections: AtomicU64,
}

/// Point-in-time copy of [`ServerStatistics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsSnapshot {
    pub started_at: DateTime<Local>,
    pub uploads: u64,
    pub downloads: u64,
    pub deletes: u64,
    pub logins: u64,
    pub logouts: u64,
    pub total_connections: u64,
    pub current_connections: u64,
}

impl ServerStatistics {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            uploads: AtomicU64::new(0),
            downloads: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            logins: AtomicU64::new(0),
            logouts: AtomicU64::new(0),
            total_connections: AtomicU64::new(0),
            current_connections: AtomicU64::new(0),
        }
    }

    /// Called by the network layer when a control connection ends.
    pub fn connection_closed(&self) {
        let _ = self
            .current_connections
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            started_at: self.started_at,
            uploads: self.uploads.load(Ordering::SeqCst),
            downloads: self.downloads.load(Ordering::SeqCst),
            deletes: self.deletes.load(Ordering::SeqCst),
            logins: self.logins.load(Ordering::SeqCst),
            logouts: self.logouts.load(Ordering::SeqCst),
            total_connections: self.total_connections.load(Ordering::SeqCst),
            current_connections: self.current_connections.load(Ordering::SeqCst),
        }
    }
}

impl Default for ServerStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticsListener for ServerStatistics {
    fn notify_upload(&self) {
        self.uploads.fetch_add(1, Ordering::SeqCst);
    }

    fn notify_download(&self) {
        self.downloads.fetch_add(1, Ordering::SeqCst);
    }

    fn notify_delete(&self) {
        self.deletes.fetch_add(1, Ordering::SeqCst);
    }

    fn notify_login(&self) {
        self.logins.fetch_add(1, Ordering::SeqCst);
    }

    fn notify_logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
    }

    /// New connection opened.
    fn notify_connection(&self) {
        self.total_connections.fetch_add(1, Ordering::SeqCst);
        self.current_connections.fetch_add(1, Ordering::SeqCst);
    }
}

impl StatisticsSnapshot {
    pub fn current_logins(&self) -> u64 {
        self.logins.saturating_sub(self.logouts)
    }

    /// Lines for `SITE STAT`.
    pub fn format_lines(&self) -> Vec<String> {
        vec![
            format!("Start time: {}", self.started_at.format("%Y-%m-%d %H:%M:%S")),
            format!(
                "Connections: {} current, {} total",
                self.current_connections, self.total_connections
            ),
            format!("Logins: {} current, {} total", self.current_logins(), self.logins),
            format!("Uploads: {}", self.uploads),
            format!("Downloads: {}", self.downloads),
            format!("Deletes: {}", self.deletes),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = ServerStatistics::new();
        stats.notify_connection();
        stats.notify_connection();
        stats.notify_login();
        stats.notify_upload();
        stats.notify_download();
        stats.notify_download();
        stats.connection_closed();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_connections, 2);
        assert_eq!(snapshot.current_connections, 1);
        assert_eq!(snapshot.current_logins(), 1);
        assert_eq!(snapshot.uploads, 1);
        assert_eq!(snapshot.downloads, 2);
        assert_eq!(snapshot.format_lines().len(), 6);
    }

    #[test]
    fn test_current_connections_never_underflow() {
        let stats = ServerStatistics::new();
        stats.connection_closed();
        assert_eq!(stats.snapshot().current_connections, 0);
    }
}
