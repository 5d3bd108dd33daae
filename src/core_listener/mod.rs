// Fire-and-forget observers of completed actions

pub mod listener;
pub mod notifier;
pub mod stats;
pub mod transfer_log;

pub use listener::{FileEvent, FileListener, StatisticsEvent, StatisticsListener};
pub use notifier::Notifier;
pub use stats::ServerStatistics;
pub use transfer_log::TransferLog;
