use crate::core_listener::listener::FileListener;
use crate::session::SessionId;
use log::info;
use std::path::Path;

/// xferlog-style line per completed upload, download or delete.
pub struct TransferLog;

impl FileListener for TransferLog {
    fn notify_upload(&self, file: &Path, session_id: SessionId) {
        info!("xfer session={} direction=i file={}", session_id, file.display());
    }

    fn notify_download(&self, file: &Path, session_id: SessionId) {
        info!("xfer session={} direction=o file={}", session_id, file.display());
    }

    fn notify_delete(&self, file: &Path, session_id: SessionId) {
        info!("xfer session={} direction=d file={}", session_id, file.display());
    }
}
