// Error taxonomy for command dispatch
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_tls::TlsError;
use crate::session::SessionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FtpError {
    /// Recoverable: the reply is written and the connection stays usable.
    #[error("protocol error: {0}")]
    Protocol(FtpReply),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("secure upgrade failed: {0}")]
    Handshake(#[source] TlsError),

    #[error("control channel I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FtpError {
    pub fn reply(code: u16, message: impl Into<String>) -> Self {
        FtpError::Protocol(FtpReply::new(code, message))
    }

    pub fn reply_with_detail(code: u16, detail: &str) -> Self {
        FtpError::Protocol(FtpReply::with_detail(code, detail))
    }
}
