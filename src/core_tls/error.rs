// Error handling for the TLS module
use crate::core_ftpcommand::reply::FtpReply;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TlsError {
    #[error("Failed to load SSL certificate: {0}")]
    CertificateLoadError(String),

    #[error("Failed to load SSL private key: {0}")]
    PrivateKeyLoadError(String),

    #[error("TLS configuration error: {0}")]
    TlsConfigError(String),

    #[error("TLS handshake failed: {0}")]
    TlsHandshakeError(#[source] std::io::Error),

    /// Refusal that already carries the reply for the client.
    #[error("TLS upgrade rejected: {0}")]
    Rejected(FtpReply),

    #[error("TLS not configured")]
    TlsNotConfigured,

    #[error("Control channel unavailable for upgrade")]
    ChannelClosed,
}

impl TlsError {
    pub fn to_ftp_reply(&self) -> FtpReply {
        match self {
            TlsError::TlsNotConfigured => FtpReply::with_detail(431, "AUTH"),
            TlsError::Rejected(reply) => reply.clone(),
            _ => FtpReply::new(421, "TLS negotiation failed, closing control connection."),
        }
    }
}
