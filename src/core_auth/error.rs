// Error handling for the user store
use crate::core_ftpcommand::reply::FtpReply;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Invalid password for user {0}")]
    InvalidPassword(String),

    #[error("Anonymous login is disabled")]
    AnonymousDisabled,

    #[error("Failed to read passwd file {path}: {source}")]
    PasswdReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Password hashing failed: {0}")]
    HashError(#[from] bcrypt::BcryptError),
}

impl AuthError {
    /// Reply for the client. Unknown users and bad passwords look the same.
    pub fn to_ftp_reply(&self) -> FtpReply {
        match self {
            AuthError::UnknownUser(_)
            | AuthError::InvalidPassword(_)
            | AuthError::AnonymousDisabled => FtpReply::new(530, "Login incorrect."),
            _ => FtpReply::with_detail(451, "PASS"),
        }
    }
}
