// Error handling for the extension registry
use crate::session::SessionError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtensionError {
    #[error("Extension with name \"{0}\" already registered")]
    DuplicateName(String),

    #[error("Extension hook failed: {0}")]
    HookFailed(String),

    #[error("Extension \"{name}\" failed to initialize: {reason}")]
    InitFailed { name: String, reason: String },

    #[error("Extension \"{name}\" failed to destroy: {reason}")]
    DestroyFailed { name: String, reason: String },

    #[error("Extension panicked: {0}")]
    Panicked(String),

    #[error("Invalid extension configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}
