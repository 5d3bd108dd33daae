// User store used by USER/PASS.

pub mod core_auth;
pub mod error;
pub mod helper;

pub use core_auth::PasswdEntry;
pub use error::AuthError;
pub use helper::PasswdUserManager;

/// An authenticated user, as handed out by a [`UserManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    /// Virtual directory the session starts in after login.
    pub home_dir: String,
    pub write_permission: bool,
    pub admin: bool,
}

impl User {
    pub fn anonymous() -> Self {
        Self {
            name: "anonymous".to_string(),
            home_dir: "/".to_string(),
            write_permission: false,
            admin: false,
        }
    }
}

/// Lookup-by-identity contract for login handling.
pub trait UserManager: Send + Sync {
    fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError>;
}
