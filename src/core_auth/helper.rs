use crate::core_auth::core_auth::PasswdEntry;
use crate::core_auth::{AuthError, User, UserManager};
use bcrypt::{hash, verify, DEFAULT_COST};
use log::{info, warn};
use std::collections::HashMap;
use std::fs;

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    Ok(hash(password, DEFAULT_COST)?)
}

pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    verify(password, hashed_password).unwrap_or(false)
}

/// Passwd-file backed user store.
pub struct PasswdUserManager {
    entries: HashMap<String, PasswdEntry>,
    allow_anonymous: bool,
}

impl PasswdUserManager {
    pub fn new(entries: Vec<PasswdEntry>, allow_anonymous: bool) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.get_username().to_string(), entry))
            .collect();
        Self {
            entries,
            allow_anonymous,
        }
    }

    pub fn load(path: Option<&str>, allow_anonymous: bool) -> Result<Self, AuthError> {
        let Some(path) = path else {
            info!("No passwd file configured, only anonymous logins possible");
            return Ok(Self::new(Vec::new(), allow_anonymous));
        };

        let content = fs::read_to_string(path).map_err(|source| AuthError::PasswdReadError {
            path: path.to_string(),
            source,
        })?;
        let entries: Vec<PasswdEntry> = content.lines().filter_map(PasswdEntry::from_line).collect();
        info!("Loaded {} user(s) from {}", entries.len(), path);

        Ok(Self::new(entries, allow_anonymous))
    }

    pub fn user_count(&self) -> usize {
        self.entries.len()
    }
}

impl UserManager for PasswdUserManager {
    fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        if username.eq_ignore_ascii_case("anonymous") || username.eq_ignore_ascii_case("ftp") {
            if !self.allow_anonymous {
                return Err(AuthError::AnonymousDisabled);
            }
            info!("Anonymous login, password (email) given: {}", !password.is_empty());
            return Ok(User::anonymous());
        }

        let entry = self
            .entries
            .get(username)
            .ok_or_else(|| AuthError::UnknownUser(username.to_string()))?;

        if verify_password(password, entry.get_hashed_password()) {
            Ok(entry.to_user())
        } else {
            warn!("Password mismatch for user {}", username);
            Err(AuthError::InvalidPassword(username.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn manager(allow_anonymous: bool) -> PasswdUserManager {
        let hashed = bcrypt::hash("secret", 4).unwrap();
        let line = format!("alice:{}:/home/alice:write", hashed);
        PasswdUserManager::new(vec![PasswdEntry::from_line(&line).unwrap()], allow_anonymous)
    }

    #[test]
    fn test_authenticate_known_user() {
        let user = manager(false).authenticate("alice", "secret").unwrap();
        assert_eq!(user.name, "alice");
        assert!(user.write_permission);
    }

    #[test]
    fn test_wrong_password_and_unknown_user() {
        let manager = manager(false);
        assert!(matches!(
            manager.authenticate("alice", "nope"),
            Err(AuthError::InvalidPassword(_))
        ));
        assert!(matches!(
            manager.authenticate("mallory", "secret"),
            Err(AuthError::UnknownUser(_))
        ));
        assert_eq!(
            manager.authenticate("mallory", "x").unwrap_err().to_ftp_reply().code(),
            530
        );
    }

    #[test]
    fn test_anonymous_policy() {
        assert!(matches!(
            manager(false).authenticate("anonymous", "me@example.org"),
            Err(AuthError::AnonymousDisabled)
        ));
        let user = manager(true).authenticate("ANONYMOUS", "").unwrap();
        assert!(!user.write_permission);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let hashed = bcrypt::hash("pw", 4).unwrap();
        writeln!(file, "# users").unwrap();
        writeln!(file, "carol:{}", hashed).unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let manager = PasswdUserManager::load(Some(&path), false).unwrap();
        assert_eq!(manager.user_count(), 1);
        assert!(manager.authenticate("carol", "pw").is_ok());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(matches!(
            PasswdUserManager::load(Some("/nonexistent/passwd"), false),
            Err(AuthError::PasswdReadError { .. })
        ));
    }
}
