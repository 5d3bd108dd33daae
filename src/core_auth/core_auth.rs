use crate::core_auth::User;

/// One line of the passwd file: `username:bcrypt_hash[:home[:flags]]`.
///
/// `flags` is a comma separated list of `write` and `admin`.
#[derive(Debug, Clone)]
pub struct PasswdEntry {
    username: String,
    hashed_password: String,
    home_dir: String,
    write_permission: bool,
    admin: bool,
}

impl PasswdEntry {
    pub fn from_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        // bcrypt hashes contain '$' but never ':'
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() < 2 || parts.len() > 4 || parts[0].is_empty() || parts[1].is_empty() {
            return None;
        }

        let home_dir = parts
            .get(2)
            .filter(|home| !home.is_empty())
            .map(|home| home.to_string())
            .unwrap_or_else(|| "/".to_string());
        let flags: Vec<&str> = parts
            .get(3)
            .map(|flags| flags.split(',').map(str::trim).collect())
            .unwrap_or_default();

        Some(PasswdEntry {
            username: parts[0].to_string(),
            hashed_password: parts[1].to_string(),
            home_dir,
            write_permission: flags.contains(&"write"),
            admin: flags.contains(&"admin"),
        })
    }

    pub fn get_hashed_password(&self) -> &str {
        &self.hashed_password
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn to_user(&self) -> User {
        User {
            name: self.username.clone(),
            home_dir: self.home_dir.clone(),
            write_permission: self.write_permission,
            admin: self.admin,
        }
    }
}
