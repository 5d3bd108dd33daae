// src/constants.rs

pub const USERNAME_REGEX: &str = r"^[a-zA-Z0-9_.\-]{1,32}$";

pub const DEFAULT_CONFIG_PATH: &str = if cfg!(target_os = "windows") {
    "C:\\ftpletd\\etc\\ftpletd.conf"
} else {
    "/etc/ftpletd.conf"
};

pub const DEFAULT_BANNER: &str = "ftpletd ready.";
pub const SYSTEM_TYPE: &str = "UNIX Type: L8";

/// Longest control line accepted, terminator included.
pub const MAX_LINE_LENGTH: usize = 4096;

pub const PASSIVE_ACCEPT_TIMEOUT_SECS: u64 = 30;
pub const SHUTDOWN_GRACE_SECS: u64 = 10;
/// Extra wait, past the grace period, for sessions to finish their teardown.
pub const SHUTDOWN_TEARDOWN_SECS: u64 = 5;
