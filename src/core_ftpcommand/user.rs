use crate::constants::USERNAME_REGEX;
use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::helpers::sanitize_input;
use log::{info, warn};
use regex::Regex;
use std::sync::OnceLock;

/// Compiled once per process.
fn username_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(USERNAME_REGEX).ok())
        .as_ref()
}

/// Handles the USER FTP command.
///
/// Remembers the user name until the following PASS. Anonymous names are
/// accepted as typed; other names must match the allowed user name pattern.
///
/// # Arguments
///
/// * `ctx` - The connection's command context.
/// * `request` - The parsed `USER <name>` request.
///
/// # Returns
///
/// Result<(), FtpError> indicating the success or failure of the operation.
pub async fn handle_user_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    let username = request
        .argument()
        .map(sanitize_input)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| FtpError::reply_with_detail(501, "USER"))?;

    if ctx.session.is_logged_in() {
        warn!("Session {}: USER while already logged in", ctx.session.id());
        return Err(FtpError::reply(530, "Can't change to another user."));
    }

    let anonymous =
        username.eq_ignore_ascii_case("anonymous") || username.eq_ignore_ascii_case("ftp");
    let valid = username_pattern().is_some_and(|re| re.is_match(&username));
    if !anonymous && !valid {
        warn!("Session {}: rejected user name {:?}", ctx.session.id(), username);
        return Err(FtpError::reply(501, "Invalid user name."));
    }

    info!("Session {}: USER {}", ctx.session.id(), username);
    ctx.session.set_pending_user(&username)?;
    ctx.reply(FtpReply::new(
        331,
        format!("User {} okay, need password.", username),
    ))
    .await
}
