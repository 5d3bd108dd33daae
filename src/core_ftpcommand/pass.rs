use crate::core_extension::FtpEvent;
use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::intercept::{self, Flow};
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_listener::StatisticsEvent;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::task;

/// Handles the PASS FTP command.
///
/// Checks the password of the user named by the preceding USER against the
/// user store, then runs the login interception point. A denied login is
/// rolled back before the reply goes out.
///
/// # Arguments
///
/// * `ctx` - The connection's command context.
/// * `request` - The parsed `PASS <password>` request.
///
/// # Returns
///
/// Result<(), FtpError> indicating the success or failure of the operation.
pub async fn handle_pass_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    if ctx.session.is_logged_in() {
        return ctx.reply(FtpReply::new(230, "Already logged in.")).await;
    }

    let Some(username) = ctx.session.take_pending_user()? else {
        return Err(FtpError::reply(503, "Login with USER first."));
    };
    let password = request.argument().unwrap_or_default().to_string();

    // bcrypt is CPU bound, keep it off the reactor.
    let users = Arc::clone(&ctx.server.user_manager);
    let name = username.clone();
    let result = task::spawn_blocking(move || users.authenticate(&name, &password))
        .await
        .map_err(|e| {
            error!("User store lookup for {} did not complete: {}", username, e);
            FtpError::reply_with_detail(451, "PASS")
        })?;

    let user = match result {
        Ok(user) => user,
        Err(e) => {
            warn!("Session {}: login failed for {}: {}", ctx.session.id(), username, e);
            return Err(FtpError::Protocol(e.to_ftp_reply()));
        }
    };

    ctx.session.login(user)?;
    let denial = FtpReply::new(530, "Login denied.");
    match intercept::before(ctx, FtpEvent::Login(request), denial).await? {
        Flow::Proceed => {}
        Flow::Denied => {
            ctx.session.logout()?;
            return Ok(());
        }
        Flow::Handled => {
            ctx.server
                .notifier
                .statistics_event(StatisticsEvent::Login)
                .await;
            return Ok(());
        }
    }

    info!("Session {}: user {} logged in", ctx.session.id(), username);
    ctx.server
        .notifier
        .statistics_event(StatisticsEvent::Login)
        .await;
    ctx.reply(FtpReply::with_detail(230, "PASS")).await
}
