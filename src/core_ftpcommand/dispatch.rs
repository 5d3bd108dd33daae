// Routes one control-channel line to its handler

use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use log::{debug, info, warn};
use std::sync::Arc;

/// Parses `line` and runs the matching handler.
///
/// Unknown verbs get `502` whatever the session state, and are checked
/// before the login gate (`530`). A handler's recoverable
/// [`FtpError::Protocol`] reply is written here; any other error is
/// returned and ends the connection.
pub async fn dispatch(ctx: &mut CommandContext, line: &str) -> Result<(), FtpError> {
    let Some(request) = FtpRequest::parse(line) else {
        debug!("Session {}: ignoring empty command line", ctx.session.id());
        return Ok(());
    };
    info!("Session {}: {}", ctx.session.id(), request.loggable());

    let Some(command) = FtpCommand::from_str(request.verb()) else {
        warn!("Session {}: unknown command {}", ctx.session.id(), request.verb());
        return ctx.reply(FtpReply::with_detail(502, request.verb())).await;
    };

    let Some(handler) = ctx.server.handlers.get(&command).map(Arc::clone) else {
        warn!("No handler registered for {:?}", command);
        return ctx.reply(FtpReply::with_detail(502, request.verb())).await;
    };

    if command.requires_login() && !ctx.session.is_logged_in() {
        return ctx
            .reply(FtpReply::new(530, "Please login with USER and PASS."))
            .await;
    }

    match handler(ctx, &request).await {
        Ok(()) => Ok(()),
        Err(FtpError::Protocol(reply)) => {
            debug!("Session {}: {} failed with {}", ctx.session.id(), request.verb(), reply);
            ctx.reply(reply).await
        }
        Err(e) => Err(e),
    }
}
