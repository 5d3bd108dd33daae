// Applies interception outcomes around a file action

use crate::core_extension::{FtpEvent, Outcome};
use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::utils::notify_file_listeners;
use crate::core_listener::FileEvent;
use log::{debug, info};
use std::path::Path;

/// Whether the handler should go on with the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Proceed,
    Denied,
    Handled,
}

/// Consults extensions before an action.
///
/// On `Deny` the queued extension replies are sent, or `denial` when there
/// are none. On `AlreadyHandled` the queued replies are sent, or a plain
/// `200`. Either way the handler must not perform the action.
pub async fn before(
    ctx: &mut CommandContext,
    event: FtpEvent<'_>,
    denial: FtpReply,
) -> Result<Flow, FtpError> {
    let outcome = ctx.intercept(event);
    let sent = ctx.flush_replies().await?;

    match outcome {
        Outcome::Default => Ok(Flow::Proceed),
        Outcome::Deny => {
            info!("Session {}: {} denied by extension", ctx.session.id(), event.name());
            if sent == 0 {
                ctx.reply(denial).await?;
            }
            Ok(Flow::Denied)
        }
        Outcome::AlreadyHandled => {
            debug!("Session {}: {} handled by extension", ctx.session.id(), event.name());
            if sent == 0 {
                ctx.reply(FtpReply::with_detail(200, event.name())).await?;
            }
            Ok(Flow::Handled)
        }
    }
}

/// Consults extensions after an action and sends the final reply.
///
/// The action already happened, so no outcome can undo it. A non-default
/// outcome lets queued extension replies stand in for `success`.
pub async fn after(
    ctx: &mut CommandContext,
    event: FtpEvent<'_>,
    success: FtpReply,
) -> Result<(), FtpError> {
    finish(ctx, event, None, success).await
}

/// Same as [`after`] for actions on a file: the file listeners hear about
/// `path` once the end hooks have run, before any reply goes out.
pub async fn after_file_action(
    ctx: &mut CommandContext,
    event: FtpEvent<'_>,
    file_event: FileEvent,
    path: &Path,
    success: FtpReply,
) -> Result<(), FtpError> {
    finish(ctx, event, Some((file_event, path)), success).await
}

async fn finish(
    ctx: &mut CommandContext,
    event: FtpEvent<'_>,
    notification: Option<(FileEvent, &Path)>,
    success: FtpReply,
) -> Result<(), FtpError> {
    let outcome = ctx.intercept(event);
    let queued = ctx.session.take_replies();

    if let Some((file_event, path)) = notification {
        notify_file_listeners(ctx, file_event, path).await;
    }

    let sent = queued.len();
    for reply in queued {
        ctx.reply(reply).await?;
    }

    if outcome != Outcome::Default {
        info!(
            "Session {}: extension returned {:?} on {}, action already done",
            ctx.session.id(),
            outcome,
            event.name()
        );
        if sent > 0 {
            return Ok(());
        }
    }
    ctx.reply(success).await
}
