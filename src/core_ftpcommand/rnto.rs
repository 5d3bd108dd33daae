use crate::core_extension::FtpEvent;
use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::intercept::{self, Flow};
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_ftpcommand::utils::file_error;
use crate::helpers::physical_path;
use log::{error, info};
use tokio::fs;

/// Handles the RNTO (Rename To) FTP command.
///
/// The pending RNFR source is consumed before anything can fail, so the
/// session is back to idle whatever the outcome.
///
/// # Arguments
///
/// * `ctx` - The connection's command context.
/// * `request` - The parsed `RNTO <target>` request.
///
/// # Returns
///
/// Result<(), FtpError> indicating the success or failure of the operation.
pub async fn handle_rnto_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    let arg = request
        .argument()
        .ok_or_else(|| FtpError::reply_with_detail(501, "RNTO"))?;

    let Some(source) = ctx.session.take_rename()? else {
        return Err(FtpError::reply(503, "Bad sequence of commands. Send RNFR first."));
    };
    ctx.require_write_permission()?;

    let source_virtual = source.to_string_lossy().into_owned();
    let source_path = physical_path(&ctx.server.root, &source_virtual);
    let (target_virtual, target_path) = ctx.resolve(arg);

    let denial = FtpReply::with_detail(550, "RNTO");
    if intercept::before(ctx, FtpEvent::RenameStart(request), denial).await? != Flow::Proceed {
        return Ok(());
    }

    if let Err(e) = fs::rename(&source_path, &target_path).await {
        error!(
            "Failed to rename {:?} to {:?}, error: {}",
            source_path, target_path, e
        );
        return Err(file_error(&e));
    }
    info!("Renamed {} to {}", source_virtual, target_virtual);

    let success = FtpReply::new(250, "Rename successful.");
    intercept::after(ctx, FtpEvent::RenameEnd(request), success).await
}
