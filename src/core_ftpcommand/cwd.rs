use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use log::{info, warn};
use tokio::fs;

/// Handles the CWD FTP command.
///
/// The target is resolved against the current virtual directory and must
/// exist as a directory below the server root.
pub async fn handle_cwd_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    let arg = request
        .argument()
        .ok_or_else(|| FtpError::reply_with_detail(501, "CWD"))?;
    change_directory(ctx, arg).await
}

pub(crate) async fn change_directory(ctx: &mut CommandContext, arg: &str) -> Result<(), FtpError> {
    let (virtual_path, dir_path) = ctx.resolve(arg);

    let is_dir = fs::metadata(&dir_path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    if !is_dir {
        warn!("Session {}: no such directory {:?}", ctx.session.id(), dir_path);
        return Err(FtpError::reply(550, "Failed to change directory."));
    }

    info!("Session {}: working directory is now {}", ctx.session.id(), virtual_path);
    ctx.session.set_current_dir(virtual_path)?;
    ctx.reply(FtpReply::new(250, "Directory successfully changed."))
        .await
}
