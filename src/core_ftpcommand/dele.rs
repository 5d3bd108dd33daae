use crate::core_extension::FtpEvent;
use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::intercept::{self, Flow};
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_ftpcommand::utils::file_error;
use crate::core_listener::FileEvent;
use crate::helpers::file_name;
use log::{error, info};
use tokio::fs;

/// Handles the DELE (Delete File) FTP command.
///
/// Listeners hear about the deletion only once the file is gone.
///
/// # Arguments
///
/// * `ctx` - The connection's command context.
/// * `request` - The parsed `DELE <file>` request.
///
/// # Returns
///
/// Result<(), FtpError> indicating the success or failure of the operation.
pub async fn handle_dele_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    let arg = request
        .argument()
        .ok_or_else(|| FtpError::reply_with_detail(501, "DELE"))?;
    ctx.require_write_permission()?;
    let (virtual_path, file_path) = ctx.resolve(arg);

    let denial = FtpReply::with_detail(550, "DELE");
    if intercept::before(ctx, FtpEvent::DeleteStart(request), denial).await? != Flow::Proceed {
        return Ok(());
    }

    let is_file = fs::metadata(&file_path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(FtpError::reply(550, "File does not exist."));
    }

    if let Err(e) = fs::remove_file(&file_path).await {
        error!("Failed to delete file: {:?}, error: {}", file_path, e);
        return Err(file_error(&e));
    }
    info!("File deleted: {:?}", file_path);

    let success = FtpReply::new(250, format!("\"{}\" file deleted.", file_name(&virtual_path)));
    let end = FtpEvent::DeleteEnd(request);
    intercept::after_file_action(ctx, end, FileEvent::Delete, &file_path, success).await
}
