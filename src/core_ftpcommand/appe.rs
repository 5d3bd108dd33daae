use crate::core_extension::FtpEvent;
use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::intercept::{self, Flow};
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_ftpcommand::utils::{receive_file, WriteMode};
use crate::core_listener::FileEvent;
use log::info;

/// Handles the APPE (Append) FTP command. Creates the file when missing.
pub async fn handle_appe_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    let arg = request
        .argument()
        .ok_or_else(|| FtpError::reply_with_detail(501, "APPE"))?;
    ctx.require_write_permission()?;
    let (virtual_path, file_path) = ctx.resolve(arg);

    let denial = FtpReply::with_detail(550, "APPE");
    if intercept::before(ctx, FtpEvent::AppendStart(request), denial).await? != Flow::Proceed {
        return Ok(());
    }

    let bytes = receive_file(ctx, &file_path, &virtual_path, WriteMode::Append).await?;
    info!("Appended {} bytes to {:?}", bytes, file_path);

    let success = FtpReply::new(226, "File transfer complete.");
    let end = FtpEvent::AppendEnd(request);
    intercept::after_file_action(ctx, end, FileEvent::Upload, &file_path, success).await
}
