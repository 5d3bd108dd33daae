use crate::core_extension::FtpEvent;
use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::intercept::{self, Flow};
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_ftpcommand::utils::{receive_file, WriteMode};
use crate::core_listener::FileEvent;
use log::info;

/// Handles the STOR (Store File) FTP command.
///
/// This function stores a file uploaded by the client below the server root,
/// relative to the session's working directory. Needs a data connection
/// prepared by PASV or PORT.
///
/// # Arguments
///
/// * `ctx` - The connection's command context.
/// * `request` - The parsed `STOR <file>` request.
///
/// # Returns
///
/// Result<(), FtpError> indicating the success or failure of the operation.
pub async fn handle_stor_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    let arg = request
        .argument()
        .ok_or_else(|| FtpError::reply_with_detail(501, "STOR"))?;
    ctx.require_write_permission()?;
    let (virtual_path, file_path) = ctx.resolve(arg);

    let denial = FtpReply::with_detail(550, "STOR");
    if intercept::before(ctx, FtpEvent::UploadStart(request), denial).await? != Flow::Proceed {
        return Ok(());
    }

    let bytes = receive_file(ctx, &file_path, &virtual_path, WriteMode::Truncate).await?;
    info!("File stored successfully: {:?} ({} bytes)", file_path, bytes);

    let success = FtpReply::new(226, "File transfer complete.");
    let end = FtpEvent::UploadEnd(request);
    intercept::after_file_action(ctx, end, FileEvent::Upload, &file_path, success).await
}
