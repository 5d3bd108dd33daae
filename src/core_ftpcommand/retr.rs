use crate::core_extension::FtpEvent;
use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::intercept::{self, Flow};
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_ftpcommand::utils::send_file;
use crate::core_listener::FileEvent;
use log::info;

/// Handles the RETR (Retrieve) FTP command.
///
/// This function sends a file below the server root to the client over the
/// prepared data connection.
///
/// # Arguments
///
/// * `ctx` - The connection's command context.
/// * `request` - The parsed `RETR <file>` request.
///
/// # Returns
///
/// Result<(), FtpError> indicating the success or failure of the operation.
pub async fn handle_retr_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    let arg = request
        .argument()
        .ok_or_else(|| FtpError::reply_with_detail(501, "RETR"))?;
    let (virtual_path, file_path) = ctx.resolve(arg);

    let denial = FtpReply::with_detail(550, "RETR");
    if intercept::before(ctx, FtpEvent::DownloadStart(request), denial).await? != Flow::Proceed {
        return Ok(());
    }

    let bytes = send_file(ctx, &file_path, &virtual_path).await?;
    info!("File transfer completed successfully: {:?} ({} bytes)", file_path, bytes);

    let success = FtpReply::new(226, "Transfer complete.");
    let end = FtpEvent::DownloadEnd(request);
    intercept::after_file_action(ctx, end, FileEvent::Download, &file_path, success).await
}
