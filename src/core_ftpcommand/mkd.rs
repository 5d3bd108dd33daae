use crate::core_extension::FtpEvent;
use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::intercept::{self, Flow};
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_ftpcommand::utils::file_error;
use log::{error, info, warn};
use tokio::fs;

/// Handles the MKD (Make Directory) FTP command.
///
/// The directory is created below the server root, relative to the
/// session's working directory. Extensions are consulted before
/// (`mkdir_start`, may deny) and after (`mkdir_end`) the creation.
///
/// # Arguments
///
/// * `ctx` - The connection's command context.
/// * `request` - The parsed `MKD <dir>` request.
///
/// # Returns
///
/// Result<(), FtpError> indicating the success or failure of the operation.
pub async fn handle_mkd_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    let arg = request
        .argument()
        .ok_or_else(|| FtpError::reply_with_detail(501, "MKD"))?;
    ctx.require_write_permission()?;
    let (virtual_path, dir_path) = ctx.resolve(arg);

    let denial = FtpReply::with_detail(550, "MKD");
    if intercept::before(ctx, FtpEvent::MkdirStart(request), denial).await? != Flow::Proceed {
        return Ok(());
    }

    if fs::metadata(&dir_path).await.is_ok() {
        warn!("Directory already exists: {:?}", dir_path);
        return Err(FtpError::reply(550, "Directory already exists."));
    }

    if let Err(e) = fs::create_dir(&dir_path).await {
        error!("Failed to create directory: {:?}, error: {}", dir_path, e);
        return Err(file_error(&e));
    }
    info!("Directory created successfully: {:?}", dir_path);

    let success = FtpReply::new(
        257,
        format!("\"{}\" directory created.", virtual_path.replace('"', "\"\"")),
    );
    intercept::after(ctx, FtpEvent::MkdirEnd(request), success).await
}
