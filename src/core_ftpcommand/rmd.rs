use crate::core_extension::FtpEvent;
use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::intercept::{self, Flow};
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_ftpcommand::utils::file_error;
use log::{error, info};
use tokio::fs;

/// Handles the RMD (Remove Directory) FTP command. Only empty directories
/// are removed; the root and the working directory itself are refused.
pub async fn handle_rmd_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    let arg = request
        .argument()
        .ok_or_else(|| FtpError::reply_with_detail(501, "RMD"))?;
    ctx.require_write_permission()?;
    let (virtual_path, dir_path) = ctx.resolve(arg);

    if virtual_path == "/" || virtual_path == ctx.session.current_dir() {
        return Err(FtpError::reply(550, "Can't remove this directory."));
    }

    let denial = FtpReply::with_detail(550, "RMD");
    if intercept::before(ctx, FtpEvent::RmdirStart(request), denial).await? != Flow::Proceed {
        return Ok(());
    }

    if let Err(e) = fs::remove_dir(&dir_path).await {
        error!("Failed to remove directory: {:?}, error: {}", dir_path, e);
        return Err(file_error(&e));
    }
    info!("Directory removed: {:?}", dir_path);

    let success = FtpReply::new(250, format!("\"{}\" directory removed.", virtual_path));
    intercept::after(ctx, FtpEvent::RmdirEnd(request), success).await
}
