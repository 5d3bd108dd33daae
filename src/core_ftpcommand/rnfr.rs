use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use log::{info, warn};
use std::path::PathBuf;
use tokio::fs;

/// Handles the RNFR (Rename From) FTP command.
///
/// Records the source in the session; the pending source stays set until
/// the next RNTO, even if other commands come in between.
pub async fn handle_rnfr_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    let arg = request
        .argument()
        .ok_or_else(|| FtpError::reply_with_detail(501, "RNFR"))?;
    ctx.require_write_permission()?;
    let (virtual_path, source_path) = ctx.resolve(arg);

    if fs::metadata(&source_path).await.is_err() {
        warn!("RNFR source does not exist: {:?}", source_path);
        return Err(FtpError::reply(550, "File not found."));
    }

    info!("Session {}: rename pending from {}", ctx.session.id(), virtual_path);
    ctx.session.begin_rename(PathBuf::from(virtual_path))?;
    ctx.reply(FtpReply::new(350, "Ready for RNTO.")).await
}
