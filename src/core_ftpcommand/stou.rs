use crate::core_extension::FtpEvent;
use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::intercept::{self, Flow};
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_ftpcommand::utils::{receive_file, WriteMode};
use crate::core_listener::FileEvent;
use crate::helpers::{file_name, sanitize_input};
use log::info;
use std::path::PathBuf;
use tokio::fs;

const MAX_NAME_ATTEMPTS: usize = 16;

/// Handles the STOU (Store Unique) FTP command.
///
/// The optional argument is used as a name prefix; the server picks a name
/// that does not exist yet in the working directory.
pub async fn handle_stou_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    ctx.require_write_permission()?;

    let prefix = request
        .argument()
        .map(sanitize_input)
        .map(|arg| file_name(&arg).to_string())
        .filter(|name| name != "/")
        .unwrap_or_else(|| "ftpletd".to_string());
    let (virtual_path, file_path) = unique_path(ctx, &prefix).await?;

    let denial = FtpReply::with_detail(550, "STOU");
    if intercept::before(ctx, FtpEvent::UploadUniqueStart(request), denial).await?
        != Flow::Proceed
    {
        return Ok(());
    }

    let bytes = receive_file(ctx, &file_path, &virtual_path, WriteMode::Truncate).await?;
    info!("Unique file stored: {:?} ({} bytes)", file_path, bytes);

    let success = FtpReply::new(
        226,
        format!("Transfer complete (unique file name: {}).", file_name(&virtual_path)),
    );
    let end = FtpEvent::UploadUniqueEnd(request);
    intercept::after_file_action(ctx, end, FileEvent::Upload, &file_path, success).await
}

async fn unique_path(ctx: &mut CommandContext, prefix: &str) -> Result<(String, PathBuf), FtpError> {
    for _ in 0..MAX_NAME_ATTEMPTS {
        let candidate = format!("{}.{:08x}", prefix, rand::random::<u32>());
        let (virtual_path, physical) = ctx.resolve(&candidate);
        if fs::metadata(&physical).await.is_err() {
            return Ok((virtual_path, physical));
        }
    }
    Err(FtpError::reply(450, "Unable to generate a unique file name."))
}
