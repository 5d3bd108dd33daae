use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use log::info;

/// Handles the QUIT FTP command. The connection loop closes the session
/// once the reply is out.
pub async fn handle_quit_command(
    ctx: &mut CommandContext,
    _request: &FtpRequest,
) -> Result<(), FtpError> {
    info!("Session {}: QUIT", ctx.session.id());
    ctx.session.request_quit()?;
    ctx.reply(FtpReply::new(221, "Goodbye.")).await
}
