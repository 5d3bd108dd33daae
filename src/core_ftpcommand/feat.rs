use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;

/// Handles the FEAT FTP command. `AUTH` is only advertised when a
/// certificate is configured.
pub async fn handle_feat_command(
    ctx: &mut CommandContext,
    _request: &FtpRequest,
) -> Result<(), FtpError> {
    let mut lines = vec!["Extensions supported:".to_string()];
    if ctx.server.transport_factory.is_secure_configured() {
        lines.push(" AUTH SSL".to_string());
        lines.push(" AUTH TLS".to_string());
    }
    lines.push(" UTF8".to_string());
    lines.push("End".to_string());
    ctx.reply(FtpReply::multiline(211, lines)).await
}
