use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_tls::TlsError;
use log::{error, info, warn};
use std::sync::Arc;

/// Handles the AUTH FTP command (secure upgrade).
///
/// The command always starts a fresh protocol turn, so sequencing state is
/// reset before anything else. Syntax errors, unknown mechanisms and a
/// missing certificate are answered on the plaintext channel and leave the
/// session usable. Once `234` is sent the plaintext transport is handed
/// to the transport factory; if that fails the channel is gone and the
/// error is returned to end the connection.
///
/// # Arguments
///
/// * `ctx` - The connection's command context.
/// * `request` - The parsed `AUTH <mechanism>` request.
///
/// # Returns
///
/// Result<(), FtpError> indicating the success or failure of the operation.
pub async fn handle_auth_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    ctx.session.reset_state()?;

    let Some(mechanism) = request.argument() else {
        return Err(FtpError::reply_with_detail(501, "AUTH"));
    };

    let detail = match mechanism.to_ascii_uppercase().as_str() {
        "SSL" => "AUTH.SSL",
        "TLS" => "AUTH.TLS",
        _ => {
            warn!(
                "Session {}: unsupported AUTH mechanism {:?}",
                ctx.session.id(),
                mechanism
            );
            return Err(FtpError::reply_with_detail(502, "AUTH"));
        }
    };

    let factory = Arc::clone(&ctx.server.transport_factory);
    if !factory.is_secure_configured() {
        return Err(FtpError::reply_with_detail(431, "AUTH"));
    }

    ctx.reply(FtpReply::with_detail(234, detail)).await?;

    match ctx.channel.upgrade(factory.as_ref()).await {
        Ok(()) => {
            ctx.session.mark_secure()?;
            info!("Session {}: control channel secured ({})", ctx.session.id(), detail);
            Ok(())
        }
        Err(e @ TlsError::Rejected(_)) => {
            // The plaintext transport went to the factory; there is nowhere
            // left to send the refusal.
            warn!("Session {}: {}", ctx.session.id(), e);
            Err(FtpError::Handshake(e))
        }
        Err(e) => {
            error!("Session {}: secure upgrade failed: {}", ctx.session.id(), e);
            Err(FtpError::Handshake(e))
        }
    }
}
