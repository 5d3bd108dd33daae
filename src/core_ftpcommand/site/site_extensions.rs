use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use log::warn;

/// Lists installed extensions in the order they are consulted. Admins only.
pub async fn handle_extensions_command(ctx: &mut CommandContext) -> Result<(), FtpError> {
    let is_admin = ctx.session.user().map(|u| u.admin).unwrap_or(false);
    if !is_admin {
        warn!("Session {}: SITE EXTENSIONS refused, not an admin", ctx.session.id());
        return Err(FtpError::reply(530, "Permission denied."));
    }

    let names = ctx.server.registry.names();
    let mut lines = vec![format!("{} extension(s) installed:", names.len())];
    lines.extend(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| format!(" {}. {}", i + 1, name)),
    );
    lines.push("End".to_string());
    ctx.reply(FtpReply::multiline(211, lines)).await
}
