use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;

/// Server-wide counters collected by the statistics listener.
pub async fn handle_stat_command(ctx: &mut CommandContext) -> Result<(), FtpError> {
    let snapshot = ctx.server.statistics.snapshot();
    let mut lines = vec!["Server statistics:".to_string()];
    lines.extend(snapshot.format_lines().into_iter().map(|l| format!(" {}", l)));
    lines.push("End".to_string());
    ctx.reply(FtpReply::multiline(211, lines)).await
}
