use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;

pub async fn handle_help_command(ctx: &mut CommandContext) -> Result<(), FtpError> {
    ctx.reply(FtpReply::multiline(
        214,
        [
            "The following SITE commands are recognized:",
            " HELP",
            " STAT",
            " EXTENSIONS",
            "End",
        ],
    ))
    .await
}
