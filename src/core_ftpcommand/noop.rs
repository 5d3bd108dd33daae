use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;

pub async fn handle_noop_command(
    ctx: &mut CommandContext,
    _request: &FtpRequest,
) -> Result<(), FtpError> {
    ctx.reply(FtpReply::with_detail(200, "NOOP")).await
}
