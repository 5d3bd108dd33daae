use crate::constants::SYSTEM_TYPE;
use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;

pub async fn handle_syst_command(
    ctx: &mut CommandContext,
    _request: &FtpRequest,
) -> Result<(), FtpError> {
    ctx.reply(FtpReply::new(215, SYSTEM_TYPE)).await
}
