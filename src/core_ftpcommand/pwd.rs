use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;

pub async fn handle_pwd_command(
    ctx: &mut CommandContext,
    _request: &FtpRequest,
) -> Result<(), FtpError> {
    let message = format!(
        "\"{}\" is current directory.",
        ctx.session.current_dir().replace('"', "\"\"")
    );
    ctx.reply(FtpReply::new(257, message)).await
}
