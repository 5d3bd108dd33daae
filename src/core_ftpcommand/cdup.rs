use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::cwd::change_directory;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::request::FtpRequest;

pub async fn handle_cdup_command(
    ctx: &mut CommandContext,
    _request: &FtpRequest,
) -> Result<(), FtpError> {
    change_directory(ctx, "..").await
}
