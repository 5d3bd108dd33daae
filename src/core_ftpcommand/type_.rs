use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::session::TransferType;

/// Handles the TYPE FTP command. Only `A` (ASCII) and `I` (image) are
/// supported; a trailing format control such as `A N` is accepted.
pub async fn handle_type_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    let arg = request
        .argument()
        .ok_or_else(|| FtpError::reply_with_detail(501, "TYPE"))?;

    let transfer_type = match arg.split_whitespace().next().map(|t| t.to_ascii_uppercase()) {
        Some(t) if t == "A" => TransferType::Ascii,
        Some(t) if t == "I" || t == "L" => TransferType::Image,
        _ => return Err(FtpError::reply_with_detail(504, "TYPE")),
    };

    ctx.session.set_transfer_type(transfer_type)?;
    let name = match transfer_type {
        TransferType::Ascii => "ASCII",
        TransferType::Image => "BINARY",
    };
    ctx.reply(FtpReply::new(200, format!("Switching to {} mode.", name)))
        .await
}
