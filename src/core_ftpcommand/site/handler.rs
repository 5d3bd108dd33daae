use crate::core_extension::FtpEvent;
use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::intercept::{self, Flow};
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_ftpcommand::site::site_extensions::handle_extensions_command;
use crate::core_ftpcommand::site::site_help::handle_help_command;
use crate::core_ftpcommand::site::site_stat::handle_stat_command;
use log::{info, warn};

pub async fn handle_site_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    let arg = request
        .argument()
        .ok_or_else(|| FtpError::reply_with_detail(501, "SITE"))?;

    let denial = FtpReply::with_detail(550, "SITE");
    if intercept::before(ctx, FtpEvent::Site(request), denial).await? != Flow::Proceed {
        return Ok(());
    }

    let mut args = arg.split_whitespace();
    let subcommand = args.next().unwrap_or_default().to_ascii_uppercase();
    let sub_args: Vec<&str> = args.collect();

    match subcommand.as_str() {
        "HELP" => handle_help_command(ctx).await,
        "STAT" => {
            info!("Handling SITE STAT for session {}", ctx.session.id());
            handle_stat_command(ctx).await
        }
        "EXTENSIONS" => {
            info!("Handling SITE EXTENSIONS with args: {:?}", sub_args);
            handle_extensions_command(ctx).await
        }
        _ => {
            warn!("Unknown SITE subcommand: {}", subcommand);
            Err(FtpError::reply_with_detail(504, "SITE"))
        }
    }
}
