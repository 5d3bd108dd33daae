use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_ftpcommand::{
    appe, auth, cdup, cwd, dele, feat, list, mkd, noop, pass, pwd, quit, retr, rmd, rnfr, rnto,
    site, stor, stou, syst, type_, user,
};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

// Specific crates for PORT and PASV commands
use crate::core_network::pasv;
use crate::core_network::port;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), FtpError>> + Send + 'a>>;

pub type CommandHandler =
    Box<dyn for<'a> Fn(&'a mut CommandContext, &'a FtpRequest) -> HandlerFuture<'a> + Send + Sync>;

fn handler<F>(f: F) -> Arc<CommandHandler>
where
    F: for<'a> Fn(&'a mut CommandContext, &'a FtpRequest) -> HandlerFuture<'a>
        + Send
        + Sync
        + 'static,
{
    Arc::new(Box::new(f))
}

pub fn initialize_command_handlers() -> HashMap<FtpCommand, Arc<CommandHandler>> {
    let mut handlers: HashMap<FtpCommand, Arc<CommandHandler>> = HashMap::new();

    handlers.insert(
        FtpCommand::USER,
        handler(|ctx, req| Box::pin(user::handle_user_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::PASS,
        handler(|ctx, req| Box::pin(pass::handle_pass_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::QUIT,
        handler(|ctx, req| Box::pin(quit::handle_quit_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::AUTH,
        handler(|ctx, req| Box::pin(auth::handle_auth_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::NOOP,
        handler(|ctx, req| Box::pin(noop::handle_noop_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::SYST,
        handler(|ctx, req| Box::pin(syst::handle_syst_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::FEAT,
        handler(|ctx, req| Box::pin(feat::handle_feat_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::PWD,
        handler(|ctx, req| Box::pin(pwd::handle_pwd_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::CWD,
        handler(|ctx, req| Box::pin(cwd::handle_cwd_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::CDUP,
        handler(|ctx, req| Box::pin(cdup::handle_cdup_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::TYPE,
        handler(|ctx, req| Box::pin(type_::handle_type_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::PASV,
        handler(|ctx, req| Box::pin(pasv::handle_pasv_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::PORT,
        handler(|ctx, req| Box::pin(port::handle_port_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::LIST,
        handler(|ctx, req| Box::pin(list::handle_list_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::NLST,
        handler(|ctx, req| Box::pin(list::handle_nlst_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::MKD,
        handler(|ctx, req| Box::pin(mkd::handle_mkd_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::RMD,
        handler(|ctx, req| Box::pin(rmd::handle_rmd_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::DELE,
        handler(|ctx, req| Box::pin(dele::handle_dele_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::RNFR,
        handler(|ctx, req| Box::pin(rnfr::handle_rnfr_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::RNTO,
        handler(|ctx, req| Box::pin(rnto::handle_rnto_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::STOR,
        handler(|ctx, req| Box::pin(stor::handle_stor_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::APPE,
        handler(|ctx, req| Box::pin(appe::handle_appe_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::STOU,
        handler(|ctx, req| Box::pin(stou::handle_stou_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::RETR,
        handler(|ctx, req| Box::pin(retr::handle_retr_command(ctx, req))),
    );
    handlers.insert(
        FtpCommand::SITE,
        handler(|ctx, req| Box::pin(site::handle_site_command(ctx, req))),
    );

    handlers
}
