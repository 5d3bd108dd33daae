use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_network::data::DataConnection;
use log::{info, warn};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Parses `h1,h2,h3,h4,p1,p2`.
pub fn parse_port_argument(arg: &str) -> Option<SocketAddr> {
    let parts: Vec<u8> = arg
        .split(',')
        .map(|x| x.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    if parts.len() != 6 {
        return None;
    }

    let ip = Ipv4Addr::new(parts[0], parts[1], parts[2], parts[3]);
    let port = (parts[4] as u16) << 8 | parts[5] as u16;
    Some(SocketAddr::V4(SocketAddrV4::new(ip, port)))
}

/// Handles the PORT (Active Mode) FTP command.
///
/// Only records the address; the connection is made by the next transfer.
pub async fn handle_port_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    let arg = request
        .argument()
        .ok_or_else(|| FtpError::reply_with_detail(501, "PORT"))?;

    let Some(addr) = parse_port_argument(arg) else {
        warn!("Invalid PORT argument: {}", arg);
        return Err(FtpError::reply_with_detail(501, "PORT"));
    };

    info!("Received PORT command with address: {}", addr);
    ctx.session.set_data_connection(DataConnection::Active(addr))?;
    ctx.reply(FtpReply::new(200, "PORT command successful.")).await
}
