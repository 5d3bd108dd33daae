use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_network::data::DataConnection;
use log::{debug, error};
use std::net::Ipv4Addr;
use tokio::net::TcpListener;

/// Sets up a passive mode (PASV) listener and sends the response to the client.
///
/// The listener is parked in the session; the next transfer command accepts
/// the client's data connection on it.
pub async fn handle_pasv_command(
    ctx: &mut CommandContext,
    _request: &FtpRequest,
) -> Result<(), FtpError> {
    let pasv_ip: Ipv4Addr = ctx.server.config.server.pasv_address.parse().map_err(|e| {
        error!(
            "Invalid pasv_address {:?}: {}",
            ctx.server.config.server.pasv_address, e
        );
        FtpError::reply_with_detail(425, "PASV")
    })?;

    let (listener, reply) = setup_pasv_listener(pasv_ip).await.map_err(|e| {
        error!("Failed to set up PASV listener: {}", e);
        FtpError::reply_with_detail(425, "PASV")
    })?;

    ctx.session
        .set_data_connection(DataConnection::Passive(listener))?;
    ctx.reply(reply).await
}

/// Sets up a passive mode (PASV) listener.
/// Returns the listener and the formatted PASV response.
pub async fn setup_pasv_listener(
    pasv_ip: Ipv4Addr,
) -> Result<(TcpListener, FtpReply), std::io::Error> {
    let listener = TcpListener::bind((pasv_ip, 0)).await?;
    let port = listener.local_addr()?.port();

    let [a, b, c, d] = pasv_ip.octets();
    let reply = FtpReply::new(
        227,
        format!(
            "Entering Passive Mode ({},{},{},{},{},{}).",
            a,
            b,
            c,
            d,
            port / 256,
            port % 256
        ),
    );
    debug!("PASV listener set up on IP: {}, Port: {}", pasv_ip, port);
    Ok((listener, reply))
}
