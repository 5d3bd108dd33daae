use crate::constants::PASSIVE_ACCEPT_TIMEOUT_SECS;
use log::debug;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

/// Data connection prepared by PASV or PORT, opened by the next transfer.
#[derive(Debug)]
pub enum DataConnection {
    Passive(TcpListener),
    Active(SocketAddr),
}

impl DataConnection {
    pub async fn open(self) -> io::Result<TcpStream> {
        match self {
            DataConnection::Passive(listener) => {
                let (stream, addr) = timeout(
                    Duration::from_secs(PASSIVE_ACCEPT_TIMEOUT_SECS),
                    listener.accept(),
                )
                .await
                .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "no passive data connection"))??;
                debug!("Accepted data connection from: {}", addr);
                Ok(stream)
            }
            DataConnection::Active(addr) => {
                let stream = TcpStream::connect(addr).await?;
                debug!("Connected data connection to: {}", addr);
                Ok(stream)
            }
        }
    }
}
