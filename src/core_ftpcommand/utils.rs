use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_listener::FileEvent;
use crate::core_network::data::DataConnection;
use crate::session::TransferType;
use log::{debug, error, warn};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::{self, AsyncWriteExt};
use tokio::net::TcpStream;

/// How an upload treats an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Truncate,
    Append,
}

/// Maps a filesystem failure onto the reply the client sees.
pub fn file_error(e: &io::Error) -> FtpError {
    match e.kind() {
        ErrorKind::NotFound => FtpError::reply(550, "File not found."),
        ErrorKind::PermissionDenied => FtpError::reply(550, "Permission denied."),
        ErrorKind::AlreadyExists => FtpError::reply(550, "File already exists."),
        _ => FtpError::reply_with_detail(451, "FILE"),
    }
}

/// Takes the data connection prepared by PASV or PORT, `425` without one.
pub fn take_data_connection(ctx: &mut CommandContext) -> Result<DataConnection, FtpError> {
    ctx.session
        .take_data_connection()?
        .ok_or_else(|| FtpError::reply(425, "Use PORT or PASV first."))
}

/// Sends `150` and opens the data connection.
pub async fn open_data_stream(
    ctx: &mut CommandContext,
    data: DataConnection,
    what: &str,
) -> Result<TcpStream, FtpError> {
    let mode = match ctx.session.transfer_type() {
        TransferType::Ascii => "ASCII",
        TransferType::Image => "BINARY",
    };
    ctx.reply(FtpReply::new(
        150,
        format!("Opening {} mode data connection for {}.", mode, what),
    ))
    .await?;
    data.open().await.map_err(|e| {
        warn!("Session {}: data connection failed: {}", ctx.session.id(), e);
        FtpError::reply_with_detail(425, "DATA")
    })
}

/// Copies the data connection into `path`. Returns the number of bytes
/// written.
///
/// `name` is the client-visible path used in replies. An existing file is
/// only truncated once the data connection is up, so a failed PASV accept
/// or PORT connect leaves it untouched.
pub async fn receive_file(
    ctx: &mut CommandContext,
    path: &Path,
    name: &str,
    mode: WriteMode,
) -> Result<u64, FtpError> {
    let data = take_data_connection(ctx)?;

    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        WriteMode::Truncate => options.write(true),
        WriteMode::Append => options.append(true),
    };
    let mut file = options.open(path).await.map_err(|e| {
        error!("Failed to open {:?} for writing: {}", path, e);
        file_error(&e)
    })?;

    let mut stream = open_data_stream(ctx, data, name).await?;
    if mode == WriteMode::Truncate {
        file.set_len(0).await.map_err(|e| {
            error!("Failed to truncate {:?}: {}", path, e);
            file_error(&e)
        })?;
    }
    let bytes = io::copy(&mut stream, &mut file).await.map_err(|e| {
        error!("Upload to {:?} aborted: {}", path, e);
        FtpError::reply_with_detail(426, "DATA")
    })?;
    file.flush().await.map_err(|e| file_error(&e))?;
    debug!("Received {} bytes into {:?}", bytes, path);
    Ok(bytes)
}

/// Copies `path` onto the data connection. Returns the number of bytes
/// sent. `name` is the client-visible path used in replies.
pub async fn send_file(ctx: &mut CommandContext, path: &Path, name: &str) -> Result<u64, FtpError> {
    let mut file = File::open(path).await.map_err(|e| {
        warn!("Failed to open {:?} for reading: {}", path, e);
        file_error(&e)
    })?;
    if file.metadata().await.map(|m| m.is_dir()).unwrap_or(false) {
        return Err(FtpError::reply(550, "Not a plain file."));
    }
    let data = take_data_connection(ctx)?;

    let mut stream = open_data_stream(ctx, data, name).await?;
    let bytes = io::copy(&mut file, &mut stream).await.map_err(|e| {
        error!("Download of {:?} aborted: {}", path, e);
        FtpError::reply_with_detail(426, "DATA")
    })?;
    stream.shutdown().await.map_err(|e| {
        error!("Error shutting down data stream: {}", e);
        FtpError::reply_with_detail(426, "DATA")
    })?;
    debug!("Sent {} bytes from {:?}", bytes, path);
    Ok(bytes)
}

/// Fans a completed file action out to the listeners.
pub async fn notify_file_listeners(ctx: &mut CommandContext, event: FileEvent, path: &Path) {
    ctx.server
        .notifier
        .file_event(event, path, ctx.session.id())
        .await;
}
