use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_ftpcommand::utils::{file_error, open_data_stream, take_data_connection};
use chrono::{DateTime, Local};
use log::{debug, error};
use std::fs::Metadata;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListFormat {
    Long,
    NamesOnly,
}

/// Handles the LIST FTP command: one `ls -l` style line per entry.
pub async fn handle_list_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    send_listing(ctx, request, ListFormat::Long).await
}

/// Handles the NLST FTP command: bare names, one per line.
pub async fn handle_nlst_command(
    ctx: &mut CommandContext,
    request: &FtpRequest,
) -> Result<(), FtpError> {
    send_listing(ctx, request, ListFormat::NamesOnly).await
}

async fn send_listing(
    ctx: &mut CommandContext,
    request: &FtpRequest,
    format: ListFormat,
) -> Result<(), FtpError> {
    // Options such as `-la` are accepted and ignored.
    let target = request
        .argument()
        .filter(|arg| !arg.starts_with('-'))
        .unwrap_or(".");
    let (_, dir_path) = ctx.resolve(target);

    let lines = read_listing(&dir_path, format).await.map_err(|e| {
        error!("Failed to list {:?}: {}", dir_path, e);
        file_error(&e)
    })?;

    let data = take_data_connection(ctx)?;
    let mut stream = open_data_stream(ctx, data, "file list").await?;
    let mut payload = String::new();
    for line in &lines {
        payload.push_str(line);
        payload.push_str("\r\n");
    }
    let written = match stream.write_all(payload.as_bytes()).await {
        Ok(()) => stream.shutdown().await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        error!("Error sending listing: {}", e);
        return Err(FtpError::reply_with_detail(426, "DATA"));
    }

    debug!("Sent {} listing entries for {:?}", lines.len(), dir_path);
    ctx.reply(FtpReply::new(226, "Directory send OK.")).await
}

async fn read_listing(dir_path: &Path, format: ListFormat) -> std::io::Result<Vec<String>> {
    let meta = fs::metadata(dir_path).await?;
    if !meta.is_dir() {
        let name = dir_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Ok(vec![format_entry(&name, &meta, format)]);
    }

    let mut entries = fs::read_dir(dir_path).await?;
    let mut lines = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let meta = entry.metadata().await?;
        let name = entry.file_name().to_string_lossy().into_owned();
        lines.push((name.clone(), format_entry(&name, &meta, format)));
    }
    lines.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(lines.into_iter().map(|(_, line)| line).collect())
}

fn format_entry(name: &str, meta: &Metadata, format: ListFormat) -> String {
    if format == ListFormat::NamesOnly {
        return name.to_string();
    }

    let kind = if meta.is_dir() { 'd' } else { '-' };
    let perms = if meta.permissions().readonly() {
        "r--r--r--"
    } else {
        "rw-r--r--"
    };
    let modified = meta
        .modified()
        .map(DateTime::<Local>::from)
        .unwrap_or_else(|_| Local::now());
    format!(
        "{}{} 1 ftp ftp {:>12} {} {}",
        kind,
        perms,
        meta.len(),
        modified.format("%b %d %H:%M"),
        name
    )
}
