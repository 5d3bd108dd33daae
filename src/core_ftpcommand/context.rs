use crate::core_extension::{FtpEvent, Outcome};
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_network::control::ControlChannel;
use crate::helpers::{physical_path, resolve_virtual_path};
use crate::server::ServerContext;
use crate::session::Session;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a command handler may touch: the shared server state, the
/// connection's session and its control channel.
pub struct CommandContext {
    pub server: Arc<ServerContext>,
    pub session: Session,
    pub channel: ControlChannel,
}

impl CommandContext {
    pub fn new(server: Arc<ServerContext>, session: Session, channel: ControlChannel) -> Self {
        Self {
            server,
            session,
            channel,
        }
    }

    pub async fn reply(&mut self, reply: FtpReply) -> Result<(), FtpError> {
        self.channel.send(&reply).await?;
        Ok(())
    }

    /// Sends replies queued by extension hooks. Returns how many were sent.
    pub async fn flush_replies(&mut self) -> Result<usize, FtpError> {
        let replies = self.session.take_replies();
        for reply in &replies {
            self.channel.send(reply).await?;
        }
        Ok(replies.len())
    }

    /// Runs `event` through the extension pipeline.
    pub fn intercept(&mut self, event: FtpEvent<'_>) -> Outcome {
        self.server.registry.notify(event, &mut self.session)
    }

    /// Virtual and physical path of a client argument, relative to the
    /// session's working directory.
    pub fn resolve(&self, arg: &str) -> (String, PathBuf) {
        let virtual_path = resolve_virtual_path(self.session.current_dir(), arg);
        let physical = physical_path(&self.server.root, &virtual_path);
        (virtual_path, physical)
    }

    /// Fails with `550` unless the logged-in user may modify files.
    pub fn require_write_permission(&self) -> Result<(), FtpError> {
        match self.session.user() {
            Some(user) if user.write_permission => Ok(()),
            _ => Err(FtpError::reply(550, "Permission denied.")),
        }
    }
}
