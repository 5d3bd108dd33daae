use crate::core_auth::User;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_network::data::DataConnection;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::fmt;
use std::mem;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn generate() -> Self {
        Self(rand::random())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session {0} is closed")]
    Closed(SessionId),
}

/// Two-command rename sequence: RNFR moves to `Pending`, RNTO consumes it.
///
/// A pending source survives unrelated commands; only RNTO, a state reset
/// (AUTH) or the end of the session returns it to `Idle`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RenameState {
    #[default]
    Idle,
    Pending(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Ascii,
    Image,
}

/// Per-connection state, owned by the connection's worker task.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    client_addr: Option<SocketAddr>,
    connected_at: DateTime<Local>,
    login_time: Option<DateTime<Local>>,
    user: Option<User>,
    pending_user: Option<String>,
    current_dir: String,
    rename: RenameState,
    secure: bool,
    attributes: HashMap<String, String>,
    live: bool,
    transfer_type: TransferType,
    data_connection: Option<DataConnection>,
    outbox: Vec<FtpReply>,
    quit_requested: bool,
}

impl Session {
    pub fn new(client_addr: Option<SocketAddr>) -> Self {
        Self {
            id: SessionId::generate(),
            client_addr,
            connected_at: Local::now(),
            login_time: None,
            user: None,
            pending_user: None,
            current_dir: String::from("/"),
            rename: RenameState::Idle,
            secure: false,
            attributes: HashMap::new(),
            live: true,
            transfer_type: TransferType::Ascii,
            data_connection: None,
            outbox: Vec::new(),
            quit_requested: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn client_addr(&self) -> Option<SocketAddr> {
        self.client_addr
    }

    pub fn connected_at(&self) -> DateTime<Local> {
        self.connected_at
    }

    pub fn login_time(&self) -> Option<DateTime<Local>> {
        self.login_time
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn ensure_live(&self) -> Result<(), SessionError> {
        if self.live {
            Ok(())
        } else {
            Err(SessionError::Closed(self.id))
        }
    }

    /// Destroys the session. Returns `false` when it was already closed.
    pub fn close(&mut self) -> bool {
        if !self.live {
            return false;
        }
        self.live = false;
        self.rename = RenameState::Idle;
        self.data_connection = None;
        self.outbox.clear();
        true
    }

    // -- authentication ----------------------------------------------------

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn set_pending_user(&mut self, username: &str) -> Result<(), SessionError> {
        self.ensure_live()?;
        self.pending_user = Some(username.to_string());
        Ok(())
    }

    pub fn take_pending_user(&mut self) -> Result<Option<String>, SessionError> {
        self.ensure_live()?;
        Ok(self.pending_user.take())
    }

    pub fn login(&mut self, user: User) -> Result<(), SessionError> {
        self.ensure_live()?;
        self.current_dir = user.home_dir.clone();
        self.user = Some(user);
        self.login_time = Some(Local::now());
        Ok(())
    }

    pub fn logout(&mut self) -> Result<Option<User>, SessionError> {
        self.ensure_live()?;
        self.login_time = None;
        self.current_dir = String::from("/");
        Ok(self.user.take())
    }

    // -- navigation --------------------------------------------------------

    pub fn current_dir(&self) -> &str {
        &self.current_dir
    }

    pub fn set_current_dir(&mut self, dir: String) -> Result<(), SessionError> {
        self.ensure_live()?;
        self.current_dir = dir;
        Ok(())
    }

    // -- rename ------------------------------------------------------------

    pub fn rename_state(&self) -> &RenameState {
        &self.rename
    }

    pub fn begin_rename(&mut self, source: PathBuf) -> Result<(), SessionError> {
        self.ensure_live()?;
        self.rename = RenameState::Pending(source);
        Ok(())
    }

    /// Consumes the pending rename source, leaving the state `Idle` no
    /// matter how the following rename turns out.
    pub fn take_rename(&mut self) -> Result<Option<PathBuf>, SessionError> {
        self.ensure_live()?;
        match mem::take(&mut self.rename) {
            RenameState::Pending(source) => Ok(Some(source)),
            RenameState::Idle => Ok(None),
        }
    }

    // -- secure channel ----------------------------------------------------

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Monotonic: there is no way back to plaintext.
    pub fn mark_secure(&mut self) -> Result<(), SessionError> {
        self.ensure_live()?;
        self.secure = true;
        Ok(())
    }

    // -- extension attributes ----------------------------------------------

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_live()?;
        self.attributes.insert(key.to_string(), value.into());
        Ok(())
    }

    pub fn remove_attribute(&mut self, key: &str) -> Result<Option<String>, SessionError> {
        self.ensure_live()?;
        Ok(self.attributes.remove(key))
    }

    // -- transfer parameters -----------------------------------------------

    pub fn transfer_type(&self) -> TransferType {
        self.transfer_type
    }

    pub fn set_transfer_type(&mut self, transfer_type: TransferType) -> Result<(), SessionError> {
        self.ensure_live()?;
        self.transfer_type = transfer_type;
        Ok(())
    }

    pub fn set_data_connection(&mut self, data: DataConnection) -> Result<(), SessionError> {
        self.ensure_live()?;
        self.data_connection = Some(data);
        Ok(())
    }

    pub fn take_data_connection(&mut self) -> Result<Option<DataConnection>, SessionError> {
        self.ensure_live()?;
        Ok(self.data_connection.take())
    }

    /// Drops command-sequencing state so the next command starts a fresh
    /// protocol turn.
    pub fn reset_state(&mut self) -> Result<(), SessionError> {
        self.ensure_live()?;
        self.rename = RenameState::Idle;
        self.data_connection = None;
        Ok(())
    }

    // -- reply outbox ------------------------------------------------------

    /// Queues a reply produced by an extension hook. The dispatcher
    /// flushes the outbox after every interception point.
    pub fn queue_reply(&mut self, reply: FtpReply) -> Result<(), SessionError> {
        self.ensure_live()?;
        self.outbox.push(reply);
        Ok(())
    }

    pub fn take_replies(&mut self) -> Vec<FtpReply> {
        mem::take(&mut self.outbox)
    }

    pub fn request_quit(&mut self) -> Result<(), SessionError> {
        self.ensure_live()?;
        self.quit_requested = true;
        Ok(())
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}
