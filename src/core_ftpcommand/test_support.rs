// In-memory control connections and fake collaborators for handler tests

use crate::config::Config;
use crate::core_auth::{AuthError, User, UserManager};
use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::dispatch::dispatch;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_network::control::ControlChannel;
use crate::core_tls::{BoxedTransport, TlsError, TransportFactory};
use crate::server::ServerContext;
use crate::session::Session;
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};

/// Pretends to encrypt: hands the same stream back.
pub(crate) struct FakeTransportFactory {
    configured: bool,
    pub upgrades: AtomicUsize,
}

impl FakeTransportFactory {
    pub(crate) fn configured() -> Arc<Self> {
        Arc::new(Self {
            configured: true,
            upgrades: AtomicUsize::new(0),
        })
    }

    pub(crate) fn unconfigured() -> Arc<Self> {
        Arc::new(Self {
            configured: false,
            upgrades: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TransportFactory for FakeTransportFactory {
    fn is_secure_configured(&self) -> bool {
        self.configured
    }

    async fn create_secure(&self, transport: BoxedTransport) -> Result<BoxedTransport, TlsError> {
        self.upgrades.fetch_add(1, Ordering::SeqCst);
        Ok(transport)
    }
}

/// Configured, but every handshake fails.
pub(crate) struct BrokenTransportFactory {
    pub rejection: Option<FtpReply>,
}

#[async_trait]
impl TransportFactory for BrokenTransportFactory {
    fn is_secure_configured(&self) -> bool {
        true
    }

    async fn create_secure(&self, _transport: BoxedTransport) -> Result<BoxedTransport, TlsError> {
        match &self.rejection {
            Some(reply) => Err(TlsError::Rejected(reply.clone())),
            None => Err(TlsError::TlsHandshakeError(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "handshake aborted",
            ))),
        }
    }
}

/// `alice` may write, `bob` may only read, `root` is an admin. Every
/// password is `secret`.
pub(crate) struct StaticUserManager;

impl UserManager for StaticUserManager {
    fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let (write_permission, admin) = match username {
            "alice" => (true, false),
            "bob" => (false, false),
            "root" => (true, true),
            _ => return Err(AuthError::UnknownUser(username.to_string())),
        };
        if password != "secret" {
            return Err(AuthError::InvalidPassword(username.to_string()));
        }
        Ok(User {
            name: username.to_string(),
            home_dir: "/".to_string(),
            write_permission,
            admin,
        })
    }
}

pub(crate) fn server_context(root: &Path, factory: Arc<dyn TransportFactory>) -> Arc<ServerContext> {
    server_context_with(root, factory, |_| {})
}

/// Like [`server_context`], with `tweak` applied to the test configuration.
pub(crate) fn server_context_with(
    root: &Path,
    factory: Arc<dyn TransportFactory>,
    tweak: impl FnOnce(&mut Config),
) -> Arc<ServerContext> {
    let mut config = Config::default();
    config.server.pasv_address = "127.0.0.1".to_string();
    config.server.listener_timeout_ms = 1000;
    tweak(&mut config);
    Arc::new(ServerContext::new(
        config,
        root.to_path_buf(),
        factory,
        Arc::new(StaticUserManager),
    ))
}

/// Client end of an in-memory control connection.
pub(crate) struct Client {
    reader: BufReader<ReadHalf<DuplexStream>>,
    writer: WriteHalf<DuplexStream>,
}

impl Client {
    pub(crate) fn new(stream: DuplexStream) -> Self {
        let (read, write) = tokio::io::split(stream);
        Self {
            reader: BufReader::new(read),
            writer: write,
        }
    }

    pub(crate) async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\r\n", line).as_bytes())
            .await
            .unwrap();
    }

    /// Reads one complete reply, multi-line replies included. Returns the
    /// code and the text of the last line.
    pub(crate) async fn reply(&mut self) -> (u16, String) {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        assert!(line.len() >= 4, "short reply line: {:?}", line);
        let code: u16 = line[..3].parse().unwrap();
        while line.as_bytes()[3] == b'-' {
            line.clear();
            self.reader.read_line(&mut line).await.unwrap();
        }
        (code, line[4..].trim_end().to_string())
    }

    /// True once the server side has closed the pipe.
    pub(crate) async fn at_eof(&mut self) -> bool {
        let mut line = String::new();
        matches!(self.reader.read_line(&mut line).await, Ok(0) | Err(_))
    }
}

/// Drives handlers directly through [`dispatch`], keeping the context
/// available for inspection.
pub(crate) struct Harness {
    pub ctx: CommandContext,
    pub client: Client,
}

impl Harness {
    pub(crate) fn new(server: Arc<ServerContext>) -> Self {
        let (client_side, server_side) = duplex(64 * 1024);
        let channel = ControlChannel::new(Box::new(server_side));
        Self {
            ctx: CommandContext::new(server, Session::new(None), channel),
            client: Client::new(client_side),
        }
    }

    /// Dispatches `line` and returns the reply it produced.
    pub(crate) async fn run(&mut self, line: &str) -> (u16, String) {
        dispatch(&mut self.ctx, line).await.unwrap();
        self.client.reply().await
    }

    pub(crate) async fn login(&mut self, user: &str) {
        assert_eq!(self.run(&format!("USER {}", user)).await.0, 331);
        assert_eq!(self.run("PASS secret").await.0, 230);
    }
}

/// Port announced in a `227` reply text.
pub(crate) fn pasv_port(text: &str) -> u16 {
    let inner = text
        .split('(')
        .nth(1)
        .and_then(|rest| rest.split(')').next())
        .unwrap();
    let nums: Vec<u16> = inner.split(',').map(|n| n.parse().unwrap()).collect();
    nums[4] * 256 + nums[5]
}
