use crate::core_tls::error::TlsError;
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

/// Anything the control channel can run over: plain TCP, a TLS stream
/// wrapping it, or an in-memory pipe in tests.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> Transport for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

pub type BoxedTransport = Box<dyn Transport>;

/// Encrypted-socket capability shared by every connection.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    /// Whether an encrypted transport can be created at all.
    fn is_secure_configured(&self) -> bool;

    /// Runs the server side of the handshake over `transport` and returns
    /// the encrypted replacement. On error the plaintext transport is gone.
    async fn create_secure(&self, transport: BoxedTransport) -> Result<BoxedTransport, TlsError>;
}
