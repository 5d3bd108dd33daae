// SSL/TLS support: explicit upgrade of the control channel (AUTH)

pub mod error;
pub mod tls_config;
pub mod tls_connection;
pub mod transport;

pub use error::TlsError;
pub use tls_config::TlsConfig;
pub use tls_connection::RustlsTransportFactory;
pub use transport::{BoxedTransport, Transport, TransportFactory};
