// rustls backed transport factory
use crate::core_tls::error::TlsError;
use crate::core_tls::tls_config::TlsConfig;
use crate::core_tls::transport::{BoxedTransport, TransportFactory};
use async_trait::async_trait;
use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tokio_rustls::{rustls, TlsAcceptor};

pub struct RustlsTransportFactory {
    tls_acceptor: Option<TlsAcceptor>,
}

impl RustlsTransportFactory {
    /// Factory without any certificate: every AUTH gets a 431.
    pub fn disabled() -> Self {
        Self { tls_acceptor: None }
    }

    pub fn from_config(config: &TlsConfig) -> Result<Self, TlsError> {
        if !config.enabled {
            info!("TLS disabled, AUTH will be refused");
            return Ok(Self::disabled());
        }
        config.validate()?;

        let certs = load_certs(&config.cert_file)?;
        let key = load_private_key(&config.key_file)?;

        let server_config = rustls::ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .map_err(|e| TlsError::TlsConfigError(e.to_string()))?;

        info!("TLS enabled with certificate {:?}", config.cert_file);
        Ok(Self {
            tls_acceptor: Some(TlsAcceptor::from(Arc::new(server_config))),
        })
    }
}

#[async_trait]
impl TransportFactory for RustlsTransportFactory {
    fn is_secure_configured(&self) -> bool {
        self.tls_acceptor.is_some()
    }

    async fn create_secure(&self, transport: BoxedTransport) -> Result<BoxedTransport, TlsError> {
        let acceptor = self.tls_acceptor.as_ref().ok_or(TlsError::TlsNotConfigured)?;

        let tls_stream = acceptor
            .accept(transport)
            .await
            .map_err(TlsError::TlsHandshakeError)?;
        debug!("TLS handshake completed");

        Ok(Box::new(tls_stream))
    }
}

fn load_certs(path: &Path) -> Result<Vec<rustls::pki_types::CertificateDer<'static>>, TlsError> {
    let file = File::open(path).map_err(|e| TlsError::CertificateLoadError(e.to_string()))?;
    let mut reader = BufReader::new(file);
    let certs: Vec<_> = rustls_pemfile::certs(&mut reader)
        .collect::<Result<_, _>>()
        .map_err(|e| TlsError::CertificateLoadError(e.to_string()))?;

    if certs.is_empty() {
        return Err(TlsError::CertificateLoadError(format!(
            "No certificate found in {:?}",
            path
        )));
    }
    Ok(certs)
}

fn load_private_key(path: &Path) -> Result<rustls::pki_types::PrivateKeyDer<'static>, TlsError> {
    let file = File::open(path).map_err(|e| TlsError::PrivateKeyLoadError(e.to_string()))?;
    let mut reader = BufReader::new(file);
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| TlsError::PrivateKeyLoadError(e.to_string()))?
        .ok_or_else(|| TlsError::PrivateKeyLoadError("No private key found".to_string()))
}
