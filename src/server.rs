use crate::config::Config;
use crate::core_auth::{PasswdUserManager, UserManager};
use crate::core_extension::builtin;
use crate::core_extension::{Extension, ExtensionContext, ExtensionError, ExtensionRegistry};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::handlers::{initialize_command_handlers, CommandHandler};
use crate::core_listener::{Notifier, ServerStatistics, TransferLog};
use crate::core_network::network;
use crate::core_tls::{RustlsTransportFactory, TransportFactory};
use anyhow::{Context, Result};
use log::{error, info, warn};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// State shared by every connection of one server instance.
pub struct ServerContext {
    pub config: Config,
    /// Physical directory the virtual `/` maps to.
    pub root: PathBuf,
    pub registry: ExtensionRegistry,
    pub transport_factory: Arc<dyn TransportFactory>,
    pub user_manager: Arc<dyn UserManager>,
    pub notifier: Notifier,
    pub statistics: Arc<ServerStatistics>,
    pub handlers: HashMap<FtpCommand, Arc<CommandHandler>>,
}

impl ServerContext {
    pub fn new(
        config: Config,
        root: PathBuf,
        transport_factory: Arc<dyn TransportFactory>,
        user_manager: Arc<dyn UserManager>,
    ) -> Self {
        let statistics = Arc::new(ServerStatistics::new());
        let notifier = Notifier::new(Duration::from_millis(config.server.listener_timeout_ms));
        notifier.add_statistics_listener(statistics.clone());
        if config.server.transfer_log {
            notifier.add_file_listener(Arc::new(TransferLog));
        }

        Self {
            config,
            root,
            registry: ExtensionRegistry::new(),
            transport_factory,
            user_manager,
            notifier,
            statistics,
            handlers: initialize_command_handlers(),
        }
    }

    pub fn extension_context(&self) -> ExtensionContext {
        ExtensionContext {
            statistics: Arc::clone(&self.statistics),
        }
    }

    pub fn install_extension(
        &self,
        name: &str,
        extension: Arc<dyn Extension>,
    ) -> Result<(), ExtensionError> {
        self.registry.install(name, extension, &self.extension_context())
    }

    /// Installs the `[[extensions]]` entries in file order.
    pub fn install_configured_extensions(&self) -> Result<(), ExtensionError> {
        for ext in &self.config.extensions {
            let extension = builtin::build(ext)?;
            self.install_extension(&ext.name, extension)?;
        }
        Ok(())
    }

    /// Destroys every installed extension, logging failures.
    pub fn dispose_extensions(&self) {
        for (name, e) in self.registry.dispose() {
            warn!("Extension {} did not shut down cleanly: {}", name, e);
        }
    }
}

/// Runs the FTP server with the provided configuration until Ctrl-C.
pub async fn run(config: Config) -> Result<()> {
    info!("Starting server with config: {:?}", config);

    let root = PathBuf::from(&config.server.chroot_dir)
        .canonicalize()
        .with_context(|| format!("Invalid chroot_dir: {}", config.server.chroot_dir))?;

    let users = PasswdUserManager::load(
        config.server.passwd_file.as_deref(),
        config.server.allow_anonymous,
    )
    .context("Failed to load user store")?;
    info!("User store ready with {} user(s)", users.user_count());

    let transport_factory =
        RustlsTransportFactory::from_config(&config.tls).context("Failed to set up TLS")?;

    let bind_addr = format!(
        "{}:{}",
        config.server.listen_address, config.server.listen_port
    );
    let server = Arc::new(ServerContext::new(
        config,
        root,
        Arc::new(transport_factory),
        Arc::new(users),
    ));
    server
        .install_configured_extensions()
        .context("Failed to install extensions")?;
    info!("Extensions installed: {:?}", server.registry.names());

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, shutting down"),
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
        let _ = shutdown_tx.send(true);
    });

    let result = network::start_server(Arc::clone(&server), listener, shutdown_rx).await;
    server.dispose_extensions();
    info!("Server stopped");
    result
}
