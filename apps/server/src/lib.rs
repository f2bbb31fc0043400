//! # Software Center Server
//!
//! The composition root of the Software Center API: configuration checks, the
//! document database, the tech API client, the feature slices and the `Axum` router.
//!
//! ## Example
//! ```no_run
//! use sc_server::Server;
//! use softwarecenter::kernel::config::{ConfigSources, load_config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cfg = load_config(&ConfigSources::new())?;
//!     Server::builder()
//!         .config(cfg)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use sc_database::Database;
use softwarecenter::domain::config::ApiConfig;
use softwarecenter::domain::constants::{SOFTWARE, TECHS_API};
use softwarecenter::features::vendors::{LookupTechs, TechApiHttp};
use softwarecenter::kernel::config::require_base_url;
use softwarecenter::kernel::security::JwtVerifier;
use softwarecenter::kernel::server::ApiState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
    techs: Option<Arc<dyn LookupTechs>>,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Replaces the HTTP tech lookup built from the `techs-api` connection string.
    /// The connection string is still required.
    pub fn techs(mut self, techs: Arc<dyn LookupTechs>) -> Self {
        self.techs = Some(techs);
        self
    }

    async fn init_database(&self, url: &str) -> Result<Database> {
        let db_cfg = &self.cfg.database;
        let mut builder = Database::builder()
            .url(url)
            .session(&db_cfg.namespace, &db_cfg.database)
            .schemas(softwarecenter::schemas());

        if let Some(creds) = &db_cfg.credentials {
            builder = builder.auth(&creds.username, &creds.password);
        }

        builder.init().await.context("Failed to establish database connection")
    }

    fn validate_ssl_config(&self) -> Result<()> {
        if let Some(ssl) = &self.cfg.server.ssl {
            if !ssl.cert.exists() {
                anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                anyhow::bail!("SSL key not found at: {}", ssl.key.display());
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let metadata = ssl.key.metadata()?;
                if metadata.permissions().mode() & 0o077 != 0 {
                    tracing::warn!(
                        "SECURITY: SSL Private Key {} has insecure permissions (should be 600)",
                        ssl.key.display()
                    );
                }
            }
        }
        Ok(())
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Requires the `software` and `techs-api` connection strings
    /// 2. Validates the SSL files and the JWT settings
    /// 3. Opens the database and applies the feature schemas
    /// 4. Binds the tech lookup and initializes the feature slices
    /// 5. Constructs application state and the router
    ///
    /// # Errors
    /// Returns an error if:
    /// * A required connection string is missing, or `techs-api` is not an absolute URL
    /// * The JWT signing key is missing
    /// * Database connection fails (unreachable host, invalid credentials)
    /// * SSL certificate/key files cannot be read
    pub async fn build(self) -> Result<Server> {
        // 1. Required connection strings
        let strings = &self.cfg.connection_strings;
        let connection = strings.require(SOFTWARE).context("Startup aborted")?.to_owned();
        let techs_api = require_base_url(strings, TECHS_API).context("Startup aborted")?;
        info!(connection_string = %connection, "Using this connection string");

        // 2. SSL and token validation
        self.validate_ssl_config()?;
        let verifier = JwtVerifier::new(&self.cfg.security.jwt).context("Invalid JWT settings")?;

        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);
        info!(address = %address, environment = %self.cfg.environment, "Initializing server");

        // 3. Database
        let db = self.init_database(&connection).await?;

        // 4. Tech lookup and feature slices
        let techs: Arc<dyn LookupTechs> = match self.techs {
            Some(techs) => techs,
            None => {
                let client = TechApiHttp::new(techs_api).context("Failed to build the tech API client")?;
                info!(base_url = %client.base_url(), "Resolving techs over HTTP");
                Arc::new(client)
            },
        };
        let slices = softwarecenter::init(techs);

        // 5. State and router
        let state = ApiState::builder()
            .config(self.cfg)
            .db(db)
            .verifier(verifier)
            .policies(softwarecenter::authorization_policies())
            .endpoint_policies(softwarecenter::endpoint_policies())
            .register_slices(slices)
            .build()
            .context("Failed to finalize API state registry")?;
        let router = router::init(state.clone());

        Ok(Server { state, router })
    }
}

/// A fully initialized server instance ready to run.
///
/// This struct is returned by [`ServerBuilder::build`] and contains
/// all necessary runtime state.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
    router: Router,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The assembled application, for serving or for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Starts the server and runs until the shutdown signal is received.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address
    /// or if SSL/TLS setup fails.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);

        info!(
            address = %address,
            ssl = cfg.server.ssl.is_some(),
            slices = ?self.state.slice_names().collect::<Vec<_>>(),
            "Starting server"
        );

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });

        if let Some(ssl_config) = &cfg.server.ssl {
            info!("Starting HTTPS server on https://{address}");

            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &ssl_config.cert,
                &ssl_config.key,
            )
            .await
            .context("Failed to load SSL/TLS certificates")?;

            axum_server::bind_rustls(address, tls_config)
                .handle(handle)
                .serve(self.router.into_make_service())
                .await
                .context("HTTPS server failed")?;
        } else {
            info!("Starting HTTP server on http://{address}");

            axum_server::bind(address)
                .handle(handle)
                .serve(self.router.into_make_service())
                .await
                .context("HTTP server failed")?;
        }

        info!("Server shutdown complete");
        Ok(())
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
