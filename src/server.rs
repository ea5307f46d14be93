//! Dashboard server lifecycle

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::aws::{CostInventory, NullCostInventory};
use crate::config::Config;
use crate::registry::UpstreamRegistry;
use crate::relay::Relay;
use crate::routes::{AppState, create_router};
use crate::{Error, Result};

/// Dashboard server: static UI, server listing, proxy, AWS endpoints.
pub struct DashboardServer {
    config: Config,
    registry: Arc<UpstreamRegistry>,
}

impl DashboardServer {
    /// Create a server from loaded configuration and registry.
    #[must_use]
    pub fn new(config: Config, registry: UpstreamRegistry) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
        }
    }

    /// Bind and serve until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the host does not parse, the port cannot be
    /// bound, or the HTTP client cannot be constructed.
    pub async fn run(self) -> Result<()> {
        let addr = SocketAddr::new(
            self.config
                .server
                .host
                .parse()
                .map_err(|e| Error::Config(format!("Invalid host: {e}")))?,
            self.config.server.port,
        );

        let aws = build_cost_inventory(&self.config).await;
        let state = Arc::new(AppState {
            registry: Arc::clone(&self.registry),
            relay: Arc::new(Relay::new()?),
            aws,
            static_dir: PathBuf::from(&self.config.server.static_dir),
        });
        let app = create_router(state);

        let listener = TcpListener::bind(addr).await?;

        info!(servers = self.registry.len(), "Loaded CI server(s)");
        for server in self.registry.iter() {
            info!(name = %server.name, url = %server.base_url, kind = %server.kind, "  upstream");
        }
        info!(
            host = %self.config.server.host,
            port = self.config.server.port,
            aws = self.config.aws.enabled,
            "Dashboard listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        Ok(())
    }
}

/// Pick the cost/inventory source for this process. Credentials present
/// and the `aws` feature compiled in gets the live source; anything
/// else degrades to the disabled one.
async fn build_cost_inventory(config: &Config) -> Arc<dyn CostInventory> {
    #[cfg(feature = "aws")]
    if config.aws.enabled {
        info!(region = %config.aws.region, "AWS integration enabled");
        return Arc::new(crate::aws::AwsCostInventory::new(&config.aws.region).await);
    }

    #[cfg(not(feature = "aws"))]
    if config.aws.enabled {
        tracing::warn!("AWS credentials present but this build excludes the aws feature");
    }

    Arc::new(NullCostInventory)
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
