//! CI dashboard server entry point

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use cidash::{
    cli::Cli, config::Config, registry::UpstreamRegistry, server::DashboardServer, setup_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.debug && cli.log_level == "info" {
        "debug"
    } else {
        cli.log_level.as_str()
    };
    if let Err(e) = setup_tracing(level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    let config = match Config::load() {
        Ok(mut config) => {
            // CLI overrides win over the environment
            if let Some(port) = cli.port {
                config.server.port = port;
            }
            if let Some(ref host) = cli.host {
                config.server.host = host.clone();
            }
            if let Some(ref dir) = cli.static_dir {
                config.server.static_dir = dir.clone();
            }
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let registry = UpstreamRegistry::from_env();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.server.port,
        servers = registry.len(),
        "Starting CI dashboard"
    );

    let server = DashboardServer::new(config, registry);
    if let Err(e) = server.run().await {
        error!("Server error: {e}");
        return ExitCode::FAILURE;
    }

    info!("Dashboard shutdown complete");
    ExitCode::SUCCESS
}
