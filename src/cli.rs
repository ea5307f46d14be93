//! Command-line interface

use clap::Parser;

/// CI dashboard server with a credential-hiding API proxy
#[derive(Parser, Debug)]
#[command(name = "cidash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Directory holding the dashboard assets
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "LOG_FORMAT")]
    pub log_format: Option<String>,

    /// Enable debug logging
    #[arg(long, env = "DEBUG")]
    pub debug: bool,
}
