//! Utils

use clap::Parser;

use crate::observability::LogFormat;

/// Arguments for the session demo
#[derive(Debug, Parser)]
#[command(name = "session", about = "Replay a scripted cart session", long_about = None)]
pub struct SessionArgs {
    /// Catalog fixture to price products from
    #[arg(short, long, default_value = "storefront")]
    pub fixture: String,

    /// Session script to replay
    #[arg(short, long, default_value = "storefront")]
    pub script: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl SessionArgs {
    /// Load arguments from environment and CLI
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
