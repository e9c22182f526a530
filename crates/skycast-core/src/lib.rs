pub mod config;
pub mod error;

pub use config::{Config, LocationConfig, Units, ValidationResult, WeatherConfig, API_KEY_ENV};
pub use error::{AppError, ConfigError, NetworkError, ReqwestErrorExt, WeatherError};

use anyhow::Result;

/// Initialize logging.
///
/// `RUST_LOG` wins over `default_level`. Logs go to stderr so command output
/// on stdout stays machine-readable.
pub fn init(default_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Skycast core initialized");
    Ok(())
}
