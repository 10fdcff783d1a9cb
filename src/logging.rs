//! Logging configuration using tracing
//!
//! Log events go to stderr so they never mix with command output on stdout.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used when `RUST_LOG` is not set, by `-v` count
pub fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize the tracing subscriber
///
/// `RUST_LOG` takes precedence; otherwise `verbosity` picks the level.
///
/// # Example RUST_LOG values
/// - `RUST_LOG=info` - Show downloads and extractions
/// - `RUST_LOG=sdkpack=debug` - Also show manifest parsing decisions
///
/// # Errors
/// Returns an error if the subscriber has already been initialized
pub fn init(verbosity: u8) -> crate::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity >= 2),
        )
        .try_init()
        .map_err(|e| crate::Error::Other(format!("Failed to initialize tracing: {}", e)))?;

    Ok(())
}
