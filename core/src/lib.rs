pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod model;
pub mod retrieval;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FORMAT_ENV: &str = "DOCTOPIC_LOG_FORMAT";

/// Installs the global subscriber. `RUST_LOG` controls the filter (default
/// `info`); `DOCTOPIC_LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter_layer);
    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()
    };

    if let Err(err) = result {
        // A subscriber was already installed (tests, embedding hosts).
        tracing::debug!("tracing already initialised: {}", err);
    }
}
