//! Tracing setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing with an env filter and a fmt layer.
///
/// Production environments log JSON lines; others use the human-readable format.
pub fn init_telemetry(
    environment: &str,
    is_production: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vidshelf=debug,tower_http=debug,audit=info".into());

    let registry = tracing_subscriber::registry().with(filter);

    if is_production {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }

    tracing::info!(environment = %environment, "Tracing initialized");
    Ok(())
}
