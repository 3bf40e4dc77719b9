//! Logging setup

use once_cell::sync::OnceCell;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static INIT: OnceCell<()> = OnceCell::new();

/// Initialize the global logging system.
///
/// `RUST_LOG` wins when set; otherwise `EMOTRACK_LOG_LEVEL` (default
/// `info`) is used as the filter. Later calls are no-ops.
pub fn init_logging() {
    INIT.get_or_init(|| {
        let level = std::env::var("EMOTRACK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let env_filter =
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());

        // A subscriber may already be installed by an embedding application.
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init();
    });
}
