use crate::infrastructure::config::AppConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `config.log_filter`; an unparsable filter falls back
/// to `info`. Returns `false` when a subscriber was already installed.
pub fn init_logging(config: &AppConfig) -> bool {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let installed = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Logging initialized with filter {}", config.log_filter);
    }
    installed
}
