//! Tracing subscriber setup.
//!
//! Filter precedence: `RUST_LOG`, then `log-filter` from the config file,
//! then `freight=info` (`freight=debug` with `--verbose`).

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init(config_filter: Option<&str>, verbose: bool) {
    let fallback = default_directive(config_filter, verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn default_directive(config_filter: Option<&str>, verbose: bool) -> String {
    match config_filter.filter(|f| !f.trim().is_empty()) {
        Some(filter) => filter.to_string(),
        None if verbose => "freight=debug".to_string(),
        None => "freight=info".to_string(),
    }
}
