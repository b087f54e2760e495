//! Logging setup for the generated CLI

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr subscriber.
///
/// `RUST_LOG` wins over `default_directive`. A second call is a no-op.
pub fn setup_logging(default_directive: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false);

    if tracing::dispatcher::has_been_set() {
        tracing::debug!("Tracing subscriber already set");
        return;
    }
    if let Err(e) = tracing_subscriber::registry()
        .with(fmt_layer.with_filter(env_filter))
        .try_init()
    {
        eprintln!("Error: Failed to set up logging: {}", e);
    }
}
