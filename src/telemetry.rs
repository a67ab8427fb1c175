use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs JSON structured logging on stdout.
///
/// `RUST_LOG` controls the filter; `default_filter` applies when it is unset.
pub fn init_telemetry(default_filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .init();
}
