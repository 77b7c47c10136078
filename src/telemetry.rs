use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// This crate at `info`, HTTP internals only when something is wrong
const DEFAULT_FILTER: &str = "agrocontrol=info,reqwest=warn,hyper=warn";

/// Install structured JSON logging.
/// `RUST_LOG` replaces the default filter. Logs go to stderr so command
/// output on stdout stays machine-readable. Calling it again is a no-op.
pub fn init_telemetry() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let formatting_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .json()
        .flatten_event(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init();
}
