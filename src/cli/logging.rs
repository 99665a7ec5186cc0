/// Diagnostic logging setup.
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Level used when neither `RUST_LOG` nor `--debug` is given.
const DEFAULT_LEVEL: &str = "warn";

/// Install the global subscriber. Diagnostics go to stderr so stdout stays
/// clean for documents and plans. `RUST_LOG` takes precedence over `--debug`.
pub fn init(debug: bool) {
    let fallback = if debug { "debug" } else { DEFAULT_LEVEL };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let registry = tracing_subscriber::registry().with(env_filter);
    // Ignore the error if a subscriber is already installed.
    let _ = tracing::subscriber::set_global_default(
        registry.with(fmt::layer().with_writer(std::io::stderr).with_target(false)),
    );
}
