use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "pokebracket=info";

/// Install the global `fmt` subscriber. Output goes to stderr so stdout stays
/// clean for JSON/CSV. `RUST_LOG` overrides the default filter. Calling this
/// twice is harmless.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
