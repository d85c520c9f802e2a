use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber used by the binaries.
///
/// Filter comes from `RUST_LOG`, defaulting to `info`. Calling it twice is harmless.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
