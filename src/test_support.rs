use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Routes crate logs into the test harness output.
///
/// Defaults to WARN everywhere and INFO for this crate; `RUST_LOG`
/// overrides (e.g. `RUST_LOG=wallcraft=debug`). Safe to call from every
/// test: only the first call installs the subscriber.
pub(crate) fn init_tracing() {
    let env_filter = EnvFilter::from_default_env()
        .add_directive(LevelFilter::WARN.into())
        .add_directive("wallcraft=info".parse().unwrap_or_default());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}
