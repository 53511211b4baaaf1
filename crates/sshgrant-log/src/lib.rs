// ABOUTME: Shared logging setup for sshgrant binaries
// ABOUTME: init() logs to stderr at INFO by default, RUST_LOG overrides

use tracing_subscriber::EnvFilter;

/// Standard logging to stderr. Default: INFO level, RUST_LOG override.
///
/// Logs go to stderr so interactive prompts and copy-paste blocks on
/// stdout stay clean. Credentials must never be logged by callers.
pub fn init() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();
}
