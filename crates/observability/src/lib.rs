//! Tracing/logging setup shared by the storefront binaries.

/// Initialize process-wide logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    self::tracing::init(self::tracing::LogFormat::from_env());
}

/// Subscriber configuration (filters, output format).
pub mod tracing;
