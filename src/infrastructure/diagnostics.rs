//! Fallback diagnostics.

use tracing::warn;

use crate::domain::ports::FallbackTracer;

/// Reports suspicious fallbacks through `tracing`, with a backtrace of the
/// consuming code path.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFallbackTracer;

impl FallbackTracer for TracingFallbackTracer {
    fn suspicious_fallback(&self, context: &str, url: &str) {
        let backtrace = std::backtrace::Backtrace::capture();
        warn!(
            context = %context,
            url = %url,
            backtrace = %backtrace,
            "Image from sample host fell back to placeholder"
        );
    }
}
