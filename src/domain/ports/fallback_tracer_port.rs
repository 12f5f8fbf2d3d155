//! Diagnostics hook for suspicious fallback usage.

/// Receives a report whenever a slot falls back after being handed a URL
/// from a host that should never reach production views (sample or demo
/// image hosts).
pub trait FallbackTracer: Send + Sync {
    /// Reports a fallback for `url` observed in `context`.
    fn suspicious_fallback(&self, context: &str, url: &str);
}

/// Tracer that drops every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFallbackTracer;

impl FallbackTracer for NoopFallbackTracer {
    fn suspicious_fallback(&self, _context: &str, _url: &str) {}
}
