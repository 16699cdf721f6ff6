//! Diagnostics for failed API responses
//!
//! The client hands the body of every non-200 response to a
//! [`ResponseDiagnostics`] implementation before returning the error.
//! The default discards it.

use std::fmt;

use tracing::debug;

/// Receives error response bodies for troubleshooting
pub trait ResponseDiagnostics: Send + Sync + fmt::Debug {
    /// Called once per non-200 response, after the body has been read
    fn error_response(&self, url: &str, status: u16, body: &str);
}

/// Diagnostics sink that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl ResponseDiagnostics for NoopDiagnostics {
    fn error_response(&self, _url: &str, _status: u16, _body: &str) {}
}

/// Diagnostics sink that emits error bodies as `tracing` debug events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl ResponseDiagnostics for TracingDiagnostics {
    fn error_response(&self, url: &str, status: u16, body: &str) {
        debug!(%url, status, %body, "Error response body");
    }
}
