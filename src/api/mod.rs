//! HTTP integration layer: REST client, send dispatcher and live event stream.

pub mod client;
pub mod dispatcher;
pub mod dto;
pub mod error;
pub mod sse;
pub mod stream_monitor;
#[cfg(test)]
pub mod test_server;

pub use client::{ApiClient, HttpSession};
pub use dispatcher::ApiMessageDispatcher;
pub use stream_monitor::{ApiStreamConnector, EventStreamMonitor};

/// Returns the api module name for smoke checks.
pub fn module_name() -> &'static str {
    "api"
}
