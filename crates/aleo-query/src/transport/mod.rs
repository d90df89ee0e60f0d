//! Transport seam between the query client and the node.
//!
//! Defines the [`Transport`] trait and provides an HTTP implementation
//! ([`HttpTransport`]) plus a test mock (`mock::MockTransport`).

mod connection;
mod http;
#[cfg(test)]
pub mod mock;

pub use http::HttpTransport;

use async_trait::async_trait;

use crate::error::TransportError;

/// Minimal GET-only transport covering what the query client needs.
///
/// Implementations resolve `path` against their network root, handle
/// authentication, rate limiting and retries internally, and return the
/// body of a `2xx` reply. Any other status is reported as
/// [`TransportError::Status`] with the body the node sent.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<String, TransportError>;
}
