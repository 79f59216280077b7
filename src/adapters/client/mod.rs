pub mod http;

use thiserror::Error;

pub use http::HttpPolicyClient;

/// Failure of a single request against the policy server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("server responded {status}: {body}")]
    Status { status: u16, body: String },
}

/// Write side of the policy server API. Implementations own authentication,
/// TLS and request timeouts.
pub trait PolicyClient: Send + Sync {
    /// `PUT` `body` to the server-relative `rel_uri`.
    /// # Errors
    /// Returns a `TransportError` when the request cannot be sent or the server rejects it.
    fn put(&self, rel_uri: &str, body: &[u8]) -> Result<(), TransportError>;
}
