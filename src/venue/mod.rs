// Venue transport: the opaque request/response channel replication
// submits through, plus a recording simulator for tests and demos.
pub mod sim;

pub use sim::SimulatedVenue;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("venue transport failure: {0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait VenueTransport: Send + Sync {
    /// Submit one request object; the response may itself carry a
    /// venue-level `error` object, which callers must check for.
    async fn send(&self, request: Value) -> Result<Value, TransportError>;
}
