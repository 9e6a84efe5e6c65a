//! Trait definitions for the collaborators the client core talks to

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::ClientMessage;

use super::Result;

/// Transport to the aggregation service.
///
/// Connection management, batching policy, retries, and timeouts belong to
/// the implementation. The core only hands over signed messages in order and
/// reads back the raw response for each.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BatchTransport: Send + Sync {
    /// Send one signed message and wait for the aggregator's response
    /// (a JSON-encoded `BatchInclusionData`).
    async fn send(&self, message: &ClientMessage) -> Result<Vec<u8>>;
}
