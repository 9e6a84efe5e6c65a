//! Domain models for the submission client
//!
//! Verification records, their commitments, signed client messages, and the
//! batch inclusion data returned by the aggregator.

mod commitment;
mod types;
mod verification;

pub use commitment::*;
pub use types::*;
pub use verification::*;
