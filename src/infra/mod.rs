//! Infrastructure layer for the submission client
//!
//! Contains:
//! - Error types
//! - Batch Merkle trees and inclusion verification
//! - The transport boundary and the batch submitter built on it

mod batch;
mod error;
pub mod merkle;
mod traits;

pub use batch::{build_client_messages, BatchSubmitter, SubmitterConfig};
pub use error::*;
pub use merkle::{compute_root, ensure_inclusion, verify_inclusion, BatchMerkleTree};
pub use traits::*;
