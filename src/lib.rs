//! Aligned SDK client core
//!
//! Builds signed submissions for a proof aggregation service and checks that
//! a submission made it into a verified batch.
//!
//! ## Modules
//!
//! - [`domain`] - Verification records, commitments, messages, inclusion data
//! - [`crypto`] - Keccak-256 commitments and secp256k1 submitter signatures
//! - [`infra`] - Errors, batch Merkle trees, and batch submission
//! - [`onchain`] - Inclusion check against the service manager contract
//! - [`telemetry`] - Logging setup

pub mod crypto;
pub mod domain;
pub mod infra;
pub mod onchain;
pub mod telemetry;

// Re-export commonly used types
pub use domain::{
    AlignedVerificationData, BatchInclusionData, ClientMessage, Hash256, InclusionProof,
    ProvingSystemId, Signature, VerificationData, VerificationDataCommitment,
};

pub use crypto::SubmitterSigningKey;

pub use infra::{
    BatchMerkleTree, BatchSubmitter, BatchTransport, Result, SdkError, SubmitterConfig,
};
