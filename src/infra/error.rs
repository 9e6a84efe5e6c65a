//! Error types for the submission client

use thiserror::Error;

use crate::domain::{AlignedVerificationData, Hash256};

/// Errors that can occur while building, submitting, or checking proofs
#[derive(Error, Debug)]
pub enum SdkError {
    /// Raw signature was not 65 bytes (r || s || v)
    #[error("invalid signature length: expected 65 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// Proof generator address is not "0x" + 40 hex characters
    #[error("invalid address encoding: {0}")]
    InvalidAddressEncoding(String),

    /// Proving system name or id outside the supported set
    #[error("unsupported proving system: {0}")]
    UnsupportedProvingSystem(String),

    /// Recomputed batch root differs from the claimed one
    #[error(
        "inclusion proof mismatch: expected root 0x{}, computed 0x{}",
        hex::encode(.expected),
        hex::encode(.computed)
    )]
    InclusionProofMismatch { expected: Hash256, computed: Hash256 },

    /// Proof bytes are empty
    #[error("proof is empty")]
    EmptyProof,

    /// No Merkle path for the item's position in the batch
    #[error("no inclusion proof for index {index} ({available} paths received)")]
    MissingInclusionProof { index: usize, available: usize },

    /// Index has bits set above the depth of the proof path
    #[error("index {index} out of range for a proof path of depth {depth}")]
    IndexOutOfRange { index: usize, depth: usize },

    /// Nothing to submit or to build a tree over
    #[error("batch is empty")]
    EmptyBatch,

    /// Private key could not be parsed
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Signing backend failure
    #[error("signing failed: {0}")]
    Signing(String),

    /// JSON encoding or decoding error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure reported by the transport collaborator
    #[error("transport error: {0}")]
    Transport(String),

    /// Response from the aggregator could not be decoded
    #[error("response decode error: {0}")]
    ResponseDecode(String),

    /// Contract call failed
    #[error("on-chain call failed: {0}")]
    Onchain(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A multi-proof submission stopped partway. `accepted` holds the
    /// evidence for every proof handled before the failure, in order.
    #[error("submission stopped after {} accepted proofs: {source}", .accepted.len())]
    PartialSubmission {
        accepted: Vec<AlignedVerificationData>,
        #[source]
        source: Box<SdkError>,
    },
}

impl SdkError {
    /// True for failures raised outside the client core (network, RPC).
    pub fn is_transport(&self) -> bool {
        match self {
            SdkError::Transport(_) | SdkError::Onchain(_) => true,
            SdkError::PartialSubmission { source, .. } => source.is_transport(),
            _ => false,
        }
    }

    /// Evidence already collected when a submission stopped, if any
    pub fn accepted(&self) -> &[AlignedVerificationData] {
        match self {
            SdkError::PartialSubmission { accepted, .. } => accepted,
            _ => &[],
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, SdkError>;
