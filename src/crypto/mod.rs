//! Cryptographic utilities for the submission client
//!
//! Provides:
//! - Keccak-256 field commitments and the batch leaf preimage
//! - Merkle node hashing for batch trees
//! - Submitter signing (recoverable secp256k1 ECDSA) and the r/s/v codec

mod hash;
mod signing;


pub use hash::*;
pub use signing::*;
