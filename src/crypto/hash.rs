//! Keccak-256 hashing for commitments and batch Merkle trees
//!
//! Every digest is computed with a freshly constructed hasher. No hasher is
//! ever shared or reused between fields, so one computation can never leak
//! state into the next.
//!
//! # Layouts
//!
//! ```text
//! field_commitment   = KECCAK256(field_bytes)
//! commitment_preimage =
//!   proof_commitment(32) ||
//!   public_input_commitment(32) ||
//!   proving_system_aux_data_commitment(32) ||
//!   proof_generator_addr(20)
//! batch_leaf          = KECCAK256(commitment_preimage)
//! node_hash           = KECCAK256(left(32) || right(32))
//! ```

use sha3::{Digest, Keccak256};

use crate::domain::{Address20, Hash256, ZERO_HASH};

/// Length of the commitment preimage: three digests and an address
pub const COMMITMENT_PREIMAGE_LEN: usize = 32 * 3 + 20;

/// Hash raw bytes with Keccak-256
pub fn keccak256(data: &[u8]) -> Hash256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Commit to an optional field; absent fields commit to the zero hash.
pub fn optional_commitment(data: Option<&[u8]>) -> Hash256 {
    data.map(keccak256).unwrap_or(ZERO_HASH)
}

/// Concatenate the commitment tuple in wire order.
pub fn commitment_preimage(
    proof_commitment: &Hash256,
    public_input_commitment: &Hash256,
    proving_system_aux_data_commitment: &Hash256,
    proof_generator_addr: &Address20,
) -> [u8; COMMITMENT_PREIMAGE_LEN] {
    let mut preimage = [0u8; COMMITMENT_PREIMAGE_LEN];
    preimage[..32].copy_from_slice(proof_commitment);
    preimage[32..64].copy_from_slice(public_input_commitment);
    preimage[64..96].copy_from_slice(proving_system_aux_data_commitment);
    preimage[96..].copy_from_slice(proof_generator_addr);
    preimage
}

/// Hash the commitment tuple. This is both the signed payload and the
/// batch Merkle leaf.
pub fn compute_batch_leaf(
    proof_commitment: &Hash256,
    public_input_commitment: &Hash256,
    proving_system_aux_data_commitment: &Hash256,
    proof_generator_addr: &Address20,
) -> Hash256 {
    let mut hasher = Keccak256::new();
    hasher.update(proof_commitment);
    hasher.update(public_input_commitment);
    hasher.update(proving_system_aux_data_commitment);
    hasher.update(proof_generator_addr);
    hasher.finalize().into()
}

/// Compute a Merkle internal node hash
///
/// node_hash = KECCAK256(left(32) || right(32))
pub fn compute_node_hash(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut hasher = Keccak256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Leaf used to fill a batch up to a power of two
pub fn pad_leaf() -> Hash256 {
    ZERO_HASH
}

// ============================================================================
// Tests
// ============================================================================
