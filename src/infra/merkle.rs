//! Batch Merkle trees and inclusion verification.
//!
//! Convention (must match the aggregator's tree construction):
//!
//! - leaves are the commitment leaf hashes, in submission order
//! - a batch is padded to the next power of two with the zero hash
//! - `node = KECCAK256(left || right)`
//! - paths are ordered leaf to root
//! - bit `i` of the index (LSB first) is the position at level `i`:
//!   0 means the running hash is the left child, 1 the right child
//!
//! With zero-hash padding a sibling equals the running hash only when the two
//! subtrees hold the same leaves. For a batch of distinct leaves a proof
//! checked against the wrong index therefore fails; identical leaves at two
//! positions verify at either one.

use crate::crypto::{compute_node_hash, pad_leaf};
use crate::domain::{Hash256, InclusionProof};
use crate::infra::{Result, SdkError};

/// Fold a leaf up its path. Fails if `index` does not fit the path depth.
pub fn compute_root(leaf: &Hash256, proof: &InclusionProof, index: usize) -> Result<Hash256> {
    let depth = proof.depth();
    if depth < usize::BITS as usize && index >> depth != 0 {
        return Err(SdkError::IndexOutOfRange { index, depth });
    }

    let mut current = *leaf;
    let mut idx = index;
    for sibling in &proof.merkle_path {
        current = if idx & 1 == 0 {
            compute_node_hash(&current, sibling)
        } else {
            compute_node_hash(sibling, &current)
        };
        idx >>= 1;
    }

    Ok(current)
}

/// True iff `leaf` at `index` hashes up to `root` along `proof`
pub fn verify_inclusion(
    leaf: &Hash256,
    proof: &InclusionProof,
    index: usize,
    root: &Hash256,
) -> bool {
    matches!(compute_root(leaf, proof, index), Ok(computed) if &computed == root)
}

/// Like [`verify_inclusion`], reporting a mismatch as [`SdkError::InclusionProofMismatch`]
pub fn ensure_inclusion(
    leaf: &Hash256,
    proof: &InclusionProof,
    index: usize,
    root: &Hash256,
) -> Result<()> {
    let computed = compute_root(leaf, proof, index)?;
    if &computed != root {
        return Err(SdkError::InclusionProofMismatch {
            expected: *root,
            computed,
        });
    }
    Ok(())
}

/// Complete binary tree over a batch of leaves
#[derive(Debug, Clone)]
pub struct BatchMerkleTree {
    leaf_count: usize,
    levels: Vec<Vec<Hash256>>,
}

impl BatchMerkleTree {
    /// Build the tree. An empty batch has no root and is rejected.
    pub fn from_leaves(leaves: &[Hash256]) -> Result<Self> {
        if leaves.is_empty() {
            return Err(SdkError::EmptyBatch);
        }

        let padded_len = leaves.len().next_power_of_two();
        let mut padded = Vec::with_capacity(padded_len);
        padded.extend_from_slice(leaves);
        padded.resize(padded_len, pad_leaf());

        let mut levels = vec![padded];
        while levels[levels.len() - 1].len() > 1 {
            let next: Vec<Hash256> = levels[levels.len() - 1]
                .chunks_exact(2)
                .map(|pair| compute_node_hash(&pair[0], &pair[1]))
                .collect();
            levels.push(next);
        }

        Ok(Self {
            leaf_count: leaves.len(),
            levels,
        })
    }

    /// Number of real (unpadded) leaves
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Path length from a leaf to the root
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn root(&self) -> Hash256 {
        self.levels
            .last()
            .and_then(|level| level.first().copied())
            .unwrap_or_else(pad_leaf)
    }

    pub fn leaf(&self, index: usize) -> Option<Hash256> {
        if index >= self.leaf_count {
            return None;
        }
        self.levels[0].get(index).copied()
    }

    /// Sibling path for the leaf at `index`
    pub fn proof(&self, index: usize) -> Result<InclusionProof> {
        if index >= self.leaf_count {
            return Err(SdkError::IndexOutOfRange {
                index,
                depth: self.depth(),
            });
        }

        let mut path = Vec::with_capacity(self.depth());
        let mut idx = index;
        for level in &self.levels[..self.depth()] {
            path.push(level[idx ^ 1]);
            idx >>= 1;
        }

        Ok(InclusionProof::new(path))
    }
}
