//! Batch inclusion types returned by the aggregator

use serde::{Deserialize, Serialize};

use super::{hash256_base64, hash256_hex_0x, vec_hash256_base64, vec_hash256_hex_0x, Hash256};
use super::VerificationDataCommitment;
use crate::infra::{merkle, Result, SdkError};

/// Merkle path for a single leaf
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    /// Sibling hashes from leaf to root
    #[serde(rename = "MerklePath", with = "vec_hash256_base64")]
    pub merkle_path: Vec<Hash256>,
}

impl InclusionProof {
    pub fn new(merkle_path: Vec<Hash256>) -> Self {
        Self { merkle_path }
    }

    /// Number of levels between the leaf and the root
    pub fn depth(&self) -> usize {
        self.merkle_path.len()
    }

    /// Siblings concatenated, as the service manager contract takes them
    pub fn to_concatenated_bytes(&self) -> Vec<u8> {
        self.merkle_path.concat()
    }
}

/// What the aggregator returns for an accepted submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchInclusionData {
    #[serde(rename = "BatchMerkleRoot", with = "hash256_base64")]
    pub batch_merkle_root: Hash256,

    #[serde(rename = "BatchInclusionProof")]
    pub batch_inclusion_proof: Vec<InclusionProof>,

    #[serde(rename = "IndexInBatch")]
    pub index_in_batch: usize,
}

impl BatchInclusionData {
    /// Decode the aggregator's raw response buffer
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| SdkError::ResponseDecode(e.to_string()))
    }

    /// The path for this item.
    ///
    /// A single path is the item's own; otherwise the list holds one path per
    /// batch position and the entry at `index_in_batch` is selected.
    pub fn inclusion_proof(&self) -> Result<&InclusionProof> {
        let proofs = &self.batch_inclusion_proof;
        let selected = if proofs.len() == 1 {
            proofs.first()
        } else {
            proofs.get(self.index_in_batch)
        };

        selected.ok_or(SdkError::MissingInclusionProof {
            index: self.index_in_batch,
            available: proofs.len(),
        })
    }
}

/// Exported evidence writes the path in the same 0x-hex as its root
mod inclusion_proof_hex_0x {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{vec_hash256_hex_0x, Hash256, InclusionProof};

    #[derive(Serialize, Deserialize)]
    struct HexPath {
        #[serde(with = "vec_hash256_hex_0x")]
        merkle_path: Vec<Hash256>,
    }

    pub fn serialize<S>(proof: &InclusionProof, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        HexPath {
            merkle_path: proof.merkle_path.clone(),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<InclusionProof, D::Error>
    where
        D: Deserializer<'de>,
    {
        HexPath::deserialize(deserializer).map(|path| InclusionProof::new(path.merkle_path))
    }
}

/// Evidence that a submission is part of a verified batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedVerificationData {
    pub verification_data_commitment: VerificationDataCommitment,

    #[serde(with = "hash256_hex_0x")]
    pub batch_merkle_root: Hash256,

    #[serde(with = "inclusion_proof_hex_0x")]
    pub batch_inclusion_proof: InclusionProof,

    pub index_in_batch: usize,
}

impl AlignedVerificationData {
    /// Pair a commitment with the aggregator's answer for it
    pub fn new(
        verification_data_commitment: VerificationDataCommitment,
        inclusion: &BatchInclusionData,
    ) -> Result<Self> {
        Ok(Self {
            verification_data_commitment,
            batch_merkle_root: inclusion.batch_merkle_root,
            batch_inclusion_proof: inclusion.inclusion_proof()?.clone(),
            index_in_batch: inclusion.index_in_batch,
        })
    }

    /// Leaf this evidence is about
    pub fn leaf_hash(&self) -> Hash256 {
        self.verification_data_commitment.leaf_hash()
    }

    /// Recompute the root from the commitment and compare
    pub fn verify_inclusion(&self) -> bool {
        merkle::verify_inclusion(
            &self.leaf_hash(),
            &self.batch_inclusion_proof,
            self.index_in_batch,
            &self.batch_merkle_root,
        )
    }

    /// Like [`Self::verify_inclusion`], with the mismatch as an error
    pub fn ensure_inclusion(&self) -> Result<()> {
        merkle::ensure_inclusion(
            &self.leaf_hash(),
            &self.batch_inclusion_proof,
            self.index_in_batch,
            &self.batch_merkle_root,
        )
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_bits_order_the_path() {
        use crate::crypto::compute_node_hash;

        let leaf = [7u8; 32];
        let proof = InclusionProof::new(vec![[1u8; 32], [2u8; 32]]);
        assert_eq!(proof.depth(), 2);

        // 2 = 0b10: left at the leaf level, right above it
        let lower = compute_node_hash(&leaf, &[1u8; 32]);
        let expected = compute_node_hash(&[2u8; 32], &lower);
        assert_eq!(merkle::compute_root(&leaf, &proof, 2).unwrap(), expected);
    }

    #[test]
    fn test_exported_evidence_is_hex_throughout() {
        let evidence = AlignedVerificationData {
            verification_data_commitment: VerificationDataCommitment {
                proof_commitment: [1u8; 32],
                public_input_commitment: [0u8; 32],
                proving_system_aux_data_commitment: [0u8; 32],
                proof_generator_addr: [0x11; 20],
            },
            batch_merkle_root: [3u8; 32],
            batch_inclusion_proof: InclusionProof::new(vec![[2u8; 32]]),
            index_in_batch: 0,
        };

        let json = evidence.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value["batch_inclusion_proof"]["merkle_path"][0],
            format!("0x{}", "02".repeat(32))
        );
        assert_eq!(
            value["batch_merkle_root"],
            format!("0x{}", "03".repeat(32))
        );

        let restored: AlignedVerificationData = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, evidence);
    }

    #[test]
    fn test_concatenated_path() {
        let proof = InclusionProof::new(vec![[1u8; 32], [2u8; 32]]);
        let bytes = proof.to_concatenated_bytes();
        assert_eq!(bytes.len(), 64);
        assert_eq!(&bytes[32..], &[2u8; 32]);
    }

    #[test]
    fn test_decode_response_buffer() {
        let raw = br#"{
            "BatchMerkleRoot": "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE=",
            "BatchInclusionProof": [
                { "MerklePath": ["AgICAgICAgICAgICAgICAgICAgICAgICAgICAgICAgI="] }
            ],
            "IndexInBatch": 1
        }"#;

        let data = BatchInclusionData::from_slice(raw).unwrap();
        assert_eq!(data.batch_merkle_root, [1u8; 32]);
        assert_eq!(data.index_in_batch, 1);
        assert_eq!(data.inclusion_proof().unwrap().merkle_path, vec![[2u8; 32]]);
    }

    #[test]
    fn test_decode_rejects_short_root() {
        let raw = br#"{"BatchMerkleRoot":"AQI=","BatchInclusionProof":[],"IndexInBatch":0}"#;
        assert!(matches!(
            BatchInclusionData::from_slice(raw),
            Err(SdkError::ResponseDecode(_))
        ));
    }

    #[test]
    fn test_inclusion_proof_selection() {
        let per_item = BatchInclusionData {
            batch_merkle_root: [0u8; 32],
            batch_inclusion_proof: vec![
                InclusionProof::new(vec![[1u8; 32]]),
                InclusionProof::new(vec![[2u8; 32]]),
                InclusionProof::new(vec![[3u8; 32]]),
            ],
            index_in_batch: 2,
        };
        assert_eq!(
            per_item.inclusion_proof().unwrap().merkle_path,
            vec![[3u8; 32]]
        );

        let missing = BatchInclusionData {
            batch_inclusion_proof: Vec::new(),
            ..per_item
        };
        assert!(matches!(
            missing.inclusion_proof(),
            Err(SdkError::MissingInclusionProof { index: 2, available: 0 })
        ));
    }
}
