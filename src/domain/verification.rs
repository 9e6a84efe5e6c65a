//! Verification data, commitments, and signed client messages

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{
    address_to_hex, bytes_base64, hash256_hex_0x, option_bytes_base64, parse_address, Address20,
    Hash256, ProvingSystemId,
};
use crate::crypto::{
    commitment_preimage, compute_batch_leaf, keccak256, optional_commitment, recover_signer,
    signature_from_raw, signature_to_raw, RawSignature, SubmitterSigningKey,
    COMMITMENT_PREIMAGE_LEN,
};
use crate::infra::{Result, SdkError};

/// A proof and everything needed to verify it, as submitted to the aggregator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationData {
    /// Proof system the artifacts belong to
    pub proving_system: ProvingSystemId,

    /// Opaque proof bytes
    #[serde(with = "bytes_base64")]
    pub proof: Vec<u8>,

    /// Public inputs, if the proof system takes them separately
    #[serde(with = "option_bytes_base64", default)]
    pub public_input: Option<Vec<u8>>,

    /// Verification key (ignored for the commitment when program code is set)
    #[serde(with = "option_bytes_base64", default)]
    pub verification_key: Option<Vec<u8>>,

    /// zkVM program image (SP1 ELF, Risc0 image id, ...)
    #[serde(with = "option_bytes_base64", default)]
    pub vm_program_code: Option<Vec<u8>>,

    /// Address of the party that generated the proof, "0x" + 40 hex chars
    #[serde(rename = "proof_generator_addr")]
    pub proof_generator_address: String,
}

impl VerificationData {
    pub fn new(
        proving_system: ProvingSystemId,
        proof: Vec<u8>,
        proof_generator_address: impl Into<String>,
    ) -> Self {
        Self {
            proving_system,
            proof,
            public_input: None,
            verification_key: None,
            vm_program_code: None,
            proof_generator_address: proof_generator_address.into(),
        }
    }

    pub fn with_public_input(mut self, public_input: Vec<u8>) -> Self {
        self.public_input = Some(public_input);
        self
    }

    pub fn with_verification_key(mut self, verification_key: Vec<u8>) -> Self {
        self.verification_key = Some(verification_key);
        self
    }

    pub fn with_vm_program_code(mut self, vm_program_code: Vec<u8>) -> Self {
        self.vm_program_code = Some(vm_program_code);
        self
    }

    /// Derive the commitment tuple for this record.
    ///
    /// Fails on an empty proof or a malformed generator address; nothing is
    /// substituted for either.
    pub fn commitment(&self) -> Result<VerificationDataCommitment> {
        if self.proof.is_empty() {
            warn!(
                proving_system = %self.proving_system,
                "refusing to commit to an empty proof"
            );
            return Err(SdkError::EmptyProof);
        }

        let proof_generator_addr = parse_address(&self.proof_generator_address)?;

        // Program code identifies the circuit for zkVMs; the key is then unused.
        let aux_source = self
            .vm_program_code
            .as_deref()
            .or(self.verification_key.as_deref());

        Ok(VerificationDataCommitment {
            proof_commitment: keccak256(&self.proof),
            public_input_commitment: optional_commitment(self.public_input.as_deref()),
            proving_system_aux_data_commitment: optional_commitment(aux_source),
            proof_generator_addr,
        })
    }
}

/// Fixed-size digests standing in for a [`VerificationData`] record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerificationDataCommitment {
    #[serde(with = "hash256_hex_0x")]
    pub proof_commitment: Hash256,

    #[serde(with = "hash256_hex_0x")]
    pub public_input_commitment: Hash256,

    #[serde(with = "hash256_hex_0x")]
    pub proving_system_aux_data_commitment: Hash256,

    #[serde(with = "super::address20_hex_0x")]
    pub proof_generator_addr: Address20,
}

impl VerificationDataCommitment {
    /// Bytes hashed into the batch leaf, in wire order
    pub fn preimage(&self) -> [u8; COMMITMENT_PREIMAGE_LEN] {
        commitment_preimage(
            &self.proof_commitment,
            &self.public_input_commitment,
            &self.proving_system_aux_data_commitment,
            &self.proof_generator_addr,
        )
    }

    /// Hash of the commitment tuple: the signed payload and the batch leaf
    pub fn leaf_hash(&self) -> Hash256 {
        compute_batch_leaf(
            &self.proof_commitment,
            &self.public_input_commitment,
            &self.proving_system_aux_data_commitment,
            &self.proof_generator_addr,
        )
    }
}

/// Recoverable ECDSA signature in wire form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// "0x" + 64 lowercase hex chars
    pub r: String,
    /// "0x" + 64 lowercase hex chars
    pub s: String,
    /// Recovery id (27/28)
    pub v: u8,
}

impl Signature {
    /// Decode r || s || v
    pub fn from_raw(raw: &[u8]) -> Result<Self> {
        signature_from_raw(raw)
    }

    /// Encode back to r || s || v
    pub fn to_raw(&self) -> Result<RawSignature> {
        signature_to_raw(self)
    }
}

/// The unit sent to the aggregator: verification data plus the submitter's
/// signature over its commitment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMessage {
    pub verification_data: VerificationData,
    pub signature: Signature,
}

impl ClientMessage {
    /// Commit to `verification_data` and sign the commitment.
    ///
    /// The message is either fully built and signed or not built at all.
    pub fn build(
        mut verification_data: VerificationData,
        signing_key: &SubmitterSigningKey,
    ) -> Result<Self> {
        let commitment = verification_data.commitment()?;
        let leaf = commitment.leaf_hash();
        let signature = signing_key.sign(&leaf)?;

        verification_data.proof_generator_address =
            address_to_hex(&commitment.proof_generator_addr);

        let message = Self {
            verification_data,
            signature,
        };

        debug!(
            proving_system = %message.verification_data.proving_system,
            commitment = %hex::encode(leaf),
            proof_len = message.verification_data.proof.len(),
            "built client message"
        );

        Ok(message)
    }

    /// Commitment the signature covers
    pub fn commitment(&self) -> Result<VerificationDataCommitment> {
        self.verification_data.commitment()
    }

    /// Address that signed this message, as the aggregator recovers it
    pub fn recover_signer(&self) -> Result<Address20> {
        let leaf = self.commitment()?.leaf_hash();
        recover_signer(&leaf, &self.signature)
    }

    /// JSON encoding sent over the wire
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ZERO_HASH;

    const ADDR: &str = "0x1111111111111111111111111111111111111111";

    fn groth16_data() -> VerificationData {
        VerificationData::new(ProvingSystemId::Groth16Bn254, b"proof-bytes".to_vec(), ADDR)
            .with_public_input(b"pub-bytes".to_vec())
            .with_verification_key(b"vk-bytes".to_vec())
    }

    #[test]
    fn test_commitment_fields() {
        let commitment = groth16_data().commitment().unwrap();

        assert_eq!(commitment.proof_commitment, keccak256(b"proof-bytes"));
        assert_eq!(commitment.public_input_commitment, keccak256(b"pub-bytes"));
        assert_eq!(
            commitment.proving_system_aux_data_commitment,
            keccak256(b"vk-bytes")
        );
        assert_eq!(commitment.proof_generator_addr, [0x11; 20]);
    }

    #[test]
    fn test_absent_fields_commit_to_zero() {
        let data = VerificationData::new(ProvingSystemId::SP1, vec![1, 2, 3], ADDR);
        let commitment = data.commitment().unwrap();

        assert_eq!(commitment.public_input_commitment, ZERO_HASH);
        assert_eq!(commitment.proving_system_aux_data_commitment, ZERO_HASH);
    }

    #[test]
    fn test_program_code_takes_precedence_over_key() {
        let data = groth16_data().with_vm_program_code(b"elf".to_vec());
        let commitment = data.commitment().unwrap();
        assert_eq!(
            commitment.proving_system_aux_data_commitment,
            keccak256(b"elf")
        );
    }

    #[test]
    fn test_empty_proof_rejected() {
        let data = VerificationData::new(ProvingSystemId::Risc0, Vec::new(), ADDR);
        assert!(matches!(data.commitment(), Err(SdkError::EmptyProof)));
    }

    #[test]
    fn test_malformed_address_rejected() {
        let mut data = groth16_data();
        data.proof_generator_address = "0xnothex".to_string();
        assert!(matches!(
            data.commitment(),
            Err(SdkError::InvalidAddressEncoding(_))
        ));
    }

    #[test]
    fn test_leaf_hash_is_hash_of_preimage() {
        let commitment = groth16_data().commitment().unwrap();
        assert_eq!(commitment.leaf_hash(), keccak256(&commitment.preimage()));
    }

    #[test]
    fn test_build_normalizes_address_and_recovers_signer() {
        let key = SubmitterSigningKey::generate();
        let data = VerificationData::new(
            ProvingSystemId::GnarkPlonkBn254,
            vec![9u8; 64],
            "0x66f9664f97F2b50F62D13eA064982f936dE76657",
        );

        let message = ClientMessage::build(data, &key).unwrap();
        assert_eq!(
            message.verification_data.proof_generator_address,
            "0x66f9664f97f2b50f62d13ea064982f936de76657"
        );
        assert_eq!(message.recover_signer().unwrap(), key.address());
    }

    #[test]
    fn test_build_fails_without_partial_message() {
        let key = SubmitterSigningKey::generate();
        let data = VerificationData::new(ProvingSystemId::SP1, vec![1], "0x12");
        assert!(ClientMessage::build(data, &key).is_err());
    }

    #[test]
    fn test_wire_json_shape() {
        let key = SubmitterSigningKey::generate();
        let message = ClientMessage::build(groth16_data(), &key).unwrap();
        let value: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();

        let vd = &value["verification_data"];
        assert_eq!(vd["proving_system"], "Groth16Bn254");
        assert_eq!(vd["proof"], "cHJvb2YtYnl0ZXM=");
        assert_eq!(vd["public_input"], "cHViLWJ5dGVz");
        assert_eq!(vd["verification_key"], "dmstYnl0ZXM=");
        assert!(vd["vm_program_code"].is_null());
        assert_eq!(vd["proof_generator_addr"], ADDR);

        let sig = &value["signature"];
        assert_eq!(sig["r"].as_str().unwrap().len(), 66);
        assert_eq!(sig["s"].as_str().unwrap().len(), 66);
        assert!(sig["v"].is_u64());

        let decoded: ClientMessage = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, message);
    }
}
