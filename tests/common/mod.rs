//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use aligned_sdk::{
    BatchInclusionData, BatchMerkleTree, BatchTransport, ClientMessage, Hash256, ProvingSystemId,
    Result, SdkError, SubmitterSigningKey, VerificationData,
};
use async_trait::async_trait;

/// Fixed submitter key
pub const TEST_PRIVATE_KEY: &str =
    "0x7d2647ad2e1f6c1dce5abe2b5c3b9c8ecfe959e40b989d531bbf6624ff1c62df";

/// Proof generator address used by the fixtures
pub const TEST_GENERATOR: &str = "0x1111111111111111111111111111111111111111";

pub fn test_signing_key() -> SubmitterSigningKey {
    SubmitterSigningKey::from_hex(TEST_PRIVATE_KEY).unwrap()
}

/// Groth16 record with public input and verification key
pub fn groth16_record() -> VerificationData {
    VerificationData::new(
        ProvingSystemId::Groth16Bn254,
        b"proof-bytes".to_vec(),
        TEST_GENERATOR,
    )
    .with_public_input(b"pub-bytes".to_vec())
    .with_verification_key(b"vk-bytes".to_vec())
}

/// zkVM record carrying program code instead of a verification key
pub fn vm_record(tag: u8) -> VerificationData {
    VerificationData::new(ProvingSystemId::SP1, vec![0xaa, tag], TEST_GENERATOR)
        .with_vm_program_code(vec![0xcc, tag])
}

/// A batch of `n` distinct records across proving systems
pub fn mixed_records(n: usize) -> Vec<VerificationData> {
    (0..n)
        .map(|i| {
            let system = ProvingSystemId::ALL[i % ProvingSystemId::ALL.len()];
            VerificationData::new(system, format!("proof-{i}").into_bytes(), TEST_GENERATOR)
                .with_public_input(vec![i as u8; 4])
        })
        .collect()
}

/// In-memory aggregator that batches a known set of records.
///
/// Each received message is looked up by its leaf and answered with the
/// inclusion data of the precomputed tree. Unknown leaves get a transport
/// error. Received messages are kept in arrival order.
pub struct InMemoryAggregator {
    leaves: Vec<Hash256>,
    tree: BatchMerkleTree,
    received: Mutex<Vec<ClientMessage>>,
    tamper_root: bool,
    sends: AtomicUsize,
    fail_at: Option<usize>,
}

impl InMemoryAggregator {
    pub fn new(batch: &[VerificationData]) -> Self {
        let leaves: Vec<Hash256> = batch
            .iter()
            .map(|d| d.commitment().unwrap().leaf_hash())
            .collect();
        let tree = BatchMerkleTree::from_leaves(&leaves).unwrap();
        Self {
            leaves,
            tree,
            received: Mutex::new(Vec::new()),
            tamper_root: false,
            sends: AtomicUsize::new(0),
            fail_at: None,
        }
    }

    /// Answer with a root that does not match the tree
    pub fn with_tampered_root(mut self) -> Self {
        self.tamper_root = true;
        self
    }

    /// Drop the connection on the send numbered `call` (0-based)
    pub fn failing_at(mut self, call: usize) -> Self {
        self.fail_at = Some(call);
        self
    }

    pub fn root(&self) -> Hash256 {
        self.tree.root()
    }

    pub fn received(&self) -> Vec<ClientMessage> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchTransport for InMemoryAggregator {
    async fn send(&self, message: &ClientMessage) -> Result<Vec<u8>> {
        let call = self.sends.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(call) {
            return Err(SdkError::Transport("connection reset".to_string()));
        }

        let leaf = message.commitment()?.leaf_hash();
        let index = self
            .leaves
            .iter()
            .position(|l| *l == leaf)
            .ok_or_else(|| SdkError::Transport("unknown submission".to_string()))?;

        self.received.lock().unwrap().push(message.clone());

        let mut root = self.tree.root();
        if self.tamper_root {
            root[31] ^= 0x01;
        }
        let response = BatchInclusionData {
            batch_merkle_root: root,
            batch_inclusion_proof: vec![self.tree.proof(index)?],
            index_in_batch: index,
        };
        Ok(serde_json::to_vec(&response)?)
    }
}
