//! Batch submission
//!
//! Turns a sequence of verification records into signed client messages,
//! hands them to a [`BatchTransport`] in order, and pairs each response with
//! the commitment it answers:
//! - Messages are built up front; one bad record aborts before anything is sent
//! - Submission order is preserved, since `index_in_batch` correlates with it
//! - Each response can be checked against its own commitment on receipt
//! - A failure partway returns the evidence gathered so far with the error

use tracing::{debug, info, warn};

use crate::crypto::SubmitterSigningKey;
use crate::domain::{
    AlignedVerificationData, BatchInclusionData, ClientMessage, VerificationData,
    VerificationDataCommitment,
};

use super::error::{Result, SdkError};
use super::traits::BatchTransport;

/// Configuration for batch submission
#[derive(Debug, Clone)]
pub struct SubmitterConfig {
    /// Aggregator endpoint. Not read here; transports built from this
    /// config connect to it.
    pub batcher_url: Option<String>,
    /// Hex-encoded submitter private key
    pub private_key: String,
    /// Check every response against its commitment before returning it
    pub verify_on_receipt: bool,
}

impl SubmitterConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let batcher_url = std::env::var("BATCHER_URL").ok();
        let private_key = std::env::var("SUBMITTER_PRIVATE_KEY").map_err(|_| {
            SdkError::Configuration("SUBMITTER_PRIVATE_KEY is not set".to_string())
        })?;
        let verify_on_receipt = std::env::var("VERIFY_ON_RECEIPT")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        Ok(Self {
            batcher_url,
            private_key,
            verify_on_receipt,
        })
    }

    /// Parse the configured private key
    pub fn signing_key(&self) -> Result<SubmitterSigningKey> {
        SubmitterSigningKey::from_hex(&self.private_key)
    }
}

/// Sign every record, preserving order. Fails as a whole on the first bad
/// record.
pub fn build_client_messages(
    verification_data: &[VerificationData],
    signing_key: &SubmitterSigningKey,
) -> Result<Vec<ClientMessage>> {
    build_signed(verification_data, signing_key)
        .map(|pairs| pairs.into_iter().map(|(message, _)| message).collect())
}

fn build_signed(
    verification_data: &[VerificationData],
    signing_key: &SubmitterSigningKey,
) -> Result<Vec<(ClientMessage, VerificationDataCommitment)>> {
    if verification_data.is_empty() {
        return Err(SdkError::EmptyBatch);
    }

    verification_data
        .iter()
        .map(|data| {
            let message = ClientMessage::build(data.clone(), signing_key)?;
            let commitment = message.commitment()?;
            Ok((message, commitment))
        })
        .collect()
}

/// Submits proofs through a transport and collects inclusion evidence
pub struct BatchSubmitter<T> {
    transport: T,
    signing_key: SubmitterSigningKey,
    verify_on_receipt: bool,
}

impl<T: BatchTransport> BatchSubmitter<T> {
    pub fn new(transport: T, signing_key: SubmitterSigningKey) -> Self {
        Self {
            transport,
            signing_key,
            verify_on_receipt: true,
        }
    }

    /// Create a submitter from configuration
    pub fn from_config(transport: T, config: &SubmitterConfig) -> Result<Self> {
        Ok(Self::new(transport, config.signing_key()?)
            .with_verify_on_receipt(config.verify_on_receipt))
    }

    pub fn with_verify_on_receipt(mut self, verify_on_receipt: bool) -> Self {
        self.verify_on_receipt = verify_on_receipt;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit a single record
    pub async fn submit(&self, verification_data: VerificationData) -> Result<AlignedVerificationData> {
        let mut results = self.submit_multiple(&[verification_data]).await?;
        results.pop().ok_or(SdkError::EmptyBatch)
    }

    /// Submit records in order and return their inclusion evidence in the
    /// same order.
    ///
    /// Sending stops at the first failing item. If earlier items already
    /// went through, their evidence comes back in
    /// [`SdkError::PartialSubmission`] so they are not submitted again.
    pub async fn submit_multiple(
        &self,
        verification_data: &[VerificationData],
    ) -> Result<Vec<AlignedVerificationData>> {
        let signed = build_signed(verification_data, &self.signing_key)?;

        info!(
            count = signed.len(),
            submitter = %hex::encode(self.signing_key.address()),
            "Submitting proofs to aggregator"
        );

        let mut results = Vec::with_capacity(signed.len());
        for (position, (message, commitment)) in signed.iter().enumerate() {
            let aligned = match self.submit_signed(message, commitment).await {
                Ok(aligned) => aligned,
                Err(e) if results.is_empty() => return Err(e),
                Err(e) => {
                    warn!(
                        position,
                        accepted = results.len(),
                        error = %e,
                        "Submission stopped partway"
                    );
                    return Err(SdkError::PartialSubmission {
                        accepted: results,
                        source: Box::new(e),
                    });
                }
            };

            debug!(
                position,
                index_in_batch = aligned.index_in_batch,
                batch_merkle_root = %hex::encode(aligned.batch_merkle_root),
                "Proof included in batch"
            );

            results.push(aligned);
        }

        info!(count = results.len(), "All proofs included");
        Ok(results)
    }

    async fn submit_signed(
        &self,
        message: &ClientMessage,
        commitment: &VerificationDataCommitment,
    ) -> Result<AlignedVerificationData> {
        let response = self.transport.send(message).await?;
        let inclusion = BatchInclusionData::from_slice(&response)?;
        let aligned = AlignedVerificationData::new(*commitment, &inclusion)?;

        if self.verify_on_receipt {
            aligned.ensure_inclusion()?;
        }
        Ok(aligned)
    }
}
