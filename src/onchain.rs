//! On-chain inclusion check
//!
//! Asks the service manager contract whether a batch containing a given
//! commitment has been verified.

use alloy::primitives::{Address, Bytes, FixedBytes, U256};
use alloy::providers::ProviderBuilder;
use alloy::sol;
use tracing::{debug, info};

use crate::domain::{Address20, AlignedVerificationData, Hash256};
use crate::infra::{Result, SdkError};

/// Default chain id (Holesky)
pub const DEFAULT_CHAIN_ID: u64 = 17000;

// Generate contract bindings
sol! {
    #[sol(rpc)]
    interface IAlignedServiceManager {
        function verifyBatchInclusion(
            bytes32 proofCommitment,
            bytes32 pubInputCommitment,
            bytes32 provingSystemAuxDataCommitment,
            bytes20 proofGeneratorAddr,
            bytes32 batchMerkleRoot,
            bytes merkleProof,
            uint256 verificationDataBatchIndex
        ) external view returns (bool);
    }
}

/// Service manager connection settings
#[derive(Debug, Clone)]
pub struct ServiceManagerConfig {
    /// Ethereum JSON-RPC endpoint
    pub rpc_url: String,
    /// Service manager contract address
    pub service_manager_address: Address,
    /// Chain ID
    pub chain_id: u64,
}

impl ServiceManagerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let rpc_url = std::env::var("ETH_RPC_URL")
            .map_err(|_| SdkError::Configuration("ETH_RPC_URL is not set".to_string()))?;
        let service_manager_address = std::env::var("ALIGNED_SERVICE_MANAGER_ADDRESS")
            .map_err(|_| {
                SdkError::Configuration("ALIGNED_SERVICE_MANAGER_ADDRESS is not set".to_string())
            })?
            .parse()
            .map_err(|e| SdkError::Configuration(format!("invalid service manager address: {e}")))?;
        let chain_id = std::env::var("CHAIN_ID")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CHAIN_ID);

        Ok(Self {
            rpc_url,
            service_manager_address,
            chain_id,
        })
    }
}

/// Read-only client for the service manager's inclusion check
pub struct ServiceManagerVerifier {
    config: ServiceManagerConfig,
}

impl ServiceManagerVerifier {
    pub fn new(config: ServiceManagerConfig) -> Self {
        Self { config }
    }

    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    /// Convert Hash256 to FixedBytes<32>
    fn to_bytes32(hash: &Hash256) -> FixedBytes<32> {
        FixedBytes::from_slice(hash)
    }

    fn to_bytes20(addr: &Address20) -> FixedBytes<20> {
        FixedBytes::from_slice(addr)
    }

    /// Ask the contract whether `data` is part of a verified batch.
    ///
    /// The local inclusion check runs first; a proof that does not fold to
    /// its own root is never sent.
    pub async fn is_verified_onchain(&self, data: &AlignedVerificationData) -> Result<bool> {
        data.ensure_inclusion()?;

        let commitment = &data.verification_data_commitment;
        info!(
            batch_merkle_root = %hex::encode(data.batch_merkle_root),
            index_in_batch = data.index_in_batch,
            "Checking batch inclusion on-chain"
        );

        let provider = ProviderBuilder::new().on_http(
            self.config
                .rpc_url
                .parse()
                .map_err(|e| SdkError::Configuration(format!("Invalid RPC URL: {}", e)))?,
        );

        let contract = IAlignedServiceManager::new(self.config.service_manager_address, &provider);

        let result = contract
            .verifyBatchInclusion(
                Self::to_bytes32(&commitment.proof_commitment),
                Self::to_bytes32(&commitment.public_input_commitment),
                Self::to_bytes32(&commitment.proving_system_aux_data_commitment),
                Self::to_bytes20(&commitment.proof_generator_addr),
                Self::to_bytes32(&data.batch_merkle_root),
                Bytes::from(data.batch_inclusion_proof.to_concatenated_bytes()),
                U256::from(data.index_in_batch),
            )
            .call()
            .await
            .map_err(|e| SdkError::Onchain(format!("Contract call failed: {}", e)))?;

        debug!(verified = result._0, "Service manager answered");
        Ok(result._0)
    }
}
