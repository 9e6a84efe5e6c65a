//! Submitter signing and signature encoding
//!
//! Submissions are signed with recoverable secp256k1 ECDSA over the 32-byte
//! batch leaf (no message prefix), so the aggregator can recover the
//! submitter's Ethereum address from `(r, s, v)`. Nonces are RFC 6979
//! deterministic: the same key and leaf always yield the same signature.

use alloy::primitives::{PrimitiveSignature as EcdsaSignature, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::domain::{Address20, Hash256, Signature};
use crate::infra::{Result, SdkError};

/// Length of a raw recoverable signature: r(32) || s(32) || v(1)
pub const RAW_SIGNATURE_LENGTH: usize = 65;

/// Raw recoverable signature bytes
pub type RawSignature = [u8; RAW_SIGNATURE_LENGTH];

/// secp256k1 secret key (32 bytes)
pub type SecretKey32 = [u8; 32];

// ============================================================================
// Submitter Signing Key
// ============================================================================

/// Private key a submitter signs commitments with
#[derive(Clone)]
pub struct SubmitterSigningKey {
    signer: PrivateKeySigner,
}

impl SubmitterSigningKey {
    /// Generate a new random signing key
    pub fn generate() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
        }
    }

    /// Create from secret key bytes
    pub fn from_bytes(bytes: &SecretKey32) -> Result<Self> {
        let signer = PrivateKeySigner::from_bytes(&B256::from(*bytes))
            .map_err(|e| SdkError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self { signer })
    }

    /// Parse a hex private key (with or without 0x prefix)
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let signer: PrivateKeySigner = hex_str
            .trim()
            .parse()
            .map_err(|e| SdkError::InvalidPrivateKey(format!("{e}")))?;
        Ok(Self { signer })
    }

    /// Ethereum address of this key
    pub fn address(&self) -> Address20 {
        self.signer.address().0 .0
    }

    /// Sign a 32-byte hash, returning r || s || v with v in {27, 28}.
    pub fn sign_hash(&self, hash: &Hash256) -> Result<RawSignature> {
        let signature = self
            .signer
            .sign_hash_sync(&B256::from(*hash))
            .map_err(|e| SdkError::Signing(e.to_string()))?;

        let mut raw: RawSignature = signature.as_bytes();
        if raw[64] < 27 {
            raw[64] += 27;
        }
        Ok(raw)
    }

    /// Sign a hash and encode it for the wire
    pub fn sign(&self, hash: &Hash256) -> Result<Signature> {
        let raw = self.sign_hash(hash)?;
        signature_from_raw(&raw)
    }
}

impl std::fmt::Debug for SubmitterSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmitterSigningKey")
            .field("address", &format!("0x{}", hex::encode(self.address())))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Signature Codec
// ============================================================================

/// Split a raw 65-byte signature into its wire form.
///
/// `r = raw[0..32]`, `s = raw[32..64]`, `v = raw[64]`, with r and s rendered
/// as 0x-prefixed lowercase hex.
pub fn signature_from_raw(raw: &[u8]) -> Result<Signature> {
    if raw.len() != RAW_SIGNATURE_LENGTH {
        return Err(SdkError::InvalidSignatureLength(raw.len()));
    }

    Ok(Signature {
        v: raw[64],
        r: format!("0x{}", hex::encode(&raw[..32])),
        s: format!("0x{}", hex::encode(&raw[32..64])),
    })
}

/// Reassemble r || s || v from the wire form
pub fn signature_to_raw(signature: &Signature) -> Result<RawSignature> {
    let r = decode_component(&signature.r)?;
    let s = decode_component(&signature.s)?;

    let mut raw = [0u8; RAW_SIGNATURE_LENGTH];
    raw[..32].copy_from_slice(&r);
    raw[32..64].copy_from_slice(&s);
    raw[64] = signature.v;
    Ok(raw)
}

fn decode_component(hex_str: &str) -> Result<[u8; 32]> {
    let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    let bytes = hex::decode(stripped)
        .map_err(|e| SdkError::Signing(format!("malformed signature component: {e}")))?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        SdkError::Signing(format!("signature component must be 32 bytes, got {}", b.len()))
    })
}

// ============================================================================
// Recovery
// ============================================================================

/// Recover the Ethereum address that signed `hash`
pub fn recover_signer(hash: &Hash256, signature: &Signature) -> Result<Address20> {
    let raw = signature_to_raw(signature)?;
    let ecdsa = EcdsaSignature::try_from(&raw[..])
        .map_err(|e| SdkError::Signing(format!("invalid signature: {e}")))?;
    let address = ecdsa
        .recover_address_from_prehash(&B256::from(*hash))
        .map_err(|e| SdkError::Signing(format!("recovery failed: {e}")))?;
    Ok(address.0 .0)
}

// ============================================================================
// Tests
// ============================================================================
