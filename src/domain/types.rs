//! Core type definitions for the submission client
//!
//! Fixed-size digests, the proving system registry, and the serde helpers used
//! by the wire types.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::infra::SdkError;

/// 32-byte Keccak-256 digest
pub type Hash256 = [u8; 32];

/// 20-byte Ethereum address
pub type Address20 = [u8; 20];

/// Digest used wherever an optional field is absent
pub const ZERO_HASH: Hash256 = [0u8; 32];

// ============================================================================
// Proving System Registry
// ============================================================================

/// Proof systems accepted by the aggregation service.
///
/// Discriminants are the legacy numeric ids and index [`WIRE_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProvingSystemId {
    GnarkPlonkBls12_381 = 0,
    GnarkPlonkBn254 = 1,
    Groth16Bn254 = 2,
    SP1 = 3,
    Halo2KZG = 4,
    Halo2IPA = 5,
    Risc0 = 6,
}

/// Canonical wire names, indexed by [`ProvingSystemId::ordinal`].
const WIRE_NAMES: [&str; ProvingSystemId::ALL.len()] = [
    "GnarkPlonkBls12_381",
    "GnarkPlonkBn254",
    "Groth16Bn254",
    "SP1",
    "Halo2KZG",
    "Halo2IPA",
    "Risc0",
];

// ALL must list every variant in discriminant order.
const _: () = {
    let mut i = 0;
    while i < ProvingSystemId::ALL.len() {
        assert!(ProvingSystemId::ALL[i].ordinal() == i);
        i += 1;
    }
};

impl ProvingSystemId {
    /// Every supported proving system, in discriminant order
    pub const ALL: [ProvingSystemId; 7] = [
        ProvingSystemId::GnarkPlonkBls12_381,
        ProvingSystemId::GnarkPlonkBn254,
        ProvingSystemId::Groth16Bn254,
        ProvingSystemId::SP1,
        ProvingSystemId::Halo2KZG,
        ProvingSystemId::Halo2IPA,
        ProvingSystemId::Risc0,
    ];

    const fn ordinal(self) -> usize {
        match self {
            ProvingSystemId::GnarkPlonkBls12_381 => 0,
            ProvingSystemId::GnarkPlonkBn254 => 1,
            ProvingSystemId::Groth16Bn254 => 2,
            ProvingSystemId::SP1 => 3,
            ProvingSystemId::Halo2KZG => 4,
            ProvingSystemId::Halo2IPA => 5,
            ProvingSystemId::Risc0 => 6,
        }
    }

    /// Canonical wire name expected by the aggregator
    pub const fn name(self) -> &'static str {
        WIRE_NAMES[self.ordinal()]
    }

    /// Legacy numeric id
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ProvingSystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProvingSystemId {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.name() == s)
            .ok_or_else(|| SdkError::UnsupportedProvingSystem(s.to_string()))
    }
}

impl TryFrom<u8> for ProvingSystemId {
    type Error = SdkError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| SdkError::UnsupportedProvingSystem(value.to_string()))
    }
}

impl Serialize for ProvingSystemId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ProvingSystemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ProvingSystemVisitor;

        impl de::Visitor<'_> for ProvingSystemVisitor {
            type Value = ProvingSystemId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a proving system name or numeric id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                u8::try_from(v)
                    .map_err(|_| SdkError::UnsupportedProvingSystem(v.to_string()))
                    .and_then(ProvingSystemId::try_from)
                    .map_err(E::custom)
            }
        }

        deserializer.deserialize_any(ProvingSystemVisitor)
    }
}

// ============================================================================
// Address Helpers
// ============================================================================

/// Decode a "0x"-prefixed (or bare) 40-hex-character address.
pub fn parse_address(s: &str) -> Result<Address20, SdkError> {
    let hex_str = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(hex_str)
        .map_err(|e| SdkError::InvalidAddressEncoding(format!("{s}: {e}")))?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        SdkError::InvalidAddressEncoding(format!("{s}: expected 20 bytes, got {}", b.len()))
    })
}

/// Lowercase "0x"-prefixed address string
pub fn address_to_hex(addr: &Address20) -> String {
    format!("0x{}", hex::encode(addr))
}

// ============================================================================
// Serde Helpers
// ============================================================================

/// Serde module for byte buffers as standard base64 strings
pub mod bytes_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s.as_bytes()).map_err(serde::de::Error::custom)
    }
}

/// Serde module for optional byte buffers; absent values serialize as `null`
pub mod option_bytes_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(opt: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match opt {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        opt.map(|s| STANDARD.decode(s.as_bytes()).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Serde module for a 32-byte hash as standard base64
pub mod hash256_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = STANDARD
            .decode(s.as_bytes())
            .map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes for Hash256"))
    }
}

/// Serde module for a list of 32-byte hashes as standard base64
pub mod vec_hash256_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{self, ser::SerializeSeq, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(hashes: &[[u8; 32]], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(hashes.len()))?;
        for h in hashes {
            seq.serialize_element(&STANDARD.encode(h))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<[u8; 32]>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Vec<String> = Vec::deserialize(deserializer)?;
        encoded
            .into_iter()
            .map(|s| {
                let bytes = STANDARD
                    .decode(s.as_bytes())
                    .map_err(serde::de::Error::custom)?;
                bytes
                    .try_into()
                    .map_err(|_| serde::de::Error::custom("expected 32 bytes for Hash256"))
            })
            .collect()
    }
}

/// Serde module for Hash256 with 0x prefix
pub mod hash256_hex_0x {
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let hex_str = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(hex_str).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes for Hash256"))
    }
}

/// Serde module for a list of Hash256 with 0x prefix
pub mod vec_hash256_hex_0x {
    use serde::{self, ser::SerializeSeq, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(hashes: &[[u8; 32]], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(hashes.len()))?;
        for h in hashes {
            seq.serialize_element(&format!("0x{}", hex::encode(h)))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<[u8; 32]>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Vec<String> = Vec::deserialize(deserializer)?;
        encoded
            .into_iter()
            .map(|s| {
                let hex_str = s.strip_prefix("0x").unwrap_or(&s);
                let bytes = hex::decode(hex_str).map_err(serde::de::Error::custom)?;
                bytes
                    .try_into()
                    .map_err(|_| serde::de::Error::custom("expected 32 bytes for Hash256"))
            })
            .collect()
    }
}

/// Serde module for a 20-byte address with 0x prefix
pub mod address20_hex_0x {
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 20], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::address_to_hex(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 20], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_address(&s).map_err(serde::de::Error::custom)
    }
}
