//! Capability types describing cryptographic keys and account key slots.
//!
//! Raw `u8` values of the algorithm enums are part of the interpreted
//! language's surface (they are the `rawValue` of the enum cases) and of
//! the wire protocol, so they must never be renumbered.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PrimitiveError;
use crate::types::UFix64;

/// Signature algorithm of a public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SignatureAlgorithm {
    EcdsaP256 = 1,
    EcdsaSecp256k1 = 2,
    BlsBls12381 = 3,
}

impl SignatureAlgorithm {
    /// Convert from the enum case raw value.
    pub fn from_raw(raw: u8) -> Result<Self, PrimitiveError> {
        match raw {
            1 => Ok(Self::EcdsaP256),
            2 => Ok(Self::EcdsaSecp256k1),
            3 => Ok(Self::BlsBls12381),
            _ => Err(PrimitiveError::UnknownSignatureAlgorithm(raw)),
        }
    }

    /// The enum case raw value.
    pub fn raw(self) -> u8 {
        self as u8
    }

    /// Name of the enum case as seen by interpreted code.
    pub fn name(self) -> &'static str {
        match self {
            Self::EcdsaP256 => "ECDSA_P256",
            Self::EcdsaSecp256k1 => "ECDSA_secp256k1",
            Self::BlsBls12381 => "BLS_BLS12_381",
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hash algorithm paired with an account key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HashAlgorithm {
    Sha2_256 = 1,
    Sha2_384 = 2,
    Sha3_256 = 3,
    Sha3_384 = 4,
    Kmac128BlsBls12381 = 5,
    Keccak256 = 6,
}

impl HashAlgorithm {
    /// Convert from the enum case raw value.
    pub fn from_raw(raw: u8) -> Result<Self, PrimitiveError> {
        match raw {
            1 => Ok(Self::Sha2_256),
            2 => Ok(Self::Sha2_384),
            3 => Ok(Self::Sha3_256),
            4 => Ok(Self::Sha3_384),
            5 => Ok(Self::Kmac128BlsBls12381),
            6 => Ok(Self::Keccak256),
            _ => Err(PrimitiveError::UnknownHashAlgorithm(raw)),
        }
    }

    /// The enum case raw value.
    pub fn raw(self) -> u8 {
        self as u8
    }

    /// Name of the enum case as seen by interpreted code.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha2_256 => "SHA2_256",
            Self::Sha2_384 => "SHA2_384",
            Self::Sha3_256 => "SHA3_256",
            Self::Sha3_384 => "SHA3_384",
            Self::Kmac128BlsBls12381 => "KMAC128_BLS_BLS12_381",
            Self::Keccak256 => "KECCAK_256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Public key material and its signature algorithm.
///
/// Validity of `public_key` is asserted by the host, never checked here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    pub public_key: Vec<u8>,
    pub sign_algo: SignatureAlgorithm,
}

impl PublicKey {
    pub fn new(public_key: impl Into<Vec<u8>>, sign_algo: SignatureAlgorithm) -> Self {
        Self {
            public_key: public_key.into(),
            sign_algo,
        }
    }
}

/// One slot in an account's key list.
///
/// Slots are never reused: revocation flips `is_revoked`, and `key_index`
/// (assigned by the host when the key is added) is the stable identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountKey {
    pub key_index: u32,
    pub public_key: PublicKey,
    pub hash_algo: HashAlgorithm,
    pub weight: UFix64,
    pub is_revoked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_algorithm_raw_values() {
        // Raw values are part of the language surface; never renumber
        assert_eq!(SignatureAlgorithm::EcdsaP256.raw(), 1);
        assert_eq!(SignatureAlgorithm::EcdsaSecp256k1.raw(), 2);
        assert_eq!(SignatureAlgorithm::BlsBls12381.raw(), 3);
        for raw in 1..=3 {
            assert_eq!(SignatureAlgorithm::from_raw(raw).unwrap().raw(), raw);
        }
    }

    #[test]
    fn test_signature_algorithm_rejects_unknown() {
        assert_eq!(
            SignatureAlgorithm::from_raw(0),
            Err(PrimitiveError::UnknownSignatureAlgorithm(0))
        );
        assert!(SignatureAlgorithm::from_raw(4).is_err());
    }

    #[test]
    fn test_hash_algorithm_raw_values() {
        for raw in 1..=6 {
            assert_eq!(HashAlgorithm::from_raw(raw).unwrap().raw(), raw);
        }
        assert!(HashAlgorithm::from_raw(0).is_err());
        assert!(HashAlgorithm::from_raw(7).is_err());
        assert_eq!(HashAlgorithm::Sha3_256.name(), "SHA3_256");
    }
}
