//! Interpreted-language values crossing the bridge.
//!
//! The interpreter's real value representation (memory accounting,
//! storage ownership, static types) lives outside this workspace. This
//! module is the narrow slice of it that capability functions decode
//! arguments from and encode results into.

use crate::address::Address;
use crate::error::PrimitiveError;
use crate::keys::{AccountKey, HashAlgorithm, PublicKey, SignatureAlgorithm};
use crate::types::UFix64;

/// An interpreted-language value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Void,
    Bool(bool),
    Int(i64),
    UInt8(u8),
    UInt64(u64),
    UFix64(UFix64),
    String(String),
    Address(Address),
    /// Variable-sized array. Byte arrays are arrays of `UInt8`.
    Array(Vec<Value>),
    /// `nil` or a present value.
    Optional(Option<Box<Value>>),
    HashAlgorithm(HashAlgorithm),
    SignatureAlgorithm(SignatureAlgorithm),
    PublicKey(PublicKeyValue),
    AccountKey(AccountKeyValue),
    DeployedContract(DeployedContractValue),
}

impl Value {
    /// Encode a byte slice as an array of `UInt8`.
    pub fn bytes(data: &[u8]) -> Self {
        Self::Array(data.iter().copied().map(Self::UInt8).collect())
    }

    /// Decode an array of `UInt8` back into bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PrimitiveError> {
        let Self::Array(elements) = self else {
            return Err(PrimitiveError::NotByteArray);
        };
        elements
            .iter()
            .map(|element| match element {
                Self::UInt8(b) => Ok(*b),
                _ => Err(PrimitiveError::NotByteArray),
            })
            .collect()
    }

    /// A present optional.
    pub fn some(value: Value) -> Self {
        Self::Optional(Some(Box::new(value)))
    }

    /// `nil`.
    pub fn nil() -> Self {
        Self::Optional(None)
    }

    /// Build a string value.
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// Returns true if this is `nil`.
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Optional(None))
    }

    /// Unwrap a present optional, returning `None` for `nil` and for
    /// non-optional values.
    pub fn into_some(self) -> Option<Value> {
        match self {
            Self::Optional(inner) => inner.map(|boxed| *boxed),
            _ => None,
        }
    }

    /// Name of the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Void => "Void",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::UInt8(_) => "UInt8",
            Self::UInt64(_) => "UInt64",
            Self::UFix64(_) => "UFix64",
            Self::String(_) => "String",
            Self::Address(_) => "Address",
            Self::Array(_) => "Array",
            Self::Optional(_) => "Optional",
            Self::HashAlgorithm(_) => "HashAlgorithm",
            Self::SignatureAlgorithm(_) => "SignatureAlgorithm",
            Self::PublicKey(_) => "PublicKey",
            Self::AccountKey(_) => "AccountKey",
            Self::DeployedContract(_) => "DeployedContract",
        }
    }
}

/// How a [`PublicKeyValue`] came to be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationSource {
    /// The host validated the key material when the value was built.
    Validated,
    /// The key was read back from host storage, where it was validated
    /// when it was first added.
    AssumedValid,
}

/// A `PublicKey` value.
///
/// There is no way to build one without choosing a validation path:
/// [`validated`](Self::validated) runs the host check,
/// [`assume_validated`](Self::assume_validated) skips it for keys that
/// come from host storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKeyValue {
    key: PublicKey,
    source: ValidationSource,
}

impl PublicKeyValue {
    /// Build a public key value after running `validate` on the key.
    pub fn validated<E>(
        key: PublicKey,
        validate: impl FnOnce(&PublicKey) -> Result<(), E>,
    ) -> Result<Self, E> {
        validate(&key)?;
        Ok(Self {
            key,
            source: ValidationSource::Validated,
        })
    }

    /// Build a public key value for key material that the host already
    /// validated when it stored it.
    pub fn assume_validated(key: PublicKey) -> Self {
        Self {
            key,
            source: ValidationSource::AssumedValid,
        }
    }

    pub fn key(&self) -> &PublicKey {
        &self.key
    }

    pub fn into_key(self) -> PublicKey {
        self.key
    }

    pub fn source(&self) -> ValidationSource {
        self.source
    }

    /// The `publicKey` field as a byte array value.
    pub fn public_key_field(&self) -> Value {
        Value::bytes(&self.key.public_key)
    }
}

/// An `AccountKey` value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountKeyValue {
    pub key_index: u32,
    pub public_key: PublicKeyValue,
    pub hash_algo: HashAlgorithm,
    pub weight: UFix64,
    pub is_revoked: bool,
}

impl AccountKeyValue {
    /// Re-encode a host account key around an already-built public key value.
    pub fn new(key: AccountKey, public_key: PublicKeyValue) -> Self {
        Self {
            key_index: key.key_index,
            public_key,
            hash_algo: key.hash_algo,
            weight: key.weight,
            is_revoked: key.is_revoked,
        }
    }

    /// Convert back into the host-side key type.
    pub fn to_account_key(&self) -> AccountKey {
        AccountKey {
            key_index: self.key_index,
            public_key: self.public_key.key().clone(),
            hash_algo: self.hash_algo,
            weight: self.weight,
            is_revoked: self.is_revoked,
        }
    }
}

/// A `DeployedContract` value: the code stored under one (address, name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeployedContractValue {
    pub address: Address,
    pub name: String,
    pub code: Vec<u8>,
}

impl DeployedContractValue {
    pub fn new(address: Address, name: impl Into<String>, code: Vec<u8>) -> Self {
        Self {
            address,
            name: name.into(),
            code,
        }
    }

    /// The `code` field as a byte array value.
    pub fn code_value(&self) -> Value {
        Value::bytes(&self.code)
    }
}
