//! Argument decoding for native-backed functions.
//!
//! The type checker guarantees argument shapes, so every mismatch here is
//! an [`InternalError`].

use quarry_primitives::{Address, HashAlgorithm, PublicKeyValue, UFix64, Value};

use crate::fault::{Fault, FaultResult, InternalError};

pub(crate) struct Arguments<'a> {
    function: &'static str,
    values: &'a [Value],
}

impl<'a> Arguments<'a> {
    /// Check the argument count of `function`.
    pub(crate) fn new(
        function: &'static str,
        values: &'a [Value],
        expected: usize,
    ) -> FaultResult<Self> {
        if values.len() != expected {
            return Err(InternalError::ArgumentCount {
                function,
                expected,
                got: values.len(),
            }
            .into());
        }
        Ok(Self { function, values })
    }

    fn unexpected(&self, index: usize, expected: &'static str) -> Fault {
        InternalError::UnexpectedArgument {
            function: self.function,
            index,
            expected,
        }
        .into()
    }

    fn get(&self, index: usize) -> FaultResult<&'a Value> {
        self.values
            .get(index)
            .ok_or(InternalError::Unreachable("argument index past checked count").into())
    }

    pub(crate) fn address(&self, index: usize) -> FaultResult<Address> {
        match self.get(index)? {
            Value::Address(address) => Ok(*address),
            _ => Err(self.unexpected(index, "an address")),
        }
    }

    pub(crate) fn bytes(&self, index: usize) -> FaultResult<Vec<u8>> {
        self.get(index)?
            .to_bytes()
            .map_err(|_| self.unexpected(index, "a byte array"))
    }

    pub(crate) fn string(&self, index: usize) -> FaultResult<&'a str> {
        match self.get(index)? {
            Value::String(s) => Ok(s),
            _ => Err(self.unexpected(index, "a string")),
        }
    }

    pub(crate) fn public_key(&self, index: usize) -> FaultResult<&'a PublicKeyValue> {
        match self.get(index)? {
            Value::PublicKey(key) => Ok(key),
            _ => Err(self.unexpected(index, "a public key")),
        }
    }

    pub(crate) fn hash_algorithm(&self, index: usize) -> FaultResult<HashAlgorithm> {
        match self.get(index)? {
            Value::HashAlgorithm(algo) => Ok(*algo),
            _ => Err(self.unexpected(index, "a hash algorithm")),
        }
    }

    pub(crate) fn ufix64(&self, index: usize) -> FaultResult<UFix64> {
        match self.get(index)? {
            Value::UFix64(v) => Ok(*v),
            _ => Err(self.unexpected(index, "a UFix64")),
        }
    }

    /// A key index: a non-negative integer that fits in `u32`.
    pub(crate) fn key_index(&self, index: usize) -> FaultResult<u32> {
        let raw = match self.get(index)? {
            Value::Int(n) => u64::try_from(*n).ok(),
            Value::UInt64(n) => Some(*n),
            Value::UInt8(n) => Some(u64::from(*n)),
            _ => None,
        };
        raw.and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| self.unexpected(index, "a non-negative key index"))
    }
}
