//! Account addresses.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PrimitiveError;
use crate::types::{from_hex, to_hex, ADDRESS_LENGTH};

/// Fixed-width identifier of an account.
///
/// Serialized as a `0x`-prefixed hex string so genesis files and logs
/// stay readable.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; ADDRESS_LENGTH]);

    /// Wrap raw address bytes.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Build an address from a slice, left-padding with zeros.
    ///
    /// Fails if the slice is longer than [`ADDRESS_LENGTH`].
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        if bytes.len() > ADDRESS_LENGTH {
            return Err(PrimitiveError::InvalidAddress(to_hex(bytes)));
        }
        let mut out = [0u8; ADDRESS_LENGTH];
        out[ADDRESS_LENGTH - bytes.len()..].copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Build an address from its big-endian integer value.
    pub const fn from_u64(value: u64) -> Self {
        Self(value.to_be_bytes())
    }

    /// The big-endian integer value of the address.
    pub const fn to_u64(self) -> u64 {
        u64::from_be_bytes(self.0)
    }

    /// The raw bytes.
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Hex rendering with leading zero digits stripped, e.g. `0x1`.
    pub fn short_hex(&self) -> String {
        let full = to_hex(&self.0);
        let trimmed = full.trim_start_matches('0');
        if trimmed.is_empty() {
            "0x0".to_string()
        } else {
            format!("0x{}", trimmed)
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", to_hex(&self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.is_empty() || digits.len() > ADDRESS_LENGTH * 2 {
            return Err(PrimitiveError::InvalidAddress(s.to_string()));
        }
        // Odd-length input is left-padded by one nibble.
        let padded = if digits.len() % 2 == 1 {
            format!("0{}", digits)
        } else {
            digits.to_string()
        };
        let bytes =
            from_hex(&padded).ok_or_else(|| PrimitiveError::InvalidAddress(s.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl TryFrom<String> for Address {
    type Error = PrimitiveError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl From<[u8; ADDRESS_LENGTH]> for Address {
    fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}
