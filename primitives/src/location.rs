//! Program locations.
//!
//! A location names where a piece of program code lives: a contract
//! deployed under an account, a transaction or script being executed, or a
//! host-defined string/identifier import. The transport proxy ships these
//! across the wire for `GetCode` and `ResolveLocation`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::PrimitiveError;
use crate::types::{from_hex, to_hex, Hash};

/// Where a program's code lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    /// A contract deployed under `address` with the given name.
    Address { address: Address, name: String },
    /// A host-defined string import.
    String(String),
    /// A host-defined identifier import.
    Identifier(String),
    /// The transaction with this hash.
    Transaction(Hash),
    /// The script with this hash.
    Script(Hash),
}

impl Location {
    /// Shorthand for an address location.
    pub fn address(address: Address, name: impl Into<String>) -> Self {
        Self::Address {
            address,
            name: name.into(),
        }
    }

    /// Stable type-id prefix of this location kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Address { .. } => "A",
            Self::String(_) => "S",
            Self::Identifier(_) => "I",
            Self::Transaction(_) => "t",
            Self::Script(_) => "s",
        }
    }

    /// The account address, if this is an address location.
    pub fn account(&self) -> Option<Address> {
        match self {
            Self::Address { address, .. } => Some(*address),
            _ => None,
        }
    }

    /// Stable type-id string, e.g. `A.0000000000000001.Foo` or `S.test`.
    pub fn type_id(&self) -> String {
        match self {
            Self::Address { address, name } => {
                format!("A.{}.{}", to_hex(address.as_bytes()), name)
            }
            Self::String(s) | Self::Identifier(s) => format!("{}.{}", self.prefix(), s),
            Self::Transaction(h) | Self::Script(h) => {
                format!("{}.{}", self.prefix(), to_hex(h))
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_id())
    }
}

fn parse_hash(s: &str, original: &str) -> Result<Hash, PrimitiveError> {
    let bytes = from_hex(s)
        .filter(|b| b.len() == 32)
        .ok_or_else(|| PrimitiveError::InvalidLocation(original.to_string()))?;
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&bytes);
    Ok(hash)
}

impl FromStr for Location {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PrimitiveError::InvalidLocation(s.to_string());
        let (prefix, rest) = s.split_once('.').ok_or_else(invalid)?;
        match prefix {
            "A" => {
                let (address, name) = rest.split_once('.').ok_or_else(invalid)?;
                if name.is_empty() {
                    return Err(invalid());
                }
                let address: Address = address.parse().map_err(|_| invalid())?;
                Ok(Self::address(address, name))
            }
            "S" => Ok(Self::String(rest.to_string())),
            "I" => Ok(Self::Identifier(rest.to_string())),
            "t" => Ok(Self::Transaction(parse_hash(rest, s)?)),
            "s" => Ok(Self::Script(parse_hash(rest, s)?)),
            _ => Err(invalid()),
        }
    }
}

/// A location together with the identifiers it provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub location: Location,
    pub identifiers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ids() {
        let loc = Location::address(Address::from_u64(1), "Foo");
        assert_eq!(loc.type_id(), "A.0000000000000001.Foo");
        assert_eq!(Location::String("test".into()).type_id(), "S.test");
        assert_eq!(Location::Identifier("Crypto".into()).type_id(), "I.Crypto");
        let tx = Location::Transaction([0xab; 32]);
        assert!(tx.type_id().starts_with("t.abab"));
    }

    #[test]
    fn test_parse_type_ids() {
        let loc: Location = "A.0000000000000001.Foo".parse().unwrap();
        assert_eq!(loc, Location::address(Address::from_u64(1), "Foo"));
        assert_eq!(loc.account(), Some(Address::from_u64(1)));

        let script: Location = format!("s.{}", "11".repeat(32)).parse().unwrap();
        assert_eq!(script, Location::Script([0x11; 32]));
        assert_eq!(script.account(), None);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("A.01".parse::<Location>().is_err());
        assert!("A.01.".parse::<Location>().is_err());
        assert!("t.abcd".parse::<Location>().is_err());
        assert!("X.foo".parse::<Location>().is_err());
        assert!("nodot".parse::<Location>().is_err());
    }
}
