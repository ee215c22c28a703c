//! Error type for parsing and constructing primitive values.

use core::fmt;

use crate::event::AccountEventKind;

/// Errors raised while parsing or constructing primitive values.
///
/// These are construction-time failures of plain data. They never reach
/// interpreted code directly; the bridge classifies them on the way up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// An address string was not valid hex or was longer than 8 bytes.
    InvalidAddress(String),

    /// A raw signature algorithm value outside the catalogue.
    UnknownSignatureAlgorithm(u8),

    /// A raw hash algorithm value outside the catalogue.
    UnknownHashAlgorithm(u8),

    /// A location type-id string that could not be parsed.
    InvalidLocation(String),

    /// An event payload with the wrong number of fields.
    EventPayload {
        kind: AccountEventKind,
        expected: usize,
        got: usize,
    },

    /// A value that was expected to be a byte array was not one.
    NotByteArray,
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAddress(s) => write!(f, "invalid address: {:?}", s),
            Self::UnknownSignatureAlgorithm(raw) => {
                write!(f, "unknown signature algorithm: {}", raw)
            }
            Self::UnknownHashAlgorithm(raw) => write!(f, "unknown hash algorithm: {}", raw),
            Self::InvalidLocation(s) => write!(f, "invalid location: {:?}", s),
            Self::EventPayload { kind, expected, got } => write!(
                f,
                "event {} expects {} payload fields, got {}",
                kind.type_id(),
                expected,
                got
            ),
            Self::NotByteArray => write!(f, "value is not a byte array"),
        }
    }
}

impl std::error::Error for PrimitiveError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = PrimitiveError::UnknownHashAlgorithm(42);
        assert!(err.to_string().contains("42"));

        let err = PrimitiveError::EventPayload {
            kind: AccountEventKind::AccountCreated,
            expected: 1,
            got: 2,
        };
        let s = err.to_string();
        assert!(s.contains("flow.AccountCreated"));
        assert!(s.contains("expects 1"));
    }
}
