//! Host-side error type for the Quarry host environment contract.
//!
//! `HostError` is what every fallible capability trait method returns.
//! Absence ("no key at this index", "no contract with this name") is never
//! a `HostError`: it travels as `Ok(None)` or an empty result.

use std::fmt;

use quarry_primitives::Address;

/// Failure reported by a host environment.
///
/// Every variant is a hard fault for the calling execution. The bridge
/// never retries or suppresses one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Host storage I/O failed.
    Io(String),
    /// Host ledger state is inconsistent with the request.
    Inconsistent(String),
    /// The host rejected public key material.
    InvalidPublicKey(String),
    /// The account does not exist on the ledger.
    AccountNotFound(Address),
    /// The method has no finished implementation on this host (or on the
    /// far end of a transport).
    Unimplemented(String),
    /// The transport to an out-of-process host failed.
    Transport(String),
    /// Any other host-internal failure.
    Internal(String),
}

impl HostError {
    /// Create an unimplemented-method error.
    pub fn unimplemented(method: impl Into<String>) -> Self {
        Self::Unimplemented(method.into())
    }

    /// Create an inconsistent-state error.
    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Self::Inconsistent(msg.into())
    }

    /// Short machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Inconsistent(_) => "inconsistent",
            Self::InvalidPublicKey(_) => "invalid_public_key",
            Self::AccountNotFound(_) => "account_not_found",
            Self::Unimplemented(_) => "unimplemented",
            Self::Transport(_) => "transport",
            Self::Internal(_) => "internal",
        }
    }

    /// Returns true if this error marks a method without an implementation.
    pub fn is_unimplemented(&self) -> bool {
        matches!(self, Self::Unimplemented(_))
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "host I/O error: {}", msg),
            Self::Inconsistent(msg) => write!(f, "inconsistent host state: {}", msg),
            Self::InvalidPublicKey(msg) => write!(f, "invalid public key: {}", msg),
            Self::AccountNotFound(address) => {
                write!(f, "account {} not found", address.short_hex())
            }
            Self::Unimplemented(method) => write!(f, "host method not implemented: {}", method),
            Self::Transport(msg) => write!(f, "host transport error: {}", msg),
            Self::Internal(msg) => write!(f, "internal host error: {}", msg),
        }
    }
}

impl std::error::Error for HostError {}
