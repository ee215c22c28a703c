//! Faults raised by capability functions.
//!
//! A capability call either returns a value (possibly an absent optional)
//! or a [`Fault`]. Faults fall into three disjoint classes and every one
//! of them aborts the enclosing execution. Absence is never a fault.

use quarry_hostapi::HostError;
use quarry_primitives::Address;
use thiserror::Error;

/// Result type of every capability function.
pub type FaultResult<T> = Result<T, Fault>;

/// The calling program broke a structural precondition that the type
/// checker should have ruled out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("unreachable: {0}")]
    Unreachable(&'static str),

    #[error("{function}: argument {index} must be {expected}")]
    UnexpectedArgument {
        function: &'static str,
        index: usize,
        expected: &'static str,
    },

    #[error("{function}: expected {expected} arguments, got {got}")]
    ArgumentCount {
        function: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{object} has no member `{member}`")]
    UnknownMember { object: &'static str, member: String },
}

/// A well-formed request that the ledger rules do not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LegalityError {
    #[error("contract name argument cannot be empty. it must match the name of the deployed contract")]
    EmptyContractName,

    #[error("cannot overwrite existing contract with name {name:?} in account {address}")]
    ContractExists { name: String, address: Address },

    #[error("cannot update non-existing contract with name {name:?} in account {address}")]
    ContractNotFound { name: String, address: Address },

    #[error("cannot remove contract `{name}`: contracts declaring enums cannot be removed")]
    ContractRemovalForbidden { name: String },
}

/// Class of a [`Fault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultClass {
    Internal,
    Host,
    Legality,
}

/// Any failure of a capability function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error(transparent)]
    Internal(#[from] InternalError),

    /// Propagated from the host unchanged.
    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Legality(#[from] LegalityError),
}

impl Fault {
    pub fn class(&self) -> FaultClass {
        match self {
            Self::Internal(_) => FaultClass::Internal,
            Self::Host(_) => FaultClass::Host,
            Self::Legality(_) => FaultClass::Legality,
        }
    }

    /// Whether this fault ends the enclosing execution. Every fault does.
    pub fn aborts_execution(&self) -> bool {
        true
    }

    pub fn unknown_member(object: &'static str, member: &str) -> Self {
        InternalError::UnknownMember {
            object,
            member: member.to_string(),
        }
        .into()
    }
}
