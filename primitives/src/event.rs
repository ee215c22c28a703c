//! The fixed catalogue of account events.
//!
//! Capability functions raise these synchronously after the host confirms
//! a mutation. This layer only constructs them; persistence belongs to the
//! host's event log.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::PrimitiveError;
use crate::value::Value;

/// Kind of account event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountEventKind {
    AccountCreated,
    AccountKeyAdded,
    AccountKeyRemoved,
    AccountContractAdded,
    AccountContractUpdated,
    AccountContractRemoved,
}

impl AccountEventKind {
    /// All kinds, in catalogue order.
    pub const ALL: [Self; 6] = [
        Self::AccountCreated,
        Self::AccountKeyAdded,
        Self::AccountKeyRemoved,
        Self::AccountContractAdded,
        Self::AccountContractUpdated,
        Self::AccountContractRemoved,
    ];

    /// Qualified event type identifier.
    pub fn type_id(self) -> &'static str {
        match self {
            Self::AccountCreated => "flow.AccountCreated",
            Self::AccountKeyAdded => "flow.AccountKeyAdded",
            Self::AccountKeyRemoved => "flow.AccountKeyRemoved",
            Self::AccountContractAdded => "flow.AccountContractAdded",
            Self::AccountContractUpdated => "flow.AccountContractUpdated",
            Self::AccountContractRemoved => "flow.AccountContractRemoved",
        }
    }

    /// Names of the payload fields, in order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::AccountCreated => &["address"],
            Self::AccountKeyAdded | Self::AccountKeyRemoved => &["address", "publicKey"],
            Self::AccountContractAdded
            | Self::AccountContractUpdated
            | Self::AccountContractRemoved => &["address", "codeHash", "contract"],
        }
    }

    /// Parse a qualified type identifier.
    pub fn from_type_id(type_id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_id() == type_id)
    }
}

impl fmt::Display for AccountEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_id())
    }
}

/// One emitted account event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEvent {
    kind: AccountEventKind,
    payload: Vec<Value>,
}

impl AccountEvent {
    /// Build an event, checking the payload arity against the catalogue.
    pub fn new(kind: AccountEventKind, payload: Vec<Value>) -> Result<Self, PrimitiveError> {
        let expected = kind.fields().len();
        if payload.len() != expected {
            return Err(PrimitiveError::EventPayload {
                kind,
                expected,
                got: payload.len(),
            });
        }
        Ok(Self { kind, payload })
    }

    /// `AccountCreated(address)`.
    pub fn account_created(address: Address) -> Self {
        Self {
            kind: AccountEventKind::AccountCreated,
            payload: vec![Value::Address(address)],
        }
    }

    /// `AccountKeyAdded(address, key)`; `key` is the public key value or
    /// the raw encoded key bytes of the legacy API.
    pub fn key_added(address: Address, key: Value) -> Self {
        Self {
            kind: AccountEventKind::AccountKeyAdded,
            payload: vec![Value::Address(address), key],
        }
    }

    /// `AccountKeyRemoved(address, keyOrIndex)`.
    pub fn key_removed(address: Address, key_or_index: Value) -> Self {
        Self {
            kind: AccountEventKind::AccountKeyRemoved,
            payload: vec![Value::Address(address), key_or_index],
        }
    }

    /// One of the three contract events with `(address, codeHash, name)`.
    ///
    /// Returns `None` if `kind` is not a contract event.
    pub fn contract(
        kind: AccountEventKind,
        address: Address,
        code_hash: &[u8],
        name: &str,
    ) -> Option<Self> {
        match kind {
            AccountEventKind::AccountContractAdded
            | AccountEventKind::AccountContractUpdated
            | AccountEventKind::AccountContractRemoved => Some(Self {
                kind,
                payload: vec![
                    Value::Address(address),
                    Value::bytes(code_hash),
                    Value::string(name),
                ],
            }),
            _ => None,
        }
    }

    pub fn kind(&self) -> AccountEventKind {
        self.kind
    }

    pub fn payload(&self) -> &[Value] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<Value> {
        self.payload
    }

    /// The `address` field every account event starts with.
    pub fn address(&self) -> Option<Address> {
        match self.payload.first() {
            Some(Value::Address(address)) => Some(*address),
            _ => None,
        }
    }
}
