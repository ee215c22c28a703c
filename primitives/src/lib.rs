//! `quarry-primitives`: foundational types for the Quarry host-capability bridge.
//!
//! This crate provides the account-model types that cross the boundary
//! between interpreted code and the host environment:
//!
//! - [`Address`] and [`Location`]: identifiers of accounts and programs
//! - [`PublicKey`], [`AccountKey`], [`HashAlgorithm`], [`SignatureAlgorithm`]: key slots
//! - [`UFix64`]: the fixed-point amount type used for balances and key weights
//! - [`Value`]: the interpreted-language value surface the bridge decodes and produces
//! - [`AccountEvent`]: the fixed catalogue of ledger events
//!
//! Nothing in this crate talks to a host; it is pure data.

pub mod types;
pub mod error;
pub mod address;
pub mod location;
pub mod keys;
pub mod value;
pub mod event;
pub mod crypto;

// Re-export commonly used types at the crate root for convenience.
pub use types::{UFix64, Hash, ADDRESS_LENGTH, UFIX64_SCALE};
pub use error::PrimitiveError;
pub use address::Address;
pub use location::{Location, ResolvedLocation};
pub use keys::{AccountKey, HashAlgorithm, PublicKey, SignatureAlgorithm};
pub use value::{
    AccountKeyValue, DeployedContractValue, PublicKeyValue, ValidationSource, Value,
};
pub use event::{AccountEvent, AccountEventKind};
