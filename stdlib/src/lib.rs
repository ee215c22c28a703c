//! `quarry-stdlib`: account capability functions of the interpreter
//! standard library.
//!
//! Programs reach the ledger through account values. This crate builds
//! those values and implements every member they expose, on top of the
//! host environment contract from `quarry-hostapi`:
//!
//! - [`Environment`]: host, program inspector and configuration of one
//!   execution, plus the `AuthAccount(payer:)`, `getAuthAccount` and
//!   `getAccount` entry points
//! - [`AuthAccount`] / [`PublicAccount`]: privileged and restricted
//!   account values with their `keys` and `contracts` members
//! - [`Fault`]: the failure type of every capability function
//! - [`DeclarationScanner`]: the default check that keeps enum-declaring
//!   contracts from being removed
//!
//! Each function is generic over exactly the host traits it calls, so a
//! host that lacks a capability cannot be handed a value exposing it.

pub mod account;
mod args;
pub mod config;
pub mod contracts;
pub mod env;
pub mod events;
pub mod fault;
pub mod keys;
pub mod program;
pub mod storage;

pub use account::{AuthAccount, PublicAccount};
pub use config::{StdlibConfig, UnparsableCodePolicy};
pub use contracts::{AuthAccountContracts, PublicAccountContracts};
pub use env::Environment;
pub use fault::{Fault, FaultClass, FaultResult, InternalError, LegalityError};
pub use keys::{AuthAccountKeys, PublicAccountKeys};
pub use program::{DeclarationScanner, ParseError, ProgramInspector};
