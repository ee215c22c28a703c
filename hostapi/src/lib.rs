//! `quarry-hostapi`: the host environment contract for the Quarry bridge.
//!
//! This crate defines what an embedding environment must provide for the
//! account capability functions to run. It provides:
//!
//! - one narrow trait per host capability, and blanket-implemented
//!   bundles such as `AuthAccountHandler` and `RuntimeHost`
//! - `HostError`: the hard-fault channel of every host call
//! - `MemHost`: an in-memory host for tests and for the host daemon
//! - `MemHostConfig`: settings of the in-memory host

pub mod error;
pub mod mem_host;
pub mod traits;
pub mod types;

// Re-export commonly used types at the crate root.
pub use error::HostError;
pub use mem_host::{HostCall, MemHost};
pub use traits::*;
pub use types::MemHostConfig;
