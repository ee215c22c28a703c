//! `quarry-ipc`: the host environment contract over a byte stream.
//!
//! Quarry programs can run apart from the node that owns chain state. This
//! crate carries host calls between the two:
//!
//! - **Messages:** protobuf [`Request`]/[`Response`] pairs, one per host call
//! - **Framing:** 4-byte big-endian length prefix with a size limit
//! - **Proxy:** [`ProxyHost`] implements every host trait by forwarding calls
//! - **Server:** [`HostServer`] answers requests from an in-process host
//!
//! The `quarry-hostd` binary serves a `MemHost` over a Unix socket or TCP.

pub mod error;
pub mod config;
pub mod messages;
pub mod codec;
pub mod connection;
pub mod proxy;
pub mod server;

pub use error::IpcError;
pub use config::{ProxyConfig, ServerConfig, DEFAULT_MAX_MESSAGE_SIZE};
pub use messages::{Method, Request, Response, WireValue};
#[cfg(unix)]
pub use connection::UnixConnector;
pub use connection::{Connector, TcpConnector};
pub use proxy::ProxyHost;
pub use server::HostServer;
