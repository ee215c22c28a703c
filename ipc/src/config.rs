//! Transport configuration.

use std::time::Duration;

/// Largest frame either side accepts by default.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024; // 16 MiB

/// Configuration for the transport proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Frames larger than this are rejected on write and on read.
    pub max_message_size: usize,

    /// Read and write deadline applied to every connection.
    /// `None` blocks until the host answers.
    pub io_timeout: Option<Duration>,

    /// Keep one connection open across calls instead of connecting per call.
    pub reuse_connection: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            io_timeout: None,
            reuse_connection: false,
        }
    }
}

/// Configuration for the host server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProxyConfig::default();
        assert_eq!(config.max_message_size, 16 * 1024 * 1024);
        assert_eq!(config.io_timeout, None);
        assert!(!config.reuse_connection);
        assert_eq!(ServerConfig::default().max_message_size, config.max_message_size);
    }
}
