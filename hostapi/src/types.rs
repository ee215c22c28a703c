//! Configuration types for the in-memory host.

use quarry_primitives::{Address, UFix64};
use serde::{Deserialize, Serialize};

/// Settings for a [`MemHost`](crate::MemHost).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemHostConfig {
    /// First address handed out by `create_account`. Later accounts get
    /// the following addresses, skipping any that already exist.
    pub first_address: Address,
    /// Balance of accounts created through `create_account`.
    pub default_balance: UFix64,
    /// Storage quota, in bytes, of every new account.
    pub default_storage_capacity: u64,
    /// Part of each balance that is unavailable for spending.
    pub reserved_balance: UFix64,
}

impl Default for MemHostConfig {
    fn default() -> Self {
        Self {
            first_address: Address::from_u64(1),
            default_balance: UFix64::ZERO,
            default_storage_capacity: 100 * 1024, // 100 KiB
            reserved_balance: UFix64::from_raw(100_000), // 0.001
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = MemHostConfig::default();
        assert_eq!(config.first_address, Address::from_u64(1));
        assert_eq!(config.default_balance, UFix64::ZERO);
        assert_eq!(config.default_storage_capacity, 100 * 1024);
        assert_eq!(config.reserved_balance.to_string(), "0.00100000");
    }

    #[test]
    fn test_struct_update_override() {
        let config = MemHostConfig {
            default_storage_capacity: 10,
            ..MemHostConfig::default()
        };
        assert_eq!(config.default_storage_capacity, 10);
        assert_eq!(config.first_address, Address::from_u64(1));
    }
}
