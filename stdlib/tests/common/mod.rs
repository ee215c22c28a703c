//! Shared test helpers for integration tests.
//!
//! Provides a funded in-memory host, key and contract fixtures, and a
//! read-only host that only implements the restricted account surface.

#![allow(dead_code)]

use quarry_hostapi::*;
use quarry_primitives::{
    AccountKey, Address, PublicKey, PublicKeyValue, SignatureAlgorithm, UFix64, Value,
};

/// Service account: funded in every test host.
pub const SERVICE: Address = Address::from_u64(0xf8d6_e058_6b0a_20c7);

/// First address handed out by `create_account` in test hosts.
pub const FIRST_CREATED: Address = Address::from_u64(0x01cf_0e2f_2f71_5450);

pub const CONTRACT_PLAIN: &str = "access(all) contract Hello {\n    access(all) let greeting: String\n    init() { self.greeting = \"Hello, World!\" }\n}\n";

pub const CONTRACT_WITH_ENUM: &str = "access(all) contract Colors {\n    access(all) enum Color: UInt8 {\n        access(all) case red\n        access(all) case green\n    }\n}\n";

// ── Hosts ──

/// In-memory host with the service account funded with 1000.0.
pub fn funded_host() -> MemHost {
    let config = MemHostConfig {
        first_address: FIRST_CREATED,
        default_balance: UFix64::from_raw(1_000_000),
        ..MemHostConfig::default()
    };
    MemHost::new(config).with_account(SERVICE, UFix64::from_raw(1_000 * 100_000_000))
}

/// A host that can serve restricted accounts and nothing else.
pub struct ReadOnlyHost<'a>(pub &'a MemHost);

impl BalanceProvider for ReadOnlyHost<'_> {
    fn get_account_balance(&self, address: Address) -> Result<UFix64, HostError> {
        self.0.get_account_balance(address)
    }
}

impl AvailableBalanceProvider for ReadOnlyHost<'_> {
    fn get_account_available_balance(&self, address: Address) -> Result<UFix64, HostError> {
        self.0.get_account_available_balance(address)
    }
}

impl StorageCommitter for ReadOnlyHost<'_> {
    fn commit_storage(&self, commit_contract_updates: bool) -> Result<(), HostError> {
        self.0.commit_storage(commit_contract_updates)
    }
}

impl StorageUsedProvider for ReadOnlyHost<'_> {
    fn get_storage_used(&self, address: Address) -> Result<u64, HostError> {
        self.0.get_storage_used(address)
    }
}

impl StorageCapacityProvider for ReadOnlyHost<'_> {
    fn get_storage_capacity(&self, address: Address) -> Result<u64, HostError> {
        self.0.get_storage_capacity(address)
    }
}

impl AccountKeyProvider for ReadOnlyHost<'_> {
    fn get_account_key(
        &self,
        address: Address,
        index: u32,
    ) -> Result<Option<AccountKey>, HostError> {
        self.0.get_account_key(address, index)
    }
}

impl AccountContractNamesProvider for ReadOnlyHost<'_> {
    fn get_account_contract_names(&self, address: Address) -> Result<Vec<String>, HostError> {
        self.0.get_account_contract_names(address)
    }
}

impl AccountContractProvider for ReadOnlyHost<'_> {
    fn get_account_contract_code(
        &self,
        address: Address,
        name: &str,
    ) -> Result<Option<Vec<u8>>, HostError> {
        self.0.get_account_contract_code(address, name)
    }
}

// ── Values ──

/// A 64-byte ECDSA P-256 public key filled with `seed`.
pub fn ecdsa_key(seed: u8) -> PublicKeyValue {
    PublicKeyValue::assume_validated(PublicKey::new(vec![seed; 64], SignatureAlgorithm::EcdsaP256))
}

/// Arguments of `contracts.add` / `contracts.update__experimental`.
pub fn contract_args(name: &str, code: &str) -> Vec<Value> {
    vec![Value::string(name), Value::bytes(code.as_bytes())]
}

/// Weight 1000.0, the full signing weight.
pub fn full_weight() -> UFix64 {
    UFix64::from_raw(1_000 * 100_000_000)
}
