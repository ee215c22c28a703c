//! In-memory host environment for testing.
//!
//! `MemHost` implements every capability trait over `BTreeMap`s, so
//! iteration order (contract names, accounts) is deterministic. All state
//! sits behind a `RefCell`; the host is meant for single-threaded
//! executions and for the sequential host server.
//!
//! Besides ledger state it keeps a log of every trait call and every
//! emitted event so tests can assert ordering.

use std::cell::RefCell;
use std::collections::BTreeMap;

use quarry_primitives::{
    AccountEvent, AccountKey, Address, HashAlgorithm, Location, PublicKey, ResolvedLocation,
    SignatureAlgorithm, UFix64,
};
use tracing::trace;

use crate::error::HostError;
use crate::traits::*;
use crate::types::MemHostConfig;

/// Length of an uncompressed ECDSA public key without the prefix byte.
const ECDSA_KEY_LEN: usize = 64;
/// Length of a compressed BLS12-381 G2 public key.
const BLS_KEY_LEN: usize = 96;

/// One recorded trait call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCall {
    /// Trait method name, e.g. `"commit_storage"`.
    pub method: &'static str,
    /// Account the call was about, if any.
    pub address: Option<Address>,
}

impl HostCall {
    fn new(method: &'static str, address: Option<Address>) -> Self {
        Self { method, address }
    }
}

#[derive(Debug, Clone)]
struct EncodedKey {
    bytes: Vec<u8>,
    revoked: bool,
}

#[derive(Debug, Clone)]
struct AccountRecord {
    balance: UFix64,
    storage_capacity: u64,
    /// Usage as of the last commit.
    storage_used: u64,
    /// Usage including writes not yet committed.
    staged_storage_used: Option<u64>,
    keys: Vec<AccountKey>,
    encoded_keys: Vec<EncodedKey>,
    contracts: BTreeMap<String, Vec<u8>>,
    pending_removals: Vec<String>,
}

impl AccountRecord {
    fn new(balance: UFix64, storage_capacity: u64) -> Self {
        Self {
            balance,
            storage_capacity,
            storage_used: 0,
            staged_storage_used: None,
            keys: Vec::new(),
            encoded_keys: Vec::new(),
            contracts: BTreeMap::new(),
            pending_removals: Vec::new(),
        }
    }

    /// Bytes this account occupies: key material plus contract code.
    fn footprint(&self) -> u64 {
        let keys: usize = self.keys.iter().map(|k| k.public_key.public_key.len()).sum();
        let encoded: usize = self.encoded_keys.iter().map(|k| k.bytes.len()).sum();
        let code: usize = self
            .contracts
            .iter()
            .map(|(name, code)| name.len() + code.len())
            .sum();
        (keys + encoded + code) as u64
    }

    fn stage(&mut self) {
        self.staged_storage_used = Some(self.footprint());
    }
}

#[derive(Debug, Default)]
struct HostState {
    accounts: BTreeMap<Address, AccountRecord>,
    next_address: u64,
    code: BTreeMap<String, Vec<u8>>,
    events: Vec<AccountEvent>,
    calls: Vec<HostCall>,
    logs: Vec<String>,
    injected: BTreeMap<&'static str, HostError>,
}

/// In-memory implementation of the whole host environment contract.
#[derive(Debug)]
pub struct MemHost {
    config: MemHostConfig,
    state: RefCell<HostState>,
}

impl Default for MemHost {
    fn default() -> Self {
        Self::new(MemHostConfig::default())
    }
}

impl MemHost {
    /// Create an empty host.
    pub fn new(config: MemHostConfig) -> Self {
        let state = HostState {
            next_address: config.first_address.to_u64(),
            ..HostState::default()
        };
        Self {
            config,
            state: RefCell::new(state),
        }
    }

    pub fn config(&self) -> &MemHostConfig {
        &self.config
    }

    /// Insert (or overwrite the balance of) an account.
    pub fn insert_account(&self, address: Address, balance: UFix64) {
        let mut state = self.state.borrow_mut();
        let capacity = self.config.default_storage_capacity;
        state
            .accounts
            .entry(address)
            .and_modify(|account| account.balance = balance)
            .or_insert_with(|| AccountRecord::new(balance, capacity));
    }

    /// Builder form of [`insert_account`](Self::insert_account).
    pub fn with_account(self, address: Address, balance: UFix64) -> Self {
        self.insert_account(address, balance);
        self
    }

    pub fn account_exists(&self, address: Address) -> bool {
        self.state.borrow().accounts.contains_key(&address)
    }

    /// Register program code served by `get_code`.
    pub fn set_code(&self, location: &Location, code: impl Into<Vec<u8>>) {
        self.state
            .borrow_mut()
            .code
            .insert(location.type_id(), code.into());
    }

    /// Make the next call to `method` fail with `error`.
    pub fn inject_fault(&self, method: &'static str, error: HostError) {
        self.state.borrow_mut().injected.insert(method, error);
    }

    /// All events emitted so far, in order.
    pub fn events(&self) -> Vec<AccountEvent> {
        self.state.borrow().events.clone()
    }

    /// All trait calls made so far, in order.
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.borrow().calls.clone()
    }

    /// Method names of all trait calls made so far, in order.
    pub fn call_names(&self) -> Vec<&'static str> {
        self.state.borrow().calls.iter().map(|c| c.method).collect()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Messages received through `program_log`.
    pub fn logs(&self) -> Vec<String> {
        self.state.borrow().logs.clone()
    }

    /// Contract removals recorded but not yet committed.
    pub fn pending_removals(&self, address: Address) -> Vec<String> {
        self.state
            .borrow()
            .accounts
            .get(&address)
            .map(|account| account.pending_removals.clone())
            .unwrap_or_default()
    }

    /// Log the call and return any fault injected for it.
    fn enter(&self, method: &'static str, address: Option<Address>) -> Result<(), HostError> {
        trace!(method, ?address, "host call");
        let mut state = self.state.borrow_mut();
        state.calls.push(HostCall::new(method, address));
        match state.injected.remove(method) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn update_account<T>(
        &self,
        address: Address,
        f: impl FnOnce(&mut AccountRecord) -> Result<T, HostError>,
    ) -> Result<T, HostError> {
        let mut state = self.state.borrow_mut();
        let account = state
            .accounts
            .get_mut(&address)
            .ok_or(HostError::AccountNotFound(address))?;
        f(account)
    }

    fn read_account<T>(&self, address: Address, f: impl FnOnce(&AccountRecord) -> T) -> Option<T> {
        self.state.borrow().accounts.get(&address).map(f)
    }
}

impl EventEmitter for MemHost {
    fn emit_event(&self, event: &AccountEvent) -> Result<(), HostError> {
        self.enter("emit_event", event.address())?;
        self.state.borrow_mut().events.push(event.clone());
        Ok(())
    }
}

impl AccountCreator for MemHost {
    fn create_account(&self, payer: Address) -> Result<Address, HostError> {
        self.enter("create_account", Some(payer))?;
        let mut state = self.state.borrow_mut();
        if !state.accounts.contains_key(&payer) {
            return Err(HostError::AccountNotFound(payer));
        }
        let mut candidate = state.next_address;
        while state.accounts.contains_key(&Address::from_u64(candidate)) {
            candidate = candidate
                .checked_add(1)
                .ok_or_else(|| HostError::Internal("address space exhausted".into()))?;
        }
        let address = Address::from_u64(candidate);
        state.next_address = candidate.wrapping_add(1);
        state.accounts.insert(
            address,
            AccountRecord::new(self.config.default_balance, self.config.default_storage_capacity),
        );
        Ok(address)
    }
}

impl BalanceProvider for MemHost {
    fn get_account_balance(&self, address: Address) -> Result<UFix64, HostError> {
        self.enter("get_account_balance", Some(address))?;
        self.read_account(address, |account| account.balance)
            .ok_or(HostError::AccountNotFound(address))
    }
}

impl AvailableBalanceProvider for MemHost {
    fn get_account_available_balance(&self, address: Address) -> Result<UFix64, HostError> {
        self.enter("get_account_available_balance", Some(address))?;
        let balance = self
            .read_account(address, |account| account.balance)
            .ok_or(HostError::AccountNotFound(address))?;
        Ok(balance
            .checked_sub(self.config.reserved_balance)
            .unwrap_or(UFix64::ZERO))
    }
}

impl StorageCommitter for MemHost {
    fn commit_storage(&self, commit_contract_updates: bool) -> Result<(), HostError> {
        self.enter("commit_storage", None)?;
        let mut state = self.state.borrow_mut();
        for account in state.accounts.values_mut() {
            if let Some(used) = account.staged_storage_used.take() {
                account.storage_used = used;
            }
            if commit_contract_updates {
                account.pending_removals.clear();
            }
        }
        Ok(())
    }
}

impl StorageUsedProvider for MemHost {
    fn get_storage_used(&self, address: Address) -> Result<u64, HostError> {
        self.enter("get_storage_used", Some(address))?;
        self.read_account(address, |account| account.storage_used)
            .ok_or(HostError::AccountNotFound(address))
    }
}

impl StorageCapacityProvider for MemHost {
    fn get_storage_capacity(&self, address: Address) -> Result<u64, HostError> {
        self.enter("get_storage_capacity", Some(address))?;
        self.read_account(address, |account| account.storage_capacity)
            .ok_or(HostError::AccountNotFound(address))
    }
}

impl AccountEncodedKeyAdditionHandler for MemHost {
    fn add_encoded_account_key(&self, address: Address, key: &[u8]) -> Result<(), HostError> {
        self.enter("add_encoded_account_key", Some(address))?;
        if key.is_empty() {
            return Err(HostError::InvalidPublicKey("encoded key is empty".into()));
        }
        self.update_account(address, |account| {
            account.encoded_keys.push(EncodedKey {
                bytes: key.to_vec(),
                revoked: false,
            });
            account.stage();
            Ok(())
        })
    }
}

impl AccountEncodedKeyRevocationHandler for MemHost {
    fn revoke_encoded_account_key(
        &self,
        address: Address,
        index: u32,
    ) -> Result<Vec<u8>, HostError> {
        self.enter("revoke_encoded_account_key", Some(address))?;
        self.update_account(address, |account| {
            let key = account
                .encoded_keys
                .get_mut(index as usize)
                .ok_or_else(|| {
                    HostError::inconsistent(format!(
                        "no encoded key at index {} on account {}",
                        index,
                        address.short_hex()
                    ))
                })?;
            key.revoked = true;
            Ok(key.bytes.clone())
        })
    }
}

impl PublicKeyValidator for MemHost {
    fn validate_public_key(&self, key: &PublicKey) -> Result<(), HostError> {
        self.enter("validate_public_key", None)?;
        let expected = match key.sign_algo {
            SignatureAlgorithm::EcdsaP256 | SignatureAlgorithm::EcdsaSecp256k1 => ECDSA_KEY_LEN,
            SignatureAlgorithm::BlsBls12381 => BLS_KEY_LEN,
        };
        if key.public_key.is_empty() {
            return Err(HostError::InvalidPublicKey("key material is empty".into()));
        }
        if key.public_key.len() != expected {
            return Err(HostError::InvalidPublicKey(format!(
                "{} key must be {} bytes, got {}",
                key.sign_algo,
                expected,
                key.public_key.len()
            )));
        }
        Ok(())
    }
}

impl AccountKeyProvider for MemHost {
    fn get_account_key(
        &self,
        address: Address,
        index: u32,
    ) -> Result<Option<AccountKey>, HostError> {
        self.enter("get_account_key", Some(address))?;
        Ok(self
            .read_account(address, |account| account.keys.get(index as usize).cloned())
            .flatten())
    }
}

impl AccountKeyAdditionHandler for MemHost {
    fn add_account_key(
        &self,
        address: Address,
        key: &PublicKey,
        hash_algo: HashAlgorithm,
        weight: UFix64,
    ) -> Result<AccountKey, HostError> {
        self.enter("add_account_key", Some(address))?;
        self.validate_public_key(key)?;
        self.update_account(address, |account| {
            let key_index = u32::try_from(account.keys.len())
                .map_err(|_| HostError::Internal("key list is full".into()))?;
            let added = AccountKey {
                key_index,
                public_key: key.clone(),
                hash_algo,
                weight,
                is_revoked: false,
            };
            account.keys.push(added.clone());
            account.stage();
            Ok(added)
        })
    }
}

impl AccountKeyRevocationHandler for MemHost {
    fn revoke_account_key(
        &self,
        address: Address,
        index: u32,
    ) -> Result<Option<AccountKey>, HostError> {
        self.enter("revoke_account_key", Some(address))?;
        let mut state = self.state.borrow_mut();
        let Some(account) = state.accounts.get_mut(&address) else {
            return Ok(None);
        };
        Ok(account.keys.get_mut(index as usize).map(|key| {
            key.is_revoked = true;
            key.clone()
        }))
    }
}

impl AccountContractNamesProvider for MemHost {
    fn get_account_contract_names(&self, address: Address) -> Result<Vec<String>, HostError> {
        self.enter("get_account_contract_names", Some(address))?;
        Ok(self
            .read_account(address, |account| account.contracts.keys().cloned().collect())
            .unwrap_or_default())
    }
}

impl AccountContractProvider for MemHost {
    fn get_account_contract_code(
        &self,
        address: Address,
        name: &str,
    ) -> Result<Option<Vec<u8>>, HostError> {
        self.enter("get_account_contract_code", Some(address))?;
        Ok(self
            .read_account(address, |account| account.contracts.get(name).cloned())
            .flatten()
            .filter(|code| !code.is_empty()))
    }
}

impl AccountContractUpdater for MemHost {
    fn update_account_contract_code(
        &self,
        address: Address,
        name: &str,
        code: &[u8],
    ) -> Result<(), HostError> {
        self.enter("update_account_contract_code", Some(address))?;
        self.update_account(address, |account| {
            account.contracts.insert(name.to_string(), code.to_vec());
            account.pending_removals.retain(|removed| removed != name);
            account.stage();
            Ok(())
        })
    }
}

impl AccountContractRemovalHandler for MemHost {
    fn remove_account_contract_code(&self, address: Address, name: &str) -> Result<(), HostError> {
        self.enter("remove_account_contract_code", Some(address))?;
        self.update_account(address, |account| {
            account.contracts.remove(name);
            account.stage();
            Ok(())
        })
    }

    fn record_contract_removal(&self, address: Address, name: &str) -> Result<(), HostError> {
        self.enter("record_contract_removal", Some(address))?;
        self.update_account(address, |account| {
            account.pending_removals.push(name.to_string());
            Ok(())
        })
    }
}

impl CodeProvider for MemHost {
    fn get_code(&self, location: &Location) -> Result<Vec<u8>, HostError> {
        self.enter("get_code", location.account())?;
        if let Location::Address { address, name } = location {
            if let Some(code) = self
                .read_account(*address, |account| account.contracts.get(name).cloned())
                .flatten()
            {
                return Ok(code);
            }
        }
        Ok(self
            .state
            .borrow()
            .code
            .get(&location.type_id())
            .cloned()
            .unwrap_or_default())
    }
}

impl LocationResolver for MemHost {
    fn resolve_location(
        &self,
        identifiers: &[String],
        location: &Location,
    ) -> Result<Vec<ResolvedLocation>, HostError> {
        self.enter("resolve_location", location.account())?;
        let Location::Address { address, .. } = location else {
            return Ok(vec![ResolvedLocation {
                location: location.clone(),
                identifiers: identifiers.to_vec(),
            }]);
        };

        // An import without identifiers brings in every contract of the
        // account.
        let names = if identifiers.is_empty() {
            self.read_account(*address, |account| account.contracts.keys().cloned().collect())
                .unwrap_or_default()
        } else {
            identifiers.to_vec()
        };
        Ok(names
            .into_iter()
            .map(|name| ResolvedLocation {
                location: Location::address(*address, name.clone()),
                identifiers: vec![name],
            })
            .collect())
    }
}

impl ProgramLogger for MemHost {
    fn program_log(&self, message: &str) -> Result<(), HostError> {
        self.enter("program_log", None)?;
        self.state.borrow_mut().logs.push(message.to_string());
        Ok(())
    }
}
