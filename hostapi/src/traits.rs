//! Host environment contract.
//!
//! The embedding environment provides each capability as its own narrow
//! trait. Capability functions in the standard library are generic over
//! exactly the traits they call, and the account handler bundles below
//! are blanket-implemented for any type that has all of their parts.
//!
//! Methods take `&self`. A host that mutates state uses interior
//! mutability and owns whatever locking it needs; callers never hold a
//! lock across a call.
//!
//! Absence is always an explicit `Ok(None)` or empty result. An `Err` is a
//! hard fault.

use quarry_primitives::{
    AccountEvent, AccountKey, Address, HashAlgorithm, Location, PublicKey, ResolvedLocation,
    UFix64,
};

use crate::error::HostError;

// ── Events ──

/// Accepts account events raised by capability functions.
pub trait EventEmitter {
    /// Record one event. Called only after the mutation it describes has
    /// been confirmed by the host.
    fn emit_event(&self, event: &AccountEvent) -> Result<(), HostError>;
}

// ── Accounts ──

/// Creates new accounts.
pub trait AccountCreator {
    /// Create an account paid for by `payer` and return its address.
    fn create_account(&self, payer: Address) -> Result<Address, HostError>;
}

/// Reports an account's total balance.
pub trait BalanceProvider {
    fn get_account_balance(&self, address: Address) -> Result<UFix64, HostError>;
}

/// Reports the part of an account's balance that is not reserved.
pub trait AvailableBalanceProvider {
    fn get_account_available_balance(&self, address: Address) -> Result<UFix64, HostError>;
}

// ── Storage ──

/// Flushes pending storage writes so usage figures are current.
pub trait StorageCommitter {
    /// Commit pending writes. `commit_contract_updates` also applies staged
    /// contract code changes.
    fn commit_storage(&self, commit_contract_updates: bool) -> Result<(), HostError>;
}

/// Reports bytes of storage used by an account.
///
/// Callers commit storage before asking.
pub trait StorageUsedProvider: StorageCommitter {
    fn get_storage_used(&self, address: Address) -> Result<u64, HostError>;
}

/// Reports an account's storage quota in bytes.
pub trait StorageCapacityProvider: StorageCommitter {
    fn get_storage_capacity(&self, address: Address) -> Result<u64, HostError>;
}

// ── Keys ──

/// Legacy raw-bytes key addition.
pub trait AccountEncodedKeyAdditionHandler: EventEmitter {
    fn add_encoded_account_key(&self, address: Address, key: &[u8]) -> Result<(), HostError>;
}

/// Legacy raw-bytes key revocation.
pub trait AccountEncodedKeyRevocationHandler: EventEmitter {
    /// Revoke the key at `index` and return its encoded bytes.
    fn revoke_encoded_account_key(&self, address: Address, index: u32)
        -> Result<Vec<u8>, HostError>;
}

/// Checks that public key material is acceptable to the host.
pub trait PublicKeyValidator {
    fn validate_public_key(&self, key: &PublicKey) -> Result<(), HostError>;
}

/// Looks up account keys by index.
pub trait AccountKeyProvider {
    /// `Ok(None)` if the account has no key at `index`.
    fn get_account_key(&self, address: Address, index: u32)
        -> Result<Option<AccountKey>, HostError>;
}

/// Adds structured keys to an account.
pub trait AccountKeyAdditionHandler: EventEmitter + PublicKeyValidator {
    /// Add a key. The host assigns and returns the key index.
    fn add_account_key(
        &self,
        address: Address,
        key: &PublicKey,
        hash_algo: HashAlgorithm,
        weight: UFix64,
    ) -> Result<AccountKey, HostError>;
}

/// Revokes structured keys.
pub trait AccountKeyRevocationHandler: EventEmitter {
    /// Mark the key at `index` revoked and return it, or `Ok(None)` if there
    /// is no such key.
    fn revoke_account_key(&self, address: Address, index: u32)
        -> Result<Option<AccountKey>, HostError>;
}

// ── Contracts ──

/// Lists the contracts deployed under an account.
pub trait AccountContractNamesProvider {
    fn get_account_contract_names(&self, address: Address) -> Result<Vec<String>, HostError>;
}

/// Reads deployed contract code.
pub trait AccountContractProvider {
    /// `Ok(None)` if no contract `name` is deployed. Empty code counts as
    /// absent.
    fn get_account_contract_code(
        &self,
        address: Address,
        name: &str,
    ) -> Result<Option<Vec<u8>>, HostError>;
}

/// Stores new or replacement contract code.
pub trait AccountContractUpdater {
    fn update_account_contract_code(
        &self,
        address: Address,
        name: &str,
        code: &[u8],
    ) -> Result<(), HostError>;
}

/// Removes deployed contracts.
pub trait AccountContractRemovalHandler: EventEmitter + AccountContractProvider {
    fn remove_account_contract_code(&self, address: Address, name: &str)
        -> Result<(), HostError>;

    /// Note that `name` was removed so the removal takes effect when the
    /// execution commits.
    fn record_contract_removal(&self, address: Address, name: &str) -> Result<(), HostError>;
}

// ── Program loading ──

/// Supplies program code by location.
pub trait CodeProvider {
    fn get_code(&self, location: &Location) -> Result<Vec<u8>, HostError>;
}

/// Resolves an import of `identifiers` from `location`.
pub trait LocationResolver {
    fn resolve_location(
        &self,
        identifiers: &[String],
        location: &Location,
    ) -> Result<Vec<ResolvedLocation>, HostError>;
}

/// Receives `log` output from programs.
pub trait ProgramLogger {
    fn program_log(&self, message: &str) -> Result<(), HostError>;
}

// ── Bundles ──

/// Everything the privileged `keys` object needs.
pub trait AuthAccountKeysHandler:
    AccountKeyProvider + AccountKeyAdditionHandler + AccountKeyRevocationHandler
{
}

impl<T> AuthAccountKeysHandler for T where
    T: AccountKeyProvider + AccountKeyAdditionHandler + AccountKeyRevocationHandler
{
}

/// Everything the privileged `contracts` object needs.
pub trait AuthAccountContractsHandler:
    EventEmitter
    + AccountContractProvider
    + AccountContractUpdater
    + AccountContractRemovalHandler
    + AccountContractNamesProvider
{
}

impl<T> AuthAccountContractsHandler for T where
    T: EventEmitter
        + AccountContractProvider
        + AccountContractUpdater
        + AccountContractRemovalHandler
        + AccountContractNamesProvider
{
}

/// Everything a privileged account value needs.
pub trait AuthAccountHandler:
    BalanceProvider
    + AvailableBalanceProvider
    + StorageUsedProvider
    + StorageCapacityProvider
    + AccountEncodedKeyAdditionHandler
    + AccountEncodedKeyRevocationHandler
    + AuthAccountKeysHandler
    + AuthAccountContractsHandler
{
}

impl<T> AuthAccountHandler for T where
    T: BalanceProvider
        + AvailableBalanceProvider
        + StorageUsedProvider
        + StorageCapacityProvider
        + AccountEncodedKeyAdditionHandler
        + AccountEncodedKeyRevocationHandler
        + AuthAccountKeysHandler
        + AuthAccountContractsHandler
{
}

/// Everything the restricted `keys` object needs.
pub trait PublicAccountKeysHandler: AccountKeyProvider {}

impl<T> PublicAccountKeysHandler for T where T: AccountKeyProvider {}

/// Everything the restricted `contracts` object needs.
pub trait PublicAccountContractsHandler:
    AccountContractNamesProvider + AccountContractProvider
{
}

impl<T> PublicAccountContractsHandler for T where
    T: AccountContractNamesProvider + AccountContractProvider
{
}

/// Everything a restricted account value needs.
pub trait PublicAccountHandler:
    BalanceProvider
    + AvailableBalanceProvider
    + StorageUsedProvider
    + StorageCapacityProvider
    + PublicAccountKeysHandler
    + PublicAccountContractsHandler
{
}

impl<T> PublicAccountHandler for T where
    T: BalanceProvider
        + AvailableBalanceProvider
        + StorageUsedProvider
        + StorageCapacityProvider
        + PublicAccountKeysHandler
        + PublicAccountContractsHandler
{
}

/// Account creation plus the privileged surface of the new account.
pub trait AccountCreationHandler: EventEmitter + AccountCreator + AuthAccountHandler {}

impl<T> AccountCreationHandler for T where T: EventEmitter + AccountCreator + AuthAccountHandler {}

/// The full host surface: every capability plus program loading.
pub trait RuntimeHost:
    AccountCreationHandler + PublicAccountHandler + CodeProvider + LocationResolver + ProgramLogger
{
}

impl<T> RuntimeHost for T where
    T: AccountCreationHandler
        + PublicAccountHandler
        + CodeProvider
        + LocationResolver
        + ProgramLogger
{
}
