//! Balance and storage queries.
//!
//! Storage figures are only meaningful after pending writes are flushed,
//! so both storage queries commit first. A failed commit aborts the query.

use quarry_hostapi::{
    AvailableBalanceProvider, BalanceProvider, StorageCapacityProvider, StorageUsedProvider,
};
use quarry_primitives::{Address, UFix64};

use crate::fault::FaultResult;

pub fn balance<H: BalanceProvider + ?Sized>(host: &H, address: Address) -> FaultResult<UFix64> {
    Ok(host.get_account_balance(address)?)
}

pub fn available_balance<H: AvailableBalanceProvider + ?Sized>(
    host: &H,
    address: Address,
) -> FaultResult<UFix64> {
    Ok(host.get_account_available_balance(address)?)
}

pub fn storage_used<H: StorageUsedProvider + ?Sized>(
    host: &H,
    address: Address,
) -> FaultResult<u64> {
    host.commit_storage(false)?;
    Ok(host.get_storage_used(address)?)
}

pub fn storage_capacity<H: StorageCapacityProvider + ?Sized>(
    host: &H,
    address: Address,
) -> FaultResult<u64> {
    host.commit_storage(false)?;
    Ok(host.get_storage_capacity(address)?)
}
