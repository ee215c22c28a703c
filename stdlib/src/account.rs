//! Account values.
//!
//! [`AuthAccount`] is the privileged view of an account: it can spend,
//! manage keys and deploy contracts. [`PublicAccount`] is the restricted
//! view anyone can obtain for any address. Both are a copy of the
//! [`Environment`] plus an immutable address; building one, or one of its
//! `keys`/`contracts` members, never calls the host.
//!
//! Member names used by [`AuthAccount::invoke`] and
//! [`PublicAccount::invoke`] follow the interpreted language. Members of
//! the nested objects are reached as `keys.<member>` and
//! `contracts.<member>`.

use std::fmt;

use quarry_hostapi::{AccountCreationHandler, AuthAccountHandler, PublicAccountHandler};
use quarry_primitives::{AccountEvent, Address, UFix64, Value};
use tracing::debug;

use crate::args::Arguments;
use crate::contracts::{AuthAccountContracts, PublicAccountContracts};
use crate::env::Environment;
use crate::events::emit;
use crate::fault::{Fault, FaultResult};
use crate::keys::{self, AuthAccountKeys, PublicAccountKeys};
use crate::storage;

/// Privileged account value.
pub struct AuthAccount<'h, H: ?Sized> {
    env: Environment<'h, H>,
    address: Address,
}

impl<'h, H: AuthAccountHandler + ?Sized> AuthAccount<'h, H> {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn balance(&self) -> FaultResult<UFix64> {
        storage::balance(self.env.host(), self.address)
    }

    pub fn available_balance(&self) -> FaultResult<UFix64> {
        storage::available_balance(self.env.host(), self.address)
    }

    pub fn storage_used(&self) -> FaultResult<u64> {
        storage::storage_used(self.env.host(), self.address)
    }

    pub fn storage_capacity(&self) -> FaultResult<u64> {
        storage::storage_capacity(self.env.host(), self.address)
    }

    /// Legacy `addPublicKey`.
    pub fn add_public_key(&self, key: &[u8]) -> FaultResult<()> {
        keys::add_public_key(self.env.host(), self.address, key)
    }

    /// Legacy `removePublicKey`.
    pub fn remove_public_key(&self, index: u32) -> FaultResult<()> {
        keys::remove_public_key(self.env.host(), self.address, index)
    }

    pub fn keys(&self) -> AuthAccountKeys<'h, H> {
        AuthAccountKeys::new(self.env, self.address)
    }

    pub fn contracts(&self) -> AuthAccountContracts<'h, H> {
        AuthAccountContracts::new(self.env, self.address)
    }

    pub fn invoke(&self, member: &str, arguments: &[Value]) -> FaultResult<Value> {
        if let Some(inner) = member.strip_prefix("keys.") {
            return self.keys().invoke(inner, arguments);
        }
        if let Some(inner) = member.strip_prefix("contracts.") {
            return self.contracts().invoke(inner, arguments);
        }
        match member {
            "address" => {
                Arguments::new("AuthAccount.address", arguments, 0)?;
                Ok(Value::Address(self.address))
            }
            "balance" => {
                Arguments::new("AuthAccount.balance", arguments, 0)?;
                Ok(Value::UFix64(self.balance()?))
            }
            "availableBalance" => {
                Arguments::new("AuthAccount.availableBalance", arguments, 0)?;
                Ok(Value::UFix64(self.available_balance()?))
            }
            "storageUsed" => {
                Arguments::new("AuthAccount.storageUsed", arguments, 0)?;
                Ok(Value::UInt64(self.storage_used()?))
            }
            "storageCapacity" => {
                Arguments::new("AuthAccount.storageCapacity", arguments, 0)?;
                Ok(Value::UInt64(self.storage_capacity()?))
            }
            "addPublicKey" => {
                let args = Arguments::new("addPublicKey", arguments, 1)?;
                self.add_public_key(&args.bytes(0)?)?;
                Ok(Value::Void)
            }
            "removePublicKey" => {
                let args = Arguments::new("removePublicKey", arguments, 1)?;
                self.remove_public_key(args.key_index(0)?)?;
                Ok(Value::Void)
            }
            _ => Err(Fault::unknown_member("AuthAccount", member)),
        }
    }
}

/// Restricted account value.
pub struct PublicAccount<'h, H: ?Sized> {
    env: Environment<'h, H>,
    address: Address,
}

impl<'h, H: PublicAccountHandler + ?Sized> PublicAccount<'h, H> {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn balance(&self) -> FaultResult<UFix64> {
        storage::balance(self.env.host(), self.address)
    }

    pub fn available_balance(&self) -> FaultResult<UFix64> {
        storage::available_balance(self.env.host(), self.address)
    }

    pub fn storage_used(&self) -> FaultResult<u64> {
        storage::storage_used(self.env.host(), self.address)
    }

    pub fn storage_capacity(&self) -> FaultResult<u64> {
        storage::storage_capacity(self.env.host(), self.address)
    }

    pub fn keys(&self) -> PublicAccountKeys<'h, H> {
        PublicAccountKeys::new(self.env, self.address)
    }

    pub fn contracts(&self) -> PublicAccountContracts<'h, H> {
        PublicAccountContracts::new(self.env, self.address)
    }

    pub fn invoke(&self, member: &str, arguments: &[Value]) -> FaultResult<Value> {
        if let Some(inner) = member.strip_prefix("keys.") {
            return self.keys().invoke(inner, arguments);
        }
        if let Some(inner) = member.strip_prefix("contracts.") {
            return self.contracts().invoke(inner, arguments);
        }
        match member {
            "address" => {
                Arguments::new("PublicAccount.address", arguments, 0)?;
                Ok(Value::Address(self.address))
            }
            "balance" => {
                Arguments::new("PublicAccount.balance", arguments, 0)?;
                Ok(Value::UFix64(self.balance()?))
            }
            "availableBalance" => {
                Arguments::new("PublicAccount.availableBalance", arguments, 0)?;
                Ok(Value::UFix64(self.available_balance()?))
            }
            "storageUsed" => {
                Arguments::new("PublicAccount.storageUsed", arguments, 0)?;
                Ok(Value::UInt64(self.storage_used()?))
            }
            "storageCapacity" => {
                Arguments::new("PublicAccount.storageCapacity", arguments, 0)?;
                Ok(Value::UInt64(self.storage_capacity()?))
            }
            _ => Err(Fault::unknown_member("PublicAccount", member)),
        }
    }
}

impl<H: ?Sized> fmt::Debug for AuthAccount<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthAccount")
            .field("address", &self.address)
            .finish()
    }
}

impl<H: ?Sized> fmt::Debug for PublicAccount<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicAccount")
            .field("address", &self.address)
            .finish()
    }
}

// ── Entry points ──

impl<'h, H: AuthAccountHandler + ?Sized> Environment<'h, H> {
    /// Build the privileged value for `address`.
    pub fn auth_account(self, address: Address) -> AuthAccount<'h, H> {
        AuthAccount { env: self, address }
    }

    /// `getAuthAccount(_ address: Address)`.
    pub fn get_auth_account(self, arguments: &[Value]) -> FaultResult<AuthAccount<'h, H>> {
        let args = Arguments::new("getAuthAccount", arguments, 1)?;
        Ok(self.auth_account(args.address(0)?))
    }
}

impl<'h, H: PublicAccountHandler + ?Sized> Environment<'h, H> {
    /// Build the restricted value for `address`.
    pub fn public_account(self, address: Address) -> PublicAccount<'h, H> {
        PublicAccount { env: self, address }
    }

    /// `getAccount(_ address: Address)`.
    pub fn get_account(self, arguments: &[Value]) -> FaultResult<PublicAccount<'h, H>> {
        let args = Arguments::new("getAccount", arguments, 1)?;
        Ok(self.public_account(args.address(0)?))
    }
}

impl<'h, H: AccountCreationHandler + ?Sized> Environment<'h, H> {
    /// `AuthAccount(payer: AuthAccount)`: creates an account and returns its
    /// privileged value. The payer is passed as its address.
    pub fn create_account(self, arguments: &[Value]) -> FaultResult<AuthAccount<'h, H>> {
        let args = Arguments::new("AuthAccount", arguments, 1)?;
        let payer = args.address(0)?;

        let address = self.host().create_account(payer)?;
        debug!(payer = %payer, address = %address, "account created");
        emit(self.host(), AccountEvent::account_created(address))?;
        Ok(self.auth_account(address))
    }
}
