//! Transport proxy.
//!
//! [`ProxyHost`] implements the whole host environment contract by
//! forwarding each call to an out-of-process host: one [`Request`]
//! written, exactly one [`Response`] read, on the calling thread. The
//! four response outcomes map onto the contract as follows:
//!
//! | outcome         | result                          |
//! |-----------------|---------------------------------|
//! | `value`         | the decoded value               |
//! | `absent`        | `Ok(None)` or an empty result   |
//! | `host_fault`    | the `HostError` the host raised |
//! | `unimplemented` | `HostError::Unimplemented`      |
//!
//! Transport failures become `HostError::Transport`. Nothing is retried.

use std::sync::{Mutex, MutexGuard};

use quarry_hostapi::*;
use quarry_primitives::{
    AccountEvent, AccountKey, Address, HashAlgorithm, Location, PublicKey, ResolvedLocation,
    UFix64,
};
use tracing::{trace, warn};

use crate::codec::{read_message, write_message};
use crate::config::ProxyConfig;
use crate::connection::Connector;
use crate::error::IpcError;
use crate::messages::{response::Outcome, Method, Request, Response, WireValue};

/// Host environment reached over a byte-stream connection.
pub struct ProxyHost<C: Connector> {
    connector: C,
    config: ProxyConfig,
    /// Open connection when `reuse_connection` is set.
    persistent: Mutex<Option<C::Stream>>,
}

impl<C: Connector> ProxyHost<C> {
    pub fn new(connector: C, config: ProxyConfig) -> Self {
        Self {
            connector,
            config,
            persistent: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    fn roundtrip(&self, stream: &mut C::Stream, request: &Request) -> Result<Response, IpcError> {
        let limit = self.config.max_message_size;
        write_message(stream, request, limit)?;
        read_message(stream, limit)?.ok_or_else(|| {
            IpcError::UnexpectedResponse("connection closed before a response".into())
        })
    }

    fn persistent(&self) -> MutexGuard<'_, Option<C::Stream>> {
        self.persistent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn exchange(&self, request: &Request) -> Result<Response, IpcError> {
        if !self.config.reuse_connection {
            let mut stream = self.connector.connect(self.config.io_timeout)?;
            return self.roundtrip(&mut stream, request);
        }

        let mut slot = self.persistent();
        let mut stream = match slot.take() {
            Some(stream) => stream,
            None => self.connector.connect(self.config.io_timeout)?,
        };
        // A stream that failed mid-exchange may be out of step with the host.
        let result = self.roundtrip(&mut stream, request);
        if result.is_ok() {
            *slot = Some(stream);
        }
        result
    }

    /// Perform one call. `Ok(None)` means the host answered `absent`.
    fn call(
        &self,
        method: Method,
        parameters: Vec<WireValue>,
    ) -> Result<Option<WireValue>, HostError> {
        let request = Request::new(method, parameters);
        trace!(method = method.name(), "host request");

        let response = self.exchange(&request).map_err(|err| {
            warn!(method = method.name(), error = %err, "host transport failed");
            HostError::from(err)
        })?;

        match response.outcome {
            Some(Outcome::Value(value)) => {
                trace!(method = method.name(), "host response: value");
                Ok(Some(value))
            }
            Some(Outcome::Absent(_)) => {
                trace!(method = method.name(), "host response: absent");
                Ok(None)
            }
            Some(Outcome::HostFault(fault)) => {
                let err = fault.to_host_error();
                warn!(method = method.name(), error = %err, "host fault");
                Err(err)
            }
            Some(Outcome::Unimplemented(unimplemented)) => {
                warn!(method = method.name(), "host method not implemented");
                let name = if unimplemented.method.is_empty() {
                    method.name().to_string()
                } else {
                    unimplemented.method
                };
                Err(HostError::Unimplemented(name))
            }
            None => Err(IpcError::UnexpectedResponse(format!(
                "{} response without an outcome",
                method.name()
            ))
            .into()),
        }
    }

    /// A call whose answer must be a value.
    fn call_value(
        &self,
        method: Method,
        parameters: Vec<WireValue>,
    ) -> Result<WireValue, HostError> {
        self.call(method, parameters)?.ok_or_else(|| {
            IpcError::UnexpectedResponse(format!(
                "{} answered absent where a value is required",
                method.name()
            ))
            .into()
        })
    }

    /// A call answered by `void` (or `absent`).
    fn call_unit(&self, method: Method, parameters: Vec<WireValue>) -> Result<(), HostError> {
        self.call(method, parameters).map(|_| ())
    }
}

impl<C: Connector> EventEmitter for ProxyHost<C> {
    fn emit_event(&self, event: &AccountEvent) -> Result<(), HostError> {
        let event = WireValue::event(event)?;
        self.call_unit(Method::EmitEvent, vec![event])
    }
}

impl<C: Connector> AccountCreator for ProxyHost<C> {
    fn create_account(&self, payer: Address) -> Result<Address, HostError> {
        let value = self.call_value(Method::CreateAccount, vec![WireValue::address(payer)])?;
        Ok(value.to_address()?)
    }
}

impl<C: Connector> BalanceProvider for ProxyHost<C> {
    fn get_account_balance(&self, address: Address) -> Result<UFix64, HostError> {
        let value = self.call_value(Method::GetAccountBalance, vec![WireValue::address(address)])?;
        Ok(value.to_ufix64()?)
    }
}

impl<C: Connector> AvailableBalanceProvider for ProxyHost<C> {
    fn get_account_available_balance(&self, address: Address) -> Result<UFix64, HostError> {
        let value = self.call_value(
            Method::GetAccountAvailableBalance,
            vec![WireValue::address(address)],
        )?;
        Ok(value.to_ufix64()?)
    }
}

impl<C: Connector> StorageCommitter for ProxyHost<C> {
    fn commit_storage(&self, commit_contract_updates: bool) -> Result<(), HostError> {
        self.call_unit(
            Method::CommitStorage,
            vec![WireValue::boolean(commit_contract_updates)],
        )
    }
}

impl<C: Connector> StorageUsedProvider for ProxyHost<C> {
    fn get_storage_used(&self, address: Address) -> Result<u64, HostError> {
        let value = self.call_value(Method::GetStorageUsed, vec![WireValue::address(address)])?;
        Ok(value.to_uint64()?)
    }
}

impl<C: Connector> StorageCapacityProvider for ProxyHost<C> {
    fn get_storage_capacity(&self, address: Address) -> Result<u64, HostError> {
        let value = self.call_value(Method::GetStorageCapacity, vec![WireValue::address(address)])?;
        Ok(value.to_uint64()?)
    }
}

impl<C: Connector> AccountEncodedKeyAdditionHandler for ProxyHost<C> {
    fn add_encoded_account_key(&self, address: Address, key: &[u8]) -> Result<(), HostError> {
        self.call_unit(
            Method::AddEncodedAccountKey,
            vec![WireValue::address(address), WireValue::bytes(key)],
        )
    }
}

impl<C: Connector> AccountEncodedKeyRevocationHandler for ProxyHost<C> {
    fn revoke_encoded_account_key(
        &self,
        address: Address,
        index: u32,
    ) -> Result<Vec<u8>, HostError> {
        let value = self.call_value(
            Method::RevokeEncodedAccountKey,
            vec![WireValue::address(address), WireValue::uint64(u64::from(index))],
        )?;
        Ok(value.to_bytes()?.to_vec())
    }
}

impl<C: Connector> PublicKeyValidator for ProxyHost<C> {
    fn validate_public_key(&self, key: &PublicKey) -> Result<(), HostError> {
        self.call_unit(Method::ValidatePublicKey, vec![WireValue::public_key(key)])
    }
}

impl<C: Connector> AccountKeyProvider for ProxyHost<C> {
    fn get_account_key(
        &self,
        address: Address,
        index: u32,
    ) -> Result<Option<AccountKey>, HostError> {
        let value = self.call(
            Method::GetAccountKey,
            vec![WireValue::address(address), WireValue::uint64(u64::from(index))],
        )?;
        Ok(value.map(|v| v.to_account_key()).transpose()?)
    }
}

impl<C: Connector> AccountKeyAdditionHandler for ProxyHost<C> {
    fn add_account_key(
        &self,
        address: Address,
        key: &PublicKey,
        hash_algo: HashAlgorithm,
        weight: UFix64,
    ) -> Result<AccountKey, HostError> {
        let value = self.call_value(
            Method::AddAccountKey,
            vec![
                WireValue::address(address),
                WireValue::public_key(key),
                WireValue::uint64(u64::from(hash_algo.raw())),
                WireValue::ufix64(weight),
            ],
        )?;
        Ok(value.to_account_key()?)
    }
}

impl<C: Connector> AccountKeyRevocationHandler for ProxyHost<C> {
    fn revoke_account_key(
        &self,
        address: Address,
        index: u32,
    ) -> Result<Option<AccountKey>, HostError> {
        let value = self.call(
            Method::RevokeAccountKey,
            vec![WireValue::address(address), WireValue::uint64(u64::from(index))],
        )?;
        Ok(value.map(|v| v.to_account_key()).transpose()?)
    }
}

impl<C: Connector> AccountContractNamesProvider for ProxyHost<C> {
    fn get_account_contract_names(&self, address: Address) -> Result<Vec<String>, HostError> {
        match self.call(Method::GetAccountContractNames, vec![WireValue::address(address)])? {
            Some(value) => Ok(value.to_string_list()?),
            None => Ok(Vec::new()),
        }
    }
}

impl<C: Connector> AccountContractProvider for ProxyHost<C> {
    fn get_account_contract_code(
        &self,
        address: Address,
        name: &str,
    ) -> Result<Option<Vec<u8>>, HostError> {
        let value = self.call(
            Method::GetAccountContractCode,
            vec![WireValue::address(address), WireValue::string(name)],
        )?;
        match value {
            Some(value) => {
                let code = value.to_bytes()?;
                Ok((!code.is_empty()).then(|| code.to_vec()))
            }
            None => Ok(None),
        }
    }
}

impl<C: Connector> AccountContractUpdater for ProxyHost<C> {
    fn update_account_contract_code(
        &self,
        address: Address,
        name: &str,
        code: &[u8],
    ) -> Result<(), HostError> {
        self.call_unit(
            Method::UpdateAccountContractCode,
            vec![
                WireValue::address(address),
                WireValue::string(name),
                WireValue::bytes(code),
            ],
        )
    }
}

impl<C: Connector> AccountContractRemovalHandler for ProxyHost<C> {
    fn remove_account_contract_code(&self, address: Address, name: &str) -> Result<(), HostError> {
        self.call_unit(
            Method::RemoveAccountContractCode,
            vec![WireValue::address(address), WireValue::string(name)],
        )
    }

    fn record_contract_removal(&self, address: Address, name: &str) -> Result<(), HostError> {
        self.call_unit(
            Method::RecordContractRemoval,
            vec![WireValue::address(address), WireValue::string(name)],
        )
    }
}

impl<C: Connector> CodeProvider for ProxyHost<C> {
    fn get_code(&self, location: &Location) -> Result<Vec<u8>, HostError> {
        match self.call(Method::GetCode, vec![WireValue::location(location)])? {
            Some(value) => Ok(value.to_bytes()?.to_vec()),
            None => Ok(Vec::new()),
        }
    }
}

impl<C: Connector> LocationResolver for ProxyHost<C> {
    fn resolve_location(
        &self,
        identifiers: &[String],
        location: &Location,
    ) -> Result<Vec<ResolvedLocation>, HostError> {
        let value = self.call(
            Method::ResolveLocation,
            vec![
                WireValue::string_list(identifiers.to_vec()),
                WireValue::location(location),
            ],
        )?;
        match value {
            Some(value) => Ok(value.to_resolved_locations()?),
            None => Ok(Vec::new()),
        }
    }
}

impl<C: Connector> ProgramLogger for ProxyHost<C> {
    fn program_log(&self, message: &str) -> Result<(), HostError> {
        self.call_unit(Method::ProgramLog, vec![WireValue::string(message)])
    }
}
