//! Contract management functions.
//!
//! `add` and `update__experimental` share one path that checks the
//! existing code before handing the new code to the host. `remove`
//! re-inspects the stored code and refuses to delete contracts that
//! declare enums. All legality checks happen before any host mutation,
//! and events are emitted only after the host confirms the change.

use std::fmt;

use quarry_hostapi::{
    AccountContractProvider, AuthAccountContractsHandler, PublicAccountContractsHandler,
};
use quarry_primitives::{AccountEventKind, Address, DeployedContractValue, Value};
use tracing::{debug, warn};

use crate::args::Arguments;
use crate::config::UnparsableCodePolicy;
use crate::env::Environment;
use crate::events::emit_contract_event;
use crate::fault::{Fault, FaultResult, LegalityError};

fn get_contract<H: AccountContractProvider + ?Sized>(
    host: &H,
    address: Address,
    name: &str,
) -> FaultResult<Option<DeployedContractValue>> {
    Ok(host
        .get_account_contract_code(address, name)?
        .map(|code| DeployedContractValue::new(address, name, code)))
}

fn optional_contract(contract: Option<DeployedContractValue>) -> Value {
    match contract {
        Some(contract) => Value::some(Value::DeployedContract(contract)),
        None => Value::nil(),
    }
}

fn names_value(names: Vec<String>) -> Value {
    Value::Array(names.into_iter().map(Value::String).collect())
}

/// The `contracts` member of a privileged account.
pub struct AuthAccountContracts<'h, H: ?Sized> {
    env: Environment<'h, H>,
    address: Address,
}

impl<'h, H: AuthAccountContractsHandler + ?Sized> AuthAccountContracts<'h, H> {
    pub(crate) fn new(env: Environment<'h, H>, address: Address) -> Self {
        Self { env, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// `contracts.add(name:code:)`. Fails if `name` is already deployed.
    pub fn add(&self, name: &str, code: &[u8]) -> FaultResult<DeployedContractValue> {
        self.change(name, code, false)
    }

    /// `contracts.update__experimental(name:code:)`. Fails if `name` is not
    /// deployed.
    pub fn update(&self, name: &str, code: &[u8]) -> FaultResult<DeployedContractValue> {
        self.change(name, code, true)
    }

    fn change(
        &self,
        name: &str,
        code: &[u8],
        is_update: bool,
    ) -> FaultResult<DeployedContractValue> {
        if name.is_empty() {
            return Err(LegalityError::EmptyContractName.into());
        }

        let host = self.env.host();
        let exists = host.get_account_contract_code(self.address, name)?.is_some();
        match (is_update, exists) {
            (true, false) => {
                return Err(LegalityError::ContractNotFound {
                    name: name.to_string(),
                    address: self.address,
                }
                .into())
            }
            (false, true) => {
                return Err(LegalityError::ContractExists {
                    name: name.to_string(),
                    address: self.address,
                }
                .into())
            }
            _ => {}
        }

        host.update_account_contract_code(self.address, name, code)?;
        debug!(address = %self.address, name, is_update, len = code.len(), "contract code stored");

        let kind = if is_update {
            AccountEventKind::AccountContractUpdated
        } else {
            AccountEventKind::AccountContractAdded
        };
        emit_contract_event(host, kind, self.address, name, code)?;
        Ok(DeployedContractValue::new(self.address, name, code.to_vec()))
    }

    /// `contracts.get(name:)`.
    pub fn get(&self, name: &str) -> FaultResult<Option<DeployedContractValue>> {
        get_contract(self.env.host(), self.address, name)
    }

    /// `contracts.remove(name:)`. `None` and no event if nothing is deployed
    /// under `name`.
    pub fn remove(&self, name: &str) -> FaultResult<Option<DeployedContractValue>> {
        let host = self.env.host();
        let Some(code) = host.get_account_contract_code(self.address, name)? else {
            return Ok(None);
        };

        let forbidden = match self.env.inspector().declares_enum(&code) {
            Ok(declares_enum) => declares_enum,
            Err(err) => {
                warn!(
                    address = %self.address,
                    name,
                    error = %err,
                    "stored contract code does not parse"
                );
                self.env.config().unparsable_code == UnparsableCodePolicy::ForbidRemoval
            }
        };
        if forbidden {
            return Err(LegalityError::ContractRemovalForbidden {
                name: name.to_string(),
            }
            .into());
        }

        host.remove_account_contract_code(self.address, name)?;
        host.record_contract_removal(self.address, name)?;
        debug!(address = %self.address, name, "contract removed");

        emit_contract_event(
            host,
            AccountEventKind::AccountContractRemoved,
            self.address,
            name,
            &code,
        )?;
        Ok(Some(DeployedContractValue::new(self.address, name, code)))
    }

    /// `contracts.names`.
    pub fn names(&self) -> FaultResult<Vec<String>> {
        Ok(self.env.host().get_account_contract_names(self.address)?)
    }

    pub fn invoke(&self, member: &str, arguments: &[Value]) -> FaultResult<Value> {
        match member {
            "add" | "update__experimental" => {
                let function = if member == "add" {
                    "contracts.add"
                } else {
                    "contracts.update__experimental"
                };
                let args = Arguments::new(function, arguments, 2)?;
                let name = args.string(0)?;
                let code = args.bytes(1)?;
                let deployed = self.change(name, &code, member != "add")?;
                Ok(Value::DeployedContract(deployed))
            }
            "get" => {
                let args = Arguments::new("contracts.get", arguments, 1)?;
                Ok(optional_contract(self.get(args.string(0)?)?))
            }
            "remove" => {
                let args = Arguments::new("contracts.remove", arguments, 1)?;
                Ok(optional_contract(self.remove(args.string(0)?)?))
            }
            "names" => {
                Arguments::new("contracts.names", arguments, 0)?;
                Ok(names_value(self.names()?))
            }
            _ => Err(Fault::unknown_member("AuthAccount.Contracts", member)),
        }
    }
}

/// The `contracts` member of a restricted account: read only.
pub struct PublicAccountContracts<'h, H: ?Sized> {
    env: Environment<'h, H>,
    address: Address,
}

impl<'h, H: PublicAccountContractsHandler + ?Sized> PublicAccountContracts<'h, H> {
    pub(crate) fn new(env: Environment<'h, H>, address: Address) -> Self {
        Self { env, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn get(&self, name: &str) -> FaultResult<Option<DeployedContractValue>> {
        get_contract(self.env.host(), self.address, name)
    }

    pub fn names(&self) -> FaultResult<Vec<String>> {
        Ok(self.env.host().get_account_contract_names(self.address)?)
    }

    pub fn invoke(&self, member: &str, arguments: &[Value]) -> FaultResult<Value> {
        match member {
            "get" => {
                let args = Arguments::new("contracts.get", arguments, 1)?;
                Ok(optional_contract(self.get(args.string(0)?)?))
            }
            "names" => {
                Arguments::new("contracts.names", arguments, 0)?;
                Ok(names_value(self.names()?))
            }
            _ => Err(Fault::unknown_member("PublicAccount.Contracts", member)),
        }
    }
}

impl<H: ?Sized> fmt::Debug for AuthAccountContracts<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthAccountContracts")
            .field("address", &self.address)
            .finish()
    }
}

impl<H: ?Sized> fmt::Debug for PublicAccountContracts<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicAccountContracts")
            .field("address", &self.address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_hostapi::MemHost;
    use quarry_primitives::UFix64;

    use crate::config::StdlibConfig;
    use crate::fault::FaultClass;

    const ACCOUNT: Address = Address::from_u64(0x30);

    fn host() -> MemHost {
        MemHost::default().with_account(ACCOUNT, UFix64::ZERO)
    }

    #[test]
    fn test_empty_name_rejected_before_host() {
        let host = host();
        let contracts = AuthAccountContracts::new(Environment::new(&host), ACCOUNT);
        assert_eq!(
            contracts.add("", b"contract X {}").unwrap_err(),
            Fault::from(LegalityError::EmptyContractName)
        );
        assert!(host.calls().is_empty());
    }

    #[test]
    fn test_add_then_update() {
        let host = host();
        let contracts = AuthAccountContracts::new(Environment::new(&host), ACCOUNT);
        contracts.add("Foo", b"contract Foo {}").unwrap();
        let updated = contracts.update("Foo", b"contract Foo { }").unwrap();
        assert_eq!(updated.code, b"contract Foo { }".to_vec());
        let kinds: Vec<_> = host.events().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                AccountEventKind::AccountContractAdded,
                AccountEventKind::AccountContractUpdated
            ]
        );
    }

    #[test]
    fn test_unparsable_code_policy() {
        let host = host();
        let env = Environment::new(&host);
        AuthAccountContracts::new(env, ACCOUNT).add("Bad", b"contract Bad {").unwrap();

        let strict = env.with_config(StdlibConfig {
            unparsable_code: UnparsableCodePolicy::ForbidRemoval,
        });
        let err = AuthAccountContracts::new(strict, ACCOUNT).remove("Bad").unwrap_err();
        assert_eq!(err.class(), FaultClass::Legality);

        let removed = AuthAccountContracts::new(env, ACCOUNT).remove("Bad").unwrap();
        assert!(removed.is_some());
    }

    #[test]
    fn test_remove_records_removal() {
        let host = host();
        let contracts = AuthAccountContracts::new(Environment::new(&host), ACCOUNT);
        contracts.add("Foo", b"contract Foo {}").unwrap();
        contracts.remove("Foo").unwrap().unwrap();
        assert_eq!(host.pending_removals(ACCOUNT), vec!["Foo".to_string()]);
        assert_eq!(contracts.get("Foo").unwrap(), None);
    }

    #[test]
    fn test_invoke_names() {
        let host = host();
        let contracts = AuthAccountContracts::new(Environment::new(&host), ACCOUNT);
        contracts
            .invoke("add", &[Value::string("B"), Value::bytes(b"contract B {}")])
            .unwrap();
        contracts
            .invoke("add", &[Value::string("A"), Value::bytes(b"contract A {}")])
            .unwrap();
        let public = PublicAccountContracts::new(Environment::new(&host), ACCOUNT);
        assert_eq!(
            public.invoke("names", &[]).unwrap(),
            Value::Array(vec![Value::string("A"), Value::string("B")])
        );
        assert!(public.invoke("remove", &[Value::string("A")]).is_err());
    }
}
