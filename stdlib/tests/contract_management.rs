//! Contract add / update / remove rules.

mod common;

use common::*;
use quarry_hostapi::HostError;
use quarry_primitives::{crypto::code_hash, AccountEventKind, Value};
use quarry_stdlib::{
    Environment, Fault, LegalityError, ParseError, ProgramInspector, StdlibConfig,
    UnparsableCodePolicy,
};

#[test]
fn test_add_then_get_returns_identical_code() {
    let host = funded_host();
    let contracts = Environment::new(&host).auth_account(SERVICE).contracts();

    let deployed = contracts.add("Hello", CONTRACT_PLAIN.as_bytes()).unwrap();
    assert_eq!(deployed.address, SERVICE);
    assert_eq!(deployed.name, "Hello");

    let fetched = contracts.get("Hello").unwrap().unwrap();
    assert_eq!(fetched.code, CONTRACT_PLAIN.as_bytes());
    assert_eq!(fetched, deployed);
}

#[test]
fn test_add_twice_fails_with_contract_exists() {
    let host = funded_host();
    let contracts = Environment::new(&host).auth_account(SERVICE).contracts();
    contracts.add("Hello", CONTRACT_PLAIN.as_bytes()).unwrap();
    host.clear_calls();

    let err = contracts.add("Hello", b"access(all) contract Hello {}").unwrap_err();
    assert_eq!(
        err,
        Fault::Legality(LegalityError::ContractExists {
            name: "Hello".into(),
            address: SERVICE,
        })
    );
    // Only the existence check reached the host.
    assert_eq!(host.call_names(), vec!["get_account_contract_code"]);
    assert_eq!(
        contracts.get("Hello").unwrap().unwrap().code,
        CONTRACT_PLAIN.as_bytes()
    );
}

#[test]
fn test_update_without_add_fails_with_contract_not_found() {
    let host = funded_host();
    let contracts = Environment::new(&host).auth_account(SERVICE).contracts();
    let err = contracts.update("Hello", CONTRACT_PLAIN.as_bytes()).unwrap_err();
    assert_eq!(
        err,
        Fault::Legality(LegalityError::ContractNotFound {
            name: "Hello".into(),
            address: SERVICE,
        })
    );
    assert!(host.events().is_empty());
}

#[test]
fn test_update_event_hashes_new_code() {
    let host = funded_host();
    let account = Environment::new(&host).auth_account(SERVICE);
    account
        .invoke("contracts.add", &contract_args("Hello", CONTRACT_PLAIN))
        .unwrap();
    let new_code = "access(all) contract Hello {}";
    account
        .invoke("contracts.update__experimental", &contract_args("Hello", new_code))
        .unwrap();

    let events = host.events();
    let update = &events[1];
    assert_eq!(update.kind(), AccountEventKind::AccountContractUpdated);
    assert_eq!(
        update.payload(),
        &[
            Value::Address(SERVICE),
            Value::bytes(&code_hash(new_code.as_bytes())),
            Value::string("Hello"),
        ]
    );
}

#[test]
fn test_remove_unknown_is_absent_without_event() {
    let host = funded_host();
    let account = Environment::new(&host).auth_account(SERVICE);
    assert_eq!(
        account.invoke("contracts.remove", &[Value::string("Nope")]).unwrap(),
        Value::nil()
    );
    assert!(host.events().is_empty());
}

#[test]
fn test_remove_enum_contract_forbidden_and_repeatable() {
    let host = funded_host();
    let contracts = Environment::new(&host).auth_account(SERVICE).contracts();
    contracts.add("Colors", CONTRACT_WITH_ENUM.as_bytes()).unwrap();
    let events_before = host.events().len();
    host.clear_calls();

    for _ in 0..2 {
        let err = contracts.remove("Colors").unwrap_err();
        assert_eq!(
            err,
            Fault::Legality(LegalityError::ContractRemovalForbidden {
                name: "Colors".into()
            })
        );
    }
    assert_eq!(host.events().len(), events_before);
    assert!(!host.call_names().contains(&"remove_account_contract_code"));
    assert!(contracts.get("Colors").unwrap().is_some());
}

#[test]
fn test_remove_plain_contract() {
    let host = funded_host();
    let contracts = Environment::new(&host).auth_account(SERVICE).contracts();
    contracts.add("Hello", CONTRACT_PLAIN.as_bytes()).unwrap();

    let removed = contracts.remove("Hello").unwrap().unwrap();
    assert_eq!(removed.code, CONTRACT_PLAIN.as_bytes());
    assert_eq!(contracts.get("Hello").unwrap(), None);
    assert!(contracts.names().unwrap().is_empty());

    let last = host.events().pop().unwrap();
    assert_eq!(last.kind(), AccountEventKind::AccountContractRemoved);
    assert_eq!(last.payload()[1], Value::bytes(&code_hash(CONTRACT_PLAIN.as_bytes())));

    let names = host.call_names();
    let removal = names.iter().position(|m| *m == "remove_account_contract_code").unwrap();
    assert_eq!(names[removal + 1], "record_contract_removal");
}

#[test]
fn test_remove_stops_when_recording_fails() {
    let host = funded_host();
    let contracts = Environment::new(&host).auth_account(SERVICE).contracts();
    contracts.add("Hello", CONTRACT_PLAIN.as_bytes()).unwrap();
    host.inject_fault("record_contract_removal", HostError::Io("journal full".into()));

    let err = contracts.remove("Hello").unwrap_err();
    assert_eq!(err, Fault::Host(HostError::Io("journal full".into())));
    assert!(err.aborts_execution());

    let kinds: Vec<_> = host.events().iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec![AccountEventKind::AccountContractAdded]);
    assert!(host.pending_removals(SERVICE).is_empty());
}

#[test]
fn test_remove_propagates_emit_fault() {
    let host = funded_host();
    let contracts = Environment::new(&host).auth_account(SERVICE).contracts();
    contracts.add("Hello", CONTRACT_PLAIN.as_bytes()).unwrap();
    host.inject_fault("emit_event", HostError::Io("event sink closed".into()));

    let err = contracts.remove("Hello").unwrap_err();
    assert_eq!(err, Fault::Host(HostError::Io("event sink closed".into())));
    assert_eq!(host.events().len(), 1);
}

#[test]
fn test_unparsable_code_policy_is_configurable() {
    let host = funded_host();
    let env = Environment::new(&host);
    env.auth_account(SERVICE)
        .contracts()
        .add("Broken", b"access(all) contract Broken {")
        .unwrap();

    let strict = env.with_config(StdlibConfig {
        unparsable_code: UnparsableCodePolicy::ForbidRemoval,
    });
    assert!(strict.auth_account(SERVICE).contracts().remove("Broken").is_err());
    assert!(env.auth_account(SERVICE).contracts().remove("Broken").unwrap().is_some());
}

struct AlwaysEnum;

impl ProgramInspector for AlwaysEnum {
    fn declares_enum(&self, _code: &[u8]) -> Result<bool, ParseError> {
        Ok(true)
    }
}

#[test]
fn test_custom_inspector() {
    let host = funded_host();
    let inspector = AlwaysEnum;
    let contracts = Environment::new(&host)
        .with_inspector(&inspector)
        .auth_account(SERVICE)
        .contracts();
    contracts.add("Hello", CONTRACT_PLAIN.as_bytes()).unwrap();
    assert!(matches!(
        contracts.remove("Hello"),
        Err(Fault::Legality(LegalityError::ContractRemovalForbidden { .. }))
    ));
}

#[test]
fn test_names_in_host_order() {
    let host = funded_host();
    let account = Environment::new(&host).auth_account(SERVICE);
    for name in ["Zeta", "Alpha", "Mid"] {
        account
            .invoke(
                "contracts.add",
                &contract_args(name, &format!("access(all) contract {} {{}}", name)),
            )
            .unwrap();
    }
    assert_eq!(
        account.invoke("contracts.names", &[]).unwrap(),
        Value::Array(vec![
            Value::string("Alpha"),
            Value::string("Mid"),
            Value::string("Zeta"),
        ])
    );
}
