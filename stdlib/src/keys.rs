//! Key management functions.
//!
//! The structured API (`keys.add`, `keys.get`, `keys.revoke`) works with
//! `AccountKey` values; the legacy API (`addPublicKey`, `removePublicKey`)
//! passes raw encoded key bytes straight through to the host.
//!
//! Key indices come from the host and are never derived here. Revocation
//! is the host's job too: the returned key reflects the host's answer.

use std::fmt;

use quarry_hostapi::{
    AccountEncodedKeyAdditionHandler, AccountEncodedKeyRevocationHandler, AccountKeyProvider,
    AuthAccountKeysHandler,
};
use quarry_primitives::{
    AccountEvent, AccountKey, AccountKeyValue, Address, HashAlgorithm, PublicKeyValue, UFix64,
    Value,
};
use tracing::debug;

use crate::args::Arguments;
use crate::env::Environment;
use crate::events::emit;
use crate::fault::{Fault, FaultResult};

/// Wrap a key read back from host storage.
fn stored_key_value(key: AccountKey) -> AccountKeyValue {
    let public_key = PublicKeyValue::assume_validated(key.public_key.clone());
    AccountKeyValue::new(key, public_key)
}

fn optional_key(key: Option<AccountKeyValue>) -> Value {
    match key {
        Some(key) => Value::some(Value::AccountKey(key)),
        None => Value::nil(),
    }
}

fn get_key<H: AccountKeyProvider + ?Sized>(
    host: &H,
    address: Address,
    index: u32,
) -> FaultResult<Option<AccountKeyValue>> {
    Ok(host.get_account_key(address, index)?.map(stored_key_value))
}

// ── Legacy encoded keys ──

/// `addPublicKey(publicKey: [UInt8])`.
pub fn add_public_key<H: AccountEncodedKeyAdditionHandler + ?Sized>(
    host: &H,
    address: Address,
    key: &[u8],
) -> FaultResult<()> {
    host.add_encoded_account_key(address, key)?;
    emit(host, AccountEvent::key_added(address, Value::bytes(key)))
}

/// `removePublicKey(index: Int)`.
pub fn remove_public_key<H: AccountEncodedKeyRevocationHandler + ?Sized>(
    host: &H,
    address: Address,
    index: u32,
) -> FaultResult<()> {
    let revoked = host.revoke_encoded_account_key(address, index)?;
    emit(host, AccountEvent::key_removed(address, Value::bytes(&revoked)))
}

// ── Structured keys ──

/// The `keys` member of a privileged account.
pub struct AuthAccountKeys<'h, H: ?Sized> {
    env: Environment<'h, H>,
    address: Address,
}

impl<'h, H: AuthAccountKeysHandler + ?Sized> AuthAccountKeys<'h, H> {
    pub(crate) fn new(env: Environment<'h, H>, address: Address) -> Self {
        Self { env, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// `keys.add(publicKey:hashAlgorithm:weight:)`.
    ///
    /// The host validates the public key before the key is added; the
    /// event carries the public key value the program supplied.
    pub fn add(
        &self,
        public_key: &PublicKeyValue,
        hash_algo: HashAlgorithm,
        weight: UFix64,
    ) -> FaultResult<AccountKeyValue> {
        let host = self.env.host();
        let validated = PublicKeyValue::validated(public_key.key().clone(), |key| {
            host.validate_public_key(key)
        })?;

        let added = host.add_account_key(self.address, validated.key(), hash_algo, weight)?;
        debug!(address = %self.address, key_index = added.key_index, "account key added");
        let key = AccountKeyValue::new(added, validated);

        emit(
            host,
            AccountEvent::key_added(self.address, Value::PublicKey(public_key.clone())),
        )?;
        Ok(key)
    }

    /// `keys.get(keyIndex:)`.
    pub fn get(&self, index: u32) -> FaultResult<Option<AccountKeyValue>> {
        get_key(self.env.host(), self.address, index)
    }

    /// `keys.revoke(keyIndex:)`. No event if there is no key at `index`.
    pub fn revoke(&self, index: u32) -> FaultResult<Option<AccountKeyValue>> {
        let host = self.env.host();
        let Some(revoked) = host.revoke_account_key(self.address, index)? else {
            return Ok(None);
        };
        emit(
            host,
            AccountEvent::key_removed(self.address, Value::Int(i64::from(index))),
        )?;
        Ok(Some(stored_key_value(revoked)))
    }

    pub fn invoke(&self, member: &str, arguments: &[Value]) -> FaultResult<Value> {
        match member {
            "add" => {
                let args = Arguments::new("keys.add", arguments, 3)?;
                let key = self.add(
                    args.public_key(0)?,
                    args.hash_algorithm(1)?,
                    args.ufix64(2)?,
                )?;
                Ok(Value::AccountKey(key))
            }
            "get" => {
                let args = Arguments::new("keys.get", arguments, 1)?;
                Ok(optional_key(self.get(args.key_index(0)?)?))
            }
            "revoke" => {
                let args = Arguments::new("keys.revoke", arguments, 1)?;
                Ok(optional_key(self.revoke(args.key_index(0)?)?))
            }
            _ => Err(Fault::unknown_member("AuthAccount.Keys", member)),
        }
    }
}

/// The `keys` member of a restricted account: lookup only.
pub struct PublicAccountKeys<'h, H: ?Sized> {
    env: Environment<'h, H>,
    address: Address,
}

impl<'h, H: AccountKeyProvider + ?Sized> PublicAccountKeys<'h, H> {
    pub(crate) fn new(env: Environment<'h, H>, address: Address) -> Self {
        Self { env, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// `keys.get(keyIndex:)`.
    pub fn get(&self, index: u32) -> FaultResult<Option<AccountKeyValue>> {
        get_key(self.env.host(), self.address, index)
    }

    pub fn invoke(&self, member: &str, arguments: &[Value]) -> FaultResult<Value> {
        match member {
            "get" => {
                let args = Arguments::new("keys.get", arguments, 1)?;
                Ok(optional_key(self.get(args.key_index(0)?)?))
            }
            _ => Err(Fault::unknown_member("PublicAccount.Keys", member)),
        }
    }
}

impl<H: ?Sized> fmt::Debug for AuthAccountKeys<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthAccountKeys")
            .field("address", &self.address)
            .finish()
    }
}

impl<H: ?Sized> fmt::Debug for PublicAccountKeys<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicAccountKeys")
            .field("address", &self.address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_hostapi::{HostError, MemHost};
    use quarry_primitives::{AccountEventKind, PublicKey, SignatureAlgorithm, ValidationSource};

    const ACCOUNT: Address = Address::from_u64(0x20);

    fn host() -> MemHost {
        MemHost::default().with_account(ACCOUNT, UFix64::ZERO)
    }

    fn key_value(fill: u8) -> PublicKeyValue {
        PublicKeyValue::assume_validated(PublicKey::new(
            vec![fill; 64],
            SignatureAlgorithm::EcdsaP256,
        ))
    }

    #[test]
    fn test_add_returns_validated_key_and_emits() {
        let host = host();
        let keys = AuthAccountKeys::new(Environment::new(&host), ACCOUNT);
        let added = keys
            .add(&key_value(1), HashAlgorithm::Sha3_256, UFix64::from_raw(100_000_000))
            .unwrap();
        assert_eq!(added.key_index, 0);
        assert_eq!(added.public_key.source(), ValidationSource::Validated);

        let events = host.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), AccountEventKind::AccountKeyAdded);
        assert_eq!(events[0].payload()[1], Value::PublicKey(key_value(1)));
    }

    #[test]
    fn test_add_failure_emits_nothing() {
        let host = host();
        let keys = AuthAccountKeys::new(Environment::new(&host), ACCOUNT);
        let bad = PublicKeyValue::assume_validated(PublicKey::new(
            vec![1; 3],
            SignatureAlgorithm::EcdsaP256,
        ));
        let err = keys.add(&bad, HashAlgorithm::Sha3_256, UFix64::ZERO).unwrap_err();
        assert!(matches!(err, Fault::Host(HostError::InvalidPublicKey(_))));
        assert!(host.events().is_empty());
        assert!(!host.call_names().contains(&"add_account_key"));
    }

    #[test]
    fn test_validation_fault_leaves_keys_untouched() {
        let host = host();
        let keys = AuthAccountKeys::new(Environment::new(&host), ACCOUNT);
        host.inject_fault("validate_public_key", HostError::unimplemented("ValidatePublicKey"));

        let err = keys.add(&key_value(1), HashAlgorithm::Sha3_256, UFix64::ZERO).unwrap_err();
        assert_eq!(err, Fault::Host(HostError::unimplemented("ValidatePublicKey")));
        assert_eq!(host.call_names(), vec!["validate_public_key"]);
        assert!(host.events().is_empty());
        assert_eq!(keys.get(0).unwrap(), None);
    }

    #[test]
    fn test_get_is_assumed_valid() {
        let host = host();
        let keys = AuthAccountKeys::new(Environment::new(&host), ACCOUNT);
        keys.add(&key_value(1), HashAlgorithm::Sha2_256, UFix64::ZERO).unwrap();
        let got = keys.get(0).unwrap().unwrap();
        assert_eq!(got.public_key.source(), ValidationSource::AssumedValid);
        assert_eq!(keys.get(1).unwrap(), None);
    }

    #[test]
    fn test_revoke_missing_key_is_silent() {
        let host = host();
        let keys = AuthAccountKeys::new(Environment::new(&host), ACCOUNT);
        assert_eq!(keys.revoke(3).unwrap(), None);
        assert!(host.events().is_empty());
    }

    #[test]
    fn test_revoke_event_carries_index() {
        let host = host();
        let keys = AuthAccountKeys::new(Environment::new(&host), ACCOUNT);
        keys.add(&key_value(1), HashAlgorithm::Sha2_256, UFix64::ZERO).unwrap();
        let revoked = keys.revoke(0).unwrap().unwrap();
        assert!(revoked.is_revoked);
        let last = host.events().pop().unwrap();
        assert_eq!(last.kind(), AccountEventKind::AccountKeyRemoved);
        assert_eq!(last.payload()[1], Value::Int(0));
    }

    #[test]
    fn test_legacy_roundtrip_events() {
        let host = host();
        add_public_key(&host, ACCOUNT, &[1, 2, 3]).unwrap();
        remove_public_key(&host, ACCOUNT, 0).unwrap();
        let events = host.events();
        assert_eq!(events[0].payload()[1], Value::bytes(&[1, 2, 3]));
        assert_eq!(events[1].payload()[1], Value::bytes(&[1, 2, 3]));
    }

    #[test]
    fn test_invoke_negative_index() {
        let host = host();
        let keys = PublicAccountKeys::new(Environment::new(&host), ACCOUNT);
        let err = keys.invoke("get", &[Value::Int(-2)]).unwrap_err();
        assert_eq!(err.class(), crate::fault::FaultClass::Internal);
        assert!(keys.invoke("revoke", &[Value::Int(0)]).is_err());
    }
}
