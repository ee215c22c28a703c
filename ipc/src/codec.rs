//! Framing and value conversion.
//!
//! ## Frame format
//!
//! ```text
//! [length: 4 bytes BE] [protobuf message: length bytes]
//! ```
//!
//! Both sides reject frames longer than their configured limit before
//! reading (or writing) the body.

use std::io::{self, Read, Write};

use bytes::BytesMut;
use prost::Message;
use quarry_hostapi::HostError;
use quarry_primitives::{
    AccountEvent, AccountEventKind, AccountKey, Address, HashAlgorithm, Location, PublicKey,
    PublicKeyValue, ResolvedLocation, SignatureAlgorithm, UFix64, Value, ADDRESS_LENGTH,
};

use crate::error::IpcError;
use crate::messages::wire_location;
use crate::messages::wire_value::Kind;
use crate::messages::*;

/// Size of the length prefix.
pub const FRAME_HEADER_LEN: usize = 4;

// ── Framing ──

/// Write one length-prefixed message and flush.
pub fn write_message<M: Message, W: Write>(
    writer: &mut W,
    message: &M,
    max_size: usize,
) -> Result<(), IpcError> {
    let size = message.encoded_len();
    if size > max_size {
        return Err(IpcError::FrameTooLarge {
            size,
            limit: max_size,
        });
    }
    let len = u32::try_from(size).map_err(|_| IpcError::FrameTooLarge {
        size,
        limit: u32::MAX as usize,
    })?;

    let mut buf = BytesMut::with_capacity(FRAME_HEADER_LEN + size);
    buf.extend_from_slice(&len.to_be_bytes());
    message.encode(&mut buf)?;
    writer.write_all(&buf)?;
    writer.flush()?;
    Ok(())
}

/// Read one length-prefixed message.
///
/// Returns `Ok(None)` if the stream ends cleanly before a new frame.
pub fn read_message<M: Message + Default, R: Read>(
    reader: &mut R,
    max_size: usize,
) -> Result<Option<M>, IpcError> {
    let mut header = [0u8; FRAME_HEADER_LEN];
    let mut filled = 0;
    while filled < FRAME_HEADER_LEN {
        match reader.read(&mut header[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(
                    io::Error::new(io::ErrorKind::UnexpectedEof, "truncated frame header").into(),
                )
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }

    let size = u32::from_be_bytes(header) as usize;
    if size > max_size {
        return Err(IpcError::FrameTooLarge {
            size,
            limit: max_size,
        });
    }
    let mut body = vec![0u8; size];
    reader.read_exact(&mut body)?;
    Ok(Some(M::decode(body.as_slice())?))
}

// ── Domain → wire ──

fn wire(kind: Kind) -> WireValue {
    WireValue { kind: Some(kind) }
}

fn public_key_to_wire(key: &PublicKey) -> WirePublicKey {
    WirePublicKey {
        public_key: key.public_key.clone(),
        sign_algo: u32::from(key.sign_algo.raw()),
    }
}

fn location_to_wire(location: &Location) -> WireLocation {
    let kind = match location {
        Location::Address { address, name } => wire_location::Kind::Address(AddressLocation {
            address: address.as_bytes().to_vec(),
            name: name.clone(),
        }),
        Location::String(s) => wire_location::Kind::String(s.clone()),
        Location::Identifier(s) => wire_location::Kind::Identifier(s.clone()),
        Location::Transaction(hash) => wire_location::Kind::Transaction(hash.to_vec()),
        Location::Script(hash) => wire_location::Kind::Script(hash.to_vec()),
    };
    WireLocation { kind: Some(kind) }
}

impl WireValue {
    pub fn void() -> Self {
        wire(Kind::Void(Absent {}))
    }

    pub fn boolean(value: bool) -> Self {
        wire(Kind::Bool(value))
    }

    pub fn uint64(value: u64) -> Self {
        wire(Kind::Uint64(value))
    }

    pub fn int64(value: i64) -> Self {
        wire(Kind::Int64(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        wire(Kind::String(value.into()))
    }

    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        wire(Kind::Bytes(value.into()))
    }

    pub fn address(address: Address) -> Self {
        wire(Kind::Address(address.as_bytes().to_vec()))
    }

    pub fn location(location: &Location) -> Self {
        wire(Kind::Location(location_to_wire(location)))
    }

    pub fn ufix64(value: UFix64) -> Self {
        wire(Kind::Ufix64(value.raw()))
    }

    pub fn public_key(key: &PublicKey) -> Self {
        wire(Kind::PublicKey(public_key_to_wire(key)))
    }

    pub fn account_key(key: &AccountKey) -> Self {
        wire(Kind::AccountKey(WireAccountKey {
            key_index: key.key_index,
            public_key: Some(public_key_to_wire(&key.public_key)),
            hash_algo: u32::from(key.hash_algo.raw()),
            weight: key.weight.raw(),
            is_revoked: key.is_revoked,
        }))
    }

    pub fn string_list(values: Vec<String>) -> Self {
        wire(Kind::StringList(StringList { values }))
    }

    pub fn resolved_locations(values: &[ResolvedLocation]) -> Self {
        wire(Kind::ResolvedLocations(ResolvedLocationList {
            values: values
                .iter()
                .map(|resolved| WireResolvedLocation {
                    location: Some(location_to_wire(&resolved.location)),
                    identifiers: resolved.identifiers.clone(),
                })
                .collect(),
        }))
    }

    pub fn event(event: &AccountEvent) -> Result<Self, IpcError> {
        let payload = event
            .payload()
            .iter()
            .map(Self::value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(wire(Kind::Event(WireEvent {
            type_id: event.kind().type_id().to_string(),
            payload,
        })))
    }

    /// Encode an interpreted value, as carried in event payloads.
    ///
    /// Byte arrays travel as `bytes`; other arrays as `list`.
    pub fn value(value: &Value) -> Result<Self, IpcError> {
        Ok(match value {
            Value::Void => Self::void(),
            Value::Bool(b) => Self::boolean(*b),
            Value::Int(n) => Self::int64(*n),
            Value::UInt64(n) => Self::uint64(*n),
            Value::UFix64(v) => Self::ufix64(*v),
            Value::String(s) => Self::string(s.clone()),
            Value::Address(address) => Self::address(*address),
            Value::Array(elements) => match value.to_bytes() {
                Ok(bytes) => Self::bytes(bytes),
                Err(_) => wire(Kind::List(WireList {
                    values: elements.iter().map(Self::value).collect::<Result<_, _>>()?,
                })),
            },
            Value::PublicKey(key) => Self::public_key(key.key()),
            Value::AccountKey(key) => Self::account_key(&key.to_account_key()),
            other => return Err(IpcError::Unsupported(other.type_name())),
        })
    }
}

// ── Wire → domain ──

fn mismatch(expected: &str, got: &WireValue) -> IpcError {
    let got = match &got.kind {
        None => "nothing",
        Some(Kind::Void(_)) => "void",
        Some(Kind::Bool(_)) => "bool",
        Some(Kind::Uint64(_)) => "uint64",
        Some(Kind::Int64(_)) => "int64",
        Some(Kind::String(_)) => "string",
        Some(Kind::Bytes(_)) => "bytes",
        Some(Kind::Address(_)) => "address",
        Some(Kind::Location(_)) => "location",
        Some(Kind::Ufix64(_)) => "ufix64",
        Some(Kind::List(_)) => "list",
        Some(Kind::PublicKey(_)) => "public_key",
        Some(Kind::AccountKey(_)) => "account_key",
        Some(Kind::StringList(_)) => "string_list",
        Some(Kind::ResolvedLocations(_)) => "resolved_locations",
        Some(Kind::Event(_)) => "event",
    };
    IpcError::decode(format!("expected {}, got {}", expected, got))
}

fn address_from_wire(bytes: &[u8]) -> Result<Address, IpcError> {
    let raw: [u8; ADDRESS_LENGTH] = bytes.try_into().map_err(|_| {
        IpcError::decode(format!(
            "address must be {} bytes, got {}",
            ADDRESS_LENGTH,
            bytes.len()
        ))
    })?;
    Ok(Address::new(raw))
}

fn hash_from_wire(bytes: &[u8]) -> Result<[u8; 32], IpcError> {
    bytes
        .try_into()
        .map_err(|_| IpcError::decode(format!("hash must be 32 bytes, got {}", bytes.len())))
}

fn location_from_wire(location: &WireLocation) -> Result<Location, IpcError> {
    Ok(match &location.kind {
        Some(wire_location::Kind::Address(a)) => {
            Location::address(address_from_wire(&a.address)?, a.name.clone())
        }
        Some(wire_location::Kind::String(s)) => Location::String(s.clone()),
        Some(wire_location::Kind::Identifier(s)) => Location::Identifier(s.clone()),
        Some(wire_location::Kind::Transaction(h)) => Location::Transaction(hash_from_wire(h)?),
        Some(wire_location::Kind::Script(h)) => Location::Script(hash_from_wire(h)?),
        None => return Err(IpcError::decode("location without a kind")),
    })
}

fn public_key_from_wire(key: &WirePublicKey) -> Result<PublicKey, IpcError> {
    let raw = u8::try_from(key.sign_algo).map_err(|_| {
        IpcError::decode(format!("signature algorithm {} out of range", key.sign_algo))
    })?;
    let sign_algo = SignatureAlgorithm::from_raw(raw).map_err(|e| IpcError::decode(e.to_string()))?;
    Ok(PublicKey::new(key.public_key.clone(), sign_algo))
}

fn account_key_from_wire(key: &WireAccountKey) -> Result<AccountKey, IpcError> {
    let public_key = key
        .public_key
        .as_ref()
        .ok_or_else(|| IpcError::decode("account key without a public key"))?;
    let raw = u8::try_from(key.hash_algo)
        .map_err(|_| IpcError::decode(format!("hash algorithm {} out of range", key.hash_algo)))?;
    Ok(AccountKey {
        key_index: key.key_index,
        public_key: public_key_from_wire(public_key)?,
        hash_algo: HashAlgorithm::from_raw(raw).map_err(|e| IpcError::decode(e.to_string()))?,
        weight: UFix64::from_raw(key.weight),
        is_revoked: key.is_revoked,
    })
}

impl WireValue {
    pub fn to_bool(&self) -> Result<bool, IpcError> {
        match &self.kind {
            Some(Kind::Bool(b)) => Ok(*b),
            _ => Err(mismatch("bool", self)),
        }
    }

    pub fn to_uint64(&self) -> Result<u64, IpcError> {
        match &self.kind {
            Some(Kind::Uint64(n)) => Ok(*n),
            _ => Err(mismatch("uint64", self)),
        }
    }

    /// A `uint64` that must fit a key index.
    pub fn to_key_index(&self) -> Result<u32, IpcError> {
        let n = self.to_uint64()?;
        u32::try_from(n).map_err(|_| IpcError::decode(format!("key index {} out of range", n)))
    }

    pub fn to_str(&self) -> Result<&str, IpcError> {
        match &self.kind {
            Some(Kind::String(s)) => Ok(s),
            _ => Err(mismatch("string", self)),
        }
    }

    pub fn to_bytes(&self) -> Result<&[u8], IpcError> {
        match &self.kind {
            Some(Kind::Bytes(b)) => Ok(b),
            _ => Err(mismatch("bytes", self)),
        }
    }

    pub fn to_address(&self) -> Result<Address, IpcError> {
        match &self.kind {
            Some(Kind::Address(b)) => address_from_wire(b),
            _ => Err(mismatch("address", self)),
        }
    }

    pub fn to_location(&self) -> Result<Location, IpcError> {
        match &self.kind {
            Some(Kind::Location(l)) => location_from_wire(l),
            _ => Err(mismatch("location", self)),
        }
    }

    pub fn to_ufix64(&self) -> Result<UFix64, IpcError> {
        match &self.kind {
            Some(Kind::Ufix64(raw)) => Ok(UFix64::from_raw(*raw)),
            _ => Err(mismatch("ufix64", self)),
        }
    }

    pub fn to_public_key(&self) -> Result<PublicKey, IpcError> {
        match &self.kind {
            Some(Kind::PublicKey(key)) => public_key_from_wire(key),
            _ => Err(mismatch("public_key", self)),
        }
    }

    pub fn to_account_key(&self) -> Result<AccountKey, IpcError> {
        match &self.kind {
            Some(Kind::AccountKey(key)) => account_key_from_wire(key),
            _ => Err(mismatch("account_key", self)),
        }
    }

    pub fn to_string_list(&self) -> Result<Vec<String>, IpcError> {
        match &self.kind {
            Some(Kind::StringList(list)) => Ok(list.values.clone()),
            _ => Err(mismatch("string_list", self)),
        }
    }

    pub fn to_resolved_locations(&self) -> Result<Vec<ResolvedLocation>, IpcError> {
        let Some(Kind::ResolvedLocations(list)) = &self.kind else {
            return Err(mismatch("resolved_locations", self));
        };
        list.values
            .iter()
            .map(|resolved| {
                let location = resolved
                    .location
                    .as_ref()
                    .ok_or_else(|| IpcError::decode("resolved location without a location"))?;
                Ok(ResolvedLocation {
                    location: location_from_wire(location)?,
                    identifiers: resolved.identifiers.clone(),
                })
            })
            .collect()
    }

    pub fn to_event(&self) -> Result<AccountEvent, IpcError> {
        let Some(Kind::Event(event)) = &self.kind else {
            return Err(mismatch("event", self));
        };
        let kind = AccountEventKind::from_type_id(&event.type_id)
            .ok_or_else(|| IpcError::decode(format!("unknown event type {:?}", event.type_id)))?;
        let payload = event
            .payload
            .iter()
            .map(Self::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        AccountEvent::new(kind, payload).map_err(|e| IpcError::decode(e.to_string()))
    }

    /// Decode an interpreted value.
    ///
    /// Public keys arrive from the host side of the boundary, so they are
    /// wrapped without re-validation.
    pub fn to_value(&self) -> Result<Value, IpcError> {
        Ok(match &self.kind {
            Some(Kind::Void(_)) => Value::Void,
            Some(Kind::Bool(b)) => Value::Bool(*b),
            Some(Kind::Uint64(n)) => Value::UInt64(*n),
            Some(Kind::Int64(n)) => Value::Int(*n),
            Some(Kind::String(s)) => Value::String(s.clone()),
            Some(Kind::Bytes(b)) => Value::bytes(b),
            Some(Kind::Address(b)) => Value::Address(address_from_wire(b)?),
            Some(Kind::Ufix64(raw)) => Value::UFix64(UFix64::from_raw(*raw)),
            Some(Kind::List(list)) => Value::Array(
                list.values
                    .iter()
                    .map(Self::to_value)
                    .collect::<Result<_, _>>()?,
            ),
            Some(Kind::PublicKey(key)) => {
                Value::PublicKey(PublicKeyValue::assume_validated(public_key_from_wire(key)?))
            }
            Some(Kind::AccountKey(key)) => {
                let key = account_key_from_wire(key)?;
                let public_key = PublicKeyValue::assume_validated(key.public_key.clone());
                Value::AccountKey(quarry_primitives::AccountKeyValue::new(key, public_key))
            }
            _ => return Err(mismatch("an interpreted value", self)),
        })
    }
}

// ── Host faults ──

impl WireFault {
    pub fn from_host_error(err: &HostError) -> Self {
        let (message, address) = match err {
            HostError::Io(m)
            | HostError::Inconsistent(m)
            | HostError::InvalidPublicKey(m)
            | HostError::Unimplemented(m)
            | HostError::Transport(m)
            | HostError::Internal(m) => (m.clone(), Vec::new()),
            HostError::AccountNotFound(address) => (String::new(), address.as_bytes().to_vec()),
        };
        Self {
            kind: err.kind().to_string(),
            message,
            address,
        }
    }

    /// Rebuild the host error. Unknown kinds become `Internal`.
    pub fn to_host_error(&self) -> HostError {
        let message = self.message.clone();
        match self.kind.as_str() {
            "io" => HostError::Io(message),
            "inconsistent" => HostError::Inconsistent(message),
            "invalid_public_key" => HostError::InvalidPublicKey(message),
            "account_not_found" => match address_from_wire(&self.address) {
                Ok(address) => HostError::AccountNotFound(address),
                Err(e) => HostError::Transport(e.to_string()),
            },
            "unimplemented" => HostError::Unimplemented(message),
            "transport" => HostError::Transport(message),
            "internal" => HostError::Internal(message),
            other => HostError::Internal(format!("{}: {}", other, message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    // ── Framing ──

    #[test]
    fn test_frame_layout() {
        let request = Request::new(
            Method::GetCode,
            vec![WireValue::location(&Location::String("x".into()))],
        );
        let mut out = Vec::new();
        write_message(&mut out, &request, 1024).unwrap();

        let body_len = request.encoded_len();
        assert_eq!(&out[..4], &(body_len as u32).to_be_bytes());
        assert_eq!(out.len(), 4 + body_len);

        let decoded: Request = read_message(&mut Cursor::new(out), 1024).unwrap().unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_clean_eof_is_none() {
        let decoded: Option<Request> = read_message(&mut Cursor::new(Vec::new()), 1024).unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn test_truncated_frames_fail() {
        let err = read_message::<Request, _>(&mut Cursor::new(vec![0, 0]), 1024).unwrap_err();
        assert!(matches!(err, IpcError::Io(_)));
        let err =
            read_message::<Request, _>(&mut Cursor::new(vec![0, 0, 0, 9, 1]), 1024).unwrap_err();
        assert!(matches!(err, IpcError::Io(_)));
    }

    #[test]
    fn test_oversized_frames_rejected() {
        let big = Request::new(Method::ProgramLog, vec![WireValue::string("x".repeat(100))]);
        let mut out = Vec::new();
        assert!(matches!(
            write_message(&mut out, &big, 10),
            Err(IpcError::FrameTooLarge { limit: 10, .. })
        ));
        assert!(out.is_empty());

        let header = 1000u32.to_be_bytes().to_vec();
        let err = read_message::<Request, _>(&mut Cursor::new(header), 100).unwrap_err();
        assert!(matches!(err, IpcError::FrameTooLarge { size: 1000, limit: 100 }));
    }

    // ── Values ──

    #[test]
    fn test_address_must_be_eight_bytes() {
        let bad = wire(Kind::Address(vec![1, 2, 3]));
        assert!(matches!(bad.to_address(), Err(IpcError::Decode(_))));
        let good = WireValue::address(Address::from_u64(7));
        assert_eq!(good.to_address().unwrap(), Address::from_u64(7));
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = WireValue::boolean(true).to_str().unwrap_err();
        assert_eq!(err.to_string(), "decode error: expected string, got bool");
    }

    #[test]
    fn test_event_payload_encoding() {
        let event = AccountEvent::key_removed(Address::from_u64(1), Value::Int(3));
        let encoded = WireValue::event(&event).unwrap();
        assert_eq!(encoded.to_event().unwrap(), event);

        let contract = AccountEvent::contract(
            AccountEventKind::AccountContractAdded,
            Address::from_u64(1),
            &[0xab; 32],
            "Foo",
        )
        .unwrap();
        let Some(Kind::Event(wire_event)) = WireValue::event(&contract).unwrap().kind else {
            panic!("expected an event");
        };
        assert_eq!(wire_event.type_id, "flow.AccountContractAdded");
        assert_eq!(wire_event.payload[1], WireValue::bytes(vec![0xab; 32]));
    }

    #[test]
    fn test_unsupported_values() {
        assert!(matches!(
            WireValue::value(&Value::nil()),
            Err(IpcError::Unsupported("Optional"))
        ));
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let key = wire(Kind::PublicKey(WirePublicKey {
            public_key: vec![1; 64],
            sign_algo: 0,
        }));
        assert!(key.to_public_key().is_err());
    }

    // ── Faults ──

    #[test]
    fn test_host_fault_mapping() {
        let errors = [
            HostError::Io("disk".into()),
            HostError::Inconsistent("x".into()),
            HostError::InvalidPublicKey("short".into()),
            HostError::AccountNotFound(Address::from_u64(0x42)),
            HostError::Unimplemented("GetCode".into()),
            HostError::Transport("reset".into()),
            HostError::Internal("boom".into()),
        ];
        for err in errors {
            assert_eq!(WireFault::from_host_error(&err).to_host_error(), err);
        }
        let unknown = WireFault {
            kind: "quota".into(),
            message: "over".into(),
            address: Vec::new(),
        };
        assert_eq!(unknown.to_host_error(), HostError::Internal("quota: over".into()));
    }
}
