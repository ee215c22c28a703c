//! Wire protocol messages.
//!
//! Every host call is one [`Request`] answered by exactly one
//! [`Response`]. The response distinguishes four outcomes: a value, an
//! explicit absence, a host fault, and "method not implemented".
//!
//! Messages are plain prost derives; there is no `.proto` build step.

// ── Envelope ──

/// Host method identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Method {
    Unspecified = 0,
    ResolveLocation = 1,
    GetCode = 2,
    ProgramLog = 3,
    CreateAccount = 4,
    EmitEvent = 5,
    GetAccountBalance = 6,
    GetAccountAvailableBalance = 7,
    CommitStorage = 8,
    GetStorageUsed = 9,
    GetStorageCapacity = 10,
    AddEncodedAccountKey = 11,
    RevokeEncodedAccountKey = 12,
    ValidatePublicKey = 13,
    AddAccountKey = 14,
    GetAccountKey = 15,
    RevokeAccountKey = 16,
    GetAccountContractNames = 17,
    GetAccountContractCode = 18,
    UpdateAccountContractCode = 19,
    RemoveAccountContractCode = 20,
    RecordContractRemoval = 21,
}

impl Method {
    /// Protocol name of the method.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unspecified => "Unspecified",
            Self::ResolveLocation => "ResolveLocation",
            Self::GetCode => "GetCode",
            Self::ProgramLog => "ProgramLog",
            Self::CreateAccount => "CreateAccount",
            Self::EmitEvent => "EmitEvent",
            Self::GetAccountBalance => "GetAccountBalance",
            Self::GetAccountAvailableBalance => "GetAccountAvailableBalance",
            Self::CommitStorage => "CommitStorage",
            Self::GetStorageUsed => "GetStorageUsed",
            Self::GetStorageCapacity => "GetStorageCapacity",
            Self::AddEncodedAccountKey => "AddEncodedAccountKey",
            Self::RevokeEncodedAccountKey => "RevokeEncodedAccountKey",
            Self::ValidatePublicKey => "ValidatePublicKey",
            Self::AddAccountKey => "AddAccountKey",
            Self::GetAccountKey => "GetAccountKey",
            Self::RevokeAccountKey => "RevokeAccountKey",
            Self::GetAccountContractNames => "GetAccountContractNames",
            Self::GetAccountContractCode => "GetAccountContractCode",
            Self::UpdateAccountContractCode => "UpdateAccountContractCode",
            Self::RemoveAccountContractCode => "RemoveAccountContractCode",
            Self::RecordContractRemoval => "RecordContractRemoval",
        }
    }
}

/// One host call.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Request {
    #[prost(enumeration = "Method", tag = "1")]
    pub method: i32,
    /// Arguments in declaration order.
    #[prost(message, repeated, tag = "2")]
    pub parameters: Vec<WireValue>,
}

impl Request {
    pub fn new(method: Method, parameters: Vec<WireValue>) -> Self {
        Self {
            method: method as i32,
            parameters,
        }
    }
}

/// The answer to one [`Request`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Response {
    #[prost(oneof = "response::Outcome", tags = "1, 2, 3, 4")]
    pub outcome: Option<response::Outcome>,
}

pub mod response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Outcome {
        #[prost(message, tag = "1")]
        Value(super::WireValue),
        #[prost(message, tag = "2")]
        Absent(super::Absent),
        #[prost(message, tag = "3")]
        HostFault(super::WireFault),
        #[prost(message, tag = "4")]
        Unimplemented(super::Unimplemented),
    }
}

impl Response {
    pub fn value(value: WireValue) -> Self {
        Self {
            outcome: Some(response::Outcome::Value(value)),
        }
    }

    pub fn absent() -> Self {
        Self {
            outcome: Some(response::Outcome::Absent(Absent {})),
        }
    }

    pub fn host_fault(fault: WireFault) -> Self {
        Self {
            outcome: Some(response::Outcome::HostFault(fault)),
        }
    }

    pub fn unimplemented(method: impl Into<String>) -> Self {
        Self {
            outcome: Some(response::Outcome::Unimplemented(Unimplemented {
                method: method.into(),
            })),
        }
    }
}

/// The host has nothing for this request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Absent {}

/// The host failed.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireFault {
    /// `HostError::kind` of the failure.
    #[prost(string, tag = "1")]
    pub kind: String,
    #[prost(string, tag = "2")]
    pub message: String,
    /// Set for `account_not_found`.
    #[prost(bytes = "vec", tag = "3")]
    pub address: Vec<u8>,
}

/// The far end has no implementation of the requested method.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Unimplemented {
    #[prost(string, tag = "1")]
    pub method: String,
}

// ── Values ──

/// A single parameter or result.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireValue {
    #[prost(
        oneof = "wire_value::Kind",
        tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15"
    )]
    pub kind: Option<wire_value::Kind>,
}

pub mod wire_value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        #[prost(message, tag = "1")]
        Void(super::Absent),
        #[prost(bool, tag = "2")]
        Bool(bool),
        #[prost(uint64, tag = "3")]
        Uint64(u64),
        #[prost(sint64, tag = "4")]
        Int64(i64),
        #[prost(string, tag = "5")]
        String(String),
        #[prost(bytes = "vec", tag = "6")]
        Bytes(Vec<u8>),
        /// Exactly 8 bytes.
        #[prost(bytes = "vec", tag = "7")]
        Address(Vec<u8>),
        #[prost(message, tag = "8")]
        Location(super::WireLocation),
        /// Raw fixed-point value.
        #[prost(uint64, tag = "9")]
        Ufix64(u64),
        #[prost(message, tag = "10")]
        List(super::WireList),
        #[prost(message, tag = "11")]
        PublicKey(super::WirePublicKey),
        #[prost(message, tag = "12")]
        AccountKey(super::WireAccountKey),
        #[prost(message, tag = "13")]
        StringList(super::StringList),
        #[prost(message, tag = "14")]
        ResolvedLocations(super::ResolvedLocationList),
        #[prost(message, tag = "15")]
        Event(super::WireEvent),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireList {
    #[prost(message, repeated, tag = "1")]
    pub values: Vec<WireValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringList {
    #[prost(string, repeated, tag = "1")]
    pub values: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireLocation {
    #[prost(oneof = "wire_location::Kind", tags = "1, 2, 3, 4, 5")]
    pub kind: Option<wire_location::Kind>,
}

pub mod wire_location {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        #[prost(message, tag = "1")]
        Address(super::AddressLocation),
        #[prost(string, tag = "2")]
        String(String),
        #[prost(string, tag = "3")]
        Identifier(String),
        #[prost(bytes = "vec", tag = "4")]
        Transaction(Vec<u8>),
        #[prost(bytes = "vec", tag = "5")]
        Script(Vec<u8>),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AddressLocation {
    #[prost(bytes = "vec", tag = "1")]
    pub address: Vec<u8>,
    #[prost(string, tag = "2")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireResolvedLocation {
    #[prost(message, optional, tag = "1")]
    pub location: Option<WireLocation>,
    #[prost(string, repeated, tag = "2")]
    pub identifiers: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResolvedLocationList {
    #[prost(message, repeated, tag = "1")]
    pub values: Vec<WireResolvedLocation>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WirePublicKey {
    #[prost(bytes = "vec", tag = "1")]
    pub public_key: Vec<u8>,
    #[prost(uint32, tag = "2")]
    pub sign_algo: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireAccountKey {
    #[prost(uint32, tag = "1")]
    pub key_index: u32,
    #[prost(message, optional, tag = "2")]
    pub public_key: Option<WirePublicKey>,
    #[prost(uint32, tag = "3")]
    pub hash_algo: u32,
    #[prost(uint64, tag = "4")]
    pub weight: u64,
    #[prost(bool, tag = "5")]
    pub is_revoked: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireEvent {
    /// Qualified event type, e.g. `flow.AccountCreated`.
    #[prost(string, tag = "1")]
    pub type_id: String,
    #[prost(message, repeated, tag = "2")]
    pub payload: Vec<WireValue>,
}
