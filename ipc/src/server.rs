//! Host server: the far end of the transport proxy.
//!
//! Reads requests from a stream, dispatches each to an in-process
//! [`RuntimeHost`] and writes back exactly one response, until the peer
//! closes the stream. Connections are served one after another, so a
//! non-`Sync` host such as `MemHost` can back the server.

use std::io::{self, Read, Write};

use quarry_hostapi::{HostError, RuntimeHost};
use quarry_primitives::HashAlgorithm;
use tracing::{debug, trace, warn};

use crate::codec::{read_message, write_message};
use crate::config::ServerConfig;
use crate::error::IpcError;
use crate::messages::{Method, Request, Response, WireFault, WireValue};

/// Why a request could not be answered with a value.
enum Failure {
    /// The request itself is malformed.
    Request(IpcError),
    Host(HostError),
}

impl From<IpcError> for Failure {
    fn from(err: IpcError) -> Self {
        Self::Request(err)
    }
}

impl From<HostError> for Failure {
    fn from(err: HostError) -> Self {
        Self::Host(err)
    }
}

/// Positional request parameters.
struct Parameters<'a> {
    method: Method,
    values: &'a [WireValue],
}

impl<'a> Parameters<'a> {
    fn new(method: Method, values: &'a [WireValue], expected: usize) -> Result<Self, IpcError> {
        if values.len() != expected {
            return Err(IpcError::decode(format!(
                "{} takes {} parameters, got {}",
                method.name(),
                expected,
                values.len()
            )));
        }
        Ok(Self { method, values })
    }

    fn get(&self, index: usize) -> Result<&'a WireValue, IpcError> {
        self.values.get(index).ok_or_else(|| {
            IpcError::decode(format!("{} parameter {} missing", self.method.name(), index))
        })
    }
}

/// Sequential request server over an in-process host.
pub struct HostServer<H> {
    host: H,
    config: ServerConfig,
}

impl<H: RuntimeHost> HostServer<H> {
    pub fn new(host: H, config: ServerConfig) -> Self {
        Self { host, config }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Serve one connection until the peer closes it.
    ///
    /// A frame whose body does not decode is answered with a host fault;
    /// the whole frame has been consumed, so the connection stays in step.
    pub fn serve<S: Read + Write>(&self, stream: &mut S) -> Result<(), IpcError> {
        let limit = self.config.max_message_size;
        loop {
            let response = match read_message::<Request, _>(stream, limit) {
                Ok(Some(request)) => self.handle(&request),
                Ok(None) => return Ok(()),
                Err(IpcError::Decode(msg)) => {
                    warn!(error = %msg, "undecodable request");
                    Response::host_fault(WireFault::from_host_error(&HostError::Internal(
                        format!("malformed request: {}", msg),
                    )))
                }
                Err(err) => return Err(err),
            };
            write_message(stream, &response, limit)?;
        }
    }

    /// Serve connections one at a time from a listener's `incoming()`.
    ///
    /// A failing connection is logged and dropped; accept errors end the
    /// loop.
    pub fn serve_listener<S, I>(&self, incoming: I) -> Result<(), IpcError>
    where
        S: Read + Write,
        I: IntoIterator<Item = io::Result<S>>,
    {
        for stream in incoming {
            let mut stream = stream?;
            debug!("host connection accepted");
            if let Err(err) = self.serve(&mut stream) {
                warn!(error = %err, "host connection failed");
            }
        }
        Ok(())
    }

    /// Answer one request.
    pub fn handle(&self, request: &Request) -> Response {
        let method = match Method::try_from(request.method) {
            Ok(Method::Unspecified) | Err(_) => {
                warn!(method = request.method, "unknown method requested");
                return Response::unimplemented(format!("method {}", request.method));
            }
            Ok(method) => method,
        };
        trace!(method = method.name(), "serving request");

        match self.dispatch(method, &request.parameters) {
            Ok(Some(value)) => Response::value(value),
            Ok(None) => Response::absent(),
            Err(Failure::Host(HostError::Unimplemented(name))) => Response::unimplemented(name),
            Err(Failure::Host(err)) => {
                debug!(method = method.name(), error = %err, "host fault");
                Response::host_fault(WireFault::from_host_error(&err))
            }
            Err(Failure::Request(err)) => {
                warn!(method = method.name(), error = %err, "malformed request");
                Response::host_fault(WireFault::from_host_error(&HostError::Internal(format!(
                    "malformed {} request: {}",
                    method.name(),
                    err
                ))))
            }
        }
    }

    fn dispatch(&self, method: Method, values: &[WireValue]) -> Result<Option<WireValue>, Failure> {
        let host = &self.host;
        let value = match method {
            Method::Unspecified => return Err(HostError::unimplemented("Unspecified").into()),
            Method::ResolveLocation => {
                let p = Parameters::new(method, values, 2)?;
                let identifiers = p.get(0)?.to_string_list()?;
                let location = p.get(1)?.to_location()?;
                WireValue::resolved_locations(&host.resolve_location(&identifiers, &location)?)
            }
            Method::GetCode => {
                let p = Parameters::new(method, values, 1)?;
                WireValue::bytes(host.get_code(&p.get(0)?.to_location()?)?)
            }
            Method::ProgramLog => {
                let p = Parameters::new(method, values, 1)?;
                host.program_log(p.get(0)?.to_str()?)?;
                WireValue::void()
            }
            Method::CreateAccount => {
                let p = Parameters::new(method, values, 1)?;
                WireValue::address(host.create_account(p.get(0)?.to_address()?)?)
            }
            Method::EmitEvent => {
                let p = Parameters::new(method, values, 1)?;
                host.emit_event(&p.get(0)?.to_event()?)?;
                WireValue::void()
            }
            Method::GetAccountBalance => {
                let p = Parameters::new(method, values, 1)?;
                WireValue::ufix64(host.get_account_balance(p.get(0)?.to_address()?)?)
            }
            Method::GetAccountAvailableBalance => {
                let p = Parameters::new(method, values, 1)?;
                WireValue::ufix64(host.get_account_available_balance(p.get(0)?.to_address()?)?)
            }
            Method::CommitStorage => {
                let p = Parameters::new(method, values, 1)?;
                host.commit_storage(p.get(0)?.to_bool()?)?;
                WireValue::void()
            }
            Method::GetStorageUsed => {
                let p = Parameters::new(method, values, 1)?;
                WireValue::uint64(host.get_storage_used(p.get(0)?.to_address()?)?)
            }
            Method::GetStorageCapacity => {
                let p = Parameters::new(method, values, 1)?;
                WireValue::uint64(host.get_storage_capacity(p.get(0)?.to_address()?)?)
            }
            Method::AddEncodedAccountKey => {
                let p = Parameters::new(method, values, 2)?;
                host.add_encoded_account_key(p.get(0)?.to_address()?, p.get(1)?.to_bytes()?)?;
                WireValue::void()
            }
            Method::RevokeEncodedAccountKey => {
                let p = Parameters::new(method, values, 2)?;
                let revoked = host.revoke_encoded_account_key(
                    p.get(0)?.to_address()?,
                    p.get(1)?.to_key_index()?,
                )?;
                WireValue::bytes(revoked)
            }
            Method::ValidatePublicKey => {
                let p = Parameters::new(method, values, 1)?;
                host.validate_public_key(&p.get(0)?.to_public_key()?)?;
                WireValue::void()
            }
            Method::AddAccountKey => {
                let p = Parameters::new(method, values, 4)?;
                let raw = p.get(2)?.to_uint64()?;
                let hash_algo = u8::try_from(raw)
                    .ok()
                    .and_then(|raw| HashAlgorithm::from_raw(raw).ok())
                    .ok_or_else(|| IpcError::decode(format!("unknown hash algorithm {}", raw)))?;
                let added = host.add_account_key(
                    p.get(0)?.to_address()?,
                    &p.get(1)?.to_public_key()?,
                    hash_algo,
                    p.get(3)?.to_ufix64()?,
                )?;
                WireValue::account_key(&added)
            }
            Method::GetAccountKey => {
                let p = Parameters::new(method, values, 2)?;
                match host.get_account_key(p.get(0)?.to_address()?, p.get(1)?.to_key_index()?)? {
                    Some(key) => WireValue::account_key(&key),
                    None => return Ok(None),
                }
            }
            Method::RevokeAccountKey => {
                let p = Parameters::new(method, values, 2)?;
                match host.revoke_account_key(p.get(0)?.to_address()?, p.get(1)?.to_key_index()?)? {
                    Some(key) => WireValue::account_key(&key),
                    None => return Ok(None),
                }
            }
            Method::GetAccountContractNames => {
                let p = Parameters::new(method, values, 1)?;
                WireValue::string_list(host.get_account_contract_names(p.get(0)?.to_address()?)?)
            }
            Method::GetAccountContractCode => {
                let p = Parameters::new(method, values, 2)?;
                let code =
                    host.get_account_contract_code(p.get(0)?.to_address()?, p.get(1)?.to_str()?)?;
                match code {
                    Some(code) => WireValue::bytes(code),
                    None => return Ok(None),
                }
            }
            Method::UpdateAccountContractCode => {
                let p = Parameters::new(method, values, 3)?;
                host.update_account_contract_code(
                    p.get(0)?.to_address()?,
                    p.get(1)?.to_str()?,
                    p.get(2)?.to_bytes()?,
                )?;
                WireValue::void()
            }
            Method::RemoveAccountContractCode => {
                let p = Parameters::new(method, values, 2)?;
                host.remove_account_contract_code(p.get(0)?.to_address()?, p.get(1)?.to_str()?)?;
                WireValue::void()
            }
            Method::RecordContractRemoval => {
                let p = Parameters::new(method, values, 2)?;
                host.record_contract_removal(p.get(0)?.to_address()?, p.get(1)?.to_str()?)?;
                WireValue::void()
            }
        };
        Ok(Some(value))
    }
}
