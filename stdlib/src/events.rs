//! Event emission.

use quarry_hostapi::EventEmitter;
use quarry_primitives::{crypto::code_hash, AccountEvent, AccountEventKind, Address};
use tracing::debug;

use crate::fault::{FaultResult, InternalError};

/// Hand `event` to the host. A failure is a host fault.
pub fn emit<H: EventEmitter + ?Sized>(host: &H, event: AccountEvent) -> FaultResult<()> {
    debug!(event = %event.kind(), address = ?event.address(), "emitting account event");
    host.emit_event(&event)?;
    Ok(())
}

/// Emit one of the contract events for `code` deployed as `name`.
pub fn emit_contract_event<H: EventEmitter + ?Sized>(
    host: &H,
    kind: AccountEventKind,
    address: Address,
    name: &str,
    code: &[u8],
) -> FaultResult<()> {
    let hash = code_hash(code);
    let event = AccountEvent::contract(kind, address, &hash, name)
        .ok_or(InternalError::Unreachable("contract event of a non-contract kind"))?;
    emit(host, event)
}
