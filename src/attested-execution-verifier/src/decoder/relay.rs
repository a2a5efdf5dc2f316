//! Relay calls (best-effort fallback chain).
//!
//! Relay bundles mix plain native transfers, token transfers carrying the request id as a
//! trailing word, approvals and calls through a forwarding wrapper. Each strategy recognizes its
//! shape by exact length and/or selector; the first one that decodes wins.

use alloc::vec::Vec;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolCall};
use attested_execution_types::DecodedRelayData;

use super::CallRequest;
use crate::{
    constants::{APPROVE_SELECTOR, TRANSFER_SELECTOR},
    errors::{Shape, StructuralError, VerifyError},
    utils::bytes::{call_len, read_address, read_b256, read_u256, selector_of, SELECTOR_LEN, WORD},
};

sol! {
    interface IRelayForwarder {
        function forward(bytes payload) external payable;
    }
}

/// Trusted relay infrastructure.
///
/// A transfer whose attributed receiver is `receiver` is paying the relay, which acts on
/// behalf of `solver`; the record is attributed to the solver instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RelayAddresses {
    pub solver: Address,
    pub receiver: Address,
}

impl RelayAddresses {
    pub const fn new(solver: Address, receiver: Address) -> Self {
        Self { solver, receiver }
    }

    fn attribute(&self, receiver: Address) -> Address {
        if receiver == self.receiver {
            self.solver
        } else {
            receiver
        }
    }
}

/// Recognized relay call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayCall {
    /// 32-byte calldata holding the request id, value attached natively.
    Native(DecodedRelayData),
    /// `transfer(receiver, amount)` with the request id appended as a third word.
    TokenTransfer(DecodedRelayData),
    /// `forward(bytes)` wrapping a 32-byte request id.
    Forward(DecodedRelayData),
    /// `approve(spender, amount)`: recognized, moves nothing.
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
}

impl RelayCall {
    /// Asset movement of this call; `None` for approvals.
    pub fn relay_data(&self) -> Option<DecodedRelayData> {
        match self {
            RelayCall::Native(data) | RelayCall::TokenTransfer(data) | RelayCall::Forward(data) => {
                Some(*data)
            }
            RelayCall::Approve { .. } => None,
        }
    }
}

type Strategy = fn(&CallRequest<'_>, &RelayAddresses) -> Result<Option<RelayCall>, VerifyError>;

const STRATEGIES: [Strategy; 4] = [native_transfer, token_transfer, token_approve, forwarded];

/// Try every strategy in order.
///
/// `Ok(None)` from a strategy means the shape is not its own. A strategy that recognizes the
/// shape but fails to decode it is remembered and the chain continues; if nothing succeeds, the
/// last such error is returned, otherwise `UnsupportedShape`.
pub fn decode_relay_call(
    call: &CallRequest<'_>,
    addresses: &RelayAddresses,
) -> Result<RelayCall, VerifyError> {
    let mut last_error = None;
    for strategy in STRATEGIES {
        match strategy(call, addresses) {
            Ok(Some(decoded)) => return Ok(decoded),
            Ok(None) => {}
            Err(err) => last_error = Some(err),
        }
    }
    Err(last_error.unwrap_or_else(|| VerifyError::UnsupportedShape(unsupported_shape(call.data))))
}

/// Decode a bundle and keep the asset movements, in call order.
pub fn infer_relay(
    calls: &[CallRequest<'_>],
    addresses: &RelayAddresses,
) -> Result<Vec<DecodedRelayData>, VerifyError> {
    let mut records = Vec::with_capacity(calls.len());
    for call in calls {
        if let Some(data) = decode_relay_call(call, addresses)?.relay_data() {
            records.push(data);
        }
    }
    Ok(records)
}

fn unsupported_shape(data: &[u8]) -> Shape {
    selector_of(data)
        .map(Shape::Selector)
        .unwrap_or(Shape::CallLength(data.len()))
}

fn native_transfer(
    call: &CallRequest<'_>,
    addresses: &RelayAddresses,
) -> Result<Option<RelayCall>, VerifyError> {
    if call.data.len() != WORD {
        return Ok(None);
    }
    Ok(Some(RelayCall::Native(DecodedRelayData {
        request_id: B256::from_slice(call.data),
        token: Address::ZERO,
        amount: call.value,
        receiver: addresses.attribute(call.target),
    })))
}

fn token_transfer(
    call: &CallRequest<'_>,
    addresses: &RelayAddresses,
) -> Result<Option<RelayCall>, VerifyError> {
    if call.data.len() != call_len(3) || selector_of(call.data) != Some(TRANSFER_SELECTOR) {
        return Ok(None);
    }
    let mut i = SELECTOR_LEN;
    let receiver = read_address(call.data, &mut i)?;
    let amount = read_u256(call.data, &mut i)?;
    let request_id = read_b256(call.data, &mut i)?;
    Ok(Some(RelayCall::TokenTransfer(DecodedRelayData {
        request_id,
        token: call.target,
        amount,
        receiver: addresses.attribute(receiver),
    })))
}

fn token_approve(
    call: &CallRequest<'_>,
    _addresses: &RelayAddresses,
) -> Result<Option<RelayCall>, VerifyError> {
    if call.data.len() != call_len(2) || selector_of(call.data) != Some(APPROVE_SELECTOR) {
        return Ok(None);
    }
    let mut i = SELECTOR_LEN;
    let spender = read_address(call.data, &mut i)?;
    let amount = read_u256(call.data, &mut i)?;
    Ok(Some(RelayCall::Approve {
        token: call.target,
        spender,
        amount,
    }))
}

fn forwarded(
    call: &CallRequest<'_>,
    addresses: &RelayAddresses,
) -> Result<Option<RelayCall>, VerifyError> {
    let selector = IRelayForwarder::forwardCall::SELECTOR;
    if selector_of(call.data) != Some(selector) {
        return Ok(None);
    }
    let payload = IRelayForwarder::forwardCall::abi_decode_raw(&call.data[SELECTOR_LEN..], true)
        .map_err(|_| StructuralError::Abi(Shape::Selector(selector)))?
        .payload;
    if payload.len() != WORD {
        return Err(StructuralError::InnerLength {
            expected: WORD,
            actual: payload.len(),
        }
        .into());
    }
    Ok(Some(RelayCall::Forward(DecodedRelayData {
        request_id: B256::from_slice(&payload),
        token: Address::ZERO,
        amount: call.value,
        receiver: addresses.attribute(call.target),
    })))
}
