use alloy_primitives::{Address, B256, U256};

/// Errors while talking to a permit token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Used by off-chain mocks or partially implemented tokens.
    NotImplemented,
    /// The underlying call reverted or could not be made.
    CallFailed { token: Address },
    /// Return data was malformed or could not be decoded.
    MalformedReturn { token: Address },
}

/// Arguments of an EIP-2612 `permit` call, in ABI order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PermitCall {
    pub owner: Address,
    pub spender: Address,
    pub value: U256,
    pub deadline: U256,
    pub v: u8,
    pub r: B256,
    pub s: B256,
}

/// Live view of an EIP-2612 token.
///
/// The type hash and domain separator differ per token (name, version, custom typehashes), so
/// they are always read from the token itself rather than reconstructed locally.
pub trait PermitToken {
    fn address(&self) -> Address;

    /// `PERMIT_TYPEHASH()`
    fn permit_typehash(&self) -> Result<B256, TokenError> {
        Err(TokenError::NotImplemented)
    }

    /// `DOMAIN_SEPARATOR()`
    fn domain_separator(&self) -> Result<B256, TokenError> {
        Err(TokenError::NotImplemented)
    }

    /// `permit(owner, spender, value, deadline, v, r, s)`; the only mutating call.
    fn permit(&mut self, _call: &PermitCall) -> Result<(), TokenError> {
        Err(TokenError::NotImplemented)
    }
}
