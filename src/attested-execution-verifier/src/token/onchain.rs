use alloc::vec::Vec;

use alloy_sol_types::{sol, SolCall};
use stylus_sdk::{
    alloy_primitives::{Address, B256},
    call::RawCall,
};

use super::{PermitCall, PermitToken, TokenError};

sol! {
    interface IERC20Permit {
        function PERMIT_TYPEHASH() external view returns (bytes32);
        function DOMAIN_SEPARATOR() external view returns (bytes32);
        function permit(
            address owner,
            address spender,
            uint256 value,
            uint256 deadline,
            uint8 v,
            bytes32 r,
            bytes32 s
        ) external;
    }
}

/// EIP-2612 token reached through raw calls. Metadata reads are `staticcall`s with a gas cap.
pub struct OnchainPermitToken {
    pub token: Address,
    pub gas_cap: u64,
}

impl OnchainPermitToken {
    pub fn new(token: Address, gas_cap: u64) -> Self {
        Self { token, gas_cap }
    }

    fn read_word(&self, data: &[u8]) -> Result<B256, TokenError> {
        let out = unsafe { RawCall::new_static().gas(self.gas_cap).call(self.token, data) }
            .map_err(|_| TokenError::CallFailed { token: self.token })?;
        // bytes32 => 1 word
        if out.len() < 32 {
            return Err(TokenError::MalformedReturn { token: self.token });
        }
        Ok(B256::from_slice(&out[..32]))
    }
}

impl PermitToken for OnchainPermitToken {
    fn address(&self) -> Address {
        self.token
    }

    fn permit_typehash(&self) -> Result<B256, TokenError> {
        self.read_word(&IERC20Permit::PERMIT_TYPEHASHCall {}.abi_encode())
    }

    fn domain_separator(&self) -> Result<B256, TokenError> {
        self.read_word(&IERC20Permit::DOMAIN_SEPARATORCall {}.abi_encode())
    }

    fn permit(&mut self, call: &PermitCall) -> Result<(), TokenError> {
        let data: Vec<u8> = IERC20Permit::permitCall {
            owner: call.owner,
            spender: call.spender,
            value: call.value,
            deadline: call.deadline,
            v: call.v,
            r: call.r,
            s: call.s,
        }
        .abi_encode();
        unsafe { RawCall::new().call(self.token, &data) }
            .map_err(|_| TokenError::CallFailed { token: self.token })?;
        Ok(())
    }
}
