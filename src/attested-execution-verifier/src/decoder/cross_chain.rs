//! Burn-and-mint cross-chain transfers.
//!
//! Exactly one entrypoint is understood: `depositForBurnWithHook`. The destination is given as a
//! messaging domain and resolved to a chain id through [`DomainLookup`].

use alloc::vec::Vec;

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{sol, SolCall};
use attested_execution_types::{DomainLookup, ExecutionInfo};

use crate::{
    errors::{Shape, StructuralError, ValidityError, VerifyError},
    utils::bytes::{call_len, require_len, selector_of, SELECTOR_LEN},
};

sol! {
    interface ITokenMessenger {
        function depositForBurnWithHook(
            uint256 amount,
            uint32 destinationDomain,
            bytes32 mintRecipient,
            address burnToken,
            bytes32 destinationCaller,
            uint256 maxFee,
            uint32 minFinalityThreshold,
            bytes hookData
        ) external;
    }
}

use ITokenMessenger::depositForBurnWithHookCall;

/// Selector plus eight head words.
pub const DEPOSIT_FOR_BURN_MIN_LEN: usize = call_len(8);

/// Validated `depositForBurnWithHook` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedBurn {
    pub amount: U256,
    pub destination_domain: u32,
    pub destination_chain_id: u64,
    pub mint_recipient: B256,
    pub burn_token: Address,
    pub destination_caller: B256,
    pub max_fee: U256,
    pub min_finality_threshold: u32,
    pub hook_data: Bytes,
}

impl DecodedBurn {
    pub fn execution_info(&self, here: u64) -> ExecutionInfo {
        ExecutionInfo::new(self.burn_token, self.amount, here, self.destination_chain_id)
    }
}

pub fn decode_cross_chain_transfer(
    data: &[u8],
    domains: &impl DomainLookup,
) -> Result<DecodedBurn, VerifyError> {
    let selector = selector_of(data).ok_or(VerifyError::Length {
        required: DEPOSIT_FOR_BURN_MIN_LEN,
        actual: data.len(),
    })?;
    if selector != depositForBurnWithHookCall::SELECTOR {
        return Err(VerifyError::UnsupportedShape(Shape::Selector(selector)));
    }
    require_len(data, DEPOSIT_FOR_BURN_MIN_LEN)?;

    let call = depositForBurnWithHookCall::abi_decode_raw(&data[SELECTOR_LEN..], true)
        .map_err(|_| StructuralError::Abi(Shape::Selector(selector)))?;

    if call.amount.is_zero() {
        return Err(ValidityError::ZeroAmount.into());
    }
    if call.burnToken.is_zero() {
        return Err(ValidityError::ZeroToken.into());
    }
    if call.mintRecipient.is_zero() {
        return Err(ValidityError::ZeroMintRecipient.into());
    }
    let destination_chain_id = domains
        .chain_id(call.destinationDomain)
        .ok_or(VerifyError::UnsupportedShape(Shape::Domain(call.destinationDomain)))?;

    Ok(DecodedBurn {
        amount: call.amount,
        destination_domain: call.destinationDomain,
        destination_chain_id,
        mint_recipient: call.mintRecipient,
        burn_token: call.burnToken,
        destination_caller: call.destinationCaller,
        max_fee: call.maxFee,
        min_finality_threshold: call.minFinalityThreshold,
        hook_data: call.hookData,
    })
}

/// Decode a batch of burns and promote each to an [`ExecutionInfo`].
pub fn infer_cross_chain_transfer(
    calls: &[&[u8]],
    here: u64,
    domains: &impl DomainLookup,
) -> Result<Vec<ExecutionInfo>, VerifyError> {
    calls
        .iter()
        .map(|data| decode_cross_chain_transfer(data, domains).map(|burn| burn.execution_info(here)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CCTP_DOMAINS;
    use alloc::vec;

    const HERE: u64 = 42161;

    fn burn_call(amount: u64, domain: u32, recipient: B256, token: Address) -> Vec<u8> {
        depositForBurnWithHookCall {
            amount: U256::from(amount),
            destinationDomain: domain,
            mintRecipient: recipient,
            burnToken: token,
            destinationCaller: B256::ZERO,
            maxFee: U256::from(500u64),
            minFinalityThreshold: 1000,
            hookData: Bytes::from(vec![0xca, 0xfe]),
        }
        .abi_encode()
    }

    fn usdc() -> Address {
        Address::repeat_byte(0xaf)
    }

    #[test]
    fn burn_to_base_promotes_to_cross_chain_record() {
        let data = burn_call(2_500_000, 6, B256::repeat_byte(0x01), usdc());
        let burn = decode_cross_chain_transfer(&data, &CCTP_DOMAINS).unwrap();
        assert_eq!(burn.destination_chain_id, 8453);
        assert_eq!(burn.hook_data, Bytes::from(vec![0xca, 0xfe]));
        assert_eq!(
            burn.execution_info(HERE),
            ExecutionInfo::new(usdc(), U256::from(2_500_000u64), HERE, 8453)
        );
    }

    #[test]
    fn other_selectors_are_unsupported() {
        let mut data = burn_call(1, 6, B256::repeat_byte(0x01), usdc());
        data[..4].copy_from_slice(&[0x6f, 0xd3, 0x50, 0x4e]);
        assert_eq!(
            decode_cross_chain_transfer(&data, &CCTP_DOMAINS),
            Err(VerifyError::UnsupportedShape(Shape::Selector([0x6f, 0xd3, 0x50, 0x4e])))
        );
    }

    #[test]
    fn one_byte_short_is_a_length_error() {
        let data = burn_call(1, 6, B256::repeat_byte(0x01), usdc());
        assert_eq!(
            decode_cross_chain_transfer(&data[..DEPOSIT_FOR_BURN_MIN_LEN - 1], &CCTP_DOMAINS),
            Err(VerifyError::Length {
                required: 260,
                actual: 259
            })
        );
        assert_eq!(
            decode_cross_chain_transfer(&[0x01, 0x02], &CCTP_DOMAINS),
            Err(VerifyError::Length {
                required: 260,
                actual: 2
            })
        );
    }

    #[test]
    fn validity_predicates() {
        let recipient = B256::repeat_byte(0x01);
        assert_eq!(
            decode_cross_chain_transfer(&burn_call(0, 6, recipient, usdc()), &CCTP_DOMAINS),
            Err(VerifyError::Validity(ValidityError::ZeroAmount))
        );
        assert_eq!(
            decode_cross_chain_transfer(&burn_call(1, 6, recipient, Address::ZERO), &CCTP_DOMAINS),
            Err(VerifyError::Validity(ValidityError::ZeroToken))
        );
        assert_eq!(
            decode_cross_chain_transfer(&burn_call(1, 6, B256::ZERO, usdc()), &CCTP_DOMAINS),
            Err(VerifyError::Validity(ValidityError::ZeroMintRecipient))
        );
    }

    #[test]
    fn unknown_domain_is_unsupported() {
        let data = burn_call(1, 99, B256::repeat_byte(0x01), usdc());
        assert_eq!(
            decode_cross_chain_transfer(&data, &CCTP_DOMAINS),
            Err(VerifyError::UnsupportedShape(Shape::Domain(99)))
        );
    }

    #[test]
    fn batch_inference_keeps_call_order() {
        let to_base = burn_call(10, 6, B256::repeat_byte(0x01), usdc());
        let to_mainnet = burn_call(20, 0, B256::repeat_byte(0x01), usdc());
        let infos = infer_cross_chain_transfer(&[&to_base, &to_mainnet], HERE, &CCTP_DOMAINS).unwrap();
        assert_eq!(infos[0].destination_chain_id, 8453);
        assert_eq!(infos[1].destination_chain_id, 1);
        assert_eq!(infos[1].amount, U256::from(20u64));
    }
}
