//! Per-integration calldata interpreters.
//!
//! Each decoder turns raw call bytes into a structured record of the asset movement the call
//! performs, without executing it. Decoding is pure: identical bytes (and, where used, the same
//! local chain id and configuration) always produce identical records.

pub mod bridge_swap;
pub mod cross_chain;
pub mod relay;

use alloy_primitives::{Address, U256};

pub use bridge_swap::{decode_bridge_swap, infer_bridge_swap, BridgeLayout, BridgeSwapCall};
pub use cross_chain::{decode_cross_chain_transfer, infer_cross_chain_transfer, DecodedBurn};
pub use relay::{decode_relay_call, infer_relay, RelayAddresses, RelayCall};

/// One call of a batch: target, attached native value and calldata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallRequest<'a> {
    pub target: Address,
    pub value: U256,
    pub data: &'a [u8],
}

impl<'a> CallRequest<'a> {
    pub fn new(target: Address, value: U256, data: &'a [u8]) -> Self {
        Self {
            target,
            value,
            data,
        }
    }
}
