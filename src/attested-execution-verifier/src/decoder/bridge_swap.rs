//! Bridge/swap facet calls (flag-driven exact match).
//!
//! The caller declares which argument layout the call uses; the selector itself is not
//! interpreted. The decoder checks the minimum head length, ABI-decodes exactly that layout and
//! then runs the layout's validity predicate. A failed predicate is an error, never a default.

use alloc::{string::String, vec, vec::Vec};

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolCall};
use attested_execution_types::ExecutionInfo;

use crate::{
    errors::{Shape, StructuralError, ValidityError, VerifyError},
    utils::bytes::{call_len, require_len, SELECTOR_LEN},
};

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct BridgeData {
        bytes32 transactionId;
        string bridge;
        string integrator;
        address referrer;
        address sendingAssetId;
        address receiver;
        uint256 minAmount;
        uint256 destinationChainId;
        bool hasSourceSwaps;
        bool hasDestinationCall;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct SwapData {
        address callTo;
        address approveTo;
        address sendingAssetId;
        address receivingAssetId;
        uint256 fromAmount;
        bytes callData;
        bool requiresDeposit;
    }

    /// Argument layouts of the facet entrypoints. Only the argument encoding matters here.
    interface IBridgeSwapLayouts {
        function bridgeWithSwaps(BridgeData bridgeData, SwapData[] swapData) external payable;
        function bridgeOnly(BridgeData bridgeData) external payable;
        function swapMultiple(
            bytes32 transactionId,
            string integrator,
            string referrer,
            address receiver,
            uint256 minAmountOut,
            SwapData[] swapData
        ) external payable;
        function swapSingle(
            bytes32 transactionId,
            string integrator,
            string referrer,
            address receiver,
            uint256 minAmountOut,
            SwapData swapData
        ) external payable;
    }
}

use IBridgeSwapLayouts::{bridgeOnlyCall, bridgeWithSwapsCall, swapMultipleCall, swapSingleCall};

/// Declared argument layout of a bridge/swap call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum BridgeLayout {
    /// `(BridgeData, SwapData[])`
    BridgeWithSwaps = 0,
    /// `(BridgeData)`
    BridgeOnly = 1,
    /// `(bytes32, string, string, address, uint256, SwapData[])`
    SwapMultiple = 2,
    /// `(bytes32, string, string, address, uint256, SwapData)`
    SwapSingle = 3,
}

impl TryFrom<u8> for BridgeLayout {
    type Error = VerifyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use BridgeLayout::*;
        let layout = match value {
            0 => BridgeWithSwaps,
            1 => BridgeOnly,
            2 => SwapMultiple,
            3 => SwapSingle,
            _ => return Err(VerifyError::UnsupportedShape(Shape::Layout(value))),
        };
        Ok(layout)
    }
}

impl BridgeLayout {
    /// Selector plus the fixed head: one word per static argument and one pointer word per
    /// dynamic argument.
    pub const fn min_len(self) -> usize {
        match self {
            BridgeLayout::BridgeWithSwaps => call_len(2),
            BridgeLayout::BridgeOnly => call_len(1),
            BridgeLayout::SwapMultiple | BridgeLayout::SwapSingle => call_len(6),
        }
    }

    fn abi_fault(self) -> VerifyError {
        StructuralError::Abi(Shape::Layout(self as u8)).into()
    }
}

/// Six-field prefix shared by the swap layouts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapPrefix {
    pub transaction_id: B256,
    pub integrator: String,
    pub referrer: String,
    pub receiver: Address,
    pub min_amount_out: U256,
}

/// Validated bridge/swap call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeSwapCall {
    Bridge {
        layout: BridgeLayout,
        bridge: BridgeData,
        /// Empty for `BridgeOnly`.
        swaps: Vec<SwapData>,
        destination_chain_id: u64,
    },
    Swap {
        layout: BridgeLayout,
        prefix: SwapPrefix,
        swaps: Vec<SwapData>,
        /// Asset delivered by the last swap.
        output_token: Address,
    },
}

impl BridgeSwapCall {
    pub fn layout(&self) -> BridgeLayout {
        match self {
            BridgeSwapCall::Bridge { layout, .. } | BridgeSwapCall::Swap { layout, .. } => *layout,
        }
    }

    pub fn swaps(&self) -> &[SwapData] {
        match self {
            BridgeSwapCall::Bridge { swaps, .. } | BridgeSwapCall::Swap { swaps, .. } => swaps,
        }
    }

    /// Inferred record for this call, executed on chain `here`.
    ///
    /// Bridges move `minAmount` of the sending asset towards the destination chain; swaps settle
    /// locally and guarantee at least `minAmountOut` of the output asset.
    pub fn execution_info(&self, here: u64) -> ExecutionInfo {
        match self {
            BridgeSwapCall::Bridge {
                bridge,
                destination_chain_id,
                ..
            } => ExecutionInfo::new(
                bridge.sendingAssetId,
                bridge.minAmount,
                here,
                *destination_chain_id,
            ),
            BridgeSwapCall::Swap {
                prefix,
                output_token,
                ..
            } => ExecutionInfo::local(*output_token, prefix.min_amount_out, here),
        }
    }
}

/// Decode `data` (selector included) under the declared `layout`.
pub fn decode_bridge_swap(layout: BridgeLayout, data: &[u8]) -> Result<BridgeSwapCall, VerifyError> {
    require_len(data, layout.min_len())?;
    let args = &data[SELECTOR_LEN..];

    match layout {
        BridgeLayout::BridgeWithSwaps => {
            let call = bridgeWithSwapsCall::abi_decode_raw(args, true)
                .map_err(|_| layout.abi_fault())?;
            let bridge = call.bridgeData;
            let swaps = call.swapData;
            let destination_chain_id = validate_bridge(&bridge)?;
            if bridge.hasSourceSwaps == swaps.is_empty() {
                return Err(ValidityError::SourceSwapsMismatch {
                    has_source_swaps: bridge.hasSourceSwaps,
                    swaps: swaps.len(),
                }
                .into());
            }
            validate_swaps(&swaps)?;
            Ok(BridgeSwapCall::Bridge {
                layout,
                bridge,
                swaps,
                destination_chain_id,
            })
        }
        BridgeLayout::BridgeOnly => {
            let bridge = bridgeOnlyCall::abi_decode_raw(args, true)
                .map_err(|_| layout.abi_fault())?
                .bridgeData;
            let destination_chain_id = validate_bridge(&bridge)?;
            if bridge.hasSourceSwaps {
                return Err(ValidityError::SourceSwapsMismatch {
                    has_source_swaps: true,
                    swaps: 0,
                }
                .into());
            }
            Ok(BridgeSwapCall::Bridge {
                layout,
                bridge,
                swaps: Vec::new(),
                destination_chain_id,
            })
        }
        BridgeLayout::SwapMultiple => {
            let call = swapMultipleCall::abi_decode_raw(args, true)
                .map_err(|_| layout.abi_fault())?;
            let prefix = SwapPrefix {
                transaction_id: call.transactionId,
                integrator: call.integrator,
                referrer: call.referrer,
                receiver: call.receiver,
                min_amount_out: call.minAmountOut,
            };
            swap_call(layout, prefix, call.swapData)
        }
        BridgeLayout::SwapSingle => {
            let call = swapSingleCall::abi_decode_raw(args, true)
                .map_err(|_| layout.abi_fault())?;
            let prefix = SwapPrefix {
                transaction_id: call.transactionId,
                integrator: call.integrator,
                referrer: call.referrer,
                receiver: call.receiver,
                min_amount_out: call.minAmountOut,
            };
            swap_call(layout, prefix, vec![call.swapData])
        }
    }
}

/// Decode every call of a batch under one layout and promote each to an [`ExecutionInfo`].
pub fn infer_bridge_swap(
    layout: BridgeLayout,
    calls: &[&[u8]],
    here: u64,
) -> Result<Vec<ExecutionInfo>, VerifyError> {
    calls
        .iter()
        .map(|data| decode_bridge_swap(layout, data).map(|call| call.execution_info(here)))
        .collect()
}

fn swap_call(
    layout: BridgeLayout,
    prefix: SwapPrefix,
    swaps: Vec<SwapData>,
) -> Result<BridgeSwapCall, VerifyError> {
    if prefix.receiver.is_zero() {
        return Err(ValidityError::ZeroReceiver.into());
    }
    if prefix.min_amount_out.is_zero() {
        return Err(ValidityError::ZeroAmount.into());
    }
    validate_swaps(&swaps)?;
    let output_token = swaps
        .last()
        .map(|swap| swap.receivingAssetId)
        .ok_or(ValidityError::NoSwaps)?;
    Ok(BridgeSwapCall::Swap {
        layout,
        prefix,
        swaps,
        output_token,
    })
}

/// Bridge record predicate; returns the destination chain id.
fn validate_bridge(bridge: &BridgeData) -> Result<u64, VerifyError> {
    if bridge.transactionId.is_zero() {
        return Err(ValidityError::ZeroTransactionId.into());
    }
    if bridge.bridge.is_empty() {
        return Err(ValidityError::EmptyBridgeName.into());
    }
    if bridge.receiver.is_zero() {
        return Err(ValidityError::ZeroReceiver.into());
    }
    if bridge.minAmount.is_zero() {
        return Err(ValidityError::ZeroAmount.into());
    }
    if bridge.destinationChainId.is_zero() {
        return Err(ValidityError::ZeroDestinationChain.into());
    }
    u64::try_from(bridge.destinationChainId)
        .map_err(|_| StructuralError::ValueOverflow(bridge.destinationChainId).into())
}

fn swap_is_valid(swap: &SwapData) -> bool {
    !swap.callTo.is_zero() || !swap.approveTo.is_zero() || !swap.fromAmount.is_zero()
}

fn validate_swaps(swaps: &[SwapData]) -> Result<(), ValidityError> {
    match swaps.iter().position(|swap| !swap_is_valid(swap)) {
        Some(index) => Err(ValidityError::EmptySwap { index }),
        None => Ok(()),
    }
}
