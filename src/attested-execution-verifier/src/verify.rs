//! Decode-then-reconcile pipelines, one per integration.
//!
//! These are the pure entrypoints behind the contract: calldata in, verdict out. The executing
//! chain id is passed in explicitly.

use alloy_primitives::B256;
use attested_execution_types::{DomainLookup, ExecutionInfo};

use crate::{
    decoder::{
        infer_bridge_swap, infer_cross_chain_transfer, infer_relay, BridgeLayout, CallRequest,
        RelayAddresses,
    },
    errors::VerifyError,
    reconcile::{reconcile, reconcile_relay, Assignment, ReconcileProfile},
};

pub fn verify_bridge_swap(
    layout: BridgeLayout,
    calls: &[&[u8]],
    attested: &[ExecutionInfo],
    here: u64,
) -> Result<Assignment, VerifyError> {
    let inferred = infer_bridge_swap(layout, calls, here)?;
    reconcile(attested, &inferred, here, &ReconcileProfile::BRIDGE_SWAP)
}

/// Approvals in `calls` are recognized and skipped; every other call must decode.
pub fn verify_relay(
    calls: &[CallRequest<'_>],
    addresses: &RelayAddresses,
    attested: &[ExecutionInfo],
    here: u64,
    expected_request_id: Option<B256>,
) -> Result<Assignment, VerifyError> {
    let inferred = infer_relay(calls, addresses)?;
    reconcile_relay(attested, &inferred, here, expected_request_id)
}

pub fn verify_cross_chain_transfer(
    calls: &[&[u8]],
    attested: &[ExecutionInfo],
    here: u64,
    domains: &impl DomainLookup,
) -> Result<Assignment, VerifyError> {
    let inferred = infer_cross_chain_transfer(calls, here, domains)?;
    reconcile(attested, &inferred, here, &ReconcileProfile::CROSS_CHAIN_TRANSFER)
}
