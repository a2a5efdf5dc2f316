use alloy_primitives::{Address, B256, U256};

/// ABI tuple form of an [`ExecutionInfo`]:
/// `(address originToken, uint256 amount, uint64 originChainId, uint64 destinationChainId)`.
pub type AttestedTuple = (Address, U256, u64, u64);

/// Canonical asset movement.
///
/// Attested instances come from a signed attestation and are trusted. Inferred instances are
/// decoded from call data and stay untrusted until reconciled against an attested one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ExecutionInfo {
    pub origin_token: Address,
    pub amount: U256,
    pub origin_chain_id: u64,
    pub destination_chain_id: u64,
}

impl ExecutionInfo {
    pub const fn new(
        origin_token: Address,
        amount: U256,
        origin_chain_id: u64,
        destination_chain_id: u64,
    ) -> Self {
        Self {
            origin_token,
            amount,
            origin_chain_id,
            destination_chain_id,
        }
    }

    /// Same-chain movement (swaps settle on the chain that executes them).
    pub const fn local(origin_token: Address, amount: U256, chain_id: u64) -> Self {
        Self::new(origin_token, amount, chain_id, chain_id)
    }
}

impl From<AttestedTuple> for ExecutionInfo {
    fn from((origin_token, amount, origin_chain_id, destination_chain_id): AttestedTuple) -> Self {
        Self::new(origin_token, amount, origin_chain_id, destination_chain_id)
    }
}

impl From<ExecutionInfo> for AttestedTuple {
    fn from(info: ExecutionInfo) -> Self {
        (
            info.origin_token,
            info.amount,
            info.origin_chain_id,
            info.destination_chain_id,
        )
    }
}

/// Relay-specific record decoded from a single relay call.
///
/// `token == Address::ZERO` denotes the native asset. `receiver` is the attributed receiver,
/// i.e. already rewritten to the solver when the call was routed through relay infrastructure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecodedRelayData {
    pub request_id: B256,
    pub token: Address,
    pub amount: U256,
    pub receiver: Address,
}

impl DecodedRelayData {
    pub fn is_native(&self) -> bool {
        self.token.is_zero()
    }
}
