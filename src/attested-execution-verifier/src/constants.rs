//! Fixed identifiers and well-known tables.

use alloy_primitives::{address, Address};
use attested_execution_types::StaticDomains;

// ERC-20 transfer(address,uint256)
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];
// ERC-20 approve(address,uint256)
pub const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

/// Gas forwarded to each token metadata read.
pub const TOKEN_READ_GAS: u64 = 50_000;

/// `ecrecover` precompile.
pub const ECRECOVER: Address = address!("0000000000000000000000000000000000000001");

/// Gas forwarded to the `ecrecover` precompile.
pub const ECRECOVER_GAS: u64 = 50_000;

/// CCTP messaging domains of the chains the verifier is deployed next to.
pub const CCTP_DOMAINS: StaticDomains = StaticDomains(&[
    (0, 1),      // Ethereum
    (1, 43114),  // Avalanche
    (2, 10),     // OP Mainnet
    (3, 42161),  // Arbitrum One
    (6, 8453),   // Base
    (7, 137),    // Polygon PoS
]);
