//! Attested execution verifier.
//!
//! Decides whether submitted call data (or an independently signed artifact) honors a prior
//! signed attestation. Calldata is decoded into canonical execution records per integration and
//! reconciled one-to-one against the attested records; raw transactions and token permits are
//! checked for the commitment hash and the expected signer.

#![cfg_attr(not(any(test, feature = "export-abi")), no_main)]

extern crate alloc;

pub mod channels;
pub mod constants;
pub mod decoder;
pub mod errors;
pub mod reconcile;
pub mod rlp;
pub mod token;
pub mod utils;
pub mod verifier;
pub mod verify;

#[cfg(test)]
mod testing;

pub use attested_execution_types::{DecodedRelayData, ExecutionInfo};
pub use verifier::AttestationVerifier;
