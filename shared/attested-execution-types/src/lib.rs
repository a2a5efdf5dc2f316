//! Shared types for execution records, permit tokens and domain lookup.
//!
//! Used by the Stylus verifier and by off-chain tooling that has to produce byte-identical
//! records, so everything here is `no_std` + `alloc`.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod domains;
pub mod execution;
pub mod token;

pub use domains::{DomainLookup, StaticDomains};
pub use execution::{AttestedTuple, DecodedRelayData, ExecutionInfo};
pub use token::{PermitCall, PermitToken, TokenError};
