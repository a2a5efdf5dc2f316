//! Signature-based attestation channels.
//!
//! Both channels check that an independently signed artifact (a raw transaction or a token
//! permit) commits to the expected hash and was signed by the expected party.

pub mod permit;
pub mod raw_tx;

use alloy_primitives::{Address, B256};

use crate::utils::crypto::recovers_to;

pub use permit::{validate_permit, DecodedPermitSig, PermitTuple};
pub use raw_tx::{validate_raw_transaction, TxData, TxType};

/// Digest a signature was accepted under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Convention {
    /// EIP-191 `"\x19Ethereum Signed Message:\n32" || hash`.
    PersonalMessage,
    /// The hash itself.
    RawHash,
    /// EIP-712 `"\x19\x01" || domainSeparator || structHash`.
    TypedData,
}

/// Try `primary`, then `fallback`. Returns the convention that recovered `expected`.
pub(crate) fn recover_either(
    primary: (Convention, B256),
    fallback: (Convention, B256),
    recovery_id: u8,
    r: &B256,
    s: &B256,
    expected: Address,
) -> Option<Convention> {
    if recovers_to(&primary.1, recovery_id, r, s, expected) {
        return Some(primary.0);
    }
    if recovers_to(&fallback.1, recovery_id, r, s, expected) {
        return Some(fallback.0);
    }
    None
}
