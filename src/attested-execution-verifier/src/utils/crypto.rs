//! secp256k1 signer recovery.
//!
//! On-chain the `ecrecover` precompile does the work. Native builds (tests, off-chain tooling)
//! recover with `k256` under the precompile's acceptance rules: r and s in `[1, n)`, recovery
//! id 0 or 1, and high-s signatures (normalised here, with the recovery id flipped to match).

use alloy_primitives::{Address, B256};

#[cfg(target_arch = "wasm32")]
use stylus_sdk::call::RawCall;

#[cfg(target_arch = "wasm32")]
use crate::constants::{ECRECOVER, ECRECOVER_GAS};

#[cfg(not(target_arch = "wasm32"))]
use alloy_primitives::keccak256;
#[cfg(not(target_arch = "wasm32"))]
use k256::{
    ecdsa::{RecoveryId, Signature, VerifyingKey},
    elliptic_curve::sec1::ToEncodedPoint,
};

/// `digest || v || r || s` as the precompile reads it, with `v` in `{27, 28}`.
pub fn ecrecover_input(digest: &B256, recovery_id: u8, r: &B256, s: &B256) -> Option<[u8; 128]> {
    if recovery_id > 1 {
        return None;
    }
    let mut input = [0u8; 128];
    input[0..32].copy_from_slice(digest.as_slice());
    // v as 32-byte big-endian word.
    input[63] = recovery_id + 27;
    input[64..96].copy_from_slice(r.as_slice());
    input[96..128].copy_from_slice(s.as_slice());
    Some(input)
}

/// Address that produced `(recovery_id, r, s)` over `digest`, if any.
#[cfg(target_arch = "wasm32")]
pub fn recover_signer(digest: &B256, recovery_id: u8, r: &B256, s: &B256) -> Option<Address> {
    let input = ecrecover_input(digest, recovery_id, r, s)?;
    let out = unsafe { RawCall::new_static().gas(ECRECOVER_GAS).call(ECRECOVER, &input) }.ok()?;
    // Empty output means the signature did not recover.
    if out.len() < 32 {
        return None;
    }
    let recovered = Address::from_slice(&out[12..32]);
    (recovered != Address::ZERO).then_some(recovered)
}

/// Address that produced `(recovery_id, r, s)` over `digest`, if any.
#[cfg(not(target_arch = "wasm32"))]
pub fn recover_signer(digest: &B256, recovery_id: u8, r: &B256, s: &B256) -> Option<Address> {
    if recovery_id > 1 {
        return None;
    }
    let mut rs = [0u8; 64];
    rs[..32].copy_from_slice(r.as_slice());
    rs[32..].copy_from_slice(s.as_slice());

    let mut signature = Signature::from_slice(&rs).ok()?;
    let mut recid = RecoveryId::from_byte(recovery_id)?;
    if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        recid = RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced());
    }

    let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recid).ok()?;
    Some(public_key_address(&key))
}

/// True iff `(recovery_id, r, s)` over `digest` recovers to `expected`.
pub fn recovers_to(
    digest: &B256,
    recovery_id: u8,
    r: &B256,
    s: &B256,
    expected: Address,
) -> bool {
    recover_signer(digest, recovery_id, r, s) == Some(expected)
}

/// Ethereum address = last 20 bytes of keccak256(uncompressed pubkey without the 0x04 tag).
#[cfg(not(target_arch = "wasm32"))]
pub fn public_key_address(key: &VerifyingKey) -> Address {
    let point = key.as_affine().to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}
