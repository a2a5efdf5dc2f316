//! Token-permit replay.
//!
//! An EIP-2612 permit whose `deadline` carries the commitment hash is accepted as an attestation
//! by the token owner. Type hash and domain separator are read from the token itself, since
//! both differ per token.

use alloc::vec::Vec;

use alloy_primitives::{keccak256, Address, B256, U256};
use attested_execution_types::{PermitCall, PermitToken};

use super::{recover_either, Convention};
use crate::errors::{StructuralError, VerifyError};

/// ABI tuple form of a [`DecodedPermitSig`]:
/// `(address token, uint256 amount, uint64 chainId, uint256 nonce, bool execute,
///   uint256 commitment, uint8 v, bytes32 r, bytes32 s)`.
pub type PermitTuple = (Address, U256, u64, U256, bool, U256, u8, B256, B256);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedPermitSig {
    pub token: Address,
    pub amount: U256,
    pub chain_id: u64,
    pub nonce: U256,
    /// Forward the permit to the token once verified.
    pub execute: bool,
    /// Commitment hash, signed as the permit deadline.
    pub commitment: U256,
    pub v: u8,
    pub r: B256,
    pub s: B256,
}

impl From<PermitTuple> for DecodedPermitSig {
    fn from(
        (token, amount, chain_id, nonce, execute, commitment, v, r, s): PermitTuple,
    ) -> Self {
        Self {
            token,
            amount,
            chain_id,
            nonce,
            execute,
            commitment,
            v,
            r,
            s,
        }
    }
}

impl DecodedPermitSig {
    /// `{27, 28}` and `{0, 1}` both map to `{0, 1}`.
    pub fn recovery_id(&self) -> Result<u8, VerifyError> {
        match self.v {
            0 | 1 => Ok(self.v),
            27 | 28 => Ok(self.v - 27),
            other => Err(StructuralError::InvalidRecoveryId(other as u64).into()),
        }
    }
}

/// `keccak256(typehash || owner || spender || value || nonce || deadline)`
pub fn permit_struct_hash(
    typehash: B256,
    owner: Address,
    spender: Address,
    value: U256,
    nonce: U256,
    deadline: U256,
) -> B256 {
    let mut buf = Vec::with_capacity(32 * 6);
    buf.extend_from_slice(typehash.as_slice());
    let mut owner_padded = [0u8; 32];
    owner_padded[12..32].copy_from_slice(owner.as_slice());
    buf.extend_from_slice(&owner_padded);
    let mut spender_padded = [0u8; 32];
    spender_padded[12..32].copy_from_slice(spender.as_slice());
    buf.extend_from_slice(&spender_padded);
    buf.extend_from_slice(&value.to_be_bytes::<32>());
    buf.extend_from_slice(&nonce.to_be_bytes::<32>());
    buf.extend_from_slice(&deadline.to_be_bytes::<32>());
    keccak256(buf)
}

/// `keccak256("\x19\x01" || domainSeparator || structHash)`
pub fn typed_data_digest(domain_separator: B256, struct_hash: B256) -> B256 {
    let mut buf = Vec::with_capacity(2 + 32 + 32);
    buf.extend_from_slice(b"\x19\x01");
    buf.extend_from_slice(domain_separator.as_slice());
    buf.extend_from_slice(struct_hash.as_slice());
    keccak256(buf)
}

/// Verify `permit` as signed by `owner` for `spender` on chain `here`, committing to
/// `expected_commitment`. When `execute` is set the permit is forwarded to `token` after every
/// check has passed.
///
/// `token` must be the token named by `permit.token`, else `TokenMismatch`.
pub fn validate_permit<T: PermitToken>(
    permit: &DecodedPermitSig,
    owner: Address,
    spender: Address,
    expected_commitment: B256,
    here: u64,
    token: &mut T,
) -> Result<Convention, VerifyError> {
    if token.address() != permit.token {
        return Err(VerifyError::TokenMismatch {
            expected: permit.token,
            found: token.address(),
        });
    }
    if permit.chain_id != here {
        return Err(VerifyError::ChainMismatch {
            expected: here,
            found: permit.chain_id,
        });
    }
    let found = B256::from(permit.commitment.to_be_bytes::<32>());
    if found != expected_commitment {
        return Err(VerifyError::CommitmentMismatch {
            expected: expected_commitment,
            found,
        });
    }
    let recovery_id = permit.recovery_id()?;

    let typehash = token.permit_typehash()?;
    let domain_separator = token.domain_separator()?;
    let struct_hash = permit_struct_hash(
        typehash,
        owner,
        spender,
        permit.amount,
        permit.nonce,
        permit.commitment,
    );
    let digest = typed_data_digest(domain_separator, struct_hash);

    let convention = recover_either(
        (Convention::TypedData, digest),
        (Convention::RawHash, struct_hash),
        recovery_id,
        &permit.r,
        &permit.s,
        owner,
    )
    .ok_or(VerifyError::Signature { expected: owner })?;

    if permit.execute {
        token.permit(&PermitCall {
            owner,
            spender,
            value: permit.amount,
            deadline: permit.commitment,
            v: recovery_id + 27,
            r: permit.r,
            s: permit.s,
        })?;
    }
    Ok(convention)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{address_of, sign_digest, test_key, MockToken};
    use attested_execution_types::TokenError;
    use k256::ecdsa::SigningKey;

    const HERE: u64 = 42161;

    fn spender() -> Address {
        Address::repeat_byte(0x5e)
    }

    fn commitment() -> B256 {
        keccak256("permit commitment")
    }

    fn token() -> MockToken {
        MockToken::new(Address::repeat_byte(0x70), keccak256("domain"))
    }

    fn signed_permit(key: &SigningKey, token: &MockToken, typed: bool, execute: bool) -> DecodedPermitSig {
        let deadline = U256::from_be_bytes(commitment().0);
        let amount = U256::from(1_000_000u64);
        let nonce = U256::from(4u64);
        let struct_hash =
            permit_struct_hash(token.typehash, address_of(key), spender(), amount, nonce, deadline);
        let digest = if typed {
            typed_data_digest(token.domain_separator, struct_hash)
        } else {
            struct_hash
        };
        let (recid, r, s) = sign_digest(key, &digest);
        DecodedPermitSig::from((token.address, amount, HERE, nonce, execute, deadline, recid + 27, r, s))
    }

    #[test]
    fn typed_data_permit_is_accepted_and_forwarded() {
        let key = test_key(0x21);
        let mut token = token();
        let permit = signed_permit(&key, &token, true, true);
        assert_eq!(
            validate_permit(&permit, address_of(&key), spender(), commitment(), HERE, &mut token),
            Ok(Convention::TypedData)
        );
        assert_eq!(token.permits.len(), 1);
        let forwarded = token.permits[0];
        assert_eq!(forwarded.owner, address_of(&key));
        assert_eq!(forwarded.spender, spender());
        assert_eq!(forwarded.deadline, permit.commitment);
        assert!(forwarded.v == 27 || forwarded.v == 28);
    }

    #[test]
    fn zero_one_recovery_ids_are_forwarded_as_27_28() {
        let key = test_key(0x22);
        let mut token = token();
        let mut permit = signed_permit(&key, &token, true, true);
        permit.v -= 27;
        assert!(validate_permit(&permit, address_of(&key), spender(), commitment(), HERE, &mut token).is_ok());
        assert_eq!(token.permits[0].v, permit.v + 27);
    }

    #[test]
    fn raw_struct_hash_fallback() {
        let key = test_key(0x23);
        let mut token = token();
        let permit = signed_permit(&key, &token, false, false);
        assert_eq!(
            validate_permit(&permit, address_of(&key), spender(), commitment(), HERE, &mut token),
            Ok(Convention::RawHash)
        );
        assert!(token.permits.is_empty());
    }

    #[test]
    fn chain_and_commitment_checks() {
        let key = test_key(0x24);
        let mut token = token();
        let permit = signed_permit(&key, &token, true, true);
        assert_eq!(
            validate_permit(&permit, address_of(&key), spender(), commitment(), 1, &mut token),
            Err(VerifyError::ChainMismatch {
                expected: 1,
                found: HERE
            })
        );
        let other = keccak256("other");
        assert_eq!(
            validate_permit(&permit, address_of(&key), spender(), other, HERE, &mut token),
            Err(VerifyError::CommitmentMismatch {
                expected: other,
                found: commitment()
            })
        );
        assert!(token.permits.is_empty());
    }

    #[test]
    fn wrong_owner_or_spender_is_a_signature_error() {
        let key = test_key(0x25);
        let stranger = address_of(&test_key(0x26));
        let mut token = token();
        let permit = signed_permit(&key, &token, true, true);
        assert_eq!(
            validate_permit(&permit, stranger, spender(), commitment(), HERE, &mut token),
            Err(VerifyError::Signature { expected: stranger })
        );
        assert_eq!(
            validate_permit(&permit, address_of(&key), stranger, commitment(), HERE, &mut token),
            Err(VerifyError::Signature {
                expected: address_of(&key)
            })
        );
        assert!(token.permits.is_empty());
    }

    #[test]
    fn domain_separator_is_read_from_the_token() {
        let key = test_key(0x27);
        let signed_for = token();
        let permit = signed_permit(&key, &signed_for, true, false);
        let mut other_domain = MockToken::new(signed_for.address, keccak256("another domain"));
        assert_eq!(
            validate_permit(&permit, address_of(&key), spender(), commitment(), HERE, &mut other_domain),
            Err(VerifyError::Signature {
                expected: address_of(&key)
            })
        );
    }

    #[test]
    fn token_other_than_the_named_one_is_refused() {
        let key = test_key(0x29);
        let named = token();
        let permit = signed_permit(&key, &named, true, true);
        let mut impostor = MockToken::new(Address::repeat_byte(0x99), named.domain_separator);
        assert_eq!(
            validate_permit(&permit, address_of(&key), spender(), commitment(), HERE, &mut impostor),
            Err(VerifyError::TokenMismatch {
                expected: named.address,
                found: Address::repeat_byte(0x99),
            })
        );
        assert!(impostor.permits.is_empty());
    }

    #[test]
    fn invalid_v_and_token_failures() {
        let key = test_key(0x28);
        let mut token = token();
        let mut permit = signed_permit(&key, &token, true, true);
        permit.v = 29;
        assert_eq!(
            validate_permit(&permit, address_of(&key), spender(), commitment(), HERE, &mut token),
            Err(VerifyError::Structural(StructuralError::InvalidRecoveryId(29)))
        );

        let permit = signed_permit(&key, &token, true, true);
        token.fail_reads = true;
        assert_eq!(
            validate_permit(&permit, address_of(&key), spender(), commitment(), HERE, &mut token),
            Err(VerifyError::Token(TokenError::CallFailed {
                token: token.address
            }))
        );
        assert!(token.permits.is_empty());
    }
}
