//! Fixtures shared by the unit tests: deterministic keys, an independent RLP writer, signed
//! transaction builders and an in-memory permit token.

use alloc::vec::Vec;

use alloy_primitives::{keccak256, Address, B256, U256};
use attested_execution_types::{PermitCall, PermitToken, TokenError};
use k256::ecdsa::SigningKey;

use crate::utils::crypto::public_key_address;

pub fn test_key(seed: u8) -> SigningKey {
    SigningKey::from_slice(&[seed; 32]).expect("seed is a valid scalar")
}

pub fn address_of(key: &SigningKey) -> Address {
    public_key_address(key.verifying_key())
}

/// `(recovery_id, r, s)` over a 32-byte prehash.
pub fn sign_digest(key: &SigningKey, digest: &B256) -> (u8, B256, B256) {
    let (signature, recid) = key
        .sign_prehash_recoverable(digest.as_slice())
        .expect("prehash signing");
    let bytes = signature.to_bytes();
    (
        recid.to_byte(),
        B256::from_slice(&bytes[..32]),
        B256::from_slice(&bytes[32..]),
    )
}

pub mod rlp {
    use alloc::vec::Vec;

    use alloy_primitives::U256;

    fn header(len: usize, offset: u8) -> Vec<u8> {
        if len < 56 {
            return vec![offset + len as u8];
        }
        let be = (len as u64).to_be_bytes();
        let trimmed: Vec<u8> = be.iter().copied().skip_while(|b| *b == 0).collect();
        let mut out = vec![offset + 55 + trimmed.len() as u8];
        out.extend(trimmed);
        out
    }

    pub fn bytes(data: &[u8]) -> Vec<u8> {
        if data.len() == 1 && data[0] < 0x80 {
            return data.to_vec();
        }
        let mut out = header(data.len(), 0x80);
        out.extend_from_slice(data);
        out
    }

    pub fn u256(value: U256) -> Vec<u8> {
        let be = value.to_be_bytes::<32>();
        let trimmed: Vec<u8> = be.iter().copied().skip_while(|b| *b == 0).collect();
        bytes(&trimmed)
    }

    pub fn uint(value: u64) -> Vec<u8> {
        u256(U256::from(value))
    }

    pub fn list(items: &[Vec<u8>]) -> Vec<u8> {
        let payload: Vec<u8> = items.concat();
        let mut out = header(payload.len(), 0xc0);
        out.extend(payload);
        out
    }
}

/// Fields shared by both transaction layouts.
#[derive(Clone, Debug)]
pub struct TxFields {
    pub nonce: u64,
    pub gas: u64,
    pub to: Address,
    pub value: U256,
    pub data: Vec<u8>,
}

impl TxFields {
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            nonce: 3,
            gas: 90_000,
            to: Address::repeat_byte(0x35),
            value: U256::from(10u64).pow(U256::from(15u64)),
            data,
        }
    }
}

fn b256_int(word: &B256) -> Vec<u8> {
    rlp::u256(U256::from_be_bytes(word.0))
}

/// Legacy transaction, EIP-155 protected when `chain_id` is set.
pub fn signed_legacy_tx(key: &SigningKey, fields: &TxFields, chain_id: Option<u64>) -> Vec<u8> {
    let mut items = vec![
        rlp::uint(fields.nonce),
        rlp::uint(20_000_000_000),
        rlp::uint(fields.gas),
        rlp::bytes(fields.to.as_slice()),
        rlp::u256(fields.value),
        rlp::bytes(&fields.data),
    ];
    let mut unsigned = items.clone();
    if let Some(chain_id) = chain_id {
        unsigned.extend([rlp::uint(chain_id), rlp::bytes(&[]), rlp::bytes(&[])]);
    }
    let hash = keccak256(rlp::list(&unsigned));
    let (recid, r, s) = sign_digest(key, &hash);
    let v = match chain_id {
        Some(chain_id) => recid as u64 + 35 + 2 * chain_id,
        None => recid as u64 + 27,
    };
    items.extend([rlp::uint(v), b256_int(&r), b256_int(&s)]);
    rlp::list(&items)
}

/// EIP-1559 transaction (`0x02 || rlp([...])`).
pub fn signed_fee_market_tx(key: &SigningKey, fields: &TxFields, chain_id: u64) -> Vec<u8> {
    let mut items = vec![
        rlp::uint(chain_id),
        rlp::uint(fields.nonce),
        rlp::uint(1_000_000_000),
        rlp::uint(30_000_000_000),
        rlp::uint(fields.gas),
        rlp::bytes(fields.to.as_slice()),
        rlp::u256(fields.value),
        rlp::bytes(&fields.data),
        rlp::list(&[]),
    ];
    let mut preimage = vec![0x02];
    preimage.extend(rlp::list(&items));
    let (recid, r, s) = sign_digest(key, &keccak256(&preimage));
    items.extend([rlp::uint(recid as u64), b256_int(&r), b256_int(&s)]);
    let mut raw = vec![0x02];
    raw.extend(rlp::list(&items));
    raw
}

/// In-memory EIP-2612 token.
#[derive(Debug)]
pub struct MockToken {
    pub address: Address,
    pub typehash: B256,
    pub domain_separator: B256,
    pub permits: Vec<PermitCall>,
    pub fail_reads: bool,
}

impl MockToken {
    pub fn new(address: Address, domain_separator: B256) -> Self {
        Self {
            address,
            typehash: keccak256(
                "Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)",
            ),
            domain_separator,
            permits: Vec::new(),
            fail_reads: false,
        }
    }
}

impl PermitToken for MockToken {
    fn address(&self) -> Address {
        self.address
    }

    fn permit_typehash(&self) -> Result<B256, TokenError> {
        if self.fail_reads {
            return Err(TokenError::CallFailed {
                token: self.address,
            });
        }
        Ok(self.typehash)
    }

    fn domain_separator(&self) -> Result<B256, TokenError> {
        if self.fail_reads {
            return Err(TokenError::CallFailed {
                token: self.address,
            });
        }
        Ok(self.domain_separator)
    }

    fn permit(&mut self, call: &PermitCall) -> Result<(), TokenError> {
        self.permits.push(*call);
        Ok(())
    }
}
