//! Raw-transaction replay.
//!
//! A signed legacy or EIP-1559 transaction whose calldata ends in the commitment hash is
//! accepted as an attestation by its signer. The signing payload is rebuilt from the raw field
//! spans, so the hash is exactly what the signer saw.

use alloc::vec::Vec;

use alloy_primitives::{eip191_hash_message, keccak256, Address, B256};

use super::{recover_either, Convention};
use crate::{
    errors::{RlpError, Shape, StructuralError, VerifyError},
    rlp::{encode_header, encode_u64, RlpItem},
    utils::bytes::WORD,
};

const FEE_MARKET_TAG: u8 = 0x02;
const LIST_PREFIX_MIN: u8 = 0xc0;

const LEGACY_FIELDS: usize = 9;
const LEGACY_UNSIGNED_FIELDS: usize = 6;
const FEE_MARKET_FIELDS: usize = 12;
const FEE_MARKET_UNSIGNED_FIELDS: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxType {
    /// `rlp([nonce, gasPrice, gas, to, value, data, v, r, s])`
    Legacy,
    /// `0x02 || rlp([chainId, nonce, maxPriorityFee, maxFee, gas, to, value, data, accessList, yParity, r, s])`
    FeeMarket,
}

/// Parsed signed transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxData {
    pub tx_type: TxType,
    /// `v` as encoded (legacy) or the y-parity (fee market).
    pub v: u64,
    /// Normalized to 0 or 1.
    pub recovery_id: u8,
    pub r: B256,
    pub s: B256,
    /// EIP-155 chain id for protected legacy transactions, the chain id field otherwise.
    pub chain_id: Option<u64>,
    /// Hash of the payload the signer signed.
    pub unsigned_hash: B256,
    /// Last 32 bytes of calldata, when it has that many.
    pub commitment: Option<B256>,
    pub data_len: usize,
}

impl TxData {
    pub fn parse(raw: &[u8]) -> Result<Self, VerifyError> {
        let tag = *raw.first().ok_or(RlpError::Empty)?;
        if tag >= LIST_PREFIX_MIN {
            Self::parse_legacy(raw)
        } else if tag == FEE_MARKET_TAG {
            Self::parse_fee_market(&raw[1..])
        } else {
            Err(VerifyError::UnsupportedShape(Shape::TxType(tag)))
        }
    }

    fn parse_legacy(raw: &[u8]) -> Result<Self, VerifyError> {
        let list = RlpItem::exact(raw)?;
        let fields = fields_of(&list, LEGACY_FIELDS)?;

        let data = fields[5].as_bytes()?;
        let v = fields[6].as_u64()?;
        let (recovery_id, chain_id) = match v {
            27 | 28 => ((v - 27) as u8, None),
            v if v >= 35 => (((v - 35) % 2) as u8, Some((v - 35) / 2)),
            other => return Err(StructuralError::InvalidRecoveryId(other).into()),
        };

        let body = unsigned_span(&list, &fields, LEGACY_UNSIGNED_FIELDS);
        let mut tail = Vec::new();
        if let Some(chain_id) = chain_id {
            encode_u64(chain_id, &mut tail);
            tail.extend_from_slice(&[0x80, 0x80]);
        }
        let mut preimage = Vec::with_capacity(9 + body.len() + tail.len());
        encode_header(body.len() + tail.len(), true, &mut preimage);
        preimage.extend_from_slice(body);
        preimage.extend_from_slice(&tail);

        Ok(Self {
            tx_type: TxType::Legacy,
            v,
            recovery_id,
            r: word_of(&fields[7])?,
            s: word_of(&fields[8])?,
            chain_id,
            unsigned_hash: keccak256(&preimage),
            commitment: commitment_of(data),
            data_len: data.len(),
        })
    }

    fn parse_fee_market(payload: &[u8]) -> Result<Self, VerifyError> {
        let list = RlpItem::exact(payload)?;
        let fields = fields_of(&list, FEE_MARKET_FIELDS)?;

        let chain_id = fields[0].as_u64()?;
        let data = fields[7].as_bytes()?;
        let parity = fields[9].as_u64()?;
        if parity > 1 {
            return Err(StructuralError::InvalidRecoveryId(parity).into());
        }

        let body = unsigned_span(&list, &fields, FEE_MARKET_UNSIGNED_FIELDS);
        let mut preimage = Vec::with_capacity(10 + body.len());
        preimage.push(FEE_MARKET_TAG);
        encode_header(body.len(), true, &mut preimage);
        preimage.extend_from_slice(body);

        Ok(Self {
            tx_type: TxType::FeeMarket,
            v: parity,
            recovery_id: parity as u8,
            r: word_of(&fields[10])?,
            s: word_of(&fields[11])?,
            chain_id: Some(chain_id),
            unsigned_hash: keccak256(&preimage),
            commitment: commitment_of(data),
            data_len: data.len(),
        })
    }

    /// Personal-message digest of the unsigned hash first, the raw hash second.
    pub fn signed_by(&self, signer: Address) -> Option<Convention> {
        recover_either(
            (
                Convention::PersonalMessage,
                eip191_hash_message(self.unsigned_hash),
            ),
            (Convention::RawHash, self.unsigned_hash),
            self.recovery_id,
            &self.r,
            &self.s,
            signer,
        )
    }
}

/// Accept `raw` if its calldata ends in `expected_commitment` and `expected_signer` signed it.
pub fn validate_raw_transaction(
    raw: &[u8],
    expected_commitment: B256,
    expected_signer: Address,
) -> Result<Convention, VerifyError> {
    let tx = TxData::parse(raw)?;
    let found = tx.commitment.ok_or(VerifyError::Length {
        required: WORD,
        actual: tx.data_len,
    })?;
    if found != expected_commitment {
        return Err(VerifyError::CommitmentMismatch {
            expected: expected_commitment,
            found,
        });
    }
    tx.signed_by(expected_signer)
        .ok_or(VerifyError::Signature {
            expected: expected_signer,
        })
}

fn fields_of<'a>(list: &RlpItem<'a>, expected: usize) -> Result<Vec<RlpItem<'a>>, VerifyError> {
    let fields = list.to_list()?;
    if fields.len() != expected {
        return Err(StructuralError::FieldCount {
            expected,
            actual: fields.len(),
        }
        .into());
    }
    Ok(fields)
}

/// Raw bytes of the first `count` fields, as laid out in the list payload.
fn unsigned_span<'a>(list: &RlpItem<'a>, fields: &[RlpItem<'a>], count: usize) -> &'a [u8] {
    let len: usize = fields[..count].iter().map(RlpItem::len).sum();
    &list.payload()[..len]
}

fn word_of(item: &RlpItem<'_>) -> Result<B256, VerifyError> {
    let value = item.as_u256()?;
    Ok(B256::from(value.to_be_bytes::<32>()))
}

fn commitment_of(data: &[u8]) -> Option<B256> {
    let start = data.len().checked_sub(WORD)?;
    Some(B256::from_slice(&data[start..]))
}
