//! Bounds-checked ABI word reads.
//!
//! Calldata is addressed as `selector || word_0 || word_1 || ...`. Every reader advances a
//! cursor and fails with `VerifyError::Length` instead of reading past the buffer.

use alloy_primitives::{Address, B256, U256};

use crate::errors::{StructuralError, VerifyError};

pub const SELECTOR_LEN: usize = 4;
pub const WORD: usize = 32;

/// Minimum length of a call with `words` head words after the selector.
pub const fn call_len(words: usize) -> usize {
    SELECTOR_LEN + words * WORD
}

pub fn require_len(bytes: &[u8], required: usize) -> Result<(), VerifyError> {
    if bytes.len() < required {
        return Err(VerifyError::Length {
            required,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Leading 4-byte identifier, if the buffer has one.
pub fn selector_of(bytes: &[u8]) -> Option<[u8; 4]> {
    let mut sel = [0u8; 4];
    sel.copy_from_slice(bytes.get(..SELECTOR_LEN)?);
    Some(sel)
}

pub fn read_selector(bytes: &[u8], i: &mut usize) -> Result<[u8; 4], VerifyError> {
    require_len(bytes, *i + SELECTOR_LEN)?;
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&bytes[*i..*i + SELECTOR_LEN]);
    *i += SELECTOR_LEN;
    Ok(sel)
}

pub fn read_word<'a>(bytes: &'a [u8], i: &mut usize) -> Result<&'a [u8], VerifyError> {
    require_len(bytes, *i + WORD)?;
    let word = &bytes[*i..*i + WORD];
    *i += WORD;
    Ok(word)
}

pub fn read_u256(bytes: &[u8], i: &mut usize) -> Result<U256, VerifyError> {
    read_word(bytes, i).map(U256::from_be_slice)
}

pub fn read_b256(bytes: &[u8], i: &mut usize) -> Result<B256, VerifyError> {
    read_word(bytes, i).map(B256::from_slice)
}

/// Address word; the 12 padding bytes must be zero.
pub fn read_address(bytes: &[u8], i: &mut usize) -> Result<Address, VerifyError> {
    let offset = *i;
    let word = read_word(bytes, i)?;
    if word[..12].iter().any(|b| *b != 0) {
        return Err(StructuralError::DirtyAddress { offset }.into());
    }
    Ok(Address::from_slice(&word[12..]))
}
