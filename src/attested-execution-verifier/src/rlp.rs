//! Decode-only RLP reader.
//!
//! An [`RlpItem`] borrows exactly the bytes of one item (prefix + payload) out of a larger
//! buffer. Nothing is copied: list children are yielded as further views into the same buffer,
//! and leaf readers validate widths before converting.
//!
//! Prefix rules:
//! - `0x00..=0x7f`: the byte is its own single-byte string
//! - `0x80..=0xb7`: string of `prefix - 0x80` bytes
//! - `0xb8..=0xbf`: string whose length takes `prefix - 0xb7` big-endian bytes
//! - `0xc0..=0xf7`: list with a `prefix - 0xc0` byte payload
//! - `0xf8..=0xff`: list whose payload length takes `prefix - 0xf7` big-endian bytes

use alloc::vec::Vec;

use alloy_primitives::{Address, B256, U256};

use crate::errors::RlpError;

const STRING_SHORT: u8 = 0x80;
const STRING_LONG: u8 = 0xb8;
const LIST_SHORT: u8 = 0xc0;
const LIST_LONG: u8 = 0xf8;

/// Payloads of 56 bytes and up need the long (length-of-length) form.
const LONG_FORM_THRESHOLD: usize = 56;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Header {
    list: bool,
    offset: usize,
    payload_len: usize,
}

impl Header {
    fn decode(buf: &[u8]) -> Result<Self, RlpError> {
        let prefix = *buf.first().ok_or(RlpError::Empty)?;
        let header = match prefix {
            0x00..=0x7f => Header {
                list: false,
                offset: 0,
                payload_len: 1,
            },
            STRING_SHORT..=0xb7 => {
                let payload_len = (prefix - STRING_SHORT) as usize;
                if payload_len == 1 {
                    let byte = *buf.get(1).ok_or(RlpError::Truncated {
                        needed: 2,
                        available: buf.len(),
                    })?;
                    if byte < STRING_SHORT {
                        return Err(RlpError::NonCanonicalSingleByte);
                    }
                }
                Header {
                    list: false,
                    offset: 1,
                    payload_len,
                }
            }
            STRING_LONG..=0xbf => {
                let len_of_len = (prefix - 0xb7) as usize;
                Header {
                    list: false,
                    offset: 1 + len_of_len,
                    payload_len: read_long_length(buf, len_of_len)?,
                }
            }
            LIST_SHORT..=0xf7 => Header {
                list: true,
                offset: 1,
                payload_len: (prefix - LIST_SHORT) as usize,
            },
            LIST_LONG..=0xff => {
                let len_of_len = (prefix - 0xf7) as usize;
                Header {
                    list: true,
                    offset: 1 + len_of_len,
                    payload_len: read_long_length(buf, len_of_len)?,
                }
            }
        };
        Ok(header)
    }
}

fn read_long_length(buf: &[u8], len_of_len: usize) -> Result<usize, RlpError> {
    let bytes = buf.get(1..1 + len_of_len).ok_or(RlpError::Truncated {
        needed: 1 + len_of_len,
        available: buf.len(),
    })?;
    if bytes[0] == 0 {
        return Err(RlpError::NonCanonicalLength);
    }
    if len_of_len > core::mem::size_of::<usize>() {
        return Err(RlpError::LengthOverflow);
    }
    let len = bytes
        .iter()
        .fold(0usize, |acc, b| (acc << 8) | *b as usize);
    if len < LONG_FORM_THRESHOLD {
        return Err(RlpError::NonCanonicalLength);
    }
    Ok(len)
}

/// Borrowed view of exactly one RLP item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RlpItem<'a> {
    raw: &'a [u8],
    payload_offset: usize,
    list: bool,
}

impl<'a> RlpItem<'a> {
    /// Item starting at `buf[0]`. Bytes after the item are ignored.
    pub fn new(buf: &'a [u8]) -> Result<Self, RlpError> {
        let header = Header::decode(buf)?;
        let total = header
            .offset
            .checked_add(header.payload_len)
            .ok_or(RlpError::LengthOverflow)?;
        if buf.len() < total {
            return Err(RlpError::Truncated {
                needed: total,
                available: buf.len(),
            });
        }
        Ok(Self {
            raw: &buf[..total],
            payload_offset: header.offset,
            list: header.list,
        })
    }

    /// Item that must span the whole of `buf`.
    pub fn exact(buf: &'a [u8]) -> Result<Self, RlpError> {
        let item = Self::new(buf)?;
        if item.len() != buf.len() {
            return Err(RlpError::TrailingBytes {
                count: buf.len() - item.len(),
            });
        }
        Ok(item)
    }

    /// Declared length of the whole item, prefix included.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn as_raw(&self) -> &'a [u8] {
        self.raw
    }

    pub fn payload_len(&self) -> usize {
        self.raw.len() - self.payload_offset
    }

    pub fn payload(&self) -> &'a [u8] {
        &self.raw[self.payload_offset..]
    }

    pub fn is_list(&self) -> bool {
        self.list
    }

    /// Children of a list, without copying.
    pub fn iter(&self) -> Result<RlpIter<'a>, RlpError> {
        if !self.list {
            return Err(RlpError::ExpectedList);
        }
        Ok(RlpIter {
            rest: self.payload(),
        })
    }

    /// Number of direct children of a list.
    pub fn item_count(&self) -> Result<usize, RlpError> {
        self.iter()?.try_fold(0usize, |count, child| child.map(|_| count + 1))
    }

    /// Children collected into a vector of views.
    pub fn to_list(&self) -> Result<Vec<RlpItem<'a>>, RlpError> {
        self.iter()?.collect()
    }

    pub fn as_bytes(&self) -> Result<&'a [u8], RlpError> {
        if self.list {
            return Err(RlpError::ExpectedString);
        }
        Ok(self.payload())
    }

    /// Big-endian unsigned integer of at most 32 bytes. Leading zeros tolerated.
    pub fn as_u256(&self) -> Result<U256, RlpError> {
        let bytes = self.as_bytes()?;
        if bytes.len() > 32 {
            return Err(RlpError::Oversized {
                max: 32,
                actual: bytes.len(),
            });
        }
        Ok(U256::from_be_slice(bytes))
    }

    /// Canonical unsigned integer: no leading zero byte (zero itself is the empty string).
    pub fn as_u256_strict(&self) -> Result<U256, RlpError> {
        let bytes = self.as_bytes()?;
        if bytes.first() == Some(&0) {
            return Err(RlpError::LeadingZero);
        }
        self.as_u256()
    }

    pub fn as_u64(&self) -> Result<u64, RlpError> {
        let bytes = self.as_bytes()?;
        if bytes.len() > 8 {
            return Err(RlpError::Oversized {
                max: 8,
                actual: bytes.len(),
            });
        }
        Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64))
    }

    pub fn as_address(&self) -> Result<Address, RlpError> {
        let bytes = self.exact_bytes(20)?;
        Ok(Address::from_slice(bytes))
    }

    pub fn as_bytes32(&self) -> Result<B256, RlpError> {
        let bytes = self.exact_bytes(32)?;
        Ok(B256::from_slice(bytes))
    }

    /// Single-byte boolean: `0x80` (empty string) is false, `0x01` is true.
    pub fn as_bool(&self) -> Result<bool, RlpError> {
        match self.raw {
            [STRING_SHORT] => Ok(false),
            [0x01] => Ok(true),
            [other] => Err(RlpError::InvalidBool(*other)),
            _ => Err(RlpError::WrongLength {
                expected: 1,
                actual: self.raw.len(),
            }),
        }
    }

    fn exact_bytes(&self, expected: usize) -> Result<&'a [u8], RlpError> {
        let bytes = self.as_bytes()?;
        if bytes.len() != expected {
            return Err(RlpError::WrongLength {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(bytes)
    }
}

/// Forward iterator over list children.
///
/// Each child is bounded by the remaining parent payload, so a child that claims more bytes
/// than its parent holds fails with `Truncated` instead of reading past the list.
#[derive(Clone, Debug)]
pub struct RlpIter<'a> {
    rest: &'a [u8],
}

impl<'a> RlpIter<'a> {
    /// Bytes not consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        self.rest
    }
}

impl<'a> Iterator for RlpIter<'a> {
    type Item = Result<RlpItem<'a>, RlpError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        match RlpItem::new(self.rest) {
            Ok(item) => {
                self.rest = &self.rest[item.len()..];
                Some(Ok(item))
            }
            Err(err) => {
                self.rest = &[];
                Some(Err(err))
            }
        }
    }
}

/// Append a string or list header for a payload of `payload_len` bytes.
///
/// Only headers are produced here; payload bytes are always copied from an existing encoding.
pub(crate) fn encode_header(payload_len: usize, list: bool, out: &mut Vec<u8>) {
    let (short, long) = if list {
        (LIST_SHORT, LIST_LONG)
    } else {
        (STRING_SHORT, STRING_LONG)
    };
    if payload_len < LONG_FORM_THRESHOLD {
        out.push(short + payload_len as u8);
        return;
    }
    let len_bytes = (payload_len as u64).to_be_bytes();
    let skip = len_bytes.iter().take_while(|b| **b == 0).count();
    out.push(long - 1 + (len_bytes.len() - skip) as u8);
    out.extend_from_slice(&len_bytes[skip..]);
}

/// Append the canonical encoding of an unsigned integer.
pub(crate) fn encode_u64(value: u64, out: &mut Vec<u8>) {
    if value == 0 {
        out.push(STRING_SHORT);
        return;
    }
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    let significant = &bytes[skip..];
    if let [single] = significant {
        if *single < STRING_SHORT {
            out.push(*single);
            return;
        }
    }
    encode_header(significant.len(), false, out);
    out.extend_from_slice(significant);
}
