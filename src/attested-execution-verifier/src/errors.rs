use alloy_primitives::{Address, B256, U256};

pub use attested_execution_types::TokenError;

use crate::reconcile::{AmountBound, MatchKey};

/// Errors while reading RLP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RlpError {
    Empty,
    Truncated { needed: usize, available: usize },
    /// Long-form length with a leading zero byte, or long form used for < 56 bytes.
    NonCanonicalLength,
    /// A single byte below 0x80 wrapped in a string prefix.
    NonCanonicalSingleByte,
    LengthOverflow,
    ExpectedList,
    ExpectedString,
    Oversized { max: usize, actual: usize },
    WrongLength { expected: usize, actual: usize },
    LeadingZero,
    InvalidBool(u8),
    TrailingBytes { count: usize },
}

/// Which layout/strategy an ABI decode was attempted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Bridge/swap layout flag.
    Layout(u8),
    /// 4-byte function selector.
    Selector([u8; 4]),
    /// Selector-less call recognised by length only.
    CallLength(usize),
    /// Unknown messaging domain.
    Domain(u32),
    /// Leading type byte of a raw transaction.
    TxType(u8),
}

/// Buffer long enough, but the fields do not form the expected shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralError {
    Rlp(RlpError),
    /// ABI decoding of the given shape failed (offsets, lengths or dirty padding).
    Abi(Shape),
    /// Upper 12 bytes of an address word are not zero.
    DirtyAddress { offset: usize },
    /// Wrapped payload has the wrong length.
    InnerLength { expected: usize, actual: usize },
    FieldCount { expected: usize, actual: usize },
    /// Recovery id that matches neither `{0, 1}`, `{27, 28}` nor EIP-155.
    InvalidRecoveryId(u64),
    /// Numeric field does not fit the width the record stores it in.
    ValueOverflow(U256),
}

/// Structurally valid record that fails a semantic predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityError {
    ZeroTransactionId,
    EmptyBridgeName,
    ZeroReceiver,
    ZeroAmount,
    ZeroDestinationChain,
    /// Swap with no call target, no approval target and no amount.
    EmptySwap { index: usize },
    /// `hasSourceSwaps` disagrees with the presence of a swap array.
    SourceSwapsMismatch { has_source_swaps: bool, swaps: usize },
    NoSwaps,
    ZeroToken,
    ZeroMintRecipient,
    /// Inferred record with a zero amount, rejected before matching.
    InferredZeroAmount { index: usize },
    /// Inferred record with a zero identity, rejected before matching.
    InferredZeroIdentity { index: usize },
}

/// Verification failure. Every variant keeps the values needed to explain it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    Length { required: usize, actual: usize },
    Structural(StructuralError),
    Validity(ValidityError),
    Arity { attested: usize, inferred: usize },
    NoMatch { key: MatchKey },
    AmountBound {
        inferred: U256,
        attested: U256,
        bound: AmountBound,
    },
    Signature { expected: Address },
    CommitmentMismatch { expected: B256, found: B256 },
    UnsupportedShape(Shape),
    ChainMismatch { expected: u64, found: u64 },
    /// Permit token collaborator is not the token the permit names.
    TokenMismatch { expected: Address, found: Address },
    Token(TokenError),
}

impl From<RlpError> for VerifyError {
    fn from(err: RlpError) -> Self {
        VerifyError::Structural(StructuralError::Rlp(err))
    }
}

impl From<StructuralError> for VerifyError {
    fn from(err: StructuralError) -> Self {
        VerifyError::Structural(err)
    }
}

impl From<ValidityError> for VerifyError {
    fn from(err: ValidityError) -> Self {
        VerifyError::Validity(err)
    }
}

impl From<TokenError> for VerifyError {
    fn from(err: TokenError) -> Self {
        VerifyError::Token(err)
    }
}

impl StructuralError {
    /// Stable numeric tag used in ABI-level errors.
    pub fn code(&self) -> u8 {
        match self {
            StructuralError::Rlp(_) => 1,
            StructuralError::Abi(_) => 2,
            StructuralError::DirtyAddress { .. } => 3,
            StructuralError::InnerLength { .. } => 4,
            StructuralError::FieldCount { .. } => 5,
            StructuralError::InvalidRecoveryId(_) => 6,
            StructuralError::ValueOverflow(_) => 7,
        }
    }

    /// Most specific numeric detail for ABI-level errors.
    pub fn detail(&self) -> U256 {
        match self {
            StructuralError::Rlp(_) => U256::ZERO,
            StructuralError::Abi(shape) => shape.value(),
            StructuralError::DirtyAddress { offset } => U256::from(*offset),
            StructuralError::InnerLength { actual, .. } => U256::from(*actual),
            StructuralError::FieldCount { actual, .. } => U256::from(*actual),
            StructuralError::InvalidRecoveryId(v) => U256::from(*v),
            StructuralError::ValueOverflow(value) => *value,
        }
    }
}

impl ValidityError {
    pub fn code(&self) -> u8 {
        match self {
            ValidityError::ZeroTransactionId => 1,
            ValidityError::EmptyBridgeName => 2,
            ValidityError::ZeroReceiver => 3,
            ValidityError::ZeroAmount => 4,
            ValidityError::ZeroDestinationChain => 5,
            ValidityError::EmptySwap { .. } => 6,
            ValidityError::SourceSwapsMismatch { .. } => 7,
            ValidityError::NoSwaps => 8,
            ValidityError::ZeroToken => 9,
            ValidityError::ZeroMintRecipient => 10,
            ValidityError::InferredZeroAmount { .. } => 11,
            ValidityError::InferredZeroIdentity { .. } => 12,
        }
    }

    /// Record index for per-record faults, swap count for flag mismatches.
    pub fn index(&self) -> usize {
        match self {
            ValidityError::EmptySwap { index }
            | ValidityError::InferredZeroAmount { index }
            | ValidityError::InferredZeroIdentity { index } => *index,
            ValidityError::SourceSwapsMismatch { swaps, .. } => *swaps,
            _ => 0,
        }
    }
}

impl Shape {
    pub fn code(&self) -> u8 {
        match self {
            Shape::Layout(_) => 1,
            Shape::Selector(_) => 2,
            Shape::CallLength(_) => 3,
            Shape::Domain(_) => 4,
            Shape::TxType(_) => 5,
        }
    }

    pub fn value(&self) -> U256 {
        match self {
            Shape::Layout(flag) => U256::from(*flag),
            Shape::Selector(selector) => U256::from(u32::from_be_bytes(*selector)),
            Shape::CallLength(len) => U256::from(*len),
            Shape::Domain(domain) => U256::from(*domain),
            Shape::TxType(tag) => U256::from(*tag),
        }
    }
}
