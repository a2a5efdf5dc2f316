//! Attested-vs-inferred reconciliation.
//!
//! Every attested record originating on the executing chain must be matched to a distinct
//! inferred record with the same key whose amount satisfies the integration's [`AmountBound`].
//! Matching is done with augmenting paths, so a batch is accepted exactly when such a one-to-one
//! assignment exists, whatever order the calls come in.

use alloc::{vec, vec::Vec};

use alloy_primitives::{Address, B256, U256};
use attested_execution_types::{DecodedRelayData, ExecutionInfo};

use crate::errors::{ValidityError, VerifyError};

/// Fields two records must agree on before their amounts are compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyKind {
    /// Origin chain, destination chain and origin token.
    Full,
    /// Origin token only.
    TokenOnly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArityRule {
    /// As many inferred records as attested ones.
    Exact,
    /// At least as many inferred records as attested ones.
    AttestedSubset,
}

/// Direction of the amount comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmountBound {
    /// The attested amount is a maximum the user offered: reject `inferred > attested`.
    AtMostAttested,
    /// The attested amount is a minimum the user demands: reject `inferred < attested`.
    AtLeastAttested,
}

impl AmountBound {
    pub fn admits(self, inferred: U256, attested: U256) -> bool {
        match self {
            AmountBound::AtMostAttested => inferred <= attested,
            AmountBound::AtLeastAttested => inferred >= attested,
        }
    }
}

/// Which field of an inferred record must be non-zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityRule {
    /// Zero token means the native asset; nothing to check.
    Unchecked,
    NonZeroToken,
    NonZeroRequestId,
}

/// Per-integration reconciliation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconcileProfile {
    pub key: KeyKind,
    pub arity: ArityRule,
    pub bound: AmountBound,
    pub identity: IdentityRule,
}

impl ReconcileProfile {
    /// Bridge `minAmount` and swap `minAmountOut` are minimums the user demands.
    pub const BRIDGE_SWAP: Self = Self {
        key: KeyKind::Full,
        arity: ArityRule::Exact,
        bound: AmountBound::AtLeastAttested,
        identity: IdentityRule::Unchecked,
    };

    /// Bundles interleave approvals, so only attested records need a counterpart.
    pub const RELAY: Self = Self {
        key: KeyKind::TokenOnly,
        arity: ArityRule::AttestedSubset,
        bound: AmountBound::AtMostAttested,
        identity: IdentityRule::NonZeroRequestId,
    };

    pub const CROSS_CHAIN_TRANSFER: Self = Self {
        key: KeyKind::Full,
        arity: ArityRule::Exact,
        bound: AmountBound::AtMostAttested,
        identity: IdentityRule::NonZeroToken,
    };
}

/// Matching key. Chain ids are `None` under [`KeyKind::TokenOnly`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub origin_chain_id: Option<u64>,
    pub destination_chain_id: Option<u64>,
    pub origin_token: Address,
}

impl MatchKey {
    pub fn of(kind: KeyKind, info: &ExecutionInfo) -> Self {
        match kind {
            KeyKind::Full => Self {
                origin_chain_id: Some(info.origin_chain_id),
                destination_chain_id: Some(info.destination_chain_id),
                origin_token: info.origin_token,
            },
            KeyKind::TokenOnly => Self {
                origin_chain_id: None,
                destination_chain_id: None,
                origin_token: info.origin_token,
            },
        }
    }
}

/// Record decoded from call data that can be reconciled against an [`ExecutionInfo`].
pub trait InferredRecord {
    fn amount(&self) -> U256;

    fn match_key(&self, kind: KeyKind, here: u64) -> MatchKey;

    fn has_zero_identity(&self, rule: IdentityRule) -> bool;
}

impl InferredRecord for ExecutionInfo {
    fn amount(&self) -> U256 {
        self.amount
    }

    fn match_key(&self, kind: KeyKind, _here: u64) -> MatchKey {
        MatchKey::of(kind, self)
    }

    fn has_zero_identity(&self, rule: IdentityRule) -> bool {
        match rule {
            IdentityRule::NonZeroToken => self.origin_token.is_zero(),
            IdentityRule::Unchecked | IdentityRule::NonZeroRequestId => false,
        }
    }
}

impl InferredRecord for DecodedRelayData {
    fn amount(&self) -> U256 {
        self.amount
    }

    /// Relay payments settle on the executing chain.
    fn match_key(&self, kind: KeyKind, here: u64) -> MatchKey {
        MatchKey::of(kind, &ExecutionInfo::local(self.token, self.amount, here))
    }

    fn has_zero_identity(&self, rule: IdentityRule) -> bool {
        match rule {
            IdentityRule::NonZeroRequestId => self.request_id.is_zero(),
            IdentityRule::NonZeroToken => self.is_native(),
            IdentityRule::Unchecked => false,
        }
    }
}

/// `(attested index, inferred index)` pairs, ordered by attested index.
pub type Assignment = Vec<(usize, usize)>;

/// Reconcile `attested` against `inferred` on chain `here`.
pub fn reconcile<R: InferredRecord>(
    attested: &[ExecutionInfo],
    inferred: &[R],
    here: u64,
    profile: &ReconcileProfile,
) -> Result<Assignment, VerifyError> {
    let arity_ok = match profile.arity {
        ArityRule::Exact => attested.len() == inferred.len(),
        ArityRule::AttestedSubset => attested.len() <= inferred.len(),
    };
    if !arity_ok {
        return Err(VerifyError::Arity {
            attested: attested.len(),
            inferred: inferred.len(),
        });
    }

    for (index, record) in inferred.iter().enumerate() {
        if record.amount().is_zero() {
            return Err(ValidityError::InferredZeroAmount { index }.into());
        }
        if record.has_zero_identity(profile.identity) {
            return Err(ValidityError::InferredZeroIdentity { index }.into());
        }
    }

    let keys: Vec<MatchKey> = inferred
        .iter()
        .map(|record| record.match_key(profile.key, here))
        .collect();

    let mut matcher = Matcher {
        candidates: Vec::with_capacity(attested.len()),
        owner: vec![None; inferred.len()],
        visited: vec![false; inferred.len()],
    };

    for (a, record) in attested.iter().enumerate() {
        let key = MatchKey::of(profile.key, record);
        matcher.candidates.push(
            (0..inferred.len())
                .filter(|&j| keys[j] == key && profile.bound.admits(inferred[j].amount(), record.amount))
                .collect(),
        );
        if record.origin_chain_id != here {
            continue;
        }

        matcher.visited.fill(false);
        if !matcher.assign(a) {
            return Err(unmatched(record, key, &keys, inferred, profile.bound));
        }
    }

    let mut assignment: Assignment = matcher
        .owner
        .iter()
        .enumerate()
        .filter_map(|(j, owner)| owner.map(|a| (a, j)))
        .collect();
    assignment.sort_unstable();
    Ok(assignment)
}

/// Relay reconciliation. When `expected_request_id` is set, every inferred record must carry it.
pub fn reconcile_relay(
    attested: &[ExecutionInfo],
    inferred: &[DecodedRelayData],
    here: u64,
    expected_request_id: Option<B256>,
) -> Result<Assignment, VerifyError> {
    if let Some(expected) = expected_request_id {
        if let Some(record) = inferred.iter().find(|r| r.request_id != expected) {
            return Err(VerifyError::CommitmentMismatch {
                expected,
                found: record.request_id,
            });
        }
    }
    reconcile(attested, inferred, here, &ReconcileProfile::RELAY)
}

/// Bipartite matcher over precomputed candidate lists.
struct Matcher {
    /// Admissible inferred indices per attested index, in inferred order.
    candidates: Vec<Vec<usize>>,
    /// Attested index currently holding each inferred record.
    owner: Vec<Option<usize>>,
    visited: Vec<bool>,
}

impl Matcher {
    /// Free candidates are taken first, in order; only then are holders asked to move.
    fn assign(&mut self, a: usize) -> bool {
        for idx in 0..self.candidates[a].len() {
            let j = self.candidates[a][idx];
            if !self.visited[j] && self.owner[j].is_none() {
                self.visited[j] = true;
                self.owner[j] = Some(a);
                return true;
            }
        }
        for idx in 0..self.candidates[a].len() {
            let j = self.candidates[a][idx];
            if self.visited[j] {
                continue;
            }
            self.visited[j] = true;
            if let Some(holder) = self.owner[j] {
                if self.assign(holder) {
                    self.owner[j] = Some(a);
                    return true;
                }
            }
        }
        false
    }
}

/// The first key-sharing record that breaks the bound explains the failure; otherwise the key
/// had no usable counterpart at all.
fn unmatched<R: InferredRecord>(
    attested: &ExecutionInfo,
    key: MatchKey,
    keys: &[MatchKey],
    inferred: &[R],
    bound: AmountBound,
) -> VerifyError {
    keys.iter()
        .zip(inferred)
        .find(|(k, record)| **k == key && !bound.admits(record.amount(), attested.amount))
        .map(|(_, record)| VerifyError::AmountBound {
            inferred: record.amount(),
            attested: attested.amount,
            bound,
        })
        .unwrap_or(VerifyError::NoMatch { key })
}
