//! Stylus entrypoint for attested execution verification.
//!
//! Design notes:
//! - Every `verify_*` / `validate_*` entrypoint uses `block.chainid` as the executing chain.
//! - Verdicts are reverts: success returns nothing, failure reverts with one of the custom
//!   errors below, carrying the values needed to explain it.
//! - Storage holds the admin fixed at deployment and the relay configuration the admin writes
//!   once through `initialize`.

use alloc::vec::Vec;

use stylus_sdk::{
    abi::Bytes,
    alloy_primitives::{Address, FixedBytes, U256},
    prelude::*,
    stylus_core::log,
};

use alloy_sol_types::sol;
use stylus_sdk::stylus_proc::SolidityError;

use attested_execution_types::{AttestedTuple, ExecutionInfo, TokenError};

use crate::{
    channels::{self, DecodedPermitSig, PermitTuple},
    constants::{CCTP_DOMAINS, TOKEN_READ_GAS},
    decoder::{BridgeLayout, CallRequest, RelayAddresses},
    errors::VerifyError,
    reconcile::AmountBound,
    token::OnchainPermitToken,
    verify,
};

sol! {
    event Initialized(address indexed solver, address indexed receiver);
    event PermitReplayed(address indexed token, address indexed owner, bytes32 commitment, bool executed);

    error AlreadyInitialized(address verifier);
    error Unauthorized(address caller);
    error NotInitialized();
    error InvalidAddress();
    error CalldataTooShort(uint256 required, uint256 actual);
    error MalformedPayload(uint8 kind, uint256 detail);
    error InvalidRecord(uint8 kind, uint256 index);
    error ArityMismatch(uint256 attested, uint256 inferred);
    error NoMatchingExecution(uint64 originChainId, uint64 destinationChainId, address originToken);
    error AmountOutOfBounds(uint256 inferred, uint256 attested, bool atMost);
    error SignerMismatch(address expected);
    error CommitmentMismatch(bytes32 expected, bytes32 found);
    error UnsupportedShape(uint8 kind, uint256 value);
    error ChainMismatch(uint64 expected, uint64 found);
    error TokenMismatch(address expected, address found);
    error TokenCallFailed(address token);
}

#[derive(SolidityError)]
pub enum VerifierError {
    AlreadyInitialized(AlreadyInitialized),
    Unauthorized(Unauthorized),
    NotInitialized(NotInitialized),
    InvalidAddress(InvalidAddress),
    CalldataTooShort(CalldataTooShort),
    MalformedPayload(MalformedPayload),
    InvalidRecord(InvalidRecord),
    ArityMismatch(ArityMismatch),
    NoMatchingExecution(NoMatchingExecution),
    AmountOutOfBounds(AmountOutOfBounds),
    SignerMismatch(SignerMismatch),
    CommitmentMismatch(CommitmentMismatch),
    UnsupportedShape(UnsupportedShape),
    ChainMismatch(ChainMismatch),
    TokenMismatch(TokenMismatch),
    TokenCallFailed(TokenCallFailed),
}

impl From<VerifyError> for VerifierError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Length { required, actual } => {
                VerifierError::CalldataTooShort(CalldataTooShort {
                    required: U256::from(required),
                    actual: U256::from(actual),
                })
            }
            VerifyError::Structural(inner) => VerifierError::MalformedPayload(MalformedPayload {
                kind: inner.code(),
                detail: inner.detail(),
            }),
            VerifyError::Validity(inner) => VerifierError::InvalidRecord(InvalidRecord {
                kind: inner.code(),
                index: U256::from(inner.index()),
            }),
            VerifyError::Arity { attested, inferred } => {
                VerifierError::ArityMismatch(ArityMismatch {
                    attested: U256::from(attested),
                    inferred: U256::from(inferred),
                })
            }
            VerifyError::NoMatch { key } => VerifierError::NoMatchingExecution(NoMatchingExecution {
                originChainId: key.origin_chain_id.unwrap_or_default(),
                destinationChainId: key.destination_chain_id.unwrap_or_default(),
                originToken: key.origin_token,
            }),
            VerifyError::AmountBound {
                inferred,
                attested,
                bound,
            } => VerifierError::AmountOutOfBounds(AmountOutOfBounds {
                inferred,
                attested,
                atMost: bound == AmountBound::AtMostAttested,
            }),
            VerifyError::Signature { expected } => {
                VerifierError::SignerMismatch(SignerMismatch { expected })
            }
            VerifyError::CommitmentMismatch { expected, found } => {
                VerifierError::CommitmentMismatch(CommitmentMismatch { expected, found })
            }
            VerifyError::UnsupportedShape(shape) => {
                VerifierError::UnsupportedShape(UnsupportedShape {
                    kind: shape.code(),
                    value: shape.value(),
                })
            }
            VerifyError::ChainMismatch { expected, found } => {
                VerifierError::ChainMismatch(ChainMismatch { expected, found })
            }
            VerifyError::TokenMismatch { expected, found } => {
                VerifierError::TokenMismatch(TokenMismatch { expected, found })
            }
            VerifyError::Token(inner) => {
                let token = match inner {
                    TokenError::CallFailed { token } | TokenError::MalformedReturn { token } => token,
                    TokenError::NotImplemented => Address::ZERO,
                };
                VerifierError::TokenCallFailed(TokenCallFailed { token })
            }
        }
    }
}

sol_storage! {
    #[entrypoint]
    pub struct AttestationVerifier {
        /// Only account allowed to install the relay configuration.
        address admin;
        /// Solver that relay payments to `relay_receiver` are attributed to.
        address relay_solver;
        /// Relay infrastructure address.
        address relay_receiver;
    }
}

#[public]
impl AttestationVerifier {
    /// Runs once at deployment. `admin` is the account that may call `initialize`.
    #[constructor]
    pub fn constructor(&mut self, admin: Address) -> Result<(), VerifierError> {
        if admin == Address::ZERO {
            return Err(VerifierError::InvalidAddress(InvalidAddress {}));
        }
        self.admin.set(admin);
        Ok(())
    }

    pub fn admin(&self) -> Address {
        self.admin.get()
    }

    /// Install the relay configuration. Admin only, callable once; both addresses must be
    /// non-zero.
    pub fn initialize(&mut self, solver: Address, receiver: Address) -> Result<(), VerifierError> {
        let caller = self.vm().msg_sender();
        if caller != self.admin.get() || caller == Address::ZERO {
            return Err(VerifierError::Unauthorized(Unauthorized { caller }));
        }
        if self.relay_solver.get() != Address::ZERO {
            return Err(VerifierError::AlreadyInitialized(AlreadyInitialized {
                verifier: self.vm().contract_address(),
            }));
        }
        if solver == Address::ZERO || receiver == Address::ZERO {
            return Err(VerifierError::InvalidAddress(InvalidAddress {}));
        }
        self.relay_solver.set(solver);
        self.relay_receiver.set(receiver);
        log(self.vm(), Initialized { solver, receiver });
        Ok(())
    }

    /// `(solver, receiver)`
    pub fn relay_addresses(&self) -> Result<(Address, Address), VerifierError> {
        let addresses = self.addresses()?;
        Ok((addresses.solver, addresses.receiver))
    }

    /// Bridge/swap facet calls, all under the declared argument `layout`.
    pub fn verify_bridge_swap(
        &self,
        layout: u8,
        calls: Vec<Bytes>,
        attested: Vec<AttestedTuple>,
    ) -> Result<(), VerifierError> {
        let layout = BridgeLayout::try_from(layout)?;
        let calls: Vec<&[u8]> = calls.iter().map(|call| &call[..]).collect();
        let attested = into_records(attested);
        verify::verify_bridge_swap(layout, &calls, &attested, self.vm().chain_id())?;
        Ok(())
    }

    /// Relay bundle of `(target, value, data)` calls. A zero `expected_request_id` skips the
    /// request id check.
    pub fn verify_relay(
        &self,
        calls: Vec<(Address, U256, Bytes)>,
        attested: Vec<AttestedTuple>,
        expected_request_id: FixedBytes<32>,
    ) -> Result<(), VerifierError> {
        let addresses = self.addresses()?;
        let requests: Vec<CallRequest<'_>> = calls
            .iter()
            .map(|(target, value, data)| CallRequest::new(*target, *value, &data[..]))
            .collect();
        let attested = into_records(attested);
        let expected = (expected_request_id != FixedBytes::ZERO).then_some(expected_request_id);
        verify::verify_relay(
            &requests,
            &addresses,
            &attested,
            self.vm().chain_id(),
            expected,
        )?;
        Ok(())
    }

    /// `depositForBurnWithHook` calls, destinations resolved through the well-known domains.
    pub fn verify_cross_chain_transfer(
        &self,
        calls: Vec<Bytes>,
        attested: Vec<AttestedTuple>,
    ) -> Result<(), VerifierError> {
        let calls: Vec<&[u8]> = calls.iter().map(|call| &call[..]).collect();
        let attested = into_records(attested);
        verify::verify_cross_chain_transfer(
            &calls,
            &attested,
            self.vm().chain_id(),
            &CCTP_DOMAINS,
        )?;
        Ok(())
    }

    pub fn validate_raw_transaction(
        &self,
        raw: Bytes,
        commitment: FixedBytes<32>,
        signer: Address,
    ) -> Result<(), VerifierError> {
        channels::validate_raw_transaction(&raw[..], commitment, signer)?;
        Ok(())
    }

    /// Verify a permit signed by `owner` for this contract as spender, and forward it to the
    /// token when its execute flag is set.
    pub fn validate_permit(
        &mut self,
        permit: PermitTuple,
        owner: Address,
        commitment: FixedBytes<32>,
    ) -> Result<(), VerifierError> {
        let permit = DecodedPermitSig::from(permit);
        let mut token = OnchainPermitToken::new(permit.token, TOKEN_READ_GAS);
        channels::validate_permit(
            &permit,
            owner,
            self.vm().contract_address(),
            commitment,
            self.vm().chain_id(),
            &mut token,
        )?;
        log(
            self.vm(),
            PermitReplayed {
                token: permit.token,
                owner,
                commitment,
                executed: permit.execute,
            },
        );
        Ok(())
    }
}

impl AttestationVerifier {
    fn addresses(&self) -> Result<RelayAddresses, VerifierError> {
        let solver = self.relay_solver.get();
        if solver == Address::ZERO {
            return Err(VerifierError::NotInitialized(NotInitialized {}));
        }
        Ok(RelayAddresses::new(solver, self.relay_receiver.get()))
    }
}

fn into_records(attested: Vec<AttestedTuple>) -> Vec<ExecutionInfo> {
    attested.into_iter().map(ExecutionInfo::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::TRANSFER_SELECTOR,
        errors::{Shape, StructuralError, ValidityError},
        reconcile::MatchKey,
        testing::{address_of, signed_fee_market_tx, test_key, TxFields},
    };
    use alloc::vec;
    use alloy_primitives::{address, keccak256, B256};
    use stylus_sdk::testing::*;

    #[test]
    fn core_errors_keep_their_values_at_the_boundary() {
        let mapped = VerifierError::from(VerifyError::AmountBound {
            inferred: U256::from(50u64),
            attested: U256::from(100u64),
            bound: AmountBound::AtLeastAttested,
        });
        assert!(matches!(
            mapped,
            VerifierError::AmountOutOfBounds(AmountOutOfBounds { inferred, attested, atMost: false })
                if inferred == U256::from(50u64) && attested == U256::from(100u64)
        ));

        let mapped = VerifierError::from(VerifyError::NoMatch {
            key: MatchKey {
                origin_chain_id: None,
                destination_chain_id: None,
                origin_token: Address::repeat_byte(0x0a),
            },
        });
        assert!(matches!(
            mapped,
            VerifierError::NoMatchingExecution(NoMatchingExecution {
                originChainId: 0,
                destinationChainId: 0,
                originToken,
            }) if originToken == Address::repeat_byte(0x0a)
        ));

        let mapped = VerifierError::from(VerifyError::UnsupportedShape(Shape::Domain(99)));
        assert!(matches!(
            mapped,
            VerifierError::UnsupportedShape(UnsupportedShape { kind: 4, value })
                if value == U256::from(99u64)
        ));

        let mapped = VerifierError::from(VerifyError::Structural(StructuralError::InvalidRecoveryId(30)));
        assert!(matches!(
            mapped,
            VerifierError::MalformedPayload(MalformedPayload { kind: 6, detail }) if detail == U256::from(30u64)
        ));

        let mapped = VerifierError::from(VerifyError::Validity(ValidityError::EmptySwap { index: 2 }));
        assert!(matches!(
            mapped,
            VerifierError::InvalidRecord(InvalidRecord { kind: 6, index }) if index == U256::from(2u64)
        ));

        let mapped = VerifierError::from(VerifyError::CommitmentMismatch {
            expected: B256::repeat_byte(1),
            found: B256::repeat_byte(2),
        });
        assert!(matches!(mapped, VerifierError::CommitmentMismatch(_)));

        let mapped = VerifierError::from(VerifyError::TokenMismatch {
            expected: Address::repeat_byte(0x70),
            found: Address::repeat_byte(0x99),
        });
        assert!(matches!(
            mapped,
            VerifierError::TokenMismatch(TokenMismatch { expected, found })
                if expected == Address::repeat_byte(0x70) && found == Address::repeat_byte(0x99)
        ));
    }

    const ADMIN: Address = address!("adadadadadadadadadadadadadadadadadadadad");
    const SOLVER: Address = address!("5050505050505050505050505050505050505050");
    const RELAY_RECEIVER: Address = address!("5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e");

    fn deployed(vm: &TestVM) -> AttestationVerifier {
        let mut contract = AttestationVerifier::from(vm);
        assert!(contract.constructor(ADMIN).is_ok());
        contract
    }

    #[test]
    fn constructor_rejects_zero_admin() {
        let vm = TestVM::default();
        let mut contract = AttestationVerifier::from(&vm);
        assert!(matches!(
            contract.constructor(Address::ZERO),
            Err(VerifierError::InvalidAddress(_))
        ));
    }

    #[test]
    fn initialize_is_admin_only() {
        let vm = TestVM::default();
        let mut contract = deployed(&vm);
        assert_eq!(contract.admin(), ADMIN);

        let stranger = Address::repeat_byte(0x66);
        vm.set_sender(stranger);
        assert!(matches!(
            contract.initialize(SOLVER, RELAY_RECEIVER),
            Err(VerifierError::Unauthorized(Unauthorized { caller })) if caller == stranger
        ));
        assert!(matches!(
            contract.relay_addresses(),
            Err(VerifierError::NotInitialized(_))
        ));
    }

    #[test]
    fn initialize_once_with_non_zero_addresses() {
        let vm = TestVM::default();
        let mut contract = deployed(&vm);
        vm.set_sender(ADMIN);

        assert!(matches!(
            contract.relay_addresses(),
            Err(VerifierError::NotInitialized(_))
        ));
        assert!(matches!(
            contract.initialize(Address::ZERO, RELAY_RECEIVER),
            Err(VerifierError::InvalidAddress(_))
        ));
        assert!(contract.initialize(SOLVER, RELAY_RECEIVER).is_ok());
        assert!(matches!(contract.relay_addresses(), Ok(pair) if pair == (SOLVER, RELAY_RECEIVER)));
        assert!(matches!(
            contract.initialize(SOLVER, RELAY_RECEIVER),
            Err(VerifierError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn relay_verification_requires_configuration() {
        let vm = TestVM::default();
        let contract = deployed(&vm);
        assert!(matches!(
            contract.verify_relay(Vec::new(), Vec::new(), FixedBytes::ZERO),
            Err(VerifierError::NotInitialized(_))
        ));
    }

    #[test]
    fn relay_payment_to_receiver_is_verified() {
        let vm = TestVM::default();
        let mut contract = deployed(&vm);
        vm.set_sender(ADMIN);
        assert!(contract.initialize(SOLVER, RELAY_RECEIVER).is_ok());

        let token = Address::repeat_byte(0xaf);
        let request_id = B256::repeat_byte(0x1d);
        let mut transfer = TRANSFER_SELECTOR.to_vec();
        transfer.extend_from_slice(&[0u8; 12]);
        transfer.extend_from_slice(RELAY_RECEIVER.as_slice());
        transfer.extend_from_slice(&U256::from(700u64).to_be_bytes::<32>());
        transfer.extend_from_slice(request_id.as_slice());

        let here = contract.vm().chain_id();
        let calls = vec![(token, U256::ZERO, Bytes::from(transfer))];
        let attested = vec![(token, U256::from(750u64), here, here)];
        assert!(contract
            .verify_relay(calls.clone(), attested.clone(), request_id)
            .is_ok());
        assert!(matches!(
            contract.verify_relay(calls, attested, B256::repeat_byte(0x2e)),
            Err(VerifierError::CommitmentMismatch(_))
        ));
    }

    #[test]
    fn raw_transaction_from_expected_signer_is_accepted() {
        let vm = TestVM::default();
        let contract = deployed(&vm);
        let key = test_key(0x31);
        let commitment = keccak256("relay intent");
        let mut data = TRANSFER_SELECTOR.to_vec();
        data.extend_from_slice(&[0x11; 64]);
        data.extend_from_slice(commitment.as_slice());
        let raw = signed_fee_market_tx(&key, &TxFields::with_data(data), 42161);

        assert!(contract
            .validate_raw_transaction(Bytes::from(raw.clone()), commitment, address_of(&key))
            .is_ok());
        assert!(matches!(
            contract.validate_raw_transaction(Bytes::from(raw), commitment, Address::repeat_byte(0x42)),
            Err(VerifierError::SignerMismatch(_))
        ));
    }

    #[test]
    fn unknown_layout_flag_reverts() {
        let vm = TestVM::default();
        let contract = deployed(&vm);
        assert!(matches!(
            contract.verify_bridge_swap(9, Vec::new(), Vec::new()),
            Err(VerifierError::UnsupportedShape(UnsupportedShape { kind: 1, .. }))
        ));
    }

    #[test]
    fn empty_batches_reconcile_trivially() {
        let vm = TestVM::default();
        let contract = deployed(&vm);
        assert!(contract
            .verify_cross_chain_transfer(Vec::new(), Vec::new())
            .is_ok());
    }
}
