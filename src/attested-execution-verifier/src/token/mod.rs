//! Permit token access.

pub mod onchain;

pub use attested_execution_types::{PermitCall, PermitToken, TokenError};
pub use onchain::OnchainPermitToken;
