//! Shared utilities for the verifier.
//!
//! These helpers are intentionally small and deterministic, as they run inside Stylus / WASM.

pub mod bytes;
pub mod crypto;
