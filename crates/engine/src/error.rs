//! Error types for swap reconstruction.

use alloy::primitives::Address;
use std::time::Duration;

/// Error type for engine operations.
///
/// Only failures that prevent a finding from being described end up here.
/// Pool validation never produces an error: a pool that cannot be verified is
/// simply not a protocol pool.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to read pool tokens for {address}: {source}")]
    PoolTokens {
        address: Address,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to read token metadata for {address}: {source}")]
    TokenMetadata {
        address: Address,
        #[source]
        source: anyhow::Error,
    },
    #[error("{operation} on {address} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        address: Address,
        timeout: Duration,
    },
    #[error("contract call failed: {0}")]
    Call(#[from] anyhow::Error),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
