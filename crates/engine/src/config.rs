//! Protocol constants and engine configuration.

use alloy::primitives::{address, Address};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::cache::{DEFAULT_POOL_CACHE_CAPACITY, DEFAULT_TOKEN_CACHE_CAPACITY};

/// Uniswap V3 `SwapRouter`.
pub const UNISWAP_V3_SWAP_ROUTER: Address = address!("E592427A0AEce92De3Edee1F18E0157C05861564");

/// Uniswap V3 `SwapRouter02`.
pub const UNISWAP_V3_SWAP_ROUTER_02: Address = address!("68b3465833fb72A70ecDF485E0e4C7bD8665Fc45");

/// Uniswap V3 pool factory.
pub const UNISWAP_V3_FACTORY: Address = address!("1F98431c8aD98523631AE4a59f267346ea31F984");

/// Protocol label attached to findings.
pub const PROTOCOL_NAME: &str = "Uniswap V3";

/// Engine settings.
///
/// Every field has a default so a partial JSON file is enough to override a
/// single value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Transactions are only analyzed when sent to one of these.
    pub routers: Vec<Address>,
    /// Pools must report this factory to be attributed to the protocol.
    pub factory: Address,
    pub pool_cache_capacity: usize,
    pub token_cache_capacity: usize,
    /// Upper bound for each contract call.
    pub call_timeout_ms: u64,
    /// Maximum number of resolver lookups in flight for one transaction.
    pub max_concurrent_lookups: usize,
}

impl EngineConfig {
    /// Load a JSON config file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Whether `to` is one of the configured routers.
    pub fn is_router(&self, to: Option<Address>) -> bool {
        to.is_some_and(|to| self.routers.contains(&to))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            routers: vec![UNISWAP_V3_SWAP_ROUTER, UNISWAP_V3_SWAP_ROUTER_02],
            factory: UNISWAP_V3_FACTORY,
            pool_cache_capacity: DEFAULT_POOL_CACHE_CAPACITY,
            token_cache_capacity: DEFAULT_TOKEN_CACHE_CAPACITY,
            call_timeout_ms: 5_000,
            max_concurrent_lookups: 16,
        }
    }
}
