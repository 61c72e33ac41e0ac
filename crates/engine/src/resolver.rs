//! Cached on-chain lookups for pools and tokens.

use alloy::primitives::Address;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::ResolverCaches;
use crate::error::{EngineError, EngineResult};
use crate::reader::ChainReader;
use crate::types::Token;

/// Resolves pool provenance, pool composition and token metadata.
///
/// This is the only component that performs external calls. Answers are
/// cached in the injected [`ResolverCaches`]; nothing is ever invalidated.
pub struct Resolver {
    reader: Arc<dyn ChainReader>,
    caches: Arc<ResolverCaches>,
    factory: Address,
    call_timeout: Duration,
}

impl Resolver {
    /// Create a new resolver.
    ///
    /// # Arguments
    /// * `reader` - Contract call backend
    /// * `caches` - Caches to read from and populate
    /// * `factory` - Factory every protocol pool must report
    /// * `call_timeout` - Upper bound for each individual contract call
    pub fn new(
        reader: Arc<dyn ChainReader>,
        caches: Arc<ResolverCaches>,
        factory: Address,
        call_timeout: Duration,
    ) -> Self {
        Self {
            reader,
            caches,
            factory,
            call_timeout,
        }
    }

    pub fn caches(&self) -> &Arc<ResolverCaches> {
        &self.caches
    }

    /// Check whether `pool` was deployed by the protocol factory.
    ///
    /// Never fails: reverts, bad responses and timeouts all mean "not a
    /// pool". Only definite answers are cached.
    pub async fn is_protocol_pool(&self, pool: Address) -> bool {
        let lookup = self
            .caches
            .pool_validity
            .get_or_try_insert_with(pool, || async {
                let factory = self.call("factory", pool, self.reader.factory(pool)).await?;
                if factory != self.factory {
                    debug!("Pool {} reports foreign factory {}", pool, factory);
                }
                Ok::<_, EngineError>(factory == self.factory)
            })
            .await;

        lookup.unwrap_or_else(|e| {
            debug!("Treating {} as a foreign pool: {}", pool, e);
            false
        })
    }

    /// Read the two tokens of a validated pool.
    pub async fn pool_tokens(&self, pool: Address) -> EngineResult<(Address, Address)> {
        self.caches
            .pool_tokens
            .get_or_try_insert_with(pool, || async {
                tokio::try_join!(
                    self.call("token0", pool, self.reader.token0(pool)),
                    self.call("token1", pool, self.reader.token1(pool)),
                )
                .map_err(|e| EngineError::PoolTokens {
                    address: pool,
                    source: e.into(),
                })
            })
            .await
    }

    /// Read `name`, `symbol` and `decimals` of a token.
    ///
    /// Unlike pool validation this fails hard: a swap cannot be described
    /// without display metadata.
    pub async fn token_metadata(&self, token: Address) -> EngineResult<Token> {
        self.caches
            .tokens
            .get_or_try_insert_with(token, || async {
                let (name, symbol, decimals) = tokio::try_join!(
                    self.call("name", token, self.reader.name(token)),
                    self.call("symbol", token, self.reader.symbol(token)),
                    self.call("decimals", token, self.reader.decimals(token)),
                )
                .map_err(|e| {
                    warn!("Token metadata lookup failed for {}: {}", token, e);
                    EngineError::TokenMetadata {
                        address: token,
                        source: e.into(),
                    }
                })?;

                Ok::<_, EngineError>(Token {
                    address: token,
                    symbol,
                    name,
                    decimals,
                })
            })
            .await
    }

    async fn call<T, F>(&self, operation: &'static str, address: Address, call: F) -> EngineResult<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result.map_err(EngineError::Call),
            Err(_) => Err(EngineError::Timeout {
                operation,
                address,
                timeout: self.call_timeout,
            }),
        }
    }
}
