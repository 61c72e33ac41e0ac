//! Transaction analyzer reconstructing Uniswap V3 swaps.

use alloy::primitives::Address;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::ResolverCaches;
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::finding::{compose_finding, Finding};
use crate::path::{
    chain_transfers, classify_ordered, classify_swaps, pair_transfer_legs, SwapClassification,
};
use crate::reader::ChainReader;
use crate::resolver::Resolver;
use crate::swap::{build_swap, build_swap_from_transfers};
use crate::types::{SwapKind, Token, TransactionEvent, TransferEvent};

/// Transaction analysis result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionAnalysis {
    /// How the swap activity was classified.
    pub classification: SwapClassification,
    /// Finding for the classification, if any.
    pub finding: Option<Finding>,
    /// Pools checked against the factory, in first-seen order.
    pub pools: Vec<Address>,
    /// False when the router gate short-circuited the analysis.
    pub analyzed: bool,
}

impl TransactionAnalysis {
    fn skipped() -> Self {
        Self {
            classification: SwapClassification::None,
            finding: None,
            pools: Vec::new(),
            analyzed: false,
        }
    }

    fn empty(pools: Vec<Address>) -> Self {
        Self {
            classification: SwapClassification::None,
            finding: None,
            pools,
            analyzed: true,
        }
    }

    pub fn kind(&self) -> Option<SwapKind> {
        match self.classification {
            SwapClassification::None => None,
            SwapClassification::Simple(_) => Some(SwapKind::Simple),
            SwapClassification::MultiHop(_) => Some(SwapKind::MultiHop),
        }
    }
}

/// Analyzer for detecting protocol swaps in transactions.
///
/// Cheap to clone; clones share the resolver and its caches.
#[derive(Clone)]
pub struct SwapAnalyzer {
    resolver: Arc<Resolver>,
    config: Arc<EngineConfig>,
}

impl SwapAnalyzer {
    /// Create an analyzer with fresh caches sized from `config`.
    pub fn new(reader: Arc<dyn ChainReader>, config: EngineConfig) -> Self {
        let caches = Arc::new(ResolverCaches::new(
            config.pool_cache_capacity,
            config.token_cache_capacity,
        ));
        Self::with_caches(reader, caches, config)
    }

    /// Create an analyzer on top of existing caches.
    pub fn with_caches(
        reader: Arc<dyn ChainReader>,
        caches: Arc<ResolverCaches>,
        config: EngineConfig,
    ) -> Self {
        let resolver = Resolver::new(reader, caches, config.factory, config.call_timeout());
        Self {
            resolver: Arc::new(resolver),
            config: Arc::new(config),
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether a transaction sent to `to` is worth analyzing at all.
    pub fn is_router(&self, to: Option<Address>) -> bool {
        self.config.is_router(to)
    }

    /// Analyze a transaction and return its findings.
    ///
    /// # Errors
    /// Returns an error when pool composition or token metadata cannot be
    /// resolved. Foreign pools and malformed events are not errors.
    pub async fn handle_transaction(&self, tx: &TransactionEvent) -> EngineResult<Vec<Finding>> {
        let analysis = self.analyze(tx).await?;
        Ok(analysis.finding.into_iter().collect())
    }

    /// Analyze a transaction for protocol swaps.
    ///
    /// Native pool `Swap` logs are preferred; transactions without them are
    /// rebuilt from their ERC-20 transfers.
    pub async fn analyze(&self, tx: &TransactionEvent) -> EngineResult<TransactionAnalysis> {
        if !self.is_router(tx.to) {
            return Ok(TransactionAnalysis::skipped());
        }

        let mut analysis = if tx.swaps().next().is_some() {
            self.analyze_swap_logs(tx).await?
        } else {
            self.analyze_transfers(tx).await?
        };

        analysis.finding = compose_finding(&analysis.classification, tx.hash);
        if let Some(kind) = analysis.kind() {
            info!(
                "Transaction {} is a {} through {} pool(s)",
                tx.hash,
                kind.as_str(),
                analysis.pools.len()
            );
        }
        Ok(analysis)
    }

    async fn analyze_swap_logs(&self, tx: &TransactionEvent) -> EngineResult<TransactionAnalysis> {
        let logs: Vec<_> = tx.swaps().collect();
        let pools = unique(logs.iter().map(|log| log.pool));

        if !self.all_protocol_pools(&pools).await {
            debug!("Transaction {} touches a foreign pool", tx.hash);
            return Ok(TransactionAnalysis::empty(pools));
        }

        let pool_tokens: HashMap<Address, (Address, Address)> = self
            .fan_out(&pools, |pool| async move {
                self.resolver.pool_tokens(pool).await.map(|tokens| (pool, tokens))
            })
            .await
            .into_iter()
            .collect::<EngineResult<_>>()?;

        let token_addresses = unique(pool_tokens.values().flat_map(|&(t0, t1)| [t0, t1]));
        let tokens = self.resolve_tokens(&token_addresses).await?;

        let mut swaps = Vec::with_capacity(logs.len());
        for log in logs {
            let Some((token0, token1)) = pool_tokens
                .get(&log.pool)
                .and_then(|(t0, t1)| Some((tokens.get(t0)?, tokens.get(t1)?)))
            else {
                return Ok(TransactionAnalysis::empty(pools));
            };
            match build_swap(log, token0, token1) {
                Some(swap) => swaps.push(swap),
                None => return Ok(TransactionAnalysis::empty(pools)),
            }
        }

        Ok(TransactionAnalysis {
            classification: classify_swaps(swaps),
            finding: None,
            pools,
            analyzed: true,
        })
    }

    async fn analyze_transfers(&self, tx: &TransactionEvent) -> EngineResult<TransactionAnalysis> {
        let transfers: Vec<TransferEvent> = tx
            .transfers()
            .map(TransferEvent::from)
            .collect();

        let Some(chain) = chain_transfers(tx.from, &transfers) else {
            if !transfers.is_empty() {
                debug!("Transaction {} transfers do not form a single path", tx.hash);
            }
            return Ok(TransactionAnalysis::empty(Vec::new()));
        };
        let Some(units) = pair_transfer_legs(&chain) else {
            debug!("Transaction {} transfer legs do not meet at pools", tx.hash);
            return Ok(TransactionAnalysis::empty(Vec::new()));
        };

        let pools = unique(units.iter().map(|(inbound, _)| inbound.to));
        if !self.all_protocol_pools(&pools).await {
            debug!("Transaction {} touches a foreign pool", tx.hash);
            return Ok(TransactionAnalysis::empty(pools));
        }

        let token_addresses = unique(chain.iter().map(|transfer| transfer.token_address));
        let tokens = self.resolve_tokens(&token_addresses).await?;

        let mut swaps = Vec::with_capacity(units.len());
        for (inbound, outbound) in units {
            let swap = match (tokens.get(&inbound.token_address), tokens.get(&outbound.token_address)) {
                (Some(token_in), Some(token_out)) => {
                    build_swap_from_transfers(inbound, outbound, token_in.clone(), token_out.clone())
                }
                _ => None,
            };
            match swap {
                Some(swap) => swaps.push(swap),
                None => return Ok(TransactionAnalysis::empty(pools)),
            }
        }

        Ok(TransactionAnalysis {
            classification: classify_ordered(swaps),
            finding: None,
            pools,
            analyzed: true,
        })
    }

    async fn all_protocol_pools(&self, pools: &[Address]) -> bool {
        self.fan_out(pools, |pool| self.resolver.is_protocol_pool(pool))
            .await
            .into_iter()
            .all(|valid| valid)
    }

    async fn resolve_tokens(&self, addresses: &[Address]) -> EngineResult<HashMap<Address, Token>> {
        self.fan_out(addresses, |token| async move {
            self.resolver.token_metadata(token).await.map(|metadata| (token, metadata))
        })
        .await
        .into_iter()
        .collect()
    }

    /// Run one lookup per address with bounded concurrency.
    async fn fan_out<T, F, Fut>(&self, addresses: &[Address], lookup: F) -> Vec<T>
    where
        F: Fn(Address) -> Fut,
        Fut: Future<Output = T>,
    {
        stream::iter(addresses.iter().copied())
            .map(lookup)
            .buffer_unordered(self.config.max_concurrent_lookups.max(1))
            .collect()
            .await
    }
}

/// Deduplicate addresses, keeping first-seen order.
fn unique(addresses: impl IntoIterator<Item = Address>) -> Vec<Address> {
    let mut seen = HashSet::new();
    addresses
        .into_iter()
        .filter(|address| seen.insert(*address))
        .collect()
}
