//! Block processing: router filtering, receipt decoding and swap analysis.

use alloy::primitives::B256;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use swapscope_engine::{Finding, SwapAnalyzer, SwapKind, TransactionAnalysis, TransactionEvent};
use swapscope_telemetry::{audit, Metrics};
use tracing::{debug, error, info, warn};

use crate::log_decoder::{transaction_event, transaction_header};
use crate::rpc_client::RpcClient;

/// Block processor feeding router transactions to the swap analyzer.
pub struct BlockProcessor {
    rpc: Arc<RpcClient>,
    analyzer: SwapAnalyzer,
    metrics: Metrics,
    sample_output_path: Option<String>,
}

#[derive(Debug, Serialize)]
struct AuditFinding<'a> {
    block_number: Option<u64>,
    transaction_hash: B256,
    finding: &'a Finding,
}

impl BlockProcessor {
    /// Create a new block processor.
    ///
    /// # Arguments
    /// * `rpc` - RPC client used for receipts
    /// * `analyzer` - Swap analyzer, normally reading through the same client
    /// * `metrics` - Metrics collector
    /// * `sample_output_path` - Optional path for the findings audit file
    pub fn new(
        rpc: Arc<RpcClient>,
        analyzer: SwapAnalyzer,
        metrics: Metrics,
        sample_output_path: Option<String>,
    ) -> Self {
        Self {
            rpc,
            analyzer,
            metrics,
            sample_output_path,
        }
    }

    /// Analyze every router transaction of a block and return its findings.
    ///
    /// A failing transaction is logged and counted; the rest of the block is
    /// still processed.
    pub async fn process_block(&self, block_json: &Value) -> anyhow::Result<Vec<Finding>> {
        let block_number_hex = block_json["number"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Block missing number"))?;
        let block_number = u64::from_str_radix(
            block_number_hex.strip_prefix("0x").unwrap_or(block_number_hex),
            16,
        )?;

        let transactions = block_json["transactions"]
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("Block missing transactions array"))?;

        debug!("Processing block {} with {} transactions", block_number, transactions.len());

        let mut findings = Vec::new();
        let mut router_count = 0usize;
        for tx_json in transactions {
            let (hash, _, to) = match transaction_header(tx_json) {
                Ok(header) => header,
                Err(e) => {
                    warn!("Skipping malformed transaction in block {}: {}", block_number, e);
                    continue;
                }
            };
            if !self.analyzer.is_router(to) {
                continue;
            }
            router_count += 1;
            self.metrics.inc_router_transactions();

            match self.analyze_transaction(tx_json, hash).await {
                Ok(analysis) => {
                    if let (Some(kind), Some(finding)) = (analysis.kind(), analysis.finding) {
                        self.record_finding(Some(block_number), hash, kind, &finding);
                        findings.push(finding);
                    }
                }
                Err(e) => {
                    self.metrics.inc_analysis_failures();
                    error!("Failed to analyze transaction {} in block {}: {:#}", hash, block_number, e);
                }
            }
        }

        self.metrics.inc_blocks_processed();
        self.metrics.inc_transactions_processed(transactions.len() as u64);
        self.publish_cache_stats().await;

        info!(
            "Processed block {}: {} transactions, {} router transactions, {} findings",
            block_number,
            transactions.len(),
            router_count,
            findings.len()
        );

        Ok(findings)
    }

    /// Analyze a single transaction by hash.
    ///
    /// Transactions not sent to a configured router come back unanalyzed.
    pub async fn inspect_transaction(&self, hash: B256) -> anyhow::Result<TransactionAnalysis> {
        let tx_json = self
            .rpc
            .get_transaction(hash)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", hash))?;

        let analysis = self.analyze_transaction(&tx_json, hash).await?;
        if !analysis.analyzed {
            info!("Transaction {} was not sent to a known router", hash);
        }
        if let (Some(kind), Some(finding)) = (analysis.kind(), &analysis.finding) {
            let block_number = tx_json["blockNumber"]
                .as_str()
                .and_then(|n| u64::from_str_radix(n.strip_prefix("0x").unwrap_or(n), 16).ok());
            self.record_finding(block_number, hash, kind, finding);
        }
        self.publish_cache_stats().await;
        Ok(analysis)
    }

    async fn analyze_transaction(
        &self,
        tx_json: &Value,
        hash: B256,
    ) -> anyhow::Result<TransactionAnalysis> {
        let (_, from, to) = transaction_header(tx_json)?;
        if !self.analyzer.is_router(to) {
            let event = TransactionEvent {
                hash,
                from,
                to,
                logs: Vec::new(),
            };
            return Ok(self.analyzer.analyze(&event).await?);
        }

        let receipt = self
            .rpc
            .get_transaction_receipt(hash)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Receipt for {} not found", hash))?;
        let event = transaction_event(tx_json, &receipt)?;
        Ok(self.analyzer.analyze(&event).await?)
    }

    fn record_finding(&self, block_number: Option<u64>, hash: B256, kind: SwapKind, finding: &Finding) {
        self.metrics.inc_findings(kind.as_str());
        let record = AuditFinding {
            block_number,
            transaction_hash: hash,
            finding,
        };
        if let Some(ref path) = self.sample_output_path {
            if let Err(e) = audit::write_audit_sample(Some(path), &record) {
                warn!("Failed to write audit sample: {}", e);
            }
        }
    }

    async fn publish_cache_stats(&self) {
        for stats in self.analyzer.resolver().caches().stats().await {
            self.metrics
                .record_cache(stats.name, stats.hits, stats.misses, stats.len);
        }
    }
}
