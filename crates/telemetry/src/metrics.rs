//! Prometheus metrics for swap detection.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};

/// Metrics collector for the swapscope service.
///
/// Each instance owns its registry so several collectors can coexist.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    blocks_processed: IntCounter,
    transactions_processed: IntCounter,
    router_transactions: IntCounter,
    findings: IntCounterVec,
    analysis_failures: IntCounter,
    rpc_errors: IntCounter,
    rpc_latency: HistogramVec,
    cache_lookups: IntGaugeVec,
    cache_entries: IntGaugeVec,
}

impl Metrics {
    /// Create a new metrics instance.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let blocks_processed = IntCounter::new(
            "swapscope_blocks_processed_total",
            "Total number of blocks processed",
        )?;
        let transactions_processed = IntCounter::new(
            "swapscope_transactions_processed_total",
            "Total number of transactions seen",
        )?;
        let router_transactions = IntCounter::new(
            "swapscope_router_transactions_total",
            "Transactions sent to a known router and analyzed",
        )?;
        let findings = IntCounterVec::new(
            Opts::new("swapscope_findings_total", "Findings emitted by swap kind"),
            &["kind"],
        )?;
        let analysis_failures = IntCounter::new(
            "swapscope_analysis_failures_total",
            "Transactions whose analysis failed",
        )?;
        let rpc_errors = IntCounter::new("swapscope_rpc_errors_total", "Total number of RPC errors")?;
        let rpc_latency = HistogramVec::new(
            HistogramOpts::new("swapscope_rpc_latency_seconds", "RPC call latency in seconds"),
            &["operation"],
        )?;
        let cache_lookups = IntGaugeVec::new(
            Opts::new("swapscope_cache_lookups", "Cache lookups by cache and outcome"),
            &["cache", "outcome"],
        )?;
        let cache_entries = IntGaugeVec::new(
            Opts::new("swapscope_cache_entries", "Entries currently held by each cache"),
            &["cache"],
        )?;

        registry.register(Box::new(blocks_processed.clone()))?;
        registry.register(Box::new(transactions_processed.clone()))?;
        registry.register(Box::new(router_transactions.clone()))?;
        registry.register(Box::new(findings.clone()))?;
        registry.register(Box::new(analysis_failures.clone()))?;
        registry.register(Box::new(rpc_errors.clone()))?;
        registry.register(Box::new(rpc_latency.clone()))?;
        registry.register(Box::new(cache_lookups.clone()))?;
        registry.register(Box::new(cache_entries.clone()))?;

        Ok(Self {
            registry,
            blocks_processed,
            transactions_processed,
            router_transactions,
            findings,
            analysis_failures,
            rpc_errors,
            rpc_latency,
            cache_lookups,
            cache_entries,
        })
    }

    pub fn inc_blocks_processed(&self) {
        self.blocks_processed.inc();
    }

    pub fn inc_transactions_processed(&self, count: u64) {
        self.transactions_processed.inc_by(count);
    }

    pub fn inc_router_transactions(&self) {
        self.router_transactions.inc();
    }

    /// Count a finding of the given kind (e.g. "simple_swap").
    pub fn inc_findings(&self, kind: &str) {
        self.findings.with_label_values(&[kind]).inc();
    }

    pub fn inc_analysis_failures(&self) {
        self.analysis_failures.inc();
    }

    pub fn inc_rpc_errors(&self) {
        self.rpc_errors.inc();
    }

    /// Record RPC latency.
    pub fn observe_rpc_latency(&self, operation: &str, duration_secs: f64) {
        self.rpc_latency.with_label_values(&[operation]).observe(duration_secs);
    }

    /// Publish a cache snapshot.
    pub fn record_cache(&self, cache: &str, hits: u64, misses: u64, entries: usize) {
        self.cache_lookups
            .with_label_values(&[cache, "hit"])
            .set(i64::try_from(hits).unwrap_or(i64::MAX));
        self.cache_lookups
            .with_label_values(&[cache, "miss"])
            .set(i64::try_from(misses).unwrap_or(i64::MAX));
        self.cache_entries
            .with_label_values(&[cache])
            .set(i64::try_from(entries).unwrap_or(i64::MAX));
    }

    /// Get Prometheus metrics as a string.
    pub fn gather(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
