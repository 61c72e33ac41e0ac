//! Ethereum JSON-RPC client for transaction ingestion and view calls.

use alloy::primitives::{Address, B256};
use alloy::sol_types::SolCall;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use swapscope_engine::abi::{IERC20Metadata, IUniswapV3PoolImmutables};
use swapscope_engine::ChainReader;
use swapscope_telemetry::Metrics;
use tokio::time::Instant;
use tracing::{debug, info};

/// Ethereum RPC client wrapper.
pub struct RpcClient {
    client: Client,
    rpc_url: String,
    metrics: Metrics,
}

impl RpcClient {
    /// Create a new RPC client.
    ///
    /// # Arguments
    /// * `rpc_url` - HTTP/HTTPS JSON-RPC endpoint URL
    /// * `metrics` - Metrics collector
    pub fn new(rpc_url: &str, metrics: Metrics) -> Result<Self> {
        info!("Initialized RPC client for {}", rpc_url);

        Ok(Self {
            client: Client::new(),
            rpc_url: rpc_url.to_string(),
            metrics,
        })
    }

    async fn call_rpc(&self, operation: &str, method: &str, params: Value) -> Result<Value> {
        let start = Instant::now();
        let result = self.send(method, params).await;
        self.metrics
            .observe_rpc_latency(operation, start.elapsed().as_secs_f64());
        if result.is_err() {
            self.metrics.inc_rpc_errors();
        }
        result
    }

    async fn send(&self, method: &str, params: Value) -> Result<Value> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let response = self.client
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("RPC request failed with status: {}", response.status()));
        }

        let mut result: Value = response.json().await?;

        if let Some(error) = result.get("error") {
            return Err(anyhow::anyhow!("RPC error: {}", error));
        }

        result
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| anyhow::anyhow!("RPC response missing result"))
    }

    /// Get the latest block number.
    pub async fn get_latest_block_number(&self) -> Result<u64> {
        let result = self.call_rpc("get_block_number", "eth_blockNumber", json!([])).await?;
        let hex_str = result.as_str().ok_or_else(|| anyhow::anyhow!("Invalid response"))?;
        let block_num = u64::from_str_radix(hex_str.strip_prefix("0x").unwrap_or(hex_str), 16)?;
        debug!("Latest block number: {}", block_num);
        Ok(block_num)
    }

    /// Get a block by number with full transaction objects.
    pub async fn get_block(&self, block_number: u64) -> Result<Option<Value>> {
        let hex_block = format!("0x{:x}", block_number);
        let result = self
            .call_rpc("get_block", "eth_getBlockByNumber", json!([hex_block, true]))
            .await?;

        if result.is_null() {
            return Ok(None);
        }

        debug!("Fetched block {}", block_number);
        Ok(Some(result))
    }

    /// Get a transaction object by hash.
    pub async fn get_transaction(&self, hash: B256) -> Result<Option<Value>> {
        let result = self
            .call_rpc("get_transaction", "eth_getTransactionByHash", json!([hash]))
            .await?;
        Ok((!result.is_null()).then_some(result))
    }

    /// Get a transaction receipt, including its logs.
    pub async fn get_transaction_receipt(&self, hash: B256) -> Result<Option<Value>> {
        let result = self
            .call_rpc("get_receipt", "eth_getTransactionReceipt", json!([hash]))
            .await?;
        Ok((!result.is_null()).then_some(result))
    }

    /// Execute a read-only call against the latest block and return the raw output.
    pub async fn eth_call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>> {
        let params = json!([
            { "to": format!("{:#x}", to), "data": format!("0x{}", hex::encode(data)) },
            "latest"
        ]);
        let result = self.call_rpc("eth_call", "eth_call", params).await?;
        let hex_str = result.as_str().ok_or_else(|| anyhow::anyhow!("Invalid eth_call response"))?;
        Ok(hex::decode(hex_str.strip_prefix("0x").unwrap_or(hex_str))?)
    }

    async fn view<C>(&self, to: Address, call: Vec<u8>) -> Result<C::Return>
    where
        C: SolCall,
        C::Return: Send,
    {
        let output = self.eth_call(to, &call).await?;
        if output.is_empty() {
            return Err(anyhow::anyhow!("empty return data from {}", to));
        }
        Ok(C::abi_decode_returns(&output, true)?)
    }
}

#[async_trait]
impl ChainReader for RpcClient {
    async fn factory(&self, pool: Address) -> Result<Address> {
        let call = IUniswapV3PoolImmutables::factoryCall {}.abi_encode();
        Ok(self.view::<IUniswapV3PoolImmutables::factoryCall>(pool, call).await?._0)
    }

    async fn token0(&self, pool: Address) -> Result<Address> {
        let call = IUniswapV3PoolImmutables::token0Call {}.abi_encode();
        Ok(self.view::<IUniswapV3PoolImmutables::token0Call>(pool, call).await?._0)
    }

    async fn token1(&self, pool: Address) -> Result<Address> {
        let call = IUniswapV3PoolImmutables::token1Call {}.abi_encode();
        Ok(self.view::<IUniswapV3PoolImmutables::token1Call>(pool, call).await?._0)
    }

    async fn name(&self, token: Address) -> Result<String> {
        let call = IERC20Metadata::nameCall {}.abi_encode();
        Ok(self.view::<IERC20Metadata::nameCall>(token, call).await?._0)
    }

    async fn symbol(&self, token: Address) -> Result<String> {
        let call = IERC20Metadata::symbolCall {}.abi_encode();
        Ok(self.view::<IERC20Metadata::symbolCall>(token, call).await?._0)
    }

    async fn decimals(&self, token: Address) -> Result<u8> {
        let call = IERC20Metadata::decimalsCall {}.abi_encode();
        Ok(self.view::<IERC20Metadata::decimalsCall>(token, call).await?._0)
    }
}
