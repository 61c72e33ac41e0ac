//! In-memory contract reader for engine tests.

#![allow(dead_code)]

use alloy::primitives::{Address, B256, I256, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use swapscope_engine::config::{EngineConfig, UNISWAP_V3_FACTORY, UNISWAP_V3_SWAP_ROUTER};
use swapscope_engine::{ChainReader, SwapAnalyzer, SwapLog, TransactionEvent, TransferLog, TxLog};

pub fn addr(byte: u8) -> Address {
    Address::from([byte; 20])
}

#[derive(Clone)]
struct MockPool {
    factory: Address,
    token0: Address,
    token1: Address,
}

#[derive(Clone)]
struct MockToken {
    name: String,
    symbol: String,
    decimals: u8,
}

/// Contract reader backed by maps, counting every call.
#[derive(Default)]
pub struct MockReader {
    pools: Mutex<HashMap<Address, MockPool>>,
    tokens: Mutex<HashMap<Address, MockToken>>,
    hanging: Mutex<HashSet<Address>>,
    latency: Mutex<Option<Duration>>,
    calls: Mutex<HashMap<(&'static str, Address), usize>>,
    total: AtomicUsize,
}

impl MockReader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_pool(&self, pool: Address, token0: Address, token1: Address) {
        self.add_foreign_pool(pool, UNISWAP_V3_FACTORY, token0, token1);
    }

    pub fn add_foreign_pool(&self, pool: Address, factory: Address, token0: Address, token1: Address) {
        self.pools.lock().unwrap().insert(pool, MockPool { factory, token0, token1 });
    }

    pub fn add_token(&self, token: Address, name: &str, symbol: &str, decimals: u8) {
        self.tokens.lock().unwrap().insert(
            token,
            MockToken {
                name: name.to_string(),
                symbol: symbol.to_string(),
                decimals,
            },
        );
    }

    /// Calls against `address` never complete.
    pub fn hang(&self, address: Address) {
        self.hanging.lock().unwrap().insert(address);
    }

    /// Every call sleeps for `latency` before answering.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    pub fn calls(&self, method: &'static str, address: Address) -> usize {
        self.calls.lock().unwrap().get(&(method, address)).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    async fn record(&self, method: &'static str, address: Address) {
        *self.calls.lock().unwrap().entry((method, address)).or_default() += 1;
        self.total.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let hangs = self.hanging.lock().unwrap().contains(&address);
        if hangs {
            std::future::pending::<()>().await;
        }
    }

    fn pool(&self, pool: Address) -> anyhow::Result<MockPool> {
        self.pools
            .lock()
            .unwrap()
            .get(&pool)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("execution reverted"))
    }

    fn token(&self, token: Address) -> anyhow::Result<MockToken> {
        self.tokens
            .lock()
            .unwrap()
            .get(&token)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("execution reverted"))
    }
}

#[async_trait]
impl ChainReader for MockReader {
    async fn factory(&self, pool: Address) -> anyhow::Result<Address> {
        self.record("factory", pool).await;
        Ok(self.pool(pool)?.factory)
    }

    async fn token0(&self, pool: Address) -> anyhow::Result<Address> {
        self.record("token0", pool).await;
        Ok(self.pool(pool)?.token0)
    }

    async fn token1(&self, pool: Address) -> anyhow::Result<Address> {
        self.record("token1", pool).await;
        Ok(self.pool(pool)?.token1)
    }

    async fn name(&self, token: Address) -> anyhow::Result<String> {
        self.record("name", token).await;
        Ok(self.token(token)?.name)
    }

    async fn symbol(&self, token: Address) -> anyhow::Result<String> {
        self.record("symbol", token).await;
        Ok(self.token(token)?.symbol)
    }

    async fn decimals(&self, token: Address) -> anyhow::Result<u8> {
        self.record("decimals", token).await;
        Ok(self.token(token)?.decimals)
    }
}

pub fn test_config() -> EngineConfig {
    EngineConfig {
        call_timeout_ms: 200,
        ..EngineConfig::default()
    }
}

pub fn analyzer(reader: &Arc<MockReader>) -> SwapAnalyzer {
    SwapAnalyzer::new(reader.clone(), test_config())
}

pub fn router_tx(from: Address, logs: Vec<TxLog>) -> TransactionEvent {
    TransactionEvent {
        hash: B256::repeat_byte(0x77),
        from,
        to: Some(UNISWAP_V3_SWAP_ROUTER),
        logs,
    }
}

pub fn transfer(token: Address, from: Address, to: Address, value: u64) -> TxLog {
    TxLog::Transfer(TransferLog {
        token,
        from,
        to,
        value: U256::from(value),
    })
}

pub fn swap(pool: Address, recipient: Address, amount0: i64, amount1: i64) -> TxLog {
    TxLog::Swap(SwapLog {
        pool,
        sender: UNISWAP_V3_SWAP_ROUTER,
        recipient,
        amount0: I256::try_from(amount0).unwrap(),
        amount1: I256::try_from(amount1).unwrap(),
    })
}

pub const SHORT: Duration = Duration::from_millis(200);
