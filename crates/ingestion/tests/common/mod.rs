//! Local JSON-RPC node and in-memory contract reader for ingestion tests.

#![allow(dead_code)]

use alloy::primitives::{Address, Log};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use swapscope_engine::config::UNISWAP_V3_FACTORY;
use swapscope_engine::ChainReader;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

pub fn addr(byte: u8) -> Address {
    Address::from([byte; 20])
}

type Handler = dyn Fn(&Value) -> Value + Send + Sync;

/// HTTP/1.1 server answering every request body with `handler(request)`.
pub struct MockNode {
    pub url: String,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockNode {
    pub async fn start<H>(handler: H) -> Self
    where
        H: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let seen = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, handler.clone(), seen.clone()));
            }
        });

        Self { url, requests }
    }

    /// Number of requests made for a JSON-RPC method.
    pub fn count(&self, method: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request["method"] == method)
            .count()
    }
}

async fn serve(stream: TcpStream, handler: Arc<Handler>, requests: Arc<Mutex<Vec<Value>>>) {
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);

    loop {
        let mut content_length = 0usize;
        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
            let header = line.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
        }

        let mut body = vec![0u8; content_length];
        if reader.read_exact(&mut body).await.is_err() {
            return;
        }
        let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        let response = handler(&request).to_string();
        requests.lock().unwrap().push(request);

        let reply = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{}",
            response.len(),
            response
        );
        if write.write_all(reply.as_bytes()).await.is_err() {
            return;
        }
    }
}

/// Wrap `result` in a JSON-RPC success envelope.
pub fn rpc_result(result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": 1, "result": result })
}

/// A receipt log in node JSON form.
pub fn log_json(log: &Log) -> Value {
    json!({
        "address": log.address,
        "topics": log.topics(),
        "data": log.data.data,
    })
}

/// Contract reader answering from fixed pool and token tables.
#[derive(Default)]
pub struct StaticReader {
    pools: Mutex<HashMap<Address, (Address, Address)>>,
    tokens: Mutex<HashMap<Address, (String, u8)>>,
}

impl StaticReader {
    pub fn add_pool(&self, pool: Address, token0: Address, token1: Address) {
        self.pools.lock().unwrap().insert(pool, (token0, token1));
    }

    pub fn add_token(&self, token: Address, symbol: &str, decimals: u8) {
        self.tokens
            .lock()
            .unwrap()
            .insert(token, (symbol.to_string(), decimals));
    }

    fn pool(&self, pool: Address) -> anyhow::Result<(Address, Address)> {
        self.pools
            .lock()
            .unwrap()
            .get(&pool)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("execution reverted"))
    }

    fn token(&self, token: Address) -> anyhow::Result<(String, u8)> {
        self.tokens
            .lock()
            .unwrap()
            .get(&token)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("execution reverted"))
    }
}

#[async_trait]
impl ChainReader for StaticReader {
    async fn factory(&self, pool: Address) -> anyhow::Result<Address> {
        self.pool(pool).map(|_| UNISWAP_V3_FACTORY)
    }

    async fn token0(&self, pool: Address) -> anyhow::Result<Address> {
        Ok(self.pool(pool)?.0)
    }

    async fn token1(&self, pool: Address) -> anyhow::Result<Address> {
        Ok(self.pool(pool)?.1)
    }

    async fn name(&self, token: Address) -> anyhow::Result<String> {
        Ok(format!("{} token", self.token(token)?.0))
    }

    async fn symbol(&self, token: Address) -> anyhow::Result<String> {
        Ok(self.token(token)?.0)
    }

    async fn decimals(&self, token: Address) -> anyhow::Result<u8> {
        Ok(self.token(token)?.1)
    }
}
