//! Read-only contract call interface.
//!
//! The engine never talks to a node directly. Anything that can answer these
//! view calls (a JSON-RPC client, a local fork, a test double) can back the
//! [`Resolver`](crate::Resolver).

use alloy::primitives::Address;
use async_trait::async_trait;

/// Trait for read-only contract readers.
///
/// Implementations should return an error for reverts, empty return data and
/// undecodable responses. Timeouts are applied by the caller.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// `factory()` of a Uniswap V3 pool.
    async fn factory(&self, pool: Address) -> anyhow::Result<Address>;

    /// `token0()` of a Uniswap V3 pool.
    async fn token0(&self, pool: Address) -> anyhow::Result<Address>;

    /// `token1()` of a Uniswap V3 pool.
    async fn token1(&self, pool: Address) -> anyhow::Result<Address>;

    /// `name()` of an ERC-20 token.
    async fn name(&self, token: Address) -> anyhow::Result<String>;

    /// `symbol()` of an ERC-20 token.
    async fn symbol(&self, token: Address) -> anyhow::Result<String>;

    /// `decimals()` of an ERC-20 token.
    async fn decimals(&self, token: Address) -> anyhow::Result<u8>;
}
