//! Transaction, log and swap models.

use alloy::primitives::{Address, B256, I256, U256};
use serde::{Deserialize, Serialize};

/// ERC-20 token display metadata.
///
/// Identity is the address; the remaining fields only affect rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

/// A decoded `Transfer(address,address,uint256)` log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferLog {
    /// Emitting token contract.
    pub token: Address,
    pub from: Address,
    pub to: Address,
    pub value: U256,
}

/// A decoded Uniswap V3 pool `Swap` log.
///
/// Only the fields needed to rebuild the exchange are kept; price and tick
/// data are dropped by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapLog {
    /// Emitting pool contract.
    pub pool: Address,
    pub sender: Address,
    pub recipient: Address,
    pub amount0: I256,
    pub amount1: I256,
}

/// A log entry relevant to swap detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxLog {
    Transfer(TransferLog),
    Swap(SwapLog),
}

/// Everything the engine needs to know about one transaction.
///
/// `logs` keeps the order the node emitted them in; pairing and threading
/// depend on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEvent {
    pub hash: B256,
    /// Originating account.
    pub from: Address,
    /// Destination contract, `None` for contract creation.
    pub to: Option<Address>,
    pub logs: Vec<TxLog>,
}

impl TransactionEvent {
    /// Iterate over the transfer logs in emission order.
    pub fn transfers(&self) -> impl Iterator<Item = &TransferLog> {
        self.logs.iter().filter_map(|log| match log {
            TxLog::Transfer(transfer) => Some(transfer),
            TxLog::Swap(_) => None,
        })
    }

    /// Iterate over the pool swap logs in emission order.
    pub fn swaps(&self) -> impl Iterator<Item = &SwapLog> {
        self.logs.iter().filter_map(|log| match log {
            TxLog::Swap(swap) => Some(swap),
            TxLog::Transfer(_) => None,
        })
    }
}

/// One leg of a transfer chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub token_address: Address,
}

impl From<&TransferLog> for TransferEvent {
    fn from(log: &TransferLog) -> Self {
        Self {
            from: log.from,
            to: log.to,
            value: log.value,
            token_address: log.token,
        }
    }
}

/// One pool-level exchange.
///
/// `token_in` is what the taker sold into the pool, `token_out` what it got
/// back. Amounts are always magnitudes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swap {
    pub liquidity_pool: Address,
    pub sender: Address,
    pub recipient: Address,
    pub token_in: Token,
    pub amount_in: U256,
    pub token_out: Token,
    pub amount_out: U256,
}

/// Kind of swap activity reported for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapKind {
    Simple,
    MultiHop,
}

impl SwapKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapKind::Simple => "simple_swap",
            SwapKind::MultiHop => "multihop_swap",
        }
    }

    pub fn alert_id(&self) -> &'static str {
        match self {
            SwapKind::Simple => "UNISWAPV3-1",
            SwapKind::MultiHop => "UNISWAPV3-2",
        }
    }

    pub fn finding_name(&self) -> &'static str {
        match self {
            SwapKind::Simple => "Uniswap V3 Simple Swap",
            SwapKind::MultiHop => "Uniswap V3 Multihop Swap",
        }
    }
}
