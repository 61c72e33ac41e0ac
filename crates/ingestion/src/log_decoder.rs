//! Decoding of receipt logs into engine log entries.

use alloy::primitives::{Address, Bytes, Log, B256};
use alloy::sol_types::SolEvent;
use serde::Deserialize;
use serde_json::Value;
use swapscope_engine::abi;
use swapscope_engine::{SwapLog, TransactionEvent, TransferLog, TxLog};

/// Log as it appears in a JSON-RPC receipt; block metadata is ignored.
#[derive(Debug, Deserialize)]
struct ReceiptLog {
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
}

/// Decode one log as an ERC-20 `Transfer` or a pool `Swap`.
///
/// Anything else, including ERC-721 transfers sharing the ERC-20 topic,
/// yields `None`.
pub fn decode_log(log: &Log) -> Option<TxLog> {
    // Both events carry the signature plus two indexed addresses.
    if log.topics().len() != 3 {
        return None;
    }
    match log.topics().first() {
        Some(topic) if *topic == abi::Transfer::SIGNATURE_HASH => {
            let event = abi::Transfer::decode_log(log, true).ok()?;
            Some(TxLog::Transfer(TransferLog {
                token: event.address,
                from: event.data.from,
                to: event.data.to,
                value: event.data.value,
            }))
        }
        Some(topic) if *topic == abi::Swap::SIGNATURE_HASH => {
            let event = abi::Swap::decode_log(log, true).ok()?;
            Some(TxLog::Swap(SwapLog {
                pool: event.address,
                sender: event.data.sender,
                recipient: event.data.recipient,
                amount0: event.data.amount0,
                amount1: event.data.amount1,
            }))
        }
        _ => None,
    }
}

/// Decode the relevant logs of a receipt, preserving their order.
pub fn decode_receipt_logs(receipt: &Value) -> anyhow::Result<Vec<TxLog>> {
    let raw = receipt
        .get("logs")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Receipt missing logs"))?;
    let logs: Vec<ReceiptLog> = serde_json::from_value(raw)?;

    Ok(logs
        .into_iter()
        .filter_map(|log| Log::new(log.address, log.topics, log.data))
        .filter_map(|log| decode_log(&log))
        .collect())
}

/// Build a transaction event from a JSON-RPC transaction object and its receipt.
pub fn transaction_event(tx_json: &Value, receipt: &Value) -> anyhow::Result<TransactionEvent> {
    let (hash, from, to) = transaction_header(tx_json)?;
    Ok(TransactionEvent {
        hash,
        from,
        to,
        logs: decode_receipt_logs(receipt)?,
    })
}

/// Extract hash, sender and destination from a JSON-RPC transaction object.
pub fn transaction_header(tx_json: &Value) -> anyhow::Result<(B256, Address, Option<Address>)> {
    let hash = tx_json["hash"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Transaction missing hash"))?
        .parse()?;
    let from = tx_json["from"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Transaction missing from"))?
        .parse()?;
    let to = match tx_json["to"].as_str() {
        Some(to) => Some(to.parse()?),
        None => None,
    };
    Ok((hash, from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::aliases::{I24, U160};
    use alloy::primitives::{I256, U256};
    use serde_json::json;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    fn transfer_log() -> Log {
        let event = abi::Transfer {
            from: addr(1),
            to: addr(2),
            value: U256::from(1_000u64),
        };
        Log {
            address: addr(0x10),
            data: event.encode_log_data(),
        }
    }

    fn swap_log() -> Log {
        let event = abi::Swap {
            sender: addr(3),
            recipient: addr(4),
            amount0: I256::try_from(-500i64).unwrap(),
            amount1: I256::try_from(480i64).unwrap(),
            sqrtPriceX96: U160::from(1u64),
            liquidity: 1u128,
            tick: I24::ZERO,
        };
        Log {
            address: addr(0x40),
            data: event.encode_log_data(),
        }
    }

    fn to_json(log: &Log) -> Value {
        json!({
            "address": log.address,
            "topics": log.topics(),
            "data": log.data.data,
            "logIndex": "0x0",
        })
    }

    #[test]
    fn test_decode_transfer() {
        let decoded = decode_log(&transfer_log()).unwrap();
        assert_eq!(
            decoded,
            TxLog::Transfer(TransferLog {
                token: addr(0x10),
                from: addr(1),
                to: addr(2),
                value: U256::from(1_000u64),
            })
        );
    }

    #[test]
    fn test_decode_swap() {
        let TxLog::Swap(swap) = decode_log(&swap_log()).unwrap() else {
            panic!("expected swap");
        };
        assert_eq!(swap.pool, addr(0x40));
        assert_eq!(swap.sender, addr(3));
        assert_eq!(swap.recipient, addr(4));
        assert!(swap.amount0.is_negative());
        assert_eq!(swap.amount1, I256::try_from(480i64).unwrap());
    }

    #[test]
    fn test_ignores_unrelated_logs() {
        let unrelated = Log::new_unchecked(addr(9), vec![B256::repeat_byte(0xab)], Bytes::new());
        assert!(decode_log(&unrelated).is_none());

        // ERC-721 Transfer: same topic, token id indexed, no data.
        let mut topics = transfer_log().topics().to_vec();
        topics.push(B256::with_last_byte(7));
        let nft = Log::new_unchecked(addr(9), topics, Bytes::new());
        assert!(decode_log(&nft).is_none());
    }

    #[test]
    fn test_receipt_logs_keep_order() {
        let receipt = json!({
            "status": "0x1",
            "logs": [to_json(&swap_log()), to_json(&transfer_log())],
        });
        let logs = decode_receipt_logs(&receipt).unwrap();
        assert_eq!(logs.len(), 2);
        assert!(matches!(logs[0], TxLog::Swap(_)));
        assert!(matches!(logs[1], TxLog::Transfer(_)));
    }

    #[test]
    fn test_transaction_header() {
        let tx = json!({
            "hash": B256::repeat_byte(0x11),
            "from": addr(1),
            "to": null,
        });
        let (hash, from, to) = transaction_header(&tx).unwrap();
        assert_eq!(hash, B256::repeat_byte(0x11));
        assert_eq!(from, addr(1));
        assert_eq!(to, None);

        assert!(transaction_header(&json!({ "from": addr(1) })).is_err());
    }
}
