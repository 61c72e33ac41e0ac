//! Rendering of classified swaps into findings.

use alloy::primitives::B256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::PROTOCOL_NAME;
use crate::path::{SwapClassification, SwapPath};
use crate::types::{Swap, SwapKind};
use crate::units::format_amount;

/// Finding category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingType {
    Info,
}

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingSeverity {
    Info,
}

/// Report handed to the delivery layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub name: String,
    pub description: String,
    pub alert_id: String,
    #[serde(rename = "type")]
    pub finding_type: FindingType,
    pub severity: FindingSeverity,
    pub protocol: String,
    pub metadata: BTreeMap<String, String>,
}

/// Compose the finding for a classification, if any.
///
/// Metadata `tokenIn`/`amountIn` describe what the beneficiary received and
/// `tokenOut`/`amountOut` what it paid. Amounts are raw integers.
pub fn compose_finding(classification: &SwapClassification, tx_hash: B256) -> Option<Finding> {
    match classification {
        SwapClassification::None => None,
        SwapClassification::Simple(swap) => Some(simple_swap_finding(swap, tx_hash)),
        SwapClassification::MultiHop(path) => Some(multi_hop_finding(path, tx_hash)),
    }
}

fn simple_swap_finding(swap: &Swap, tx_hash: B256) -> Finding {
    let mut metadata = BTreeMap::new();
    metadata.insert("beneficiary".to_string(), swap.recipient.to_string());
    metadata.insert("tokenIn".to_string(), swap.token_out.name.clone());
    metadata.insert("tokenOut".to_string(), swap.token_in.name.clone());
    metadata.insert("amountIn".to_string(), swap.amount_out.to_string());
    metadata.insert("amountOut".to_string(), swap.amount_in.to_string());
    metadata.insert("liquidityPool".to_string(), swap.liquidity_pool.to_string());
    metadata.insert("transactionHash".to_string(), tx_hash.to_string());

    build(SwapKind::Simple, describe(swap, swap), metadata)
}

fn multi_hop_finding(path: &SwapPath, tx_hash: B256) -> Finding {
    let (first, last) = (path.first(), path.last());
    let pools = path
        .pools()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");

    let mut metadata = BTreeMap::new();
    metadata.insert("beneficiary".to_string(), path.beneficiary().to_string());
    metadata.insert("liquidityPools".to_string(), pools);
    metadata.insert("hops".to_string(), path.len().to_string());
    metadata.insert("tokenIn".to_string(), last.token_out.name.clone());
    metadata.insert("tokenOut".to_string(), first.token_in.name.clone());
    metadata.insert("amountIn".to_string(), last.amount_out.to_string());
    metadata.insert("amountOut".to_string(), first.amount_in.to_string());
    metadata.insert("transactionHash".to_string(), tx_hash.to_string());

    build(SwapKind::MultiHop, describe(first, last), metadata)
}

fn describe(first: &Swap, last: &Swap) -> String {
    format!(
        "Swap {}-{} for {}-{}",
        format_amount(first.amount_in, first.token_in.decimals),
        first.token_in.symbol,
        format_amount(last.amount_out, last.token_out.decimals),
        last.token_out.symbol,
    )
}

fn build(kind: SwapKind, description: String, metadata: BTreeMap<String, String>) -> Finding {
    Finding {
        name: kind.finding_name().to_string(),
        description,
        alert_id: kind.alert_id().to_string(),
        finding_type: FindingType::Info,
        severity: FindingSeverity::Info,
        protocol: PROTOCOL_NAME.to_string(),
        metadata,
    }
}
