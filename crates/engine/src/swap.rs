//! Normalization of raw log entries into [`Swap`] records.

use alloy::primitives::I256;
use tracing::debug;

use crate::types::{Swap, SwapLog, Token, TransferEvent};

/// Build a swap from a pool `Swap` log and the pool's resolved tokens.
///
/// The leg with a strictly positive delta is the output leg, the other leg
/// must be non-positive and is the input leg. Any other sign combination is
/// malformed and yields `None`.
pub fn build_swap(log: &SwapLog, token0: &Token, token1: &Token) -> Option<Swap> {
    let (out_leg, in_leg) = match classify_deltas(log.amount0, log.amount1) {
        Some(LegOrder::Token0Out) => ((token0, log.amount0), (token1, log.amount1)),
        Some(LegOrder::Token1Out) => ((token1, log.amount1), (token0, log.amount0)),
        None => {
            debug!(
                "Discarding malformed swap on {}: amount0={} amount1={}",
                log.pool, log.amount0, log.amount1
            );
            return None;
        }
    };

    Some(Swap {
        liquidity_pool: log.pool,
        sender: log.sender,
        recipient: log.recipient,
        token_in: in_leg.0.clone(),
        amount_in: in_leg.1.unsigned_abs(),
        token_out: out_leg.0.clone(),
        amount_out: out_leg.1.unsigned_abs(),
    })
}

/// Build a swap from the leg paid into a pool and the leg paid out of it.
///
/// The two legs must meet at the same address, which becomes the pool.
pub fn build_swap_from_transfers(
    inbound: &TransferEvent,
    outbound: &TransferEvent,
    token_in: Token,
    token_out: Token,
) -> Option<Swap> {
    if inbound.to != outbound.from
        || token_in.address != inbound.token_address
        || token_out.address != outbound.token_address
    {
        return None;
    }

    Some(Swap {
        liquidity_pool: inbound.to,
        sender: inbound.from,
        recipient: outbound.to,
        token_in,
        amount_in: inbound.value,
        token_out,
        amount_out: outbound.value,
    })
}

enum LegOrder {
    Token0Out,
    Token1Out,
}

fn classify_deltas(amount0: I256, amount1: I256) -> Option<LegOrder> {
    match (amount0.is_positive(), amount1.is_positive()) {
        (true, false) => Some(LegOrder::Token0Out),
        (false, true) => Some(LegOrder::Token1Out),
        _ => None,
    }
}
