//! Path reconstruction and simple/multi-hop classification.
//!
//! Threading assumes a transaction contains exactly one linear trade. Transfers
//! from unrelated operations interleaved with the swap (airdrops, fee
//! transfers, a second independent swap) are not separated out: they either
//! break the chain, in which case nothing is reported, or get absorbed into it
//! when they happen to continue from the current address.
//!
//! Swap logs are threaded greedily, without backtracking. A route that passes
//! through the same token twice can be rejected when the first candidate
//! taken for that token leads to a dead end (e.g. hops A->B, B->A, A->C
//! emitted as A->C, B->A, A->B). Such transactions produce no finding.

use alloy::primitives::Address;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::types::{Swap, TransferEvent};

/// Ordered, non-empty sequence of swaps forming one user-level trade.
///
/// The constructor enforces `path[i].token_out == path[i + 1].token_in`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPath(Vec<Swap>);

impl SwapPath {
    /// Build a path, returning `None` if it is empty or token linkage breaks.
    pub fn new(swaps: Vec<Swap>) -> Option<Self> {
        if swaps.is_empty() {
            return None;
        }
        let continuous = swaps
            .windows(2)
            .all(|pair| pair[0].token_out.address == pair[1].token_in.address);
        continuous.then_some(Self(swaps))
    }

    pub fn swaps(&self) -> &[Swap] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The hop selling the path's input asset.
    pub fn first(&self) -> &Swap {
        &self.0[0]
    }

    /// The hop buying the path's output asset.
    pub fn last(&self) -> &Swap {
        &self.0[self.0.len() - 1]
    }

    /// Pools in traversal order.
    pub fn pools(&self) -> Vec<Address> {
        self.0.iter().map(|swap| swap.liquidity_pool).collect()
    }

    /// Account receiving the final output.
    pub fn beneficiary(&self) -> Address {
        self.last().recipient
    }

    pub fn into_swaps(self) -> Vec<Swap> {
        self.0
    }
}

/// Result of classifying a transaction's swap activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapClassification {
    None,
    Simple(Swap),
    MultiHop(SwapPath),
}

impl SwapClassification {
    fn from_path(path: SwapPath) -> Self {
        if path.len() == 1 {
            let mut swaps = path.into_swaps();
            match swaps.pop() {
                Some(swap) => SwapClassification::Simple(swap),
                None => SwapClassification::None,
            }
        } else {
            SwapClassification::MultiHop(path)
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, SwapClassification::None)
    }
}

/// Classify normalized pool swaps, ordering them by token linkage.
///
/// Multi-hop routes may emit their swaps out of path order (exact-output
/// routes execute the last hop first), so swaps are threaded rather than
/// taken in log order.
pub fn classify_swaps(swaps: Vec<Swap>) -> SwapClassification {
    if swaps.is_empty() {
        return SwapClassification::None;
    }
    order_swaps(swaps)
        .and_then(SwapPath::new)
        .map_or(SwapClassification::None, SwapClassification::from_path)
}

/// Classify swaps that are already in path order, such as those rebuilt from
/// a transfer chain.
pub fn classify_ordered(swaps: Vec<Swap>) -> SwapClassification {
    SwapPath::new(swaps).map_or(SwapClassification::None, SwapClassification::from_path)
}

/// Thread swaps from `token_out` to the next `token_in`.
///
/// The path starts at the first swap, in log order, whose input asset is not
/// produced by another swap; cyclic routes start at the first swap. Returns
/// `None` unless every swap ends up on the path.
pub fn order_swaps(swaps: Vec<Swap>) -> Option<Vec<Swap>> {
    let produced: HashSet<Address> = swaps.iter().map(|s| s.token_out.address).collect();
    let start = swaps
        .iter()
        .position(|s| !produced.contains(&s.token_in.address))
        .unwrap_or(0);

    let mut by_input: HashMap<Address, VecDeque<usize>> = HashMap::new();
    for (index, swap) in swaps.iter().enumerate() {
        if index != start {
            by_input.entry(swap.token_in.address).or_default().push_back(index);
        }
    }

    let mut order = Vec::with_capacity(swaps.len());
    let mut current = start;
    order.push(current);
    while order.len() < swaps.len() {
        let next = by_input
            .get_mut(&swaps[current].token_out.address)
            .and_then(VecDeque::pop_front)?;
        order.push(next);
        current = next;
    }

    let mut slots: Vec<Option<Swap>> = swaps.into_iter().map(Some).collect();
    order.into_iter().map(|index| slots[index].take()).collect()
}

/// Order transfers into one chain starting at `origin`.
///
/// Each step follows the previous leg's `to` to the first unused transfer
/// sent from that address, in log order. Returns `None` when the count is
/// zero or odd, or when the chain cannot consume every transfer.
pub fn chain_transfers(origin: Address, transfers: &[TransferEvent]) -> Option<Vec<TransferEvent>> {
    if transfers.is_empty() || transfers.len() % 2 != 0 {
        return None;
    }

    let mut by_sender: HashMap<Address, VecDeque<usize>> = HashMap::new();
    for (index, transfer) in transfers.iter().enumerate() {
        by_sender.entry(transfer.from).or_default().push_back(index);
    }

    let mut chain = Vec::with_capacity(transfers.len());
    let mut current = origin;
    while chain.len() < transfers.len() {
        let index = by_sender.get_mut(&current).and_then(VecDeque::pop_front)?;
        let transfer = &transfers[index];
        current = transfer.to;
        chain.push(transfer.clone());
    }
    Some(chain)
}

/// Split a transfer chain into (paid into pool, paid out of pool) units.
///
/// Every unit must meet at a single address, the pool.
pub fn pair_transfer_legs(chain: &[TransferEvent]) -> Option<Vec<(&TransferEvent, &TransferEvent)>> {
    if chain.is_empty() || chain.len() % 2 != 0 {
        return None;
    }
    chain
        .chunks_exact(2)
        .map(|unit| (unit[0].to == unit[1].from).then_some((&unit[0], &unit[1])))
        .collect()
}
