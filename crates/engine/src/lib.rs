//! Uniswap V3 swap reconstruction and protocol attribution.
//!
//! Turns the decoded `Transfer`/`Swap` logs of one transaction into at most
//! one finding describing a simple or multi-hop trade.

pub mod abi;
pub mod analyzer;
pub mod cache;
pub mod config;
pub mod error;
pub mod finding;
pub mod path;
pub mod reader;
pub mod resolver;
pub mod swap;
pub mod types;
pub mod units;

pub use analyzer::{SwapAnalyzer, TransactionAnalysis};
pub use cache::{CacheStats, MetadataCache, ResolverCaches};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use finding::Finding;
pub use path::{SwapClassification, SwapPath};
pub use reader::ChainReader;
pub use resolver::Resolver;
pub use types::{Swap, SwapKind, SwapLog, Token, TransactionEvent, TransferEvent, TransferLog, TxLog};
