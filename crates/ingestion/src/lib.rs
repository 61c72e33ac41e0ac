//! Transaction ingestion and on-chain reads for swapscope.

pub mod rpc_client;
pub mod log_decoder;
pub mod block_processor;

pub use block_processor::BlockProcessor;
pub use rpc_client::RpcClient;
