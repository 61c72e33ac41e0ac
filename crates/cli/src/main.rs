//! CLI for the swapscope Uniswap V3 swap detector.

use alloy::primitives::B256;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use swapscope_engine::{ChainReader, EngineConfig, SwapAnalyzer};
use swapscope_ingestion::{BlockProcessor, RpcClient};
use swapscope_telemetry::{init_logging, LogFormat, Metrics};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[command(name = "swapscope")]
#[command(about = "Detects Uniswap V3 simple and multi-hop swaps in Ethereum transactions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// Ethereum execution RPC URL
    #[arg(long, default_value = "http://localhost:8545")]
    rpc_url: String,

    /// JSON engine configuration (routers, factory, cache sizes, timeouts)
    #[arg(long)]
    config: Option<String>,

    /// Log filter, e.g. "info" or "swapscope_engine=debug"
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format: json or pretty
    #[arg(long, default_value = "json")]
    log_format: String,

    /// Append emitted findings to this JSON lines file
    #[arg(long)]
    sample_output_path: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow new blocks and report swaps as they land
    Watch {
        #[command(flatten)]
        common: CommonArgs,

        /// Poll interval in seconds
        #[arg(long, default_value = "12")]
        poll_interval_seconds: u64,

        /// Metrics bind address
        #[arg(long, default_value = "0.0.0.0:9090")]
        metrics_bind_address: String,

        /// First block to process; defaults to the next block after the current head
        #[arg(long)]
        from_block: Option<u64>,
    },
    /// Analyze a single transaction and print its finding
    Inspect {
        #[command(flatten)]
        common: CommonArgs,

        /// Transaction hash
        #[arg(long)]
        tx_hash: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            common,
            poll_interval_seconds,
            metrics_bind_address,
            from_block,
        } => {
            init_logging(common.log_level.as_deref(), common.log_format.parse::<LogFormat>()?)?;
            run_watch(common, poll_interval_seconds, &metrics_bind_address, from_block).await?;
        }
        Commands::Inspect { common, tx_hash } => {
            init_logging(common.log_level.as_deref(), common.log_format.parse::<LogFormat>()?)?;
            let hash: B256 = tx_hash.parse()?;
            run_inspect(common, hash).await?;
        }
    }

    Ok(())
}

fn build_processor(common: &CommonArgs, metrics: &Metrics) -> anyhow::Result<(Arc<RpcClient>, BlockProcessor)> {
    let config = match &common.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    info!(
        "Engine configured with {} router(s), factory {}",
        config.routers.len(),
        config.factory
    );

    let rpc = Arc::new(RpcClient::new(&common.rpc_url, metrics.clone())?);
    let reader: Arc<dyn ChainReader> = rpc.clone();
    let analyzer = SwapAnalyzer::new(reader, config);
    let processor = BlockProcessor::new(
        rpc.clone(),
        analyzer,
        metrics.clone(),
        common.sample_output_path.clone(),
    );
    Ok((rpc, processor))
}

async fn run_watch(
    common: CommonArgs,
    poll_interval: u64,
    metrics_addr: &str,
    from_block: Option<u64>,
) -> anyhow::Result<()> {
    info!("Starting swapscope watcher");

    let metrics = Metrics::new()?;
    let (rpc_client, processor) = build_processor(&common, &metrics)?;

    start_metrics_server(metrics_addr, metrics.clone()).await?;

    let mut last_block = match from_block {
        Some(block) => block.saturating_sub(1),
        None => {
            let latest = rpc_client.get_latest_block_number().await?;
            info!("Starting after latest block: {}", latest);
            latest
        }
    };
    let poll_duration = Duration::from_secs(poll_interval);

    loop {
        match rpc_client.get_latest_block_number().await {
            Ok(latest_block) => {
                if latest_block > last_block {
                    debug!("Processing blocks from {} to {}", last_block + 1, latest_block);
                    for block_num in (last_block + 1)..=latest_block {
                        match rpc_client.get_block(block_num).await {
                            Ok(Some(block_json)) => match processor.process_block(&block_json).await {
                                Ok(findings) => {
                                    for finding in findings {
                                        println!("{}", serde_json::to_string(&finding)?);
                                    }
                                    last_block = block_num;
                                }
                                Err(e) => {
                                    error!("Failed to process block {}: {}", block_num, e);
                                    break;
                                }
                            },
                            Ok(None) => {
                                warn!("Block {} not found", block_num);
                                break;
                            }
                            Err(e) => {
                                error!("Failed to fetch block {}: {}", block_num, e);
                                break;
                            }
                        }
                    }
                } else {
                    debug!("No new blocks, latest: {}", latest_block);
                }
            }
            Err(e) => {
                error!("Failed to get latest block number: {}", e);
            }
        }

        sleep(poll_duration).await;
    }
}

async fn run_inspect(common: CommonArgs, hash: B256) -> anyhow::Result<()> {
    let metrics = Metrics::new()?;
    let (_, processor) = build_processor(&common, &metrics)?;

    let analysis = processor.inspect_transaction(hash).await?;
    match analysis.finding {
        Some(finding) => println!("{}", serde_json::to_string_pretty(&finding)?),
        None => info!("No Uniswap V3 swap detected in {}", hash),
    }
    Ok(())
}

async fn start_metrics_server(addr: &str, metrics: Metrics) -> anyhow::Result<()> {
    use axum::{
        extract::State,
        http::StatusCode,
        response::IntoResponse,
        routing::get,
        Router,
    };

    let metrics = Arc::new(metrics);

    async fn metrics_handler(
        State(metrics): State<Arc<Metrics>>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match metrics.gather() {
            Ok(body) => Ok((StatusCode::OK, body)),
            Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Metrics server listening on http://{}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(())
}
