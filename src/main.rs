//! raftkv - one node of a raft key-value cluster.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use raftkv::api::{ApiServer, AppState, ServerConfig};
use raftkv::raft::{ConsensusEngine, StandaloneEngine};
use raftkv::state::StoreStateMachine;
use raftkv::store::{SledStore, StorageEngine};
use raftkv::NodeConfig;

/// Raft key value store - one node of a raft key value cluster.
#[derive(Parser)]
#[command(name = "raftkv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Start {
        /// Storage path
        #[arg(long = "storage-path", default_value = "tmp/storage")]
        storage_path: PathBuf,

        /// HTTP port to use
        #[arg(short, long, default_value_t = 3000)]
        port: u16,

        /// Raft transport port to use
        #[arg(long = "raft-port", default_value_t = 1111)]
        raft_port: u16,

        /// Node id
        #[arg(long = "node-id", default_value = "1")]
        node_id: String,

        /// Host to bind the HTTP API to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Start {
            storage_path,
            port,
            raft_port,
            node_id,
            host,
        } => {
            let config = NodeConfig::builder()
                .node_id(node_id)
                .host(host)
                .port(port)
                .raft_port(raft_port)
                .storage_path(storage_path)
                .build()
                .map_err(|e| anyhow::anyhow!(e))?;

            start(config).await
        }
    }
}

async fn start(config: NodeConfig) -> Result<()> {
    tracing::info!(
        node_id = %config.node_id,
        storage = %config.storage_path.display(),
        port = config.port,
        raft_port = config.raft_port,
        "starting node"
    );

    // Half-initialized nodes must not serve traffic: a storage failure here
    // is fatal.
    let store: Arc<dyn StorageEngine> = Arc::new(
        SledStore::open(&config.storage_path).context("failed to open storage engine")?,
    );

    let machine = Arc::new(StoreStateMachine::new(Arc::clone(&store)));
    let engine: Arc<dyn ConsensusEngine> =
        Arc::new(StandaloneEngine::new(machine, config.local_member()));

    let state = Arc::new(AppState::new(
        config.node_id.clone(),
        Arc::clone(&engine),
        Arc::clone(&store),
        config.propose_timeout(),
    ));

    let mut server_config = ServerConfig::new(config.host.clone(), config.port);
    server_config.shutdown_grace = config.shutdown_grace();

    let server = ApiServer::new(server_config, state);
    let shutdown = server.shutdown_handle();
    let mut server_task = tokio::spawn(async move { server.run().await });

    tokio::select! {
        result = &mut server_task => {
            // The server stopped on its own (e.g. the bind failed).
            result.context("server task failed")??;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
            shutdown.shutdown();
            server_task.await.context("server task failed")??;
        }
    }

    // Collaborators close only after the listener is down.
    store.flush().context("failed to flush storage")?;
    tracing::info!("node stopped");

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
