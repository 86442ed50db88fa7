use std::sync::Arc;

use clap::Parser;

mod api;
mod config;
mod handler;
mod http;
mod logger;
mod server;
mod session;
mod store;

use handler::static_files::DirAssetStore;
use store::{DocumentStore, MemoryDocumentStore, SqliteDocumentStore};

/// `database.url` value selecting the process-local store
const MEMORY_STORE_URL: &str = "memory";

/// Edge router serving the session/document API and a single-page app
#[derive(Debug, Parser)]
#[command(name = "edge-gate", version, about)]
struct Cli {
    /// Configuration file path (extension optional)
    #[arg(short, long, default_value = "config")]
    config: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = config::Config::load_from(&cli.config)?;
    logger::init(&cfg)?;

    // Worker thread count follows server.workers, defaulting to CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    let (store, sqlite) = open_store(&cfg).await?;
    let assets = Arc::new(DirAssetStore::new(&cfg.assets.dir));

    let listener = server::create_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(config::AppState::new(cfg, store, assets)?);
    server::start_server_loop(listener, state, server::shutdown_signal()).await?;

    if let Some(sqlite) = sqlite {
        sqlite.close().await;
    }
    logger::log_info("Server stopped");
    Ok(())
}

/// Pick the storage collaborator from `database.url`
///
/// The SQLite handle is returned separately so the pool can be closed on
/// shutdown.
async fn open_store(
    cfg: &config::Config,
) -> Result<(Option<Arc<dyn DocumentStore>>, Option<SqliteDocumentStore>), store::StoreError> {
    match cfg.database.url.as_deref() {
        None => Ok((None, None)),
        Some(MEMORY_STORE_URL) => {
            let memory: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
            Ok((Some(memory), None))
        }
        Some(url) => {
            let sqlite = SqliteDocumentStore::connect(&cfg.database, url).await?;
            let shared: Arc<dyn DocumentStore> = Arc::new(sqlite.clone());
            Ok((Some(shared), Some(sqlite)))
        }
    }
}
