use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use swapflow::api::{create_router, AppState};
use swapflow::config::{AppConfig, LoggingConfig};
use swapflow::dex::{DexRouter, LiquiditySource, SimulatedDex};
use swapflow::engine::OrderExecutor;
use swapflow::error::Result;
use swapflow::notify::NotificationHub;
use swapflow::persistence::{MemoryStore, OrderStore, PgOrderStore};
use swapflow::queue::{JobHandler, JobQueue, QueueConfig};
use swapflow::services::OrderService;

#[derive(Parser, Debug)]
#[command(name = "swapflow", about = "Asynchronous market-swap execution engine")]
struct Cli {
    /// Configuration directory
    #[arg(short, long, default_value = "config")]
    config: String,

    /// Run against an in-memory store, no database required
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match AppConfig::load_from(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    if cli.dry_run {
        config.dry_run.enabled = true;
    }

    init_logging(&config.logging);

    if let Err(errors) = config.validate() {
        for message in &errors {
            error!("config error: {message}");
        }
        std::process::exit(1);
    }

    info!(
        dry_run = config.dry_run.enabled,
        concurrency = config.queue.concurrency,
        "starting swapflow"
    );

    let store: Arc<dyn OrderStore> = if config.dry_run.enabled {
        info!("dry run mode, using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await?;
        let store = PgOrderStore::new(pool);
        store.init_schema().await?;
        info!("database connected");
        Arc::new(store)
    };

    let hub = Arc::new(NotificationHub::new(store.clone()));

    let router = Arc::new(DexRouter::new(vec![
        Arc::new(SimulatedDex::raydium(config.simulator.clone())) as Arc<dyn LiquiditySource>,
        Arc::new(SimulatedDex::meteora(config.simulator.clone())) as Arc<dyn LiquiditySource>,
    ]));

    let executor = Arc::new(OrderExecutor::new(
        router,
        hub.clone(),
        Duration::from_millis(config.executor.phase_delay_ms),
    ));

    let queue = Arc::new(JobQueue::new(QueueConfig::from(&config.queue)));
    let workers = queue.start_workers(
        executor as Arc<dyn JobHandler>,
        config.queue.concurrency,
    );
    info!(workers = workers.len(), "worker pool started");

    let service = Arc::new(OrderService::new(
        store.clone(),
        queue.clone(),
        hub.clone(),
    ));

    let app = create_router(AppState {
        service,
        store,
        queue: queue.clone(),
        hub,
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");
    queue.shutdown();
    for worker in workers {
        if let Err(e) = worker.await {
            error!("worker task panicked: {e}");
        }
    }

    info!("shutdown complete");
    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},swapflow=debug,sqlx=warn", logging.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
