//! Recipe Box server binary.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recipe_box::db::{self, BootstrapOptions, BootstrapReport, Db};
use recipe_box::{router, AppState, Config};

#[derive(Parser, Debug)]
#[command(name = "recipe-box", version, about = "Recipe keeping REST API")]
struct Cli {
    /// JSON configuration file
    #[arg(long, default_value = "dev.config")]
    config: PathBuf,

    /// Create the schema and load the seed files before serving
    #[arg(long)]
    bootstrap: bool,

    /// With --bootstrap, rebuild even if the database has data
    #[arg(long, requires = "bootstrap")]
    force: bool,

    /// Enable debug mode regardless of the config file
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipe_box=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if cli.debug {
        config.debug = true;
    }
    config.validate().context("invalid configuration")?;

    info!("Starting Recipe Box");
    info!(dialect = %config.db_dialect, debug = config.debug, "configuration loaded");

    let pool = db::connect(&config.db_dsn)
        .await
        .context("connecting to database")?;

    if cli.bootstrap {
        let options = BootstrapOptions {
            seed_dir: config.seed_dir.clone(),
            force: cli.force,
            hash_cost: config.bcrypt_cost,
        };
        match db::bootstrap(&pool, config.db_dialect, &options)
            .await
            .context("bootstrapping database")?
        {
            BootstrapReport::Skipped => info!("bootstrap skipped"),
            BootstrapReport::Seeded(counts) => info!(?counts, "database seeded"),
        }
    }

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config, Db::new(pool.clone()));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {bind_addr}"))?;
    info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
