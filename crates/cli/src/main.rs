//! `tazeai` — the gateway server binary.

use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tazeai_auth::{Auth, CacheSessionStorage};
use tazeai_cache::Cache;
use tazeai_core::Config;
use tazeai_db::Db;
use tazeai_http::{AppState, create_router};
use tazeai_llm::ProviderRegistry;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tazeai", version, about = "TazeAI gateway server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve {
        /// Bind address; overrides the HOST environment variable.
        #[arg(long)]
        host: Option<String>,
        /// Port; overrides the PORT environment variable.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply the database schema migrations and exit.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("loading configuration")?;

    match cli.command {
        Command::Serve { host, port } => serve(config, host, port).await,
        Command::Migrate => {
            let db = Db::connect(&config.database_url).await.context("connecting to postgres")?;
            db.migrate().await.context("applying migrations")?;
            Ok(())
        },
    }
}

async fn serve(config: Config, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let db = Db::connect(&config.database_url).await.context("connecting to postgres")?;
    db.migrate().await.context("applying migrations")?;

    let cache = Arc::new(
        Cache::new(&config.redis_url)
            .context("opening redis")?
            .with_prefix(config.cache_prefix.clone()),
    );
    let storage =
        Arc::new(CacheSessionStorage::new(Arc::clone(&cache)).with_ttl(config.session_ttl_secs));
    let auth = Auth::new(storage, db.clone(), config.session_ttl_secs);
    let llm = ProviderRegistry::from_config(&config).context("configuring LLM providers")?;

    let router = create_router(Arc::new(AppState { db, cache, auth, llm }));

    let host = host.unwrap_or(config.host);
    let port = port.unwrap_or(config.port);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "gateway listening");
    axum::serve(listener, router).await.context("server error")
}
