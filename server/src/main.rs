use anyhow::Result;
use axum::Router;
use clap::Parser;
use server::build_app;
use std::net::SocketAddr;
use std::path::PathBuf;
use subsearch_core::SearchConfig;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// SQLite subtitle store (overrides SUBSEARCH_DB)
    #[arg(long)]
    db: Option<PathBuf>,
    /// Preferred table name (overrides SUBSEARCH_TABLE)
    #[arg(long)]
    table: Option<String>,
    /// Fraction of subtitles kept after sampling (overrides SUBSEARCH_RETENTION)
    #[arg(long)]
    retention: Option<f64>,
    /// Sampling seed (overrides SUBSEARCH_SEED)
    #[arg(long)]
    seed: Option<u64>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut config = SearchConfig::from_env()?;
    if let Some(db) = args.db { config.store_path = db; }
    if let Some(table) = args.table { config.table = table; }
    if let Some(fraction) = args.retention { config.retention_fraction = fraction; }
    if let Some(seed) = args.seed { config.seed = Some(seed); }

    let app: Router = build_app(config).await?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
