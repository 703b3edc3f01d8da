use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use subsearch_core::archive::Progress;
use subsearch_core::{SearchConfig, Session};
use tracing_subscriber::{fmt, EnvFilter};

mod render;

use render::{render_outcome, render_summary, ExtractSummary};

const MAX_K: usize = 100;

#[derive(Parser)]
#[command(name = "subsearch")]
#[command(about = "Search subtitles stored in a SQLite archive by bag-of-words similarity", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct StoreArgs {
    /// SQLite subtitle store (overrides SUBSEARCH_DB)
    #[arg(long)]
    db: Option<PathBuf>,
    /// Preferred table; the first table is used when it is missing
    #[arg(long)]
    table: Option<String>,
    /// Fraction of extracted subtitles kept in memory, in (0, 1]
    #[arg(long)]
    retention: Option<f64>,
    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,
    /// Default number of results per query
    #[arg(long)]
    top_k: Option<usize>,
}

impl StoreArgs {
    fn config(&self) -> Result<SearchConfig> {
        let mut cfg = SearchConfig::from_env()?;
        if let Some(db) = &self.db { cfg.store_path = db.clone(); }
        if let Some(table) = &self.table { cfg.table = table.clone(); }
        if let Some(fraction) = self.retention { cfg.retention_fraction = fraction; }
        if let Some(seed) = self.seed { cfg.seed = Some(seed); }
        if let Some(k) = self.top_k { cfg.top_k = k; }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Load and sample the store, then report what was extracted
    Extract {
        #[command(flatten)]
        store: StoreArgs,
        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run a single query
    Search {
        #[command(flatten)]
        store: StoreArgs,
        /// Free-text query
        #[arg(long, short)]
        query: String,
        /// Number of results (defaults to --top-k)
        #[arg(long, short)]
        k: Option<usize>,
    },
    /// Load once, then answer queries read from stdin (one per line, `:quit` to stop)
    Repl {
        #[command(flatten)]
        store: StoreArgs,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { store, json } => extract(&store.config()?, json),
        Commands::Search { store, query, k } => {
            let cfg = store.config()?;
            let session = load(&cfg)?;
            let k = k.unwrap_or(cfg.top_k).clamp(1, MAX_K);
            let outcome = session.search(&query, k);
            render_outcome(&mut io::stdout().lock(), &query, &outcome, cfg.preview_chars)?;
            Ok(())
        }
        Commands::Repl { store } => {
            let cfg = store.config()?;
            let session = load(&cfg)?;
            repl(&session, &cfg)
        }
    }
}

fn report_progress(p: Progress) {
    if p.processed == p.total || p.processed % 50 == 0 {
        eprint!("\rextracting rows: {}/{} ({:.0}%)", p.processed, p.total, p.fraction() * 100.0);
        if p.processed == p.total {
            eprintln!();
        }
    }
}

fn load(cfg: &SearchConfig) -> Result<Session> {
    let session = Session::load(cfg, &mut report_progress)
        .with_context(|| format!("failed to load subtitles from {}", cfg.store_path.display()))?;
    if session.is_empty() {
        eprintln!("error: no subtitles loaded from the store; check the database path and content");
    } else {
        eprintln!(
            "loaded {} subtitles ({:.0}% of {} extracted)",
            session.len(),
            cfg.retention_fraction * 100.0,
            session.summary().extracted
        );
    }
    Ok(session)
}

fn extract(cfg: &SearchConfig, json: bool) -> Result<()> {
    let session = load(cfg)?;
    let summary = ExtractSummary::new(session.summary(), session.len());
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &summary)?;
        writeln!(out)?;
    } else {
        render_summary(&mut out, &summary)?;
    }
    Ok(())
}

fn repl(session: &Session, cfg: &SearchConfig) -> Result<()> {
    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    write!(out, "query> ")?;
    out.flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let query = line.trim();
        if query == ":quit" || query == ":q" {
            break;
        }
        let outcome = session.search(query, cfg.top_k.clamp(1, MAX_K));
        render_outcome(&mut out, query, &outcome, cfg.preview_chars)?;
        write!(out, "query> ")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}
