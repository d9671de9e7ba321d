//! ItemGraph translation CLI
//!
//! # Usage
//!
//! ```bash
//! # Built-in MAGE mapping, SQLite output
//! itemgraph-translate --source mage.jsonl --sqlite genomic.db
//!
//! # Custom mapping and run configuration, JSON-lines output
//! itemgraph-translate --source mage.jsonl --mapping mapping.yaml \
//!     --config translate.yaml --jsonl genomic.jsonl
//! ```
//!
//! Logging follows `RUST_LOG` (default `info`). The run report is printed to
//! stdout as JSON.

use clap::{ArgGroup, Parser};
use itemgraph_store::{read_items_jsonl, BufferedItemWriter, JsonlItemWriter, TargetGraphSink};
use itemgraph_translate::{FieldMapping, TranslationConfig, TranslationDriver};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "itemgraph-translate")]
#[command(about = "Translate a MAGE item graph into the genomic model", long_about = None)]
#[command(group(ArgGroup::new("output").required(true).args(["sqlite", "jsonl"])))]
struct Cli {
    /// Source items, one JSON item per line
    #[arg(short, long)]
    source: PathBuf,

    /// Class/field mapping (built-in MAGE mapping when omitted)
    #[arg(short, long)]
    mapping: Option<PathBuf>,

    /// Run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of phase-1 workers (0 = one per CPU)
    #[arg(long)]
    workers: Option<usize>,

    /// Write the target graph to a SQLite database
    #[arg(long)]
    sqlite: Option<PathBuf>,

    /// Write the target graph as JSON lines
    #[arg(long)]
    jsonl: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => TranslationConfig::from_yaml(path)?,
        None => TranslationConfig::default(),
    };
    if let Some(workers) = cli.workers {
        config = config.with_workers(workers);
    }

    let mapping = match &cli.mapping {
        Some(path) => FieldMapping::from_yaml(path)?,
        None => FieldMapping::builtin_mage()?,
    };

    let source = read_items_jsonl(&cli.source)?;
    info!(path = %cli.source.display(), items = source.len(), "Loaded source graph");

    let mut sink = BufferedItemWriter::with_config(open_sink(&cli)?, config.writer.clone())?;
    let report = TranslationDriver::new(&source, &mapping, config)?.run(&mut sink)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn open_sink(cli: &Cli) -> Result<Box<dyn TargetGraphSink>, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.jsonl {
        return Ok(Box::new(JsonlItemWriter::create(path)?));
    }

    #[cfg(feature = "sqlite")]
    if let Some(path) = &cli.sqlite {
        return Ok(Box::new(itemgraph_store::SqliteItemStore::open(path)?));
    }

    Err("SQLite output requires the `sqlite` feature".into())
}
