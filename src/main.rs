use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;

use elsevier_search::{
    config::Config, utils::init_logger, ElsevierClient, PaginatedSearch, SearchRequest,
};

#[derive(Parser)]
#[command(
    name = "elsevier-search",
    about = "Search an Elsevier index and export the results as a table",
    version
)]
struct Cli {
    /// Search query, e.g. "TITLE-ABS-KEY(heart attack)".
    query: String,

    /// Index to search (scopus, sciencedirect, author, affiliation, ...).
    #[arg(short, long, default_value = "scopus")]
    index: String,

    /// Follow pagination links to retrieve every result (up to 5000).
    #[arg(short, long)]
    all: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Summary,
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(&format!("elsevier_search={}", cli.log_level));

    let config = Config::from_env()?;
    let client = ElsevierClient::new(&config.api)?;

    let request = SearchRequest::with_base_url(&config.api.base_url, cli.query, cli.index);
    let mut search = PaginatedSearch::from(request);
    search.execute(&client, cli.all).await?;

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    let table = search.table()?;
    match cli.format {
        OutputFormat::Summary => {
            writeln!(out, "uri:       {}", search.request_uri()?)?;
            writeln!(out, "total:     {}", search.total_result_count()?)?;
            writeln!(out, "retrieved: {}", search.retrieved_count()?)?;
            writeln!(out, "complete:  {}", search.has_all_results()?)?;
            writeln!(out, "columns:   {}", table.columns().join(", "))?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, table)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => table.write_csv(&mut out)?,
    }
    out.flush()?;

    if let Some(path) = &cli.output {
        info!(path = %path.display(), rows = table.len(), "Results written");
    }

    Ok(())
}
