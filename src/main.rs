mod config;
mod deadline;
mod document;
mod fetch;
mod harvest;
mod identifier;
mod listing;
mod models;
mod store;
#[cfg(test)]
mod testlog;

use anyhow::{Context, Result};
use clap::Parser;
use config::{HarvestConfig, DEFAULT_LOCAL_BASE_URL};
use document::DocumentExtractor;
use fetch::HttpFetcher;
use harvest::Harvester;
use models::RunSummary;
use std::path::PathBuf;
use store::Store;

#[derive(Parser)]
#[command(name = "jobharvest")]
#[command(about = "Harvest job ads from a listing page into a SQLite database")]
struct Cli {
    /// URL or path of a local HTML file with the job listings
    input: String,

    /// Path to the output SQLite database
    output: PathBuf,

    /// Base URL for relative links when the input is a local file
    #[arg(long, default_value = DEFAULT_LOCAL_BASE_URL)]
    base_url: String,

    /// Directory for temporary document copies (default: system temp dir)
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Process everything but roll back instead of saving
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .filter_module("pdf_extract", log::LevelFilter::Error)
        .filter_module("lopdf", log::LevelFilter::Error)
        .format_timestamp_secs()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = HarvestConfig::new(&cli.base_url, cli.dry_run)?;
    let mut store = Store::open(&cli.output)?;
    log::debug!("Using database {}", store.path().display());

    let fetcher = HttpFetcher::new(config.local_base_url.clone())?;
    let mut documents = DocumentExtractor::pdf(&fetcher);
    if let Some(dir) = &cli.temp_dir {
        documents = documents.with_temp_dir(dir);
    }

    let harvester = Harvester::new(&fetcher, &documents, &config)?;
    let summary = harvester
        .run(&cli.input, &mut store)
        .with_context(|| format!("Harvest of {} was rolled back", cli.input))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, store.count()?);
    }

    Ok(())
}

fn print_summary(summary: &RunSummary, total: usize) {
    println!("Input: {}", summary.location);
    if let Some(job_type) = &summary.job_type {
        println!("Job type: {}", job_type);
    }
    println!("  Found:           {}", summary.found);
    println!("  Added:           {}", summary.inserted.len());
    println!("  Already present: {}", summary.skipped.len());
    if !summary.failed.is_empty() {
        println!("  Failed:          {}", summary.failed.len());
        for failed in &summary.failed {
            println!("    {} - {}: {}", failed.id, truncate(&failed.title, 40), failed.reason);
        }
    }
    println!("  Records in database: {}", total);

    if !summary.committed {
        println!("\n(Dry run - no job ads were saved)");
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_positional_arguments() {
        let cli = Cli::try_parse_from(["jobharvest", "jobs.html", "jobs.db", "--dry-run"]).unwrap();
        assert_eq!(cli.input, "jobs.html");
        assert_eq!(cli.output, PathBuf::from("jobs.db"));
        assert_eq!(cli.base_url, DEFAULT_LOCAL_BASE_URL);
        assert!(cli.dry_run);
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_requires_output() {
        assert!(Cli::try_parse_from(["jobharvest", "jobs.html"]).is_err());
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("Mitarbeiter", 20), "Mitarbeiter");
        assert_eq!(truncate("Wissenschaftliche Mitarbeiterin", 10), "Wissens...");
        assert_eq!(truncate("Größenänderung", 6), "Grö...");
    }
}
