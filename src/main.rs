//! quotes: command line front end for quotes-rs
//!
//! `quotes search <name | ISIN>` prints the symbol, name, market and last
//! price of every matching asset.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use quotes_rs::{
    config,
    output::{self, OutputFormat},
    normalize, InvalidQuery, RetryPolicy, Search, SearchError,
};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "quotes", version = quotes_rs::VERSION, about = "Financial asset lookup")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search a financial asset
    #[command(long_about = "Search a financial asset by name or ISIN and return the following \
information:\nSymbol, Name, Market, Last price\n\nUsage: quotes search [name | ISIN]")]
    Search(SearchArgs),
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Name or ISIN of the asset; several words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,

    /// Display output in a table (same as --format table)
    #[arg(long)]
    pretty: bool,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Log more info
    #[arg(short, long)]
    verbose: bool,

    /// Retries after a transient network failure
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Delay before the first retry, doubled for each following one
    #[arg(long, default_value_t = 500)]
    backoff_ms: u64,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<f64>,

    /// Path to a settings file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl SearchArgs {
    fn output_format(&self) -> OutputFormat {
        match (self.format, self.pretty) {
            (Some(format), _) => format,
            (None, true) => OutputFormat::Table,
            (None, false) => OutputFormat::Csv,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Command::Search(args) => args.verbose,
    };
    init_logging(verbose);

    let result = match cli.command {
        Command::Search(args) => run_search(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
    let default = if verbose { "warn,quotes_rs=debug,quotes=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let query = normalize(&args.query.join(" "))?;

    let mut settings = config::load(args.config.as_deref())?;
    if let Some(timeout) = args.timeout {
        settings.outgoing.request_timeout = timeout;
        settings.validate()?;
    }
    let search = Search::from_settings(&settings)?;
    info!("Using source {} at {}", search.engine_name(), settings.source.base_url);
    let policy = RetryPolicy::new(args.retries, Duration::from_millis(args.backoff_ms));

    if args.verbose {
        eprintln!("Searching for '{}'...", query);
    }
    let result = policy.run(&search, &query).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if result.is_empty() {
        writeln!(out, "No result found.")?;
        return Ok(());
    }

    if args.verbose {
        eprintln!("Results found:");
    }
    output::render(&result, args.output_format(), &mut out)?;

    Ok(())
}

/// 2 invalid query, 3 network failure, 4 parse failure, 1 anything else
fn exit_code(error: &anyhow::Error) -> u8 {
    if error.downcast_ref::<InvalidQuery>().is_some() {
        return 2;
    }
    match error.downcast_ref::<SearchError>() {
        Some(SearchError::Network(_)) => 3,
        Some(SearchError::Parse(_)) => 4,
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotes_rs::{NetworkFailure, ParseFailure};

    #[test]
    fn test_cli_parses_search() {
        let cli = Cli::try_parse_from(["quotes", "search", "--pretty", "Total", "Energies"]).unwrap();
        let Command::Search(args) = cli.command;
        assert_eq!(args.query, vec!["Total", "Energies"]);
        assert_eq!(args.output_format(), OutputFormat::Table);
        assert_eq!(args.retries, 0);
    }

    #[test]
    fn test_cli_requires_query() {
        assert!(Cli::try_parse_from(["quotes", "search"]).is_err());
    }

    #[test]
    fn test_format_overrides_pretty() {
        let cli =
            Cli::try_parse_from(["quotes", "search", "--pretty", "--format", "json", "LVMH"]).unwrap();
        let Command::Search(args) = cli.command;
        assert_eq!(args.output_format(), OutputFormat::Json);
    }

    #[test]
    fn test_exit_codes() {
        let invalid = anyhow::Error::from(InvalidQuery::Empty);
        let network = anyhow::Error::from(SearchError::from(NetworkFailure::Timeout));
        let parse = anyhow::Error::from(SearchError::from(ParseFailure::Blocked));

        assert_eq!(exit_code(&invalid), 2);
        assert_eq!(exit_code(&network), 3);
        assert_eq!(exit_code(&parse), 4);
        assert_eq!(exit_code(&anyhow::anyhow!("bad settings")), 1);
    }
}
