mod table;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use skywatch_events::{
    extract_with_fallback, upstream_error, AstroClient, EventsOutcome, EventsQuery,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "skywatch-cli")]
#[command(about = "Extract astronomy events from upstream JSON")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Normalize events from a JSON file (or stdin)
    Extract {
        /// Path to a JSON document; `-` or omitted reads stdin
        path: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Fetch events from the upstream API and normalize them
    Fetch {
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Observer elevation in metres
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        elevation: f64,
        #[arg(long)]
        days: Option<u32>,
        /// Celestial body, e.g. `sun` or `moon`
        #[arg(long)]
        body: Option<String>,
        /// First day of the window (YYYY-MM-DD), defaults to today (UTC)
        #[arg(long)]
        from: Option<NaiveDate>,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, clap::Args)]
struct OutputArgs {
    /// Print a JSON array instead of a table
    #[arg(long)]
    json: bool,
    /// Print at most this many events
    #[arg(long)]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Extract { path, output }) => run_extract(path.as_deref(), &output),
        Some(Commands::Fetch {
            lat,
            lon,
            elevation,
            days,
            body,
            from,
            output,
        }) => {
            let config = skywatch_core::load_app_config()?;
            let query = EventsQuery::new(
                body.as_deref().unwrap_or(&config.astro_default_body),
                lat.unwrap_or(config.astro_default_lat),
                lon.unwrap_or(config.astro_default_lon),
                from.unwrap_or_else(|| Utc::now().date_naive()),
                days.unwrap_or(config.astro_default_days),
            )?
            .with_elevation(elevation);
            let client = AstroClient::from_app_config(&config)?;
            let outcome = client
                .fetch_events(&query)
                .await
                .context("fetching astronomy events")?;
            print_outcome(outcome, &output)
        }
        None => {
            println!("skywatch-cli: use `extract` or `fetch` (see --help)");
            Ok(())
        }
    }
}

fn run_extract(path: Option<&Path>, output: &OutputArgs) -> anyhow::Result<()> {
    let raw = read_document(path)?;
    tracing::debug!(bytes = raw.len(), "read input document");
    let document: serde_json::Value =
        serde_json::from_str(&raw).context("input is not valid JSON")?;

    if let Some(err) = upstream_error(&document) {
        anyhow::bail!("document is an upstream error payload: {err}");
    }

    print_outcome(extract_with_fallback(&document), output)
}

fn read_document(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("reading {}", p.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn print_outcome(outcome: EventsOutcome, output: &OutputArgs) -> anyhow::Result<()> {
    let mut events = outcome.into_events();
    if let Some(limit) = output.limit {
        events.truncate(limit);
    }

    if output.json {
        println!("{}", serde_json::to_string_pretty(&events)?);
    } else {
        print!("{}", table::render_table(&events));
    }
    Ok(())
}
