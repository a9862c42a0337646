use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use relscan_core::{DateRange, ReportConfig, parse_keywords};
use relscan_store::OutputFormat;
use relscan_sync::{TrackerClient, TrackerConfig};

mod display;
mod extract;
mod fields;

#[derive(Parser)]
#[command(name = "relscan", version, about = "Release and issue reports from a ticket tracker")]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract issues fixed in releases shipped inside a date range.
    Extract {
        #[command(flatten)]
        conn: Connection,

        /// Comma-separated project keys.
        #[arg(long, value_delimiter = ',', required = true)]
        projects: Vec<String>,

        /// First release date to include (YYYY-MM-DD).
        #[arg(long)]
        start: String,

        /// Last release date to include (YYYY-MM-DD).
        #[arg(long)]
        end: String,

        /// Comma-separated keywords; writes a second table of matches.
        #[arg(long, env = "RELSCAN_KEYWORDS")]
        keywords: Option<String>,

        /// JSON report config (field catalog, search columns).
        #[arg(long, env = "RELSCAN_CONFIG")]
        config: Option<PathBuf>,

        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// parquet or csv.
        #[arg(long, default_value = "parquet")]
        format: OutputFormat,

        /// Releases fetched in parallel.
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },

    /// Survey custom fields on recent issues to help write a report config.
    Fields {
        #[command(flatten)]
        conn: Connection,

        #[arg(long, value_delimiter = ',', required = true)]
        projects: Vec<String>,

        /// Issues sampled per project.
        #[arg(long, default_value_t = 5)]
        sample: u32,
    },

    /// Print rows of a Parquet report.
    Inspect {
        file: PathBuf,

        /// Show a single issue as a card.
        #[arg(long)]
        key: Option<String>,

        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Args)]
struct Connection {
    /// Tracker base URL.
    #[arg(long, env = "RELSCAN_URL")]
    url: String,

    #[arg(long, env = "RELSCAN_USER")]
    user: Option<String>,

    /// Password or API token.
    #[arg(long, env = "RELSCAN_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = "RELSCAN_API_VERSION", default_value = "2")]
    api_version: String,

    /// Accept invalid TLS certificates.
    #[arg(long, env = "RELSCAN_INSECURE")]
    insecure: bool,
}

impl Connection {
    fn client(self) -> anyhow::Result<TrackerClient> {
        let mut config = TrackerConfig::new(self.url);
        config.api_version = self.api_version;
        config.username = self.user;
        config.secret = self.token;
        config.accept_invalid_certs = self.insecure;
        TrackerClient::new(config).context("building HTTP client")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("relscan v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Extract {
            conn,
            projects,
            start,
            end,
            keywords,
            config,
            out_dir,
            format,
            concurrency,
        } => {
            let range = DateRange::parse(&start, &end).context("invalid date range")?;
            let report_config = match config {
                Some(path) => ReportConfig::load(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => ReportConfig::default(),
            };
            let options = extract::ExtractOptions {
                projects: projects
                    .iter()
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect(),
                range,
                keywords: keywords.as_deref().map(parse_keywords).unwrap_or_default(),
                out_dir,
                format,
                concurrency,
            };
            let client = conn.client()?;
            let stats = extract::run_extract_pipeline(&client, &report_config, &options).await?;
            stats.print_summary();
        }
        Command::Fields {
            conn,
            projects,
            sample,
        } => {
            let client = conn.client()?;
            fields::run_field_report(&client, &projects, sample).await?;
        }
        Command::Inspect { file, key, limit } => {
            let batches = relscan_store::read_parquet(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            match key {
                Some(key) => display::print_issue_cards(&batches, &key)?,
                None => display::print_rows(&batches, limit)?,
            }
        }
    }

    Ok(())
}
