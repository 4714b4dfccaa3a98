use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use countdown_feed::common::types::date_key;
use countdown_feed::completion::CompletionStore;
use countdown_feed::config::Config;
use countdown_feed::infra::http_client::ReqwestHttp;
use countdown_feed::logging;
use countdown_feed::metrics;
use countdown_feed::server::{self, AppState};
use countdown_feed::visibility::{visible_actions, QueryOverride};
use countdown_feed::{parse_csv_date, FeedIngestor, FieldNormalizer, VisibilityGate};

#[derive(Parser)]
#[command(name = "countdown_feed")]
#[command(about = "Daily action feed ingestion from a spreadsheet export")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the sheet once and print the visible actions
    Fetch {
        /// Environment override, as the `env` query parameter: dev or prd
        #[arg(long)]
        env: Option<String>,
        /// Print the actions as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Fetch the sheet and report rows dropped for bad dates
    Audit {
        /// Print the full ingest snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Serve the feed over HTTP
    Serve {
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Parse a single date cell the way the ingestor would
    ParseDate { value: String },
}

fn build_ingestor(config: &Config) -> anyhow::Result<FeedIngestor> {
    let http = ReqwestHttp::new(config.feed.timeout()).context("building HTTP client")?;
    Ok(FeedIngestor::new(
        Arc::new(http),
        Arc::new(FieldNormalizer::new(config.defaults.clone())),
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load().context("loading configuration")?;
    info!(sheet_url = %config.feed.sheet_url, mode = ?config.visibility.mode, "configuration loaded");

    match cli.command {
        Commands::Fetch { env, json } => {
            let ingestor = build_ingestor(&config)?;
            let gate = VisibilityGate::new(config.visibility.mode, config.visibility.build_is_dev);
            let dev_mode = gate.is_dev_mode(QueryOverride::from_query_value(env.as_deref()));

            let actions = ingestor.fetch_feed(&config.feed.sheet_url).await;
            let visible = visible_actions(dev_mode, &actions);
            if json {
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else {
                println!("{} actions ({} visible, dev mode {})", actions.len(), visible.len(), dev_mode);
                for action in visible {
                    println!("  {}  {}  [{}]", action.date_key(), action.headline, action.labels.join(", "));
                }
            }
        }
        Commands::Audit { json } => {
            let ingestor = build_ingestor(&config)?;
            let snapshot = ingestor
                .fetch(&config.feed.sheet_url)
                .await
                .context("fetching sheet")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                return Ok(());
            }
            println!(
                "{} rows decoded, {} kept, {} dropped",
                snapshot.rows_decoded,
                snapshot.actions.len(),
                snapshot.rows_dropped()
            );
            for rejected in &snapshot.rejected {
                println!("  row {}: {:?} ({})", rejected.row_number, rejected.raw_date, rejected.reason);
            }
        }
        Commands::Serve { port } => {
            let handle = metrics::init_metrics();
            if handle.is_none() {
                warn!("serving without /metrics");
            }
            let completions = CompletionStore::open(&config.completion.path);
            info!(path = %completions.path().display(), "completion store ready");

            let state = AppState {
                ingestor: Arc::new(build_ingestor(&config)?),
                sheet_url: Arc::from(config.feed.sheet_url.as_str()),
                gate: Arc::new(VisibilityGate::new(
                    config.visibility.mode,
                    config.visibility.build_is_dev,
                )),
                completions: Arc::new(completions),
                metrics: handle,
            };
            server::start_server(state, port.unwrap_or(config.server.port)).await?;
        }
        Commands::ParseDate { value } => match parse_csv_date(&value) {
            Ok(date) => println!("{}", date_key(date)),
            Err(e) => println!("rejected: {e}"),
        },
    }
    Ok(())
}
