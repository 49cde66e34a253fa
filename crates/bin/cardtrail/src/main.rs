//! # cardtrail: card movement tracker
//!
//! Composition root that wires the adapters together behind a small CLI.
//!
//! ## Responsibilities
//! - Load `.env`, parse CLI arguments and configuration
//! - Initialize logging
//! - Construct the Trello client, JSON cache and outputs (adapters)
//! - Construct the aggregator and tracking pipeline, injecting adapters via
//!   port traits
//! - Run the requested command and report the outcome
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer. No domain logic belongs here.

mod config;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cardtrail_adapter_cache_json::JsonFileCache;
use cardtrail_adapter_csv::CsvMovementFile;
use cardtrail_adapter_sheets::{
    GoogleSheetsWriter, ServiceAccountKey, ServiceAccountTokenSource, SheetsConfig,
};
use cardtrail_adapter_trello_reqwest::{TrelloClient, TrelloConfig};
use cardtrail_app::services::aggregator::MovementAggregator;
use cardtrail_app::services::tracking::{Scope, TrackingService};
use cardtrail_domain::id::BoardId;
use cardtrail_domain::movement::MovementRecord;

use crate::config::{Config, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(name = "cardtrail", version)]
#[command(about = "Track Trello card movements into CSV and Google Sheets")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch movements and append the new ones to every configured output
    Track {
        /// Only track this board instead of every accessible board
        #[arg(long)]
        board: Option<String>,
    },
    /// Print the movement history of one board
    Board {
        /// Board id (defaults to BOARD_ID)
        board: Option<String>,
    },
}

type Aggregator = MovementAggregator<TrelloClient, JsonFileCache>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    init_tracing(&config.logging.filter);

    let aggregator = build_aggregator(&config)?;

    match cli.command {
        Command::Track { board } => {
            let scope = match board {
                Some(id) => Scope::Board(BoardId::new(id)?),
                None => Scope::AllBoards,
            };
            track(&config, aggregator, scope).await
        }
        Command::Board { board } => {
            let Some(id) = board.or_else(|| config.trello.board_id.clone()) else {
                Cli::command()
                    .error(
                        clap::error::ErrorKind::MissingRequiredArgument,
                        "no board id provided; pass one or set BOARD_ID",
                    )
                    .exit();
            };
            print_board(&aggregator, &BoardId::new(id)?).await
        }
    }
}

fn init_tracing(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

fn build_aggregator(config: &Config) -> anyhow::Result<Aggregator> {
    let trello = TrelloConfig {
        base_url: config.trello.base_url.clone(),
        timeout: Duration::from_secs(config.trello.timeout_secs),
        ..TrelloConfig::new(&config.trello.api_key, &config.trello.api_token)
    };
    let api = TrelloClient::new(trello).context("failed to build Trello client")?;
    let cache = JsonFileCache::new(&config.cache.path).with_freshness(config.cache.freshness());

    Ok(MovementAggregator::new(api, cache).with_strategy(config.trello.strategy))
}

fn build_sheets(
    config: &Config,
) -> anyhow::Result<Option<GoogleSheetsWriter<ServiceAccountTokenSource>>> {
    let sheets = &config.sheets;
    let Some(spreadsheet_id) = sheets.spreadsheet_id.as_ref().filter(|_| sheets.enabled) else {
        tracing::debug!("sheets output disabled");
        return Ok(None);
    };

    let key = ServiceAccountKey::from_file(&sheets.service_account_key_path)?;
    let http = reqwest::Client::new();
    let tokens = ServiceAccountTokenSource::new(http.clone(), key)?;
    let target = SheetsConfig {
        sheet_name: sheets.sheet_name.clone(),
        ..SheetsConfig::new(spreadsheet_id)
    };
    Ok(Some(GoogleSheetsWriter::new(http, target, tokens)))
}

async fn track(config: &Config, aggregator: Aggregator, scope: Scope) -> anyhow::Result<()> {
    let csv = CsvMovementFile::new(&config.output.csv_path);
    let sheets = build_sheets(config).context("failed to set up the sheets output")?;
    let service = TrackingService::new(aggregator, csv.clone(), (csv, sheets));

    let report = service
        .run(scope)
        .await
        .context("failed to track card movements")?;
    println!(
        "Card movement tracking complete: {} movements found, {} new",
        report.fetched, report.appended
    );
    Ok(())
}

async fn print_board(aggregator: &Aggregator, board_id: &BoardId) -> anyhow::Result<()> {
    let records = aggregator
        .aggregate_board(board_id)
        .await
        .with_context(|| format!("failed to read movements of board {board_id}"))?;

    println!("\nCard Movements:");
    for record in &records {
        print_record(record);
    }
    println!("\nTotal movements found: {}", records.len());
    Ok(())
}

fn print_record(record: &MovementRecord) {
    println!("\n---");
    println!("Card: {}", record.card_name);
    println!("From: {}", record.old_location);
    println!("To: {}", record.new_location);
    println!("Date: {}", record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
}
