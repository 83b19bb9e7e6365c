mod actors;
mod models;
mod schedule;
mod storage;
mod types;

use std::fs::File;
use std::io::{stderr, stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use csv::WriterBuilder;
use rust_decimal::Decimal;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::actors::{LedgerActor, LedgerHandle};
use crate::models::{LedgerConfig, Page, PageRow, TransactionRecord, DEFAULT_PAGE_SIZE};
use crate::schedule::LiveSchedule;
use crate::storage::SessionStorage;
use crate::types::{format_currency, parse_amount, signed_amount, SessionId, SortOrder, TransactionId};

const SESSION: SessionId = 1;
const RECENT_ACTIVITY: usize = 3;

#[derive(Parser, Debug)]
#[command(name = "ledger-engine", version, about = "Synthetic account ledger: generate, filter, sort and page transactions")]
struct Cli {
    /// Seed for a reproducible history (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Case-insensitive search over description, details, date and amount
    #[arg(long, default_value = "")]
    query: String,

    #[arg(long, value_enum, default_value_t = SortOrder::Newest)]
    sort: SortOrder,

    /// Zero-based page to print
    #[arg(long, default_value_t = 0)]
    page: usize,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Live amounts to append before the view is built, e.g. --append 150.00 --append -20
    #[arg(long, value_parser = parse_amount, allow_hyphen_values = true)]
    append: Vec<Decimal>,

    /// Number of simulated balance drift ticks to run
    #[arg(long, default_value_t = 0)]
    live_ticks: usize,

    #[arg(long, default_value_t = 30_000)]
    live_interval_ms: u64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Print the details of one transaction instead of a page
    #[arg(long)]
    describe: Option<String>,

    /// Write the page here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogLevel::Error)]
    log_level: LogLevel
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Table
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.into());

    let mut config = LedgerConfig::default().with_page_size(cli.page_size);
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    let storage = Arc::new(SessionStorage::new());
    let actor = LedgerActor::spawn(SESSION, storage.clone(), config);

    for amount in &cli.append {
        let record = actor.append_live(*amount).await?;
        info!("Appended [{}] {}", record.id, signed_amount(record.amount));
    }

    let mut schedule = LiveSchedule::new();

    if cli.live_ticks > 0 {
        let period = Duration::from_millis(cli.live_interval_ms);
        let drift = schedule.start_balance_drift(actor.handle(), period, Some(cli.live_ticks), cli.seed);
        info!("Running [{}] for {} ticks every {period:?}", drift.name(), cli.live_ticks);
    }

    if !schedule.is_empty() {
        schedule.join().await;
    }

    let mut output: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(stdout().lock()))
    };

    if let Some(id) = &cli.describe {
        let details = actor.describe(&TransactionId::from(id.as_str())).await?;
        writeln!(output, "{details}")?;
        output.flush()?;
    } else {
        let page = select_page(&actor, &cli).await?;
        write_page(&actor, &page, cli.format, output).await?;
    }

    schedule.shutdown().await;
    actor.despawn().await?;

    info!("Parked sessions: {:?}", storage.parked_sessions());

    Ok(())
}

async fn select_page(ledger: &LedgerHandle, cli: &Cli) -> Result<Page> {
    ledger.apply_filter(&cli.query)?;
    ledger.sort_by(cli.sort)?;
    go_to_page(ledger, cli.page).await?;

    Ok(ledger.page().await?)
}

/// Steps the cursor one page at a time toward `target`, stopping at either end of the view.
async fn go_to_page(ledger: &LedgerHandle, target: usize) -> Result<()> {
    let mut current = ledger.page().await?.page_index;

    while current != target {
        let forward = current < target;
        let moved = if forward {
            ledger.advance_page().await?
        } else {
            ledger.retreat_page().await?
        };

        if !moved {
            warn!("Requested page {target} is past the end of the view, showing page {current}");
            break;
        }

        current = if forward { current + 1 } else { current - 1 };
    }

    Ok(())
}

fn setup_logging(level: LevelFilter) {
    //NOTE: stdout carries the page output, logging goes to stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

async fn write_page<W: Write>(ledger: &LedgerHandle, page: &Page, format: OutputFormat, output: W) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(page, output),
        OutputFormat::Table => {
            let recent = ledger.recent(RECENT_ACTIVITY).await?;
            let balance = ledger.balance().await?;
            write_table(page, &recent, balance, output)
        }
    }
}

fn write_csv<W: Write>(page: &Page, output: W) -> Result<()> {
    //NOTE: the header is written by hand so an empty page still gets one
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);

    writer.write_record(["date", "description", "details", "category", "status", "amount", "balance", "id"])?;

    for record in &page.records {
        writer.serialize(record)?;
    }

    writer.flush()?;

    Ok(())
}

fn write_table<W: Write>(page: &Page, recent: &[TransactionRecord], balance: Decimal, mut output: W) -> Result<()> {
    writeln!(output, "Current balance: {}", format_currency(balance))?;
    writeln!(output, "Recent activity:")?;

    for record in recent {
        writeln!(output, "  {:>14}  {:<22}  {}", signed_amount(record.amount), record.description, record.formatted_date())?;
    }

    writeln!(output)?;

    for row in page.rows() {
        match row {
            PageRow::Statement { as_of } => writeln!(output, "Statement as of {as_of} (view statements)")?,
            PageRow::Transaction(record) => writeln!(
                output,
                "{}  {:<22}  {:<34}  {:<13}  {}  {:>14}  {:>16}",
                record.formatted_date(),
                record.description,
                record.details,
                record.category,
                record.status.code(),
                signed_amount(record.amount),
                format_currency(record.running_balance)
            )?
        }
    }

    if page.has_more {
        writeln!(output, "Load More Transactions ({} remaining)", page.remaining())?;
    }

    output.flush()?;

    Ok(())
}
