//! tencent-billing CLI - fetch monthly Tencent Cloud bills for a batch of accounts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{error, info, warn};

use tencent_billing::logging::{self, DEFAULT_BACKUP_COUNT, DEFAULT_MAX_BYTES};
use tencent_billing::{
    load_accounts, BatchRunner, BillingPeriod, LogConfig, LogLevel, Settings,
    TencentClientFactory,
};

const DEFAULT_CONFIG_PATH: &str = "conf/config.toml";

/// Fetch L2 (by product) and L3 (detail) Tencent Cloud bills for every account.
#[derive(Parser, Debug)]
#[command(name = "tencent-billing")]
#[command(about = "Fetch monthly Tencent Cloud bills for a batch of accounts")]
#[command(version)]
struct Cli {
    /// Billing month (YYYY-MM). Defaults to the previous calendar month.
    #[arg(long)]
    month: Option<String>,

    /// Settings file (TOML). Optional unless given explicitly.
    #[arg(long)]
    config_path: Option<PathBuf>,

    /// Accounts file (JSON array of {name, secret_id, secret_key})
    #[arg(long, default_value = "conf/tencent.json")]
    info_path: PathBuf,

    /// Log file path
    #[arg(long, default_value = "logs/TencentBilling.log")]
    log_path: PathBuf,

    /// Log level
    #[arg(long, value_enum, ignore_case = true, default_value = "DEBUG")]
    log_level: LogLevel,

    /// Maximum size of one log file in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BYTES)]
    max_bytes: u64,

    /// Number of rotated log files to keep
    #[arg(long, default_value_t = DEFAULT_BACKUP_COUNT)]
    backup_count: usize,

    /// Do not log to the console
    #[arg(long)]
    no_console: bool,

    /// Do not log to the log file
    #[arg(long)]
    no_file: bool,

    /// Fetch every page of the L3 bill instead of only the first
    #[arg(long)]
    all_pages: bool,
}

impl Cli {
    fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level,
            path: self.log_path.clone(),
            max_bytes: self.max_bytes,
            backup_count: self.backup_count,
            console: !self.no_console,
            file: !self.no_file,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (dispatch, _guard) =
        logging::build(&cli.log_config()).context("failed to initialize logging")?;
    let _default = tracing::dispatcher::set_default(&dispatch);

    if cli.no_console && cli.no_file {
        warn!("All log output disabled (--no-console and --no-file)");
    }

    if let Err(err) = run(&cli).await {
        error!("{err:#}");
        return Err(err);
    }
    Ok(())
}

/// Resolve global inputs, then process the batch.
///
/// Only startup problems (bad month, settings or accounts file) are returned
/// as errors; per-account failures end up in the batch report.
async fn run(cli: &Cli) -> Result<()> {
    let month = cli
        .month
        .clone()
        .unwrap_or_else(|| BillingPeriod::previous_month(Local::now().date_naive()));
    let period = BillingPeriod::from_month(&month).context("invalid --month")?;
    info!(month = %month, period = %period, "Resolved billing period");

    let (config_path, required) = match &cli.config_path {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };
    let settings = Settings::load(&config_path, required).context("failed to load settings")?;
    let mut detail = settings.detail;
    if cli.all_pages {
        detail.follow_pages = true;
    }

    let accounts = load_accounts(&cli.info_path).context("failed to load accounts")?;
    info!(path = %cli.info_path.display(), accounts = accounts.len(), "Loaded accounts");

    let factory = TencentClientFactory::new(settings.provider, detail)?;
    let runner = BatchRunner::new(factory, month)?;
    let report = runner.run(&accounts).await;

    if report.failed() > 0 || report.skipped() > 0 {
        warn!(
            failed = report.failed(),
            skipped = report.skipped(),
            "Some accounts were not fully processed; see errors above"
        );
    }
    Ok(())
}
