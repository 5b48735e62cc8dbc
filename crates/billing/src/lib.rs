//! Monthly Tencent Cloud bill retrieval.
//!
//! This crate fetches two tiers of bills for a calendar month and for any
//! number of accounts:
//!
//! - **L2** - costs summarized by product line (`DescribeBillSummaryByProduct`)
//! - **L3** - itemized bill detail (`DescribeBillDetail`)
//!
//! ## Features
//!
//! - Month label (`YYYY-MM`) to inclusive billing period conversion
//! - TC3-HMAC-SHA256 request signing per account
//! - Explicit "no data" results for empty periods
//! - Per-account failure isolation with an ordered outcome report
//! - Console and size-rotated file logging
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tencent_billing::{load_accounts, BatchRunner, TencentClientFactory};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let accounts = load_accounts("conf/tencent.json".as_ref())?;
//!     let runner = BatchRunner::new(TencentClientFactory::default(), "2025-09")?;
//!
//!     let report = runner.run(&accounts).await;
//!     println!("{} succeeded, {} failed", report.succeeded(), report.failed());
//!     Ok(())
//! }
//! ```
//!
//! ## Single account
//!
//! ```rust,ignore
//! use tencent_billing::{BillingClient, Fetched};
//!
//! let client = BillingClient::new(&credential, &settings.provider, settings.detail, span)?;
//! match client.get_summary_by_product("2024-02").await? {
//!     Fetched::Data(bill) => println!("{}", bill.to_pretty_json()?),
//!     Fetched::NoData => println!("no data"),
//! }
//! ```

pub mod accounts;
pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod period;
pub mod providers;

pub use accounts::{load_accounts, AccountCredential, ValidatedCredential};
pub use batch::{
    AccountOutcome, AccountState, BatchReport, BatchRunner, BillFetcher, ClientFactory,
    FailedStep, OutcomeStatus, TencentClientFactory,
};
pub use client::BillingClient;
pub use config::{DetailPolicy, ProviderSettings, Settings};
pub use error::BillingError;
pub use logging::{LogConfig, LogLevel, LoggingGuard};
pub use period::BillingPeriod;
pub use providers::{BillResponse, BillingApi, DetailBill, Fetched, SummaryBill};
