//! Batch runner.
//!
//! Accounts are processed strictly in input order, one at a time. Each
//! account walks `Pending -> Authenticated -> SummaryFetched ->
//! DetailFetched -> Done`; any failure ends that account's walk and is
//! recorded as an [`AccountOutcome`], after which the next account starts.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info, info_span, Instrument, Span};

use crate::accounts::{AccountCredential, ValidatedCredential};
use crate::client::BillingClient;
use crate::config::{DetailPolicy, ProviderSettings};
use crate::error::BillingError;
use crate::period::BillingPeriod;
use crate::providers::{BillResponse, Fetched};

// ============================================================================
// Seams
// ============================================================================

/// Operations the runner invokes on a connected account.
#[async_trait]
pub trait BillFetcher: Send + Sync {
    /// L2 bill for `month`.
    async fn summary_by_product(&self, month: &str)
        -> Result<Fetched<BillResponse>, BillingError>;

    /// L3 bill for `month`.
    async fn detail(&self, month: &str) -> Result<Fetched<BillResponse>, BillingError>;
}

#[async_trait]
impl BillFetcher for BillingClient {
    async fn summary_by_product(
        &self,
        month: &str,
    ) -> Result<Fetched<BillResponse>, BillingError> {
        self.get_summary_by_product(month).await
    }

    async fn detail(&self, month: &str) -> Result<Fetched<BillResponse>, BillingError> {
        self.get_detail(month).await
    }
}

/// Builds one fetcher per account.
pub trait ClientFactory: Send + Sync {
    /// Authenticate `credential`, handing the account's logging span to the client.
    fn connect(
        &self,
        credential: &ValidatedCredential,
        log: Span,
    ) -> Result<Box<dyn BillFetcher>, BillingError>;
}

/// Factory producing Tencent Cloud [`BillingClient`]s.
#[derive(Debug, Clone, Default)]
pub struct TencentClientFactory {
    provider: ProviderSettings,
    detail: DetailPolicy,
}

impl TencentClientFactory {
    /// Create a factory sharing one endpoint and paging policy across accounts.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::Config`] if the detail page size is out of range.
    pub fn new(provider: ProviderSettings, detail: DetailPolicy) -> Result<Self, BillingError> {
        detail.validate()?;
        Ok(Self { provider, detail })
    }
}

impl ClientFactory for TencentClientFactory {
    fn connect(
        &self,
        credential: &ValidatedCredential,
        log: Span,
    ) -> Result<Box<dyn BillFetcher>, BillingError> {
        let client = BillingClient::new(credential, &self.provider, self.detail, log)?;
        Ok(Box::new(client))
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Per-account processing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountState {
    Pending,
    Authenticated,
    SummaryFetched,
    DetailFetched,
    Done,
}

impl std::fmt::Display for AccountState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::SummaryFetched => write!(f, "summary_fetched"),
            Self::DetailFetched => write!(f, "detail_fetched"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Step at which an account failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStep {
    Authenticate,
    Summary,
    Detail,
}

impl std::fmt::Display for FailedStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authenticate => write!(f, "authenticate"),
            Self::Summary => write!(f, "summary"),
            Self::Detail => write!(f, "detail"),
        }
    }
}

/// How an account's processing ended.
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeStatus {
    /// Both fetches completed (each may carry no data).
    Success {
        summary: Fetched<BillResponse>,
        detail: Fetched<BillResponse>,
    },
    /// Account record was unusable and was not attempted.
    Skipped { reason: String },
    /// A step failed; later steps were not attempted.
    Failed {
        step: FailedStep,
        kind: &'static str,
        reason: String,
    },
}

/// Outcome of one account.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountOutcome {
    /// Display name of the account.
    pub name: String,
    /// Last state reached.
    pub state: AccountState,
    /// How processing ended.
    pub status: OutcomeStatus,
}

impl AccountOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Success { .. })
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self.status, OutcomeStatus::Skipped { .. })
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed { .. })
    }
}

/// Ordered outcomes of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// Month the batch was run for.
    pub month: String,
    /// One entry per input account, in input order.
    pub outcomes: Vec<AccountOutcome>,
}

impl BatchReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Runs both bill fetches for every account of a batch.
pub struct BatchRunner<F> {
    factory: F,
    month: String,
}

impl<F: ClientFactory> BatchRunner<F> {
    /// Create a runner for `month`.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::Parse`] if `month` is not a valid `YYYY-MM`
    /// label; the month is global to the run, so this is fatal.
    pub fn new(factory: F, month: impl Into<String>) -> Result<Self, BillingError> {
        let month = month.into();
        BillingPeriod::from_month(&month)?;
        Ok(Self { factory, month })
    }

    /// Month the runner fetches.
    #[must_use]
    pub fn month(&self) -> &str {
        &self.month
    }

    /// Process every account in order and collect their outcomes.
    pub async fn run(&self, accounts: &[AccountCredential]) -> BatchReport {
        info!(month = %self.month, accounts = accounts.len(), "Starting billing batch");

        let mut outcomes = Vec::with_capacity(accounts.len());
        for account in accounts {
            let span = info_span!("account", name = %account.display_name());
            let outcome = self.process(account, span.clone()).instrument(span).await;
            outcomes.push(outcome);
        }

        let report = BatchReport {
            month: self.month.clone(),
            outcomes,
        };
        info!(
            month = %report.month,
            succeeded = report.succeeded(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Billing batch finished"
        );
        report
    }

    async fn process(&self, account: &AccountCredential, span: Span) -> AccountOutcome {
        let name = account.display_name().to_string();
        info!("Processing account: {name}");

        let credential = match account.validate() {
            Ok(credential) => credential,
            Err(err) => {
                error!(error = %err, "Skipping account {name}: secret_id or secret_key missing");
                return AccountOutcome {
                    name,
                    state: AccountState::Pending,
                    status: OutcomeStatus::Skipped {
                        reason: err.to_string(),
                    },
                };
            }
        };

        let fetcher = match self.factory.connect(&credential, span) {
            Ok(fetcher) => fetcher,
            Err(err) => {
                return Self::failed(name, AccountState::Pending, FailedStep::Authenticate, &err)
            }
        };
        let mut state = AccountState::Authenticated;
        debug!(%state, "Client ready");

        let summary = match fetcher.summary_by_product(&self.month).await {
            Ok(summary) => summary,
            Err(err) => return Self::failed(name, state, FailedStep::Summary, &err),
        };
        Self::log_fetched("L2", &self.month, &summary);
        state = AccountState::SummaryFetched;
        debug!(%state, "Summary fetched");

        let detail = match fetcher.detail(&self.month).await {
            Ok(detail) => detail,
            Err(err) => return Self::failed(name, state, FailedStep::Detail, &err),
        };
        Self::log_fetched("L3", &self.month, &detail);
        state = AccountState::DetailFetched;
        debug!(%state, "Detail fetched");

        state = AccountState::Done;
        debug!(%state, "Account complete");
        AccountOutcome {
            name,
            state,
            status: OutcomeStatus::Success { summary, detail },
        }
    }

    fn log_fetched(level: &str, month: &str, fetched: &Fetched<BillResponse>) {
        match fetched {
            Fetched::Data(response) => {
                info!(rows = response.row_count(), "{level} bill ({month}) retrieved");
            }
            Fetched::NoData => info!("{level} bill ({month}) has no data"),
        }
    }

    fn failed(
        name: String,
        state: AccountState,
        step: FailedStep,
        err: &BillingError,
    ) -> AccountOutcome {
        error!(
            %step,
            %state,
            kind = err.kind(),
            error = %err,
            "Account {name} failed at {step} step"
        );
        AccountOutcome {
            name,
            state,
            status: OutcomeStatus::Failed {
                step,
                kind: err.kind(),
                reason: err.to_string(),
            },
        }
    }
}
