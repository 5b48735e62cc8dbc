//! Per-account billing client.
//!
//! [`BillingClient`] resolves the billing period for a month label, issues
//! the provider request and logs the normalized response inside the logging
//! span it was constructed with.

use std::sync::Arc;

use tracing::{debug, info, warn, Instrument, Span};

use crate::accounts::ValidatedCredential;
use crate::config::{DetailPolicy, ProviderSettings};
use crate::error::BillingError;
use crate::period::BillingPeriod;
use crate::providers::{
    BillResponse, BillingApi, DetailBill, DetailRequest, Fetched, SummaryRequest,
    TencentBillingApi,
};

/// Client for one account's bills.
pub struct BillingClient {
    api: Arc<dyn BillingApi>,
    detail: DetailPolicy,
    log: Span,
}

impl std::fmt::Debug for BillingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingClient")
            .field("provider", &self.api.name())
            .field("detail", &self.detail)
            .finish_non_exhaustive()
    }
}

impl BillingClient {
    /// Build a Tencent Cloud client for `credential`.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::Authentication`] if the secrets are blank and
    /// [`BillingError::Config`] if the detail page size is out of range.
    pub fn new(
        credential: &ValidatedCredential,
        provider: &ProviderSettings,
        detail: DetailPolicy,
        log: Span,
    ) -> Result<Self, BillingError> {
        let api = TencentBillingApi::new(
            credential.secret_id.clone(),
            credential.secret_key.clone(),
            provider.endpoint(),
        )?;
        Self::with_api(Arc::new(api), detail, log)
    }

    /// Build a client over any [`BillingApi`] implementation.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::Config`] if the detail page size is out of range.
    pub fn with_api(
        api: Arc<dyn BillingApi>,
        detail: DetailPolicy,
        log: Span,
    ) -> Result<Self, BillingError> {
        detail.validate()?;
        Ok(Self { api, detail, log })
    }

    /// Fetch the L2 bill (costs summarized by product) for `month`.
    ///
    /// # Errors
    ///
    /// [`BillingError::Parse`] for a malformed month label, otherwise any
    /// provider or authentication error. Nothing is retried.
    pub async fn get_summary_by_product(
        &self,
        month: &str,
    ) -> Result<Fetched<BillResponse>, BillingError> {
        async {
            let period = BillingPeriod::from_month(month)?;
            info!(month, begin = %period.begin_time(), end = %period.end_time(), "Querying L2 bill");

            let (begin_time, end_time) = period.bounds();
            let bill = self
                .api
                .summary_by_product(SummaryRequest {
                    begin_time,
                    end_time,
                })
                .await?;

            if !bill.ready {
                warn!(month, "Provider reports the L2 bill is not ready yet");
            }
            if bill.products.is_empty() {
                info!(month, "L2 bill has no data");
                return Ok(Fetched::NoData);
            }

            let response = BillResponse::Summary(bill);
            info!("=== L2 summary by product ===");
            info!("{}", response.to_pretty_json()?);
            Ok(Fetched::Data(response))
        }
        .instrument(self.log.clone())
        .await
    }

    /// Fetch the L3 bill (itemized detail) for `month`.
    ///
    /// Only the first page is requested unless the detail policy follows
    /// pages; a truncated result is logged at WARN.
    ///
    /// # Errors
    ///
    /// [`BillingError::Parse`] for a malformed month label, otherwise any
    /// provider or authentication error. Nothing is retried.
    pub async fn get_detail(&self, month: &str) -> Result<Fetched<BillResponse>, BillingError> {
        async {
            let period = BillingPeriod::from_month(month)?;
            info!(month, begin = %period.begin_time(), end = %period.end_time(), "Querying L3 bill");

            let bill = self.fetch_detail_pages(&period).await?;
            if bill.is_truncated() {
                warn!(
                    month,
                    fetched = bill.records.len(),
                    total = bill.total,
                    "L3 bill truncated: only the first {} records were requested",
                    bill.records.len()
                );
            }
            if bill.records.is_empty() {
                info!(month, "L3 bill has no data");
                return Ok(Fetched::NoData);
            }

            let response = BillResponse::Detail(bill);
            info!("=== L3 bill detail ===");
            info!("{}", response.to_pretty_json()?);
            Ok(Fetched::Data(response))
        }
        .instrument(self.log.clone())
        .await
    }

    async fn fetch_detail_pages(&self, period: &BillingPeriod) -> Result<DetailBill, BillingError> {
        let limit = self.detail.page_size;
        let (begin_time, end_time) = period.bounds();
        let mut request = DetailRequest {
            month: period.month.clone(),
            begin_time,
            end_time,
            offset: 0,
            limit,
            need_record_num: true,
        };

        let mut bill = self.api.bill_detail(request.clone()).await?;
        let mut last_page_len = bill.records.len() as u64;

        while self.detail.follow_pages
            && last_page_len == limit
            && bill
                .total
                .map_or(true, |total| (bill.records.len() as u64) < total)
        {
            request.offset += limit;
            let page = self.api.bill_detail(request.clone()).await?;
            last_page_len = page.records.len() as u64;
            if last_page_len == 0 {
                break;
            }
            debug!(offset = request.offset, rows = last_page_len, "Fetched L3 page");

            bill.records.extend(page.records);
            if page.total.is_some() {
                bill.total = page.total;
            }
            bill.request_id = page.request_id;
        }

        Ok(bill)
    }
}
