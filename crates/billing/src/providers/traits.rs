//! Billing provider trait and common types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BillingError;

// ============================================================================
// Requests
// ============================================================================

/// Request for a product-level (L2) bill summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    /// Period start (`YYYY-MM-DD HH:MM:SS`, inclusive).
    pub begin_time: String,
    /// Period end (`YYYY-MM-DD HH:MM:SS`, inclusive).
    pub end_time: String,
}

/// Request for one page of itemized (L3) bill detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    /// Month label (`YYYY-MM`).
    pub month: String,
    /// Period start (`YYYY-MM-DD HH:MM:SS`, inclusive).
    pub begin_time: String,
    /// Period end (`YYYY-MM-DD HH:MM:SS`, inclusive).
    pub end_time: String,
    /// Row offset of the page.
    pub offset: u64,
    /// Page size.
    pub limit: u64,
    /// Ask the provider to report the total number of records.
    pub need_record_num: bool,
}

// ============================================================================
// L2 summary
// ============================================================================

/// Cost summary for one product line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    /// Product code (e.g. `p_cvm`).
    pub business_code: String,
    /// Product display name.
    pub business_name: String,
    /// Original cost before discounts.
    pub real_total_cost: Option<String>,
    /// Total cost after discounts.
    pub total_cost: Option<String>,
    /// Amount paid in cash.
    pub cash_pay_amount: Option<String>,
    /// Amount paid with vouchers.
    pub voucher_pay_amount: Option<String>,
    /// Amount paid with free credits.
    pub incentive_pay_amount: Option<String>,
}

/// Product-level (L2) bill for a period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryBill {
    /// Whether the provider finished aggregating the bill.
    pub ready: bool,
    /// Total cost across all products.
    pub total_cost: Option<String>,
    /// Per-product rows.
    pub products: Vec<ProductSummary>,
    /// Provider request identifier.
    pub request_id: Option<String>,
}

// ============================================================================
// L3 detail
// ============================================================================

/// Billed component of a detail record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillComponent {
    /// Component category name.
    pub component_code_name: Option<String>,
    /// Component item name.
    pub item_code_name: Option<String>,
    /// Unit price.
    pub single_price: Option<String>,
    /// Price unit.
    pub price_unit: Option<String>,
    /// Used amount.
    pub used_amount: Option<String>,
    /// Used amount unit.
    pub used_amount_unit: Option<String>,
    /// Original cost.
    pub cost: Option<String>,
    /// Discounted cost.
    pub real_cost: Option<String>,
}

/// Resource tag attached to a detail record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillTag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

/// Itemized bill record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillDetailRecord {
    pub business_code_name: Option<String>,
    pub product_code_name: Option<String>,
    pub pay_mode_name: Option<String>,
    pub project_name: Option<String>,
    pub region_name: Option<String>,
    pub zone_name: Option<String>,
    pub resource_id: Option<String>,
    pub resource_name: Option<String>,
    pub action_type_name: Option<String>,
    pub order_id: Option<String>,
    pub bill_id: Option<String>,
    pub pay_time: Option<String>,
    pub fee_begin_time: Option<String>,
    pub fee_end_time: Option<String>,
    pub components: Vec<BillComponent>,
    pub tags: Vec<BillTag>,
}

/// Itemized (L3) bill detail for a period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailBill {
    /// Records returned for the requested page(s).
    pub records: Vec<BillDetailRecord>,
    /// Total number of records the provider holds for the period, if reported.
    pub total: Option<u64>,
    /// Offset of the first returned record.
    pub offset: u64,
    /// Page size used for the request.
    pub limit: u64,
    /// Provider request identifier (of the last page fetched).
    pub request_id: Option<String>,
}

impl DetailBill {
    /// Whether the provider holds more records than were returned.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.total
            .is_some_and(|total| self.offset + (self.records.len() as u64) < total)
    }
}

// ============================================================================
// Normalized response
// ============================================================================

/// Normalized bill returned by the client operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum BillResponse {
    /// L2: summary by product.
    Summary(SummaryBill),
    /// L3: itemized detail.
    Detail(DetailBill),
}

impl BillResponse {
    /// Number of rows carried by the response.
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self {
            Self::Summary(bill) => bill.products.len(),
            Self::Detail(bill) => bill.records.len(),
        }
    }

    /// Pretty JSON rendering used for logging.
    pub fn to_pretty_json(&self) -> Result<String, BillingError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of a fetch: data, or an explicit marker that the period has no rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    /// Provider returned at least one row.
    Data(T),
    /// Provider returned zero rows for the period.
    NoData,
}

impl<T> Fetched<T> {
    /// Whether the fetch produced no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoData)
    }

    /// Convert into an `Option`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Data(value) => Some(value),
            Self::NoData => None,
        }
    }
}

// ============================================================================
// Provider trait
// ============================================================================

/// Trait for cloud billing APIs.
///
/// Implementations own authentication and wire-format concerns and return
/// provider-neutral bills.
#[async_trait]
pub trait BillingApi: Send + Sync {
    /// Provider name (e.g. "tencent").
    fn name(&self) -> &'static str;

    /// Fetch the product-level summary for a period.
    async fn summary_by_product(&self, request: SummaryRequest)
        -> Result<SummaryBill, BillingError>;

    /// Fetch one page of itemized bill detail for a period.
    async fn bill_detail(&self, request: DetailRequest) -> Result<DetailBill, BillingError>;
}
