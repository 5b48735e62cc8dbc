//! Cloud billing provider implementations.
//!
//! This module provides integrations with:
//!
//! - Tencent Cloud - Billing API (`DescribeBillSummaryByProduct`, `DescribeBillDetail`)

pub mod tencent;
mod traits;

pub use tencent::{TencentBillingApi, TencentEndpoint};
pub use traits::{
    BillComponent, BillDetailRecord, BillResponse, BillTag, BillingApi, DetailBill, DetailRequest,
    Fetched, ProductSummary, SummaryBill, SummaryRequest,
};
