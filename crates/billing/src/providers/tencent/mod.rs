//! Tencent Cloud Billing API client.
//!
//! This module provides integration with the Billing API (version `2018-07-09`):
//!
//! - **DescribeBillSummaryByProduct**: L2 bill, costs aggregated by product line.
//! - **DescribeBillDetail**: L3 bill, itemized line items (paged, at most 100 per page).
//!
//! ## Authentication
//!
//! Every request is signed with TC3-HMAC-SHA256 using the account's
//! `SecretId`/`SecretKey` pair.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tencent_billing::providers::{BillingApi, SummaryRequest, TencentBillingApi, TencentEndpoint};
//!
//! let api = TencentBillingApi::new("AKID...", "secret", TencentEndpoint::default())?;
//! let bill = api.summary_by_product(SummaryRequest {
//!     begin_time: "2025-09-01 00:00:00".into(),
//!     end_time: "2025-09-30 23:59:59".into(),
//! }).await?;
//! ```

mod client;
mod models;
mod signer;

pub use client::{TencentBillingApi, TencentEndpoint, DEFAULT_ENDPOINT};
pub use signer::Tc3Signer;
