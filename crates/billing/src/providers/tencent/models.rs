//! Tencent Cloud Billing API (2018-07-09) wire models.

use serde::{Deserialize, Serialize};

// ============================================================================
// Common response wrapper
// ============================================================================

/// Outer envelope of every API 3.0 response.
#[derive(Debug, Clone, Deserialize)]
pub struct TencentEnvelope<T> {
    #[serde(rename = "Response")]
    pub response: TencentResponse<T>,
}

/// Response body: action-specific fields plus error and request id.
#[derive(Debug, Clone, Deserialize)]
pub struct TencentResponse<T> {
    /// Present when the call failed.
    #[serde(rename = "Error")]
    pub error: Option<TencentError>,
    /// Unique request identifier.
    #[serde(rename = "RequestId")]
    pub request_id: Option<String>,
    /// Action-specific fields.
    #[serde(flatten)]
    pub body: T,
}

/// API error payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TencentError {
    /// Error code (e.g. `AuthFailure.SignatureFailure`).
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl TencentError {
    /// Whether the error means the credentials were rejected.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        self.code.starts_with("AuthFailure")
    }
}

// ============================================================================
// Requests
// ============================================================================

/// `DescribeBillSummaryByProduct` request payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeBillSummaryByProductRequest {
    pub begin_time: String,
    pub end_time: String,
}

/// `DescribeBillDetail` request payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeBillDetailRequest {
    pub offset: u64,
    pub limit: u64,
    pub month: String,
    pub begin_time: String,
    pub end_time: String,
    pub need_record_num: u8,
}

// ============================================================================
// L2: summary by product
// ============================================================================

/// `DescribeBillSummaryByProduct` response fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DescribeBillSummaryByProductResponse {
    /// 1 when the bill is ready, 0 while it is still being generated.
    pub ready: Option<i64>,
    /// Total across products.
    pub summary_total: Option<BusinessSummaryTotal>,
    /// Per-product rows.
    pub summary_overview: Option<Vec<BusinessSummaryOverviewItem>>,
}

/// Total row of the product summary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BusinessSummaryTotal {
    pub real_total_cost: Option<String>,
    pub total_cost: Option<String>,
    pub cash_pay_amount: Option<String>,
    pub voucher_pay_amount: Option<String>,
    pub incentive_pay_amount: Option<String>,
}

/// Per-product row of the summary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BusinessSummaryOverviewItem {
    pub business_code: Option<String>,
    pub business_code_name: Option<String>,
    pub real_total_cost: Option<String>,
    pub total_cost: Option<String>,
    pub cash_pay_amount: Option<String>,
    pub voucher_pay_amount: Option<String>,
    pub incentive_pay_amount: Option<String>,
}

// ============================================================================
// L3: bill detail
// ============================================================================

/// `DescribeBillDetail` response fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DescribeBillDetailResponse {
    /// Records of the requested page.
    pub detail_set: Option<Vec<BillDetail>>,
    /// Total record count (only when `NeedRecordNum` is 1).
    pub total: Option<u64>,
}

/// One itemized bill record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BillDetail {
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
    pub component_set: Option<Vec<BillDetailComponent>>,
    pub tags: Option<Vec<BillTagInfo>>,
}

/// Billed component of a record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BillDetailComponent {
    pub component_code_name: Option<String>,
    pub item_code_name: Option<String>,
    pub single_price: Option<String>,
    pub price_unit: Option<String>,
    pub used_amount: Option<String>,
    pub used_amount_unit: Option<String>,
    pub cost: Option<String>,
    pub real_cost: Option<String>,
}

/// Resource tag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BillTagInfo {
    pub tag_key: Option<String>,
    pub tag_value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope() {
        let body = r#"{
            "Response": {
                "Error": {"Code": "AuthFailure.SecretIdNotFound", "Message": "The SecretId is not found"},
                "RequestId": "a1b2"
            }
        }"#;
        let envelope: TencentEnvelope<DescribeBillDetailResponse> =
            serde_json::from_str(body).unwrap();
        let error = envelope.response.error.unwrap();
        assert!(error.is_auth_failure());
        assert_eq!(envelope.response.request_id.as_deref(), Some("a1b2"));
        assert!(envelope.response.body.detail_set.is_none());
    }

    #[test]
    fn test_summary_envelope() {
        let body = r#"{
            "Response": {
                "Ready": 1,
                "SummaryTotal": {"RealTotalCost": "120.00", "TotalCost": "100.00"},
                "SummaryOverview": [
                    {"BusinessCode": "p_cvm", "BusinessCodeName": "Cloud Virtual Machine", "TotalCost": "80.00"},
                    {"BusinessCode": "p_cos", "BusinessCodeName": "Cloud Object Storage", "TotalCost": "20.00"}
                ],
                "RequestId": "c3d4"
            }
        }"#;
        let envelope: TencentEnvelope<DescribeBillSummaryByProductResponse> =
            serde_json::from_str(body).unwrap();
        let response = envelope.response;
        assert!(response.error.is_none());
        assert_eq!(response.body.ready, Some(1));
        assert_eq!(response.body.summary_overview.unwrap().len(), 2);
    }

    #[test]
    fn test_detail_request_field_names() {
        let request = DescribeBillDetailRequest {
            offset: 0,
            limit: 100,
            month: "2025-09".into(),
            begin_time: "2025-09-01 00:00:00".into(),
            end_time: "2025-09-30 23:59:59".into(),
            need_record_num: 1,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["Offset"], 0);
        assert_eq!(value["Limit"], 100);
        assert_eq!(value["Month"], "2025-09");
        assert_eq!(value["BeginTime"], "2025-09-01 00:00:00");
        assert_eq!(value["NeedRecordNum"], 1);
    }
}
