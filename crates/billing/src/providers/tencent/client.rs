//! Tencent Cloud Billing API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

use super::models::{
    BillDetail, BusinessSummaryOverviewItem, DescribeBillDetailRequest,
    DescribeBillDetailResponse, DescribeBillSummaryByProductRequest,
    DescribeBillSummaryByProductResponse, TencentEnvelope,
};
use super::signer::{Tc3Signer, CONTENT_TYPE};
use crate::error::BillingError;
use crate::providers::{
    BillComponent, BillDetailRecord, BillTag, BillingApi, DetailBill, DetailRequest,
    ProductSummary, SummaryBill, SummaryRequest,
};

/// Default billing endpoint host.
pub const DEFAULT_ENDPOINT: &str = "billing.tencentcloudapi.com";

const API_VERSION: &str = "2018-07-09";
const SERVICE: &str = "billing";

const ACTION_SUMMARY_BY_PRODUCT: &str = "DescribeBillSummaryByProduct";
const ACTION_BILL_DETAIL: &str = "DescribeBillDetail";

/// Connection settings for [`TencentBillingApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TencentEndpoint {
    /// Host name that is signed and sent in the `Host` header.
    pub host: String,
    /// Region sent as `X-TC-Region`; omitted when empty.
    pub region: String,
    /// URL the request is posted to. Defaults to `https://{host}/`.
    pub base_url: Option<String>,
    /// Request timeout. `None` keeps the HTTP client default.
    pub timeout: Option<Duration>,
}

impl Default for TencentEndpoint {
    fn default() -> Self {
        Self {
            host: DEFAULT_ENDPOINT.to_string(),
            region: String::new(),
            base_url: None,
            timeout: None,
        }
    }
}

impl TencentEndpoint {
    /// URL requests are posted to.
    #[must_use]
    pub fn url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}/", self.host))
    }
}

/// Tencent Cloud Billing API provider.
///
/// One instance per account: the secret pair is bound at construction and
/// used to sign every request.
#[derive(Debug, Clone)]
pub struct TencentBillingApi {
    client: Client,
    signer: Tc3Signer,
    endpoint: TencentEndpoint,
}

impl TencentBillingApi {
    /// Create a client for one account.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::Authentication`] if either secret is empty and
    /// [`BillingError::Http`] if the HTTP client cannot be built.
    pub fn new(
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
        endpoint: TencentEndpoint,
    ) -> Result<Self, BillingError> {
        let signer = Tc3Signer::new(secret_id, secret_key, SERVICE)?;

        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = endpoint.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(BillingError::Http)?;

        Ok(Self {
            client,
            signer,
            endpoint,
        })
    }

    /// Sign and POST an action, returning its decoded response fields and request id.
    async fn call<Req, Resp>(
        &self,
        action: &str,
        request: &Req,
    ) -> Result<(Resp, Option<String>), BillingError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned + Send,
    {
        let payload = serde_json::to_string(request)?;
        let timestamp = chrono::Utc::now().timestamp();
        let authorization =
            self.signer
                .authorization(&self.endpoint.host, action, &payload, timestamp)?;

        let url = self.endpoint.url();
        debug!(url = %url, action, "Making Tencent Cloud API request");

        let mut builder = self
            .client
            .post(&url)
            .header("Authorization", authorization)
            .header("Content-Type", CONTENT_TYPE)
            .header("Host", &self.endpoint.host)
            .header("X-TC-Action", action)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Version", API_VERSION);
        if !self.endpoint.region.is_empty() {
            builder = builder.header("X-TC-Region", &self.endpoint.region);
        }

        let response = builder.body(payload).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BillingError::provider(
                action,
                format!("HTTP {}: {body}", status.as_u16()),
            ));
        }

        let envelope: TencentEnvelope<Resp> = serde_json::from_str(&body)?;
        let response = envelope.response;
        if let Some(error) = response.error {
            let request_id = response.request_id.unwrap_or_default();
            let message = format!("{}: {} (request {request_id})", error.code, error.message);
            if error.is_auth_failure() {
                return Err(BillingError::Authentication(message));
            }
            return Err(BillingError::provider(action, message));
        }

        debug!(action, request_id = ?response.request_id, "Tencent Cloud API request succeeded");
        Ok((response.body, response.request_id))
    }

    /// Convert a product summary response into the provider-neutral bill.
    fn convert_summary(
        response: DescribeBillSummaryByProductResponse,
        request_id: Option<String>,
    ) -> SummaryBill {
        SummaryBill {
            ready: response.ready.unwrap_or(0) == 1,
            total_cost: response.summary_total.and_then(|total| total.total_cost),
            products: response
                .summary_overview
                .unwrap_or_default()
                .into_iter()
                .map(Self::convert_product)
                .collect(),
            request_id,
        }
    }

    fn convert_product(item: BusinessSummaryOverviewItem) -> ProductSummary {
        ProductSummary {
            business_code: item.business_code.unwrap_or_default(),
            business_name: item.business_code_name.unwrap_or_default(),
            real_total_cost: item.real_total_cost,
            total_cost: item.total_cost,
            cash_pay_amount: item.cash_pay_amount,
            voucher_pay_amount: item.voucher_pay_amount,
            incentive_pay_amount: item.incentive_pay_amount,
        }
    }

    /// Convert a bill detail response into the provider-neutral bill.
    fn convert_detail(
        response: DescribeBillDetailResponse,
        request: &DetailRequest,
        request_id: Option<String>,
    ) -> DetailBill {
        DetailBill {
            records: response
                .detail_set
                .unwrap_or_default()
                .into_iter()
                .map(Self::convert_record)
                .collect(),
            total: response.total,
            offset: request.offset,
            limit: request.limit,
            request_id,
        }
    }

    fn convert_record(detail: BillDetail) -> BillDetailRecord {
        BillDetailRecord {
            business_code_name: detail.business_code_name,
            product_code_name: detail.product_code_name,
            pay_mode_name: detail.pay_mode_name,
            project_name: detail.project_name,
            region_name: detail.region_name,
            zone_name: detail.zone_name,
            resource_id: detail.resource_id,
            resource_name: detail.resource_name,
            action_type_name: detail.action_type_name,
            order_id: detail.order_id,
            bill_id: detail.bill_id,
            pay_time: detail.pay_time,
            fee_begin_time: detail.fee_begin_time,
            fee_end_time: detail.fee_end_time,
            components: detail
                .component_set
                .unwrap_or_default()
                .into_iter()
                .map(|component| BillComponent {
                    component_code_name: component.component_code_name,
                    item_code_name: component.item_code_name,
                    single_price: component.single_price,
                    price_unit: component.price_unit,
                    used_amount: component.used_amount,
                    used_amount_unit: component.used_amount_unit,
                    cost: component.cost,
                    real_cost: component.real_cost,
                })
                .collect(),
            tags: detail
                .tags
                .unwrap_or_default()
                .into_iter()
                .map(|tag| BillTag {
                    key: tag.tag_key.unwrap_or_default(),
                    value: tag.tag_value.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl BillingApi for TencentBillingApi {
    fn name(&self) -> &'static str {
        "tencent"
    }

    #[instrument(skip(self), fields(provider = "tencent"))]
    async fn summary_by_product(
        &self,
        request: SummaryRequest,
    ) -> Result<SummaryBill, BillingError> {
        let payload = DescribeBillSummaryByProductRequest {
            begin_time: request.begin_time,
            end_time: request.end_time,
        };
        let (response, request_id): (DescribeBillSummaryByProductResponse, _) =
            self.call(ACTION_SUMMARY_BY_PRODUCT, &payload).await?;

        Ok(Self::convert_summary(response, request_id))
    }

    #[instrument(skip(self), fields(provider = "tencent"))]
    async fn bill_detail(&self, request: DetailRequest) -> Result<DetailBill, BillingError> {
        let payload = DescribeBillDetailRequest {
            offset: request.offset,
            limit: request.limit,
            month: request.month.clone(),
            begin_time: request.begin_time.clone(),
            end_time: request.end_time.clone(),
            need_record_num: u8::from(request.need_record_num),
        };
        let (response, request_id): (DescribeBillDetailResponse, _) =
            self.call(ACTION_BILL_DETAIL, &payload).await?;

        Ok(Self::convert_detail(response, &request, request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::tencent::models::{BillDetailComponent, BillTagInfo, BusinessSummaryTotal};

    #[test]
    fn test_new_requires_credentials() {
        let result = TencentBillingApi::new("", "key", TencentEndpoint::default());
        assert!(matches!(result, Err(BillingError::Authentication(_))));
    }

    #[test]
    fn test_endpoint_url() {
        let endpoint = TencentEndpoint::default();
        assert_eq!(endpoint.url(), "https://billing.tencentcloudapi.com/");

        let endpoint = TencentEndpoint {
            base_url: Some("http://127.0.0.1:8080/".into()),
            ..TencentEndpoint::default()
        };
        assert_eq!(endpoint.url(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_convert_summary() {
        let response = DescribeBillSummaryByProductResponse {
            ready: Some(1),
            summary_total: Some(BusinessSummaryTotal {
                total_cost: Some("42.00".into()),
                ..Default::default()
            }),
            summary_overview: Some(vec![BusinessSummaryOverviewItem {
                business_code: Some("p_cvm".into()),
                business_code_name: Some("Cloud Virtual Machine".into()),
                total_cost: Some("42.00".into()),
                ..Default::default()
            }]),
        };

        let bill = TencentBillingApi::convert_summary(response, Some("req".into()));
        assert!(bill.ready);
        assert_eq!(bill.total_cost.as_deref(), Some("42.00"));
        assert_eq!(bill.products[0].business_code, "p_cvm");
        assert_eq!(bill.request_id.as_deref(), Some("req"));
    }

    #[test]
    fn test_convert_detail() {
        let request = DetailRequest {
            month: "2025-09".into(),
            begin_time: "2025-09-01 00:00:00".into(),
            end_time: "2025-09-30 23:59:59".into(),
            offset: 0,
            limit: 100,
            need_record_num: true,
        };
        let response = DescribeBillDetailResponse {
            detail_set: Some(vec![BillDetail {
                resource_id: Some("ins-123".into()),
                component_set: Some(vec![BillDetailComponent {
                    component_code_name: Some("CPU".into()),
                    real_cost: Some("1.00".into()),
                    ..Default::default()
                }]),
                tags: Some(vec![BillTagInfo {
                    tag_key: Some("team".into()),
                    tag_value: Some("infra".into()),
                }]),
                ..Default::default()
            }]),
            total: Some(1),
        };

        let bill = TencentBillingApi::convert_detail(response, &request, None);
        assert_eq!(bill.records.len(), 1);
        assert_eq!(bill.records[0].resource_id.as_deref(), Some("ins-123"));
        assert_eq!(bill.records[0].components[0].real_cost.as_deref(), Some("1.00"));
        assert_eq!(bill.records[0].tags[0].key, "team");
        assert_eq!(bill.total, Some(1));
        assert_eq!(bill.limit, 100);
        assert!(!bill.is_truncated());
    }
}
