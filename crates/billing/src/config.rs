//! Settings file.
//!
//! Optional TOML file overriding provider connection details and the detail
//! paging policy. Every field has a default, so an empty file is valid.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::BillingError;
use crate::providers::tencent::DEFAULT_ENDPOINT;
use crate::providers::TencentEndpoint;

/// Largest page the detail API accepts.
pub const MAX_DETAIL_PAGE_SIZE: u64 = 100;

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Billing API connection.
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Detail (L3) paging policy.
    #[serde(default)]
    pub detail: DetailPolicy,
}

/// Billing API connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSettings {
    /// Endpoint host.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Region header value; the billing API is global so this is usually empty.
    #[serde(default)]
    pub region: String,

    /// Optional URL override (e.g. a proxy).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Optional request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            region: String::new(),
            base_url: None,
            timeout_secs: None,
        }
    }
}

impl ProviderSettings {
    /// Connection details for the Tencent client.
    #[must_use]
    pub fn endpoint(&self) -> TencentEndpoint {
        TencentEndpoint {
            host: self.endpoint.clone(),
            region: self.region.clone(),
            base_url: self.base_url.clone(),
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// How the detail operation pages through records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailPolicy {
    /// Rows requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Keep requesting pages until every record is fetched.
    #[serde(default)]
    pub follow_pages: bool,
}

const fn default_page_size() -> u64 {
    MAX_DETAIL_PAGE_SIZE
}

impl Default for DetailPolicy {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            follow_pages: false,
        }
    }
}

impl DetailPolicy {
    /// Create a checked paging policy.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::Config`] if `page_size` is outside `1..=100`.
    pub fn new(page_size: u64, follow_pages: bool) -> Result<Self, BillingError> {
        let policy = Self {
            page_size,
            follow_pages,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Check that the page size is one the detail API accepts.
    pub fn validate(&self) -> Result<(), BillingError> {
        if (1..=MAX_DETAIL_PAGE_SIZE).contains(&self.page_size) {
            Ok(())
        } else {
            Err(BillingError::Config(format!(
                "detail.page_size must be between 1 and {MAX_DETAIL_PAGE_SIZE}, got {}",
                self.page_size
            )))
        }
    }
}

impl Settings {
    /// Load settings from `path`.
    ///
    /// A missing file yields defaults unless `required` is set (the path was
    /// given explicitly).
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::Config`] if the file is required but missing,
    /// unreadable, not valid TOML, or holds out-of-range values.
    pub fn load(path: &Path, required: bool) -> Result<Self, BillingError> {
        if !path.exists() {
            if required {
                return Err(BillingError::Config(format!(
                    "settings file {} not found",
                    path.display()
                )));
            }
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            BillingError::Config(format!("failed to read settings file {}: {e}", path.display()))
        })?;
        Self::parse(&contents).map_err(|e| match e {
            BillingError::Config(message) => {
                BillingError::Config(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    /// Parse and validate settings from TOML text.
    pub fn parse(contents: &str) -> Result<Self, BillingError> {
        let settings: Self =
            toml::from_str(contents).map_err(|e| BillingError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), BillingError> {
        self.detail.validate()?;
        if self.provider.endpoint.trim().is_empty() {
            return Err(BillingError::Config(
                "provider.endpoint must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.detail.page_size, 100);
        assert!(!settings.detail.follow_pages);
        assert_eq!(settings.provider.endpoint, "billing.tencentcloudapi.com");
    }

    #[test]
    fn test_parse_overrides() {
        let settings = Settings::parse(
            r#"
            [provider]
            region = "ap-guangzhou"
            timeout_secs = 15

            [detail]
            page_size = 50
            follow_pages = true
            "#,
        )
        .unwrap();

        let endpoint = settings.provider.endpoint();
        assert_eq!(endpoint.region, "ap-guangzhou");
        assert_eq!(endpoint.timeout, Some(Duration::from_secs(15)));
        assert_eq!(settings.detail.page_size, 50);
        assert!(settings.detail.follow_pages);
    }

    #[test]
    fn test_rejects_out_of_range_page_size() {
        for page_size in [0, 101] {
            let err = Settings::parse(&format!("[detail]\npage_size = {page_size}")).unwrap_err();
            assert!(matches!(err, BillingError::Config(_)));
        }
    }

    #[test]
    fn test_detail_policy_constructor_checks_range() {
        assert!(matches!(
            DetailPolicy::new(0, true),
            Err(BillingError::Config(_))
        ));
        assert!(DetailPolicy::new(101, false).is_err());

        let policy = DetailPolicy::new(25, true).unwrap();
        assert_eq!(policy.page_size, 25);
        assert!(policy.follow_pages);
    }

    #[test]
    fn test_rejects_unknown_and_malformed() {
        assert!(Settings::parse("[detail]\npages = 3").is_err());
        assert!(Settings::parse("[detail").is_err());
    }

    #[test]
    fn test_missing_file() {
        let path = Path::new("/nonexistent/tencent-billing/config.toml");
        assert_eq!(Settings::load(path, false).unwrap(), Settings::default());
        assert!(matches!(
            Settings::load(path, true),
            Err(BillingError::Config(_))
        ));
    }
}
