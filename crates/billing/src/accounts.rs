//! Account credential records.

use std::path::Path;

use serde::Deserialize;

use crate::error::BillingError;

/// Display name used when an account record has no `name`.
pub const UNKNOWN_ACCOUNT: &str = "unknown";

/// One account record as read from the accounts file.
///
/// Credential fields are optional here so that a record missing them can be
/// reported and skipped instead of failing the whole file.
#[derive(Clone, Default, Deserialize)]
pub struct AccountCredential {
    /// Display label.
    #[serde(default)]
    pub name: Option<String>,
    /// Tencent Cloud `SecretId`.
    #[serde(default)]
    pub secret_id: Option<String>,
    /// Tencent Cloud `SecretKey`.
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Why the record could not be read, when it was malformed in the file.
    #[serde(skip)]
    pub malformed: Option<String>,
}

impl std::fmt::Debug for AccountCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountCredential")
            .field("name", &self.name)
            .field("secret_id", &self.secret_id)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("malformed", &self.malformed)
            .finish()
    }
}

impl AccountCredential {
    /// Create a record with all fields present.
    pub fn new(
        name: impl Into<String>,
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            secret_id: Some(secret_id.into()),
            secret_key: Some(secret_key.into()),
            malformed: None,
        }
    }

    /// Placeholder for a file entry that is not a valid account object.
    fn from_malformed(entry: &serde_json::Value, reason: String) -> Self {
        Self {
            name: entry
                .get("name")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
            malformed: Some(reason),
            ..Self::default()
        }
    }

    /// Name shown in logs; `"unknown"` when absent.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNKNOWN_ACCOUNT)
    }

    /// Check that both secrets are present and non-blank.
    ///
    /// Secrets are trimmed of surrounding whitespace in the returned
    /// credential; the signer never sees the padding.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::Validation`] naming the missing fields, or the
    /// parse failure of a malformed record.
    pub fn validate(&self) -> Result<ValidatedCredential, BillingError> {
        if let Some(reason) = &self.malformed {
            return Err(BillingError::Validation(format!(
                "malformed account record: {reason}"
            )));
        }

        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        match (present(&self.secret_id), present(&self.secret_key)) {
            (Some(secret_id), Some(secret_key)) => Ok(ValidatedCredential {
                name: self.display_name().to_string(),
                secret_id,
                secret_key,
            }),
            (secret_id, secret_key) => {
                let missing: Vec<&str> = [
                    secret_id.is_none().then_some("secret_id"),
                    secret_key.is_none().then_some("secret_key"),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(BillingError::Validation(format!(
                    "missing {} in account record",
                    missing.join(" and ")
                )))
            }
        }
    }
}

/// Account whose secrets are known to be present, trimmed of whitespace.
#[derive(Clone)]
pub struct ValidatedCredential {
    pub name: String,
    pub secret_id: String,
    pub secret_key: String,
}

impl std::fmt::Debug for ValidatedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedCredential")
            .field("name", &self.name)
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Load the ordered list of account records from a JSON file.
///
/// # Errors
///
/// Returns [`BillingError::Config`] if the file cannot be read or is not a
/// JSON array. Entries that are not valid account objects are kept as
/// malformed records and fail validation individually.
pub fn load_accounts(path: &Path) -> Result<Vec<AccountCredential>, BillingError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        BillingError::Config(format!("failed to read accounts file {}: {e}", path.display()))
    })?;
    parse_accounts(&contents)
        .map_err(|e| BillingError::Config(format!("invalid accounts file {}: {e}", path.display())))
}

/// Parse account records from JSON text.
pub fn parse_accounts(contents: &str) -> Result<Vec<AccountCredential>, serde_json::Error> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(contents)?;
    Ok(entries
        .into_iter()
        .map(|entry| {
            AccountCredential::deserialize(&entry)
                .unwrap_or_else(|e| AccountCredential::from_malformed(&entry, e.to_string()))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order_and_optional_fields() {
        let accounts = parse_accounts(
            r#"[
                {"name": "A"},
                {"name": "B", "secret_id": "x", "secret_key": "y"},
                {"secret_id": "x2", "secret_key": "y2", "note": "ignored"}
            ]"#,
        )
        .unwrap();

        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[0].display_name(), "A");
        assert!(accounts[0].secret_id.is_none());
        assert_eq!(accounts[1].display_name(), "B");
        assert_eq!(accounts[2].display_name(), UNKNOWN_ACCOUNT);
    }

    #[test]
    fn test_validate_reports_missing_fields() {
        let account = AccountCredential {
            name: Some("A".into()),
            ..Default::default()
        };
        let err = account.validate().unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));
        assert!(err.to_string().contains("secret_id and secret_key"));

        let account = AccountCredential {
            name: Some("A".into()),
            secret_id: Some("x".into()),
            secret_key: Some("   ".into()),
            ..Default::default()
        };
        let err = account.validate().unwrap_err();
        assert!(err.to_string().contains("missing secret_key"));
    }

    #[test]
    fn test_validate_success() {
        let validated = AccountCredential::new("B", " x ", "y").validate().unwrap();
        assert_eq!(validated.name, "B");
        assert_eq!(validated.secret_id, "x");
        assert_eq!(validated.secret_key, "y");
    }

    #[test]
    fn test_debug_redacts_secret_key() {
        let account = AccountCredential::new("B", "x", "top-secret");
        assert!(!format!("{account:?}").contains("top-secret"));
        let validated = account.validate().unwrap();
        assert!(!format!("{validated:?}").contains("top-secret"));
    }

    #[test]
    fn test_mistyped_record_only_fails_itself() {
        let accounts = parse_accounts(
            r#"[
                {"name": "A", "secret_id": 12345, "secret_key": "k"},
                42,
                {"name": "B", "secret_id": "x", "secret_key": "y"}
            ]"#,
        )
        .unwrap();

        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[0].display_name(), "A");
        let err = accounts[0].validate().unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));
        assert!(err.to_string().contains("malformed account record"));

        assert_eq!(accounts[1].display_name(), UNKNOWN_ACCOUNT);
        assert!(accounts[1].validate().is_err());
        assert!(accounts[2].validate().is_ok());
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_accounts(r#"{"name": "A"}"#).is_err());
        assert!(parse_accounts("not json").is_err());
    }
}
