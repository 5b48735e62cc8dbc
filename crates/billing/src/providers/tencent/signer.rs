//! TC3-HMAC-SHA256 request signing for Tencent Cloud API 3.0.

use chrono::DateTime;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::BillingError;

type HmacSha256 = Hmac<Sha256>;

/// Signature algorithm name.
pub const ALGORITHM: &str = "TC3-HMAC-SHA256";

/// Content type sent with every request; part of the signed headers.
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";

const SIGNED_HEADERS: &str = "content-type;host;x-tc-action";

/// Signs API requests with a secret id/key pair.
#[derive(Clone)]
pub struct Tc3Signer {
    secret_id: String,
    secret_key: String,
    service: String,
}

impl std::fmt::Debug for Tc3Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tc3Signer")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .field("service", &self.service)
            .finish()
    }
}

impl Tc3Signer {
    /// Create a signer for `service` (e.g. `billing`).
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::Authentication`] if either secret is empty.
    pub fn new(
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
        service: impl Into<String>,
    ) -> Result<Self, BillingError> {
        let secret_id = secret_id.into();
        let secret_key = secret_key.into();
        if secret_id.trim().is_empty() || secret_key.trim().is_empty() {
            return Err(BillingError::Authentication(
                "secret_id and secret_key are required".to_string(),
            ));
        }

        Ok(Self {
            secret_id,
            secret_key,
            service: service.into(),
        })
    }

    /// Build the `Authorization` header value for a JSON POST to `/`.
    pub fn authorization(
        &self,
        host: &str,
        action: &str,
        payload: &str,
        timestamp: i64,
    ) -> Result<String, BillingError> {
        let date = DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| {
                BillingError::Authentication(format!("invalid signing timestamp {timestamp}"))
            })?
            .format("%Y-%m-%d")
            .to_string();

        let canonical_request = canonical_request(host, action, payload);
        let credential_scope = format!("{date}/{}/tc3_request", self.service);
        let string_to_sign = format!(
            "{ALGORITHM}\n{timestamp}\n{credential_scope}\n{}",
            sha256_hex(canonical_request.as_bytes())
        );

        let secret_date = hmac_sha256(format!("TC3{}", self.secret_key).as_bytes(), &date)?;
        let secret_service = hmac_sha256(&secret_date, &self.service)?;
        let secret_signing = hmac_sha256(&secret_service, "tc3_request")?;
        let signature = hex::encode(hmac_sha256(&secret_signing, &string_to_sign)?);

        Ok(format!(
            "{ALGORITHM} Credential={}/{credential_scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
            self.secret_id
        ))
    }
}

/// Canonical request for a JSON POST with no query string.
fn canonical_request(host: &str, action: &str, payload: &str) -> String {
    format!(
        "POST\n/\n\ncontent-type:{CONTENT_TYPE}\nhost:{host}\nx-tc-action:{}\n\n{SIGNED_HEADERS}\n{}",
        action.to_ascii_lowercase(),
        sha256_hex(payload.as_bytes())
    )
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], message: &str) -> Result<Vec<u8>, BillingError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| BillingError::Authentication(format!("invalid signing key: {e}")))?;
    mac.update(message.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMESTAMP: i64 = 1_551_113_065; // 2019-02-25 16:44:25 UTC

    #[test]
    fn test_signer_requires_secrets() {
        assert!(matches!(
            Tc3Signer::new("", "key", "billing"),
            Err(BillingError::Authentication(_))
        ));
        assert!(matches!(
            Tc3Signer::new("id", "  ", "billing"),
            Err(BillingError::Authentication(_))
        ));
    }

    #[test]
    fn test_canonical_request_layout() {
        let request = canonical_request("billing.tencentcloudapi.com", "DescribeBillDetail", "{}");
        let lines: Vec<&str> = request.split('\n').collect();
        assert_eq!(lines[0], "POST");
        assert_eq!(lines[1], "/");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "content-type:application/json; charset=utf-8");
        assert_eq!(lines[4], "host:billing.tencentcloudapi.com");
        assert_eq!(lines[5], "x-tc-action:describebilldetail");
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], SIGNED_HEADERS);
        assert_eq!(lines[8], sha256_hex(b"{}"));
    }

    #[test]
    fn test_sha256_hex_known_value() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_authorization_header_shape() {
        let signer = Tc3Signer::new("AKIDEXAMPLE", "secret", "billing").unwrap();
        let header = signer
            .authorization("billing.tencentcloudapi.com", "DescribeBillDetail", "{}", TIMESTAMP)
            .unwrap();

        assert!(header.starts_with(
            "TC3-HMAC-SHA256 Credential=AKIDEXAMPLE/2019-02-25/billing/tc3_request, "
        ));
        assert!(header.contains("SignedHeaders=content-type;host;x-tc-action, "));
        let signature = header.rsplit("Signature=").next().unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_known_signature() {
        let signer = Tc3Signer::new("AKIDEXAMPLE", "secret", "billing").unwrap();
        let header = signer
            .authorization(
                "billing.tencentcloudapi.com",
                "DescribeBillDetail",
                "{\"Limit\":1}",
                TIMESTAMP,
            )
            .unwrap();

        assert_eq!(
            header,
            "TC3-HMAC-SHA256 Credential=AKIDEXAMPLE/2019-02-25/billing/tc3_request, \
             SignedHeaders=content-type;host;x-tc-action, \
             Signature=3e437a3dc38d055ed3a559c67ef0f988cdd5504dfdc5b19d3b66d8d5ea2d8a8d"
        );
    }

    #[test]
    fn test_signature_depends_on_key_and_payload() {
        let signer = Tc3Signer::new("AKIDEXAMPLE", "secret", "billing").unwrap();
        let other = Tc3Signer::new("AKIDEXAMPLE", "other-secret", "billing").unwrap();
        let host = "billing.tencentcloudapi.com";

        let first = signer.authorization(host, "DescribeBillDetail", "{}", TIMESTAMP).unwrap();
        let again = signer.authorization(host, "DescribeBillDetail", "{}", TIMESTAMP).unwrap();
        let other_key = other.authorization(host, "DescribeBillDetail", "{}", TIMESTAMP).unwrap();
        let other_body = signer
            .authorization(host, "DescribeBillDetail", "{\"Limit\":1}", TIMESTAMP)
            .unwrap();

        assert_eq!(first, again);
        assert_ne!(first, other_key);
        assert_ne!(first, other_body);
    }

    #[test]
    fn test_debug_redacts_secret_key() {
        let signer = Tc3Signer::new("AKIDEXAMPLE", "very-secret", "billing").unwrap();
        let debug = format!("{signer:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
