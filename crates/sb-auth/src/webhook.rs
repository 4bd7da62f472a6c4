//! Inbound webhook signature checks.
//!
//! - Clerk delivers through Svix: base64 HMAC-SHA256 over `id.timestamp.body`,
//!   keyed with the base64 secret after the `whsec_` prefix.
//! - Provisioning and payment partners send a hex HMAC-SHA256 of the raw body
//!   in `x-webhook-signature`.
//! - Sanity sends a hex HMAC-SHA256 in `sanity-webhook-signature`; the check is
//!   skipped when no secret is configured.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::AuthError;

type HmacSha256 = Hmac<Sha256>;

pub const SVIX_ID: &str = "svix-id";
pub const SVIX_TIMESTAMP: &str = "svix-timestamp";
pub const SVIX_SIGNATURE: &str = "svix-signature";
pub const PARTNER_SIGNATURE: &str = "x-webhook-signature";
pub const SANITY_SIGNATURE: &str = "sanity-webhook-signature";

/// Maximum clock skew accepted on `svix-timestamp`, in seconds.
pub const SVIX_TOLERANCE_SECS: i64 = 300;

/// The three Svix delivery headers.
#[derive(Debug, Clone, Copy)]
pub struct SvixHeaders<'a> {
    pub id: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
}

impl<'a> SvixHeaders<'a> {
    /// Collect the headers, failing on the first one that is missing or empty.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingHeader` naming the absent header.
    pub fn from_lookup<F>(mut get: F) -> Result<Self, AuthError>
    where
        F: FnMut(&'static str) -> Option<&'a str>,
    {
        let mut require = |name: &'static str| {
            get(name)
                .filter(|v| !v.is_empty())
                .ok_or(AuthError::MissingHeader(name))
        };
        Ok(Self {
            id: require(SVIX_ID)?,
            timestamp: require(SVIX_TIMESTAMP)?,
            signature: require(SVIX_SIGNATURE)?,
        })
    }
}

fn mac_for(key: &[u8]) -> Result<HmacSha256, AuthError> {
    HmacSha256::new_from_slice(key).map_err(|e| AuthError::Other(format!("invalid HMAC key: {e}")))
}

fn svix_key(secret: &str) -> Result<Vec<u8>, AuthError> {
    let encoded = secret.strip_prefix("whsec_").unwrap_or(secret);
    STANDARD
        .decode(encoded)
        .map_err(|e| AuthError::InvalidSignature(format!("webhook secret is not base64: {e}")))
}

/// Compute the `v1,<base64>` signature Svix would send for this delivery.
///
/// # Errors
///
/// Returns `AuthError::InvalidSignature` if the secret is not valid base64.
pub fn sign_svix(secret: &str, id: &str, timestamp: &str, body: &[u8]) -> Result<String, AuthError> {
    let mut mac = mac_for(&svix_key(secret)?)?;
    mac.update(id.as_bytes());
    mac.update(b".");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    Ok(format!("v1,{}", STANDARD.encode(mac.finalize().into_bytes())))
}

/// Verify a Svix delivery against `now`.
///
/// The signature header may carry several space-separated `v1,<sig>` entries;
/// any one matching is enough.
///
/// # Errors
///
/// Returns `AuthError::InvalidSignature` on a stale timestamp, a bad secret, or
/// when no signature matches.
pub fn verify_svix(
    secret: &str,
    headers: &SvixHeaders<'_>,
    body: &[u8],
    now: DateTime<Utc>,
) -> Result<(), AuthError> {
    let sent: i64 = headers
        .timestamp
        .parse()
        .map_err(|_| AuthError::InvalidSignature("timestamp is not a number".into()))?;
    if now.timestamp().abs_diff(sent) > SVIX_TOLERANCE_SECS.unsigned_abs() {
        return Err(AuthError::InvalidSignature("timestamp outside tolerance".into()));
    }

    let expected = sign_svix(secret, headers.id, headers.timestamp, body)?;
    let matched = headers
        .signature
        .split_whitespace()
        .filter(|candidate| candidate.starts_with("v1,"))
        .any(|candidate| bool::from(candidate.as_bytes().ct_eq(expected.as_bytes())));

    if matched {
        Ok(())
    } else {
        Err(AuthError::InvalidSignature("no matching signature".into()))
    }
}

/// Lowercase hex HMAC-SHA256 of `body`.
///
/// # Errors
///
/// Returns `AuthError::Other` if the key is rejected by the MAC.
pub fn hex_hmac_sha256(secret: &str, body: &[u8]) -> Result<String, AuthError> {
    let mut mac = mac_for(secret.as_bytes())?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a hex HMAC signature. A missing secret or signature fails.
///
/// # Errors
///
/// Returns `AuthError::NotConfigured` without a secret and
/// `AuthError::InvalidSignature` when the signature is absent or wrong.
pub fn verify_hex_signature(
    secret: &str,
    signature: Option<&str>,
    body: &[u8],
) -> Result<(), AuthError> {
    if secret.is_empty() {
        return Err(AuthError::NotConfigured("webhooks.provision_secret"));
    }
    let signature = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AuthError::InvalidSignature("missing signature".into()))?;

    let expected = hex_hmac_sha256(secret, body)?;
    if bool::from(signature.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(AuthError::InvalidSignature("signature mismatch".into()))
    }
}

/// Verify a Sanity webhook. Passes unconditionally when `secret` is empty.
///
/// # Errors
///
/// Returns `AuthError::InvalidSignature` when a secret is set and the
/// signature is absent or wrong.
pub fn verify_sanity_signature(
    secret: &str,
    signature: Option<&str>,
    body: &[u8],
) -> Result<(), AuthError> {
    if secret.is_empty() {
        tracing::debug!("sanity webhook secret not set, skipping signature check");
        return Ok(());
    }
    let expected = hex_hmac_sha256(secret, body)?;
    let given = signature.unwrap_or_default().trim();
    if bool::from(given.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(AuthError::InvalidSignature("signature mismatch".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // base64("test-webhook-secret-key")
    const SECRET: &str = "whsec_dGVzdC13ZWJob29rLXNlY3JldC1rZXk=";

    fn headers<'a>(id: &'a str, ts: &'a str, sig: &'a str) -> SvixHeaders<'a> {
        SvixHeaders {
            id,
            timestamp: ts,
            signature: sig,
        }
    }

    #[test]
    fn svix_roundtrip_accepts_valid_delivery() {
        let now = Utc::now();
        let ts = now.timestamp().to_string();
        let body = br#"{"type":"user.created"}"#;
        let sig = sign_svix(SECRET, "msg_1", &ts, body).unwrap();
        assert!(sig.starts_with("v1,"));

        verify_svix(SECRET, &headers("msg_1", &ts, &sig), body, now).unwrap();
    }

    #[test]
    fn svix_accepts_any_listed_signature() {
        let now = Utc::now();
        let ts = now.timestamp().to_string();
        let body = b"{}";
        let good = sign_svix(SECRET, "msg_1", &ts, body).unwrap();
        let header = format!("v1,AAAA {good}");
        verify_svix(SECRET, &headers("msg_1", &ts, &header), body, now).unwrap();
    }

    #[test]
    fn svix_rejects_tampered_body() {
        let now = Utc::now();
        let ts = now.timestamp().to_string();
        let sig = sign_svix(SECRET, "msg_1", &ts, b"original").unwrap();
        let err = verify_svix(SECRET, &headers("msg_1", &ts, &sig), b"tampered", now).unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature(_)));
    }

    #[test]
    fn svix_rejects_stale_timestamp() {
        let now = Utc::now();
        let stale = (now.timestamp() - SVIX_TOLERANCE_SECS - 1).to_string();
        let sig = sign_svix(SECRET, "msg_1", &stale, b"{}").unwrap();
        let err = verify_svix(SECRET, &headers("msg_1", &stale, &sig), b"{}", now).unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature(_)));
    }

    #[test]
    fn svix_rejects_extreme_timestamp() {
        let now = Utc::now();
        let extreme = i64::MIN.to_string();
        let sig = sign_svix(SECRET, "msg_1", &extreme, b"{}").unwrap();
        let err = verify_svix(SECRET, &headers("msg_1", &extreme, &sig), b"{}", now).unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature(_)));
    }

    #[test]
    fn svix_headers_report_first_missing() {
        let err = SvixHeaders::from_lookup(|name| (name == SVIX_ID).then_some("msg_1")).unwrap_err();
        assert!(matches!(err, AuthError::MissingHeader(SVIX_TIMESTAMP)));
    }

    #[test]
    fn hex_hmac_matches_known_vector() {
        // RFC 4231 test case 2
        let sig = hex_hmac_sha256("Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            sig,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn hex_signature_verification() {
        let body = br#"{"org_slug":"worldcc"}"#;
        let sig = hex_hmac_sha256("partner-secret", body).unwrap();

        verify_hex_signature("partner-secret", Some(&sig), body).unwrap();
        assert!(matches!(
            verify_hex_signature("partner-secret", Some("deadbeef"), body),
            Err(AuthError::InvalidSignature(_))
        ));
        assert!(matches!(
            verify_hex_signature("partner-secret", None, body),
            Err(AuthError::InvalidSignature(_))
        ));
        assert!(matches!(
            verify_hex_signature("", Some(&sig), body),
            Err(AuthError::NotConfigured(_))
        ));
    }

    #[test]
    fn sanity_check_skipped_without_secret() {
        verify_sanity_signature("", None, b"anything").unwrap();

        let sig = hex_hmac_sha256("cms", b"doc").unwrap();
        verify_sanity_signature("cms", Some(&sig), b"doc").unwrap();
        assert!(verify_sanity_signature("cms", None, b"doc").is_err());
    }
}
