//! Webhook signature verification.
//!
//! The provider signs `"{timestamp}.{raw payload}"` with HMAC-SHA256 under
//! the shared webhook secret and sends `Stripe-Signature: t=<ts>,v1=<hex>`.
//! Verification recomputes the MAC and compares in constant time
//! (`Mac::verify_slice`); deliveries outside the replay tolerance are
//! rejected even with a valid MAC.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// How far a delivery's timestamp may drift from now, in seconds.
pub const REPLAY_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("missing signature header")]
    MissingHeader,

    #[error("signature header missing timestamp")]
    MissingTimestamp,

    #[error("signature header missing v1 signature")]
    MissingSignature,

    #[error("malformed signature header")]
    Malformed,

    #[error("timestamp outside replay tolerance")]
    StaleTimestamp,

    #[error("signature mismatch")]
    Mismatch,
}

#[derive(Debug)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Result<SignatureHeader, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or(SignatureError::Malformed)?;
        match key {
            "t" => {
                timestamp =
                    Some(value.parse::<i64>().map_err(|_| SignatureError::Malformed)?);
            }
            // The provider may include multiple v1 entries during secret
            // rotation; any one of them matching is sufficient.
            "v1" => {
                signatures.push(hex::decode(value).map_err(|_| SignatureError::Malformed)?);
            }
            // Unknown schemes (v0, ...) are ignored.
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(SignatureError::MissingSignature);
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// Verify `payload` against the provider's signature header.
///
/// `now` is the caller's clock as a Unix timestamp, passed in so tests can
/// pin it.
pub fn verify(
    payload: &[u8],
    header: Option<&str>,
    secret: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let header = match header {
        Some(h) if !h.is_empty() => h,
        _ => return Err(SignatureError::MissingHeader),
    };

    let parsed = parse_header(header)?;

    if (now - parsed.timestamp).abs() > REPLAY_TOLERANCE_SECS {
        return Err(SignatureError::StaleTimestamp);
    }

    for candidate in &parsed.signatures {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| SignatureError::Malformed)?;
        mac.update(parsed.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);

        if mac.verify_slice(candidate).is_ok() {
            return Ok(());
        }
    }

    Err(SignatureError::Mismatch)
}

/// Compute the `t=...,v1=...` header for a payload. Test-side counterpart
/// of [`verify`].
#[cfg(test)]
pub fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test123secret456";
    const NOW: i64 = 1_755_000_000;
    const PAYLOAD: &[u8] = b"{\"type\":\"checkout.session.completed\"}";

    #[test]
    fn test_valid_signature_accepted() {
        let header = sign(PAYLOAD, SECRET, NOW);
        assert!(verify(PAYLOAD, Some(&header), SECRET, NOW).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let header = sign(PAYLOAD, "wrong_secret", NOW);
        assert!(matches!(
            verify(PAYLOAD, Some(&header), SECRET, NOW),
            Err(SignatureError::Mismatch)
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let header = sign(PAYLOAD, SECRET, NOW);
        let tampered = b"{\"type\":\"checkout.session.completed\",\"hacked\":true}";
        assert!(matches!(
            verify(tampered, Some(&header), SECRET, NOW),
            Err(SignatureError::Mismatch)
        ));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        // Ten minutes old, beyond the five-minute tolerance.
        let header = sign(PAYLOAD, SECRET, NOW - 600);
        assert!(matches!(
            verify(PAYLOAD, Some(&header), SECRET, NOW),
            Err(SignatureError::StaleTimestamp)
        ));
    }

    #[test]
    fn test_timestamp_within_tolerance_accepted() {
        let header = sign(PAYLOAD, SECRET, NOW - REPLAY_TOLERANCE_SECS);
        assert!(verify(PAYLOAD, Some(&header), SECRET, NOW).is_ok());
    }

    #[test]
    fn test_rotated_secret_second_v1_accepted() {
        let header = sign(PAYLOAD, SECRET, NOW);
        let old = sign(PAYLOAD, "whsec_previous", NOW);
        let old_sig = old.split("v1=").nth(1).unwrap();
        let combined = format!("{header},v1={old_sig}");
        assert!(verify(PAYLOAD, Some(&combined), SECRET, NOW).is_ok());
    }

    #[test]
    fn test_missing_header_rejected() {
        assert!(matches!(
            verify(PAYLOAD, None, SECRET, NOW),
            Err(SignatureError::MissingHeader)
        ));
        assert!(matches!(
            verify(PAYLOAD, Some(""), SECRET, NOW),
            Err(SignatureError::MissingHeader)
        ));
    }

    #[test]
    fn test_missing_parts_rejected() {
        assert!(matches!(
            verify(PAYLOAD, Some("v1=deadbeef"), SECRET, NOW),
            Err(SignatureError::MissingTimestamp)
        ));
        assert!(matches!(
            verify(PAYLOAD, Some("t=1234567890"), SECRET, NOW),
            Err(SignatureError::MissingSignature)
        ));
    }

    #[test]
    fn test_malformed_header_rejected() {
        for header in ["garbage", "t=abc,v1=00", "t=123,v1=zz"] {
            assert!(matches!(
                verify(PAYLOAD, Some(header), SECRET, NOW),
                Err(SignatureError::Malformed)
            ));
        }
    }
}
