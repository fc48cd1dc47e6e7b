//! HMAC-SHA256 verification of GitHub webhook deliveries.
//!
//! The digest is always computed over the raw request body exactly as it
//! arrived on the wire. Re-encoding a parsed body would change key order and
//! whitespace and break interoperability with GitHub's signer.

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{error, warn};

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

/// Compute the `sha256=<hex>` signature GitHub would send for `payload`.
pub fn sign(payload: &[u8], secret: &str) -> Result<String, InvalidLength> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())?;
    mac.update(payload);
    Ok(format!(
        "{}{}",
        SIGNATURE_PREFIX,
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Check `signature` against the HMAC of `payload` keyed by `secret`.
///
/// - `secret` unset or empty: verification is disabled and this returns
///   `true` (with a warning).
/// - `signature` missing: `false`.
/// - otherwise the expected `sha256=<hex>` string is compared with the
///   provided one in constant time.
pub fn verify(payload: &[u8], signature: Option<&str>, secret: Option<&str>) -> bool {
    let secret = match secret.filter(|s| !s.is_empty()) {
        Some(secret) => secret,
        None => {
            warn!("webhook secret not configured, skipping signature verification");
            return true;
        }
    };

    let signature = match signature.filter(|s| !s.is_empty()) {
        Some(signature) => signature,
        None => {
            error!("X-Hub-Signature-256 header missing");
            return false;
        }
    };

    let expected = match sign(payload, secret) {
        Ok(expected) => expected,
        Err(e) => {
            error!(error = %e, "HMAC init failed");
            return false;
        }
    };
    // Length is public; only the content comparison must not short-circuit.
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}
