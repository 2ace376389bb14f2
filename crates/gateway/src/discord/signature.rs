//! Ed25519 request verification for the interactions endpoint.

use ed25519_dalek::{Signature, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use tb_domain::error::{Error, Result};

/// Checks `X-Signature-Ed25519` over `X-Signature-Timestamp || body`.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    /// Parse the application's hex-encoded public key.
    pub fn from_hex(public_key: &str) -> Result<Self> {
        let bytes = hex::decode(public_key.trim())
            .map_err(|e| Error::Config(format!("discord public key is not hex: {e}")))?;
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            Error::Config(format!("discord public key must be {PUBLIC_KEY_LENGTH} bytes"))
        })?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| Error::Config(format!("discord public key is invalid: {e}")))?;
        Ok(Self { key })
    }

    pub fn from_key(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// True when `signature_hex` is a valid signature of the request.
    pub fn verify(&self, timestamp: &str, body: &[u8], signature_hex: &str) -> bool {
        let Ok(sig_bytes) = hex::decode(signature_hex.trim()) else {
            return false;
        };
        let Ok(sig_bytes) = <[u8; SIGNATURE_LENGTH]>::try_from(sig_bytes) else {
            return false;
        };
        let signature = Signature::from_bytes(&sig_bytes);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);
        self.key.verify_strict(&message, &signature).is_ok()
    }
}
