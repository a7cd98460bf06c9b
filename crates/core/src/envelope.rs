//! Encrypted request envelopes.
//!
//! The enrollment endpoint accepts its payload as `{"data": ...}` where the
//! value is `base64(nonce || ciphertext)` under AES-256-GCM with a shared
//! key, so order parameters are opaque in transit and client logs. The key is
//! configured as 64 hex characters.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::error::CoreError;
use crate::signing::decode_hex;

const NONCE_LEN: usize = 12;

/// AES-256-GCM envelope codec.
#[derive(Clone)]
pub struct Envelope {
    cipher: Aes256Gcm,
}

impl Envelope {
    pub fn new(key: &[u8; 32]) -> Self {
        Envelope {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    /// Parse a 64-hex-character key, as configured via the environment.
    pub fn from_hex_key(hex: &str) -> Result<Self, CoreError> {
        let raw = decode_hex(hex)
            .filter(|raw| raw.len() == 32)
            .ok_or_else(|| {
                CoreError::Validation("envelope key must be 64 hex characters".into())
            })?;
        let mut key = [0u8; 32];
        key.copy_from_slice(&raw);
        Ok(Envelope::new(&key))
    }

    /// Seal `plaintext` under a fresh random nonce.
    pub fn seal(&self, plaintext: &str) -> Result<String, CoreError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce_bytes)
            .map_err(|e| CoreError::Internal(format!("nonce generation failed: {e}")))?;
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|_| CoreError::Internal("envelope seal failed".into()))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend(ciphertext);
        Ok(BASE64.encode(combined))
    }

    /// Open a sealed payload. Fails on wrong key, truncation, or tampering;
    /// callers treat all of these as a malformed client request.
    pub fn open(&self, sealed: &str) -> Result<String, CoreError> {
        let combined = BASE64
            .decode(sealed)
            .map_err(|_| CoreError::Validation("envelope is not valid base64".into()))?;
        if combined.len() < NONCE_LEN {
            return Err(CoreError::Validation("envelope too short".into()));
        }
        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CoreError::Validation("envelope decryption failed".into()))?;
        String::from_utf8(plaintext)
            .map_err(|_| CoreError::Validation("envelope is not valid UTF-8".into()))
    }
}
