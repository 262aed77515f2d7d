//! Encryption at rest for search history terms.
//!
//! Terms are sealed with AES-256-GCM under a process-wide key and stored as
//! an envelope of three hex fields: `nonce:tag:ciphertext`. A random 128-bit
//! nonce is drawn per call, so sealing the same term twice never yields the
//! same envelope. Equality lookups use [`Cipher::fingerprint`] instead.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Nonce, Tag};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::config::{ENCRYPTION_KEY_ENV, SearchHistoryConfig};

/// Placeholder returned for envelopes that cannot be opened.
pub const DECRYPTION_FAILED: &str = "[decryption failed]";

pub const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 16;
const TAG_LEN: usize = 16;

type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Problems with the configured key. Any of these stops startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyConfigError {
    #[error("search history encryption key is not set (expected {ENCRYPTION_KEY_ENV})")]
    Missing,

    #[error("search history encryption key is not valid base64: {0}")]
    Encoding(String),

    #[error("search history encryption key must be {KEY_LEN} bytes, got {0}")]
    Length(usize),
}

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("encryption failed: {0}")]
    Encrypt(String),

    #[error("malformed envelope: {0}")]
    Malformed(&'static str),

    #[error("authentication failed")]
    Authentication,

    #[error("decrypted bytes are not valid UTF-8")]
    Utf8,
}

/// A 256-bit AES key.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, KeyConfigError> {
        let decoded = BASE64
            .decode(encoded.trim())
            .map_err(|e| KeyConfigError::Encoding(e.to_string()))?;

        let bytes: [u8; KEY_LEN] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| KeyConfigError::Length(decoded.len()))?;

        Ok(Self(bytes))
    }

    pub fn from_config(config: &SearchHistoryConfig) -> Result<Self, KeyConfigError> {
        let encoded = config
            .encryption_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(KeyConfigError::Missing)?;
        Self::from_base64(encoded)
    }

    /// Fresh random key, base64 encoded, for `init` and tests.
    #[must_use]
    pub fn generate_base64() -> String {
        let bytes: [u8; KEY_LEN] = rand::rng().random();
        BASE64.encode(bytes)
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

/// Stateless apart from the immutable key; clone freely.
#[derive(Clone)]
pub struct Cipher {
    aead: Aes256Gcm16,
}

impl Cipher {
    #[must_use]
    pub fn new(key: &EncryptionKey) -> Self {
        Self {
            aead: Aes256Gcm16::new(&key.0.into()),
        }
    }

    /// Seals `plaintext` into a `nonce:tag:ciphertext` envelope.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::rng().random();
        let nonce = Nonce::<U16>::from(nonce_bytes);

        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = self
            .aead
            .encrypt_in_place_detached(&nonce, b"", &mut buffer)
            .map_err(|e| CipherError::Encrypt(e.to_string()))?;

        Ok(format!(
            "{}:{}:{}",
            hex::encode(nonce_bytes),
            hex::encode(tag),
            hex::encode(buffer)
        ))
    }

    /// Opens an envelope, reporting why it could not be opened.
    pub fn try_decrypt(&self, envelope: &str) -> Result<String, CipherError> {
        let mut parts = envelope.split(':');
        let (Some(nonce_hex), Some(tag_hex), Some(body_hex), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(CipherError::Malformed("expected three fields"));
        };

        let nonce_bytes = hex::decode(nonce_hex).map_err(|_| CipherError::Malformed("nonce"))?;
        let tag_bytes = hex::decode(tag_hex).map_err(|_| CipherError::Malformed("tag"))?;
        let mut buffer = hex::decode(body_hex).map_err(|_| CipherError::Malformed("ciphertext"))?;

        if nonce_bytes.len() != NONCE_LEN {
            return Err(CipherError::Malformed("nonce length"));
        }
        if tag_bytes.len() != TAG_LEN {
            return Err(CipherError::Malformed("tag length"));
        }

        let nonce = Nonce::<U16>::from_slice(&nonce_bytes);
        let tag = Tag::<U16>::from_slice(&tag_bytes);

        self.aead
            .decrypt_in_place_detached(nonce, b"", &mut buffer, tag)
            .map_err(|_| CipherError::Authentication)?;

        String::from_utf8(buffer).map_err(|_| CipherError::Utf8)
    }

    /// Opens an envelope, degrading to [`DECRYPTION_FAILED`] on any error.
    #[must_use]
    pub fn decrypt(&self, envelope: &str) -> String {
        match self.try_decrypt(envelope) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                warn!(error = %e, "Search history entry could not be decrypted");
                DECRYPTION_FAILED.to_string()
            }
        }
    }

    /// Lowercase hex SHA-256 of the exact plaintext bytes. Not keyed.
    #[must_use]
    pub fn fingerprint(plaintext: &str) -> String {
        hex::encode(Sha256::digest(plaintext.as_bytes()))
    }
}

impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> Cipher {
        Cipher::new(&EncryptionKey::from_bytes([7u8; KEY_LEN]))
    }

    #[test]
    fn round_trip() {
        let cipher = cipher();
        for plaintext in ["pasta", "", "crème brûlée", "a:b:c", "  spaced  ", "🍝 carbonara"] {
            let envelope = cipher.encrypt(plaintext).unwrap();
            assert_eq!(cipher.decrypt(&envelope), plaintext);
        }
    }

    #[test]
    fn envelope_has_three_hex_fields() {
        let envelope = cipher().encrypt("ramen").unwrap();
        let parts: Vec<&str> = envelope.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), NONCE_LEN * 2);
        assert_eq!(parts[1].len(), TAG_LEN * 2);
        assert_eq!(parts[2].len(), "ramen".len() * 2);
    }

    #[test]
    fn encryption_is_not_deterministic() {
        let cipher = cipher();
        let first = cipher.encrypt("pasta").unwrap();
        let second = cipher.encrypt("pasta").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn flipping_any_byte_is_detected() {
        let cipher = cipher();
        let envelope = cipher.encrypt("lasagne").unwrap();
        let parts: Vec<Vec<u8>> = envelope
            .split(':')
            .map(|p| hex::decode(p).unwrap())
            .collect();

        for field in 0..parts.len() {
            for index in 0..parts[field].len() {
                let mut tampered = parts.clone();
                tampered[field][index] ^= 0x01;
                let encoded = tampered
                    .iter()
                    .map(hex::encode)
                    .collect::<Vec<_>>()
                    .join(":");
                assert_eq!(cipher.decrypt(&encoded), DECRYPTION_FAILED);
            }
        }
    }

    #[test]
    fn wrong_key_yields_sentinel() {
        let envelope = cipher().encrypt("tacos").unwrap();
        let other = Cipher::new(&EncryptionKey::from_bytes([9u8; KEY_LEN]));
        assert_eq!(other.decrypt(&envelope), DECRYPTION_FAILED);
    }

    #[test]
    fn malformed_envelopes_yield_sentinel() {
        let cipher = cipher();
        for envelope in ["", "abc", "00:11", "zz:zz:zz", "00:11:22:33", "plain text"] {
            assert_eq!(cipher.decrypt(envelope), DECRYPTION_FAILED, "{envelope}");
        }
        assert!(matches!(
            cipher.try_decrypt("00:11"),
            Err(CipherError::Malformed(_))
        ));
    }

    #[test]
    fn fingerprint_is_sha256_hex() {
        assert_eq!(
            Cipher::fingerprint("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(Cipher::fingerprint("pasta"), Cipher::fingerprint("pasta"));
        assert_ne!(Cipher::fingerprint("pasta"), Cipher::fingerprint("Pasta"));
        assert_ne!(Cipher::fingerprint("pasta"), Cipher::fingerprint("pasta "));
    }

    #[test]
    fn key_from_base64_checks_length() {
        let encoded = EncryptionKey::generate_base64();
        assert!(EncryptionKey::from_base64(&encoded).is_ok());

        let short = BASE64.encode([1u8; 16]);
        assert_eq!(
            EncryptionKey::from_base64(&short),
            Err(KeyConfigError::Length(16))
        );
        assert!(matches!(
            EncryptionKey::from_base64("not*base64"),
            Err(KeyConfigError::Encoding(_))
        ));
    }

    #[test]
    fn key_from_config_requires_a_value() {
        let config = SearchHistoryConfig::default();
        assert_eq!(
            EncryptionKey::from_config(&config),
            Err(KeyConfigError::Missing)
        );
    }

    #[test]
    fn key_debug_is_redacted() {
        let key = EncryptionKey::from_bytes([1u8; KEY_LEN]);
        assert_eq!(format!("{key:?}"), "EncryptionKey(<redacted>)");
    }
}
