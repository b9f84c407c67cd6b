//! Reversible encryption of user identifiers carried in token subjects.
//!
//! AES-256-GCM with a 128-bit nonce: a fresh random IV per call, and an
//! integrity tag appended to the ciphertext so tampering is detected at
//! decryption rather than producing garbage plaintext.

use core::fmt;
use core::str::FromStr;

use aes_gcm::{
    AesGcm,
    aead::{Aead, KeyInit, consts::U16, generic_array::GenericArray},
    aes::Aes256,
};
use rand::{RngCore, rngs::OsRng};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::error::ConfigurationError;

pub const IV_LEN: usize = 16;
const KEY_LEN: usize = 32;

type Aes256Gcm128 = AesGcm<Aes256, U16>;

/// Why a ciphertext could not be turned back into an identifier.
///
/// Always recoverable: callers treat it as "unauthenticated".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecryptionError {
    #[error("expected exactly one ':' between iv and ciphertext")]
    Separator,

    #[error("iv or ciphertext is empty")]
    EmptySegment,

    #[error("segment is not valid hex")]
    InvalidHex,

    #[error("iv must be {IV_LEN} bytes")]
    IvLength,

    #[error("ciphertext failed authentication")]
    Authentication,

    #[error("plaintext is not valid UTF-8")]
    InvalidUtf8,
}

/// An `(iv, ciphertext)` pair, serialized as `<hex iv>:<hex ciphertext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedId {
    iv: [u8; IV_LEN],
    ciphertext: Vec<u8>,
}

impl EncryptedId {
    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }
}

impl fmt::Display for EncryptedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", hex::encode(self.iv), hex::encode(&self.ciphertext))
    }
}

impl FromStr for EncryptedId {
    type Err = DecryptionError;

    /// Rejects malformed input without touching any key material.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (Some(iv_hex), Some(ct_hex), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(DecryptionError::Separator);
        };
        if iv_hex.is_empty() || ct_hex.is_empty() {
            return Err(DecryptionError::EmptySegment);
        }

        let iv_bytes = hex::decode(iv_hex).map_err(|_| DecryptionError::InvalidHex)?;
        let ciphertext = hex::decode(ct_hex).map_err(|_| DecryptionError::InvalidHex)?;
        let iv: [u8; IV_LEN] = iv_bytes
            .try_into()
            .map_err(|_| DecryptionError::IvLength)?;

        Ok(Self { iv, ciphertext })
    }
}

/// Symmetric cipher bound to the process-wide encryption key.
#[derive(Clone)]
pub struct IdentifierCipher {
    cipher: Aes256Gcm128,
}

impl IdentifierCipher {
    /// Build from the hex-encoded 256-bit key.
    pub fn new(key_hex: &SecretString) -> Result<Self, ConfigurationError> {
        let key = hex::decode(key_hex.expose_secret().trim())
            .map_err(|_| ConfigurationError::InvalidEncryptionKey)?;
        if key.len() != KEY_LEN {
            return Err(ConfigurationError::InvalidEncryptionKey);
        }
        let cipher = Aes256Gcm128::new_from_slice(&key)
            .map_err(|_| ConfigurationError::InvalidEncryptionKey)?;
        Ok(Self { cipher })
    }

    /// Encrypt with a fresh random IV. Two calls on the same input differ.
    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedId, aes_gcm::Error> {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);
        let ciphertext = self
            .cipher
            .encrypt(GenericArray::from_slice(&iv), plaintext.as_bytes())?;
        Ok(EncryptedId { iv, ciphertext })
    }

    pub fn decrypt(&self, encrypted: &EncryptedId) -> Result<String, DecryptionError> {
        let plaintext = self
            .cipher
            .decrypt(GenericArray::from_slice(&encrypted.iv), encrypted.ciphertext.as_slice())
            .map_err(|_| DecryptionError::Authentication)?;
        String::from_utf8(plaintext).map_err(|_| DecryptionError::InvalidUtf8)
    }
}

impl fmt::Debug for IdentifierCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifierCipher").finish_non_exhaustive()
    }
}
