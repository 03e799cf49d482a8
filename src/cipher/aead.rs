use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::config::NONCE_SIZE;
use crate::error::{Error, Result};
use crate::secret::Key;

/// AES-256-GCM with caller-supplied nonces and associated data.
///
/// Nonce management lives with the callers: the stream cipher derives
/// per-chunk nonces from a file's base nonce, and the manifest codec
/// generates one fresh nonce per blob. This wrapper only seals and opens.
pub struct AeadCipher {
    aead: Aes256Gcm,
}

impl AeadCipher {
    pub fn new(key: &Key) -> Self {
        Self { aead: Aes256Gcm::new(key.expose().into()) }
    }

    /// Seals `plaintext` under `nonce`, binding `ad`.
    ///
    /// The output is the ciphertext followed by the 16-byte GCM tag.
    pub fn seal(&self, nonce: &[u8; NONCE_SIZE], plaintext: &[u8], ad: &[u8]) -> Result<Vec<u8>> {
        self.aead
            .encrypt(Nonce::from_slice(nonce), Payload { msg: plaintext, aad: ad })
            .map_err(|_| Error::malformed("aead seal failed"))
    }

    /// Opens a sealed blob, verifying the tag against `nonce` and `ad`.
    ///
    /// Any authentication failure is reported as
    /// [`Error::WrongPasswordOrTampered`]; the two causes cannot be told
    /// apart.
    pub fn open(&self, nonce: &[u8; NONCE_SIZE], ciphertext: &[u8], ad: &[u8]) -> Result<Vec<u8>> {
        self.aead
            .decrypt(Nonce::from_slice(nonce), Payload { msg: ciphertext, aad: ad })
            .map_err(|_| Error::WrongPasswordOrTampered)
    }
}
