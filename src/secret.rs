use secrecy::zeroize::Zeroize;
use secrecy::{ExposeSecret, SecretBox};

use crate::config::KEY_SIZE;

/// A password held behind [`SecretBox`]: zeroized on drop, absent from
/// debug output.
pub struct Password {
    inner: SecretBox<String>,
}

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self { inner: SecretBox::new(Box::new(password.into())) }
    }

    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }
}

/// A derived 32-byte AES key.
///
/// Exists for the duration of a single encrypt or decrypt operation and is
/// wiped from memory when dropped.
#[derive(Debug)]
pub struct Key {
    inner: SecretBox<[u8; KEY_SIZE]>,
}

impl Key {
    pub fn new(mut bytes: [u8; KEY_SIZE]) -> Self {
        let inner = SecretBox::new(Box::new(bytes));
        bytes.zeroize();
        Self { inner }
    }

    pub fn expose(&self) -> &[u8; KEY_SIZE] {
        self.inner.expose_secret()
    }
}
