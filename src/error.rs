//! Error taxonomy for folder encryption and decryption.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All failure modes of the encryption engine.
#[derive(Debug, Error)]
pub enum Error {
    /// AEAD authentication failed somewhere in the tree or manifest.
    ///
    /// A wrong password and a tampered ciphertext are cryptographically
    /// indistinguishable, so they share one variant.
    #[error("wrong password or tampered ciphertext")]
    WrongPasswordOrTampered,

    /// The ciphertext does not follow the encrypted file or directory
    /// layout: short header, inconsistent chunk lengths, size mismatches.
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// The encrypted file header carries a version this build cannot read.
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),

    /// The manifest decrypted but failed schema or invariant checks.
    #[error("invalid metadata: {0}")]
    MetadataInvalid(String),

    /// The password was rejected by the encryption-time strength gate.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// An underlying filesystem failure, with the path that caused it.
    #[error("i/o failure at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedCiphertext(detail.into())
    }

    pub(crate) fn metadata(detail: impl Into<String>) -> Self {
        Self::MetadataInvalid(detail.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
