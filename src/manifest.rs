//! Encrypted manifest carrying the tree's structural metadata.
//!
//! The manifest is the only record of the tree's shape: directory entries
//! leave no filesystem marker in the encrypted output. It is serialized as
//! canonical JSON and sealed as a single AES-256-GCM blob, persisted as a
//! 12-byte random nonce followed by ciphertext and tag, with the literal
//! associated data `"metadata"`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cipher::AeadCipher;
use crate::config::{MANIFEST_AD, MANIFEST_FILENAME, MANIFEST_VERSION, NONCE_SIZE, SALT_FILENAME, TAG_SIZE};
use crate::error::{Error, Result};
use crate::kdf;

/// Metadata for one entry of the source tree.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FileEntry {
    /// Forward-slash relative path, identical on every platform.
    pub relative_path: String,

    /// Plaintext size in bytes; 0 for directories.
    pub original_size: u64,

    /// Size of the ciphertext file on disk. Advisory only; verification
    /// uses `original_size`.
    pub encrypted_size: u64,

    pub is_directory: bool,

    /// POSIX mode bits captured at encryption time, absent on platforms
    /// without them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<u32>,
}

/// The ordered inventory of an encrypted tree.
///
/// Canonical order is directories first, then files, each sorted by path.
/// A single forward pass over the entries always creates a parent directory
/// before anything below it.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Manifest {
    pub version: u32,
    pub files: Vec<FileEntry>,
}

impl Manifest {
    pub fn new(files: Vec<FileEntry>) -> Self {
        Self { version: MANIFEST_VERSION, files }
    }

    /// Serializes and seals the manifest into its persisted form:
    /// nonce followed by ciphertext and tag.
    pub fn seal(&self, cipher: &AeadCipher) -> Result<Vec<u8>> {
        let plaintext = serde_json::to_vec(self).map_err(|e| Error::metadata(format!("manifest serialization failed: {e}")))?;

        let nonce: [u8; NONCE_SIZE] = kdf::random_bytes()?;
        let sealed = cipher.seal(&nonce, &plaintext, MANIFEST_AD)?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + sealed.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&sealed);
        Ok(blob)
    }

    /// Opens a persisted manifest blob, parses it, and checks every schema
    /// invariant.
    ///
    /// # Errors
    ///
    /// * [`Error::MalformedCiphertext`] if the blob cannot even hold a nonce
    ///   and a tag.
    /// * [`Error::WrongPasswordOrTampered`] if authentication fails.
    /// * [`Error::MetadataInvalid`] if the plaintext does not parse or
    ///   violates the schema.
    pub fn open(cipher: &AeadCipher, blob: &[u8]) -> Result<Self> {
        if blob.len() < NONCE_SIZE + TAG_SIZE {
            return Err(Error::malformed("manifest blob too short"));
        }

        let (nonce_bytes, sealed) = blob.split_at(NONCE_SIZE);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(nonce_bytes);

        let plaintext = cipher.open(&nonce, sealed, MANIFEST_AD)?;

        let manifest: Self = serde_json::from_slice(&plaintext).map_err(|e| Error::metadata(format!("manifest does not parse: {e}")))?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        if self.version != MANIFEST_VERSION {
            return Err(Error::metadata(format!("unsupported manifest version {}", self.version)));
        }

        let mut seen = HashSet::with_capacity(self.files.len());
        for entry in &self.files {
            validate_relative_path(&entry.relative_path)?;

            if !seen.insert(entry.relative_path.as_str()) {
                return Err(Error::metadata(format!("duplicate entry: {}", entry.relative_path)));
            }

            if entry.is_directory && entry.original_size != 0 {
                return Err(Error::metadata(format!("directory with nonzero size: {}", entry.relative_path)));
            }
        }

        let split = self.files.iter().position(|e| !e.is_directory).unwrap_or(self.files.len());
        if self.files[split..].iter().any(|e| e.is_directory) {
            return Err(Error::metadata("directory entry after first file entry"));
        }

        for section in [&self.files[..split], &self.files[split..]] {
            if section.windows(2).any(|pair| pair[0].relative_path >= pair[1].relative_path) {
                return Err(Error::metadata("entries are not in canonical order"));
            }
        }

        Ok(())
    }
}

fn validate_relative_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::metadata("empty relative path"));
    }

    if path == MANIFEST_FILENAME || path == SALT_FILENAME {
        return Err(Error::metadata(format!("reserved name: {path}")));
    }

    if path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|component| component.is_empty() || component == "." || component == "..")
    {
        return Err(Error::metadata(format!("unsafe relative path: {path}")));
    }

    Ok(())
}
