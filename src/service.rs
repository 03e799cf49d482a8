//! End-to-end folder encryption and decryption.
//!
//! These entry points own the key-derivation ceremony and the salt sidecar.
//! The encrypt path writes `.salt` only after the tree and manifest are
//! fully on disk; the decrypt path reads it first and refuses anything that
//! is not exactly a 32-byte salt. On failure the output directory may hold
//! partial data; there is no rollback.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

use tracing::info;

use crate::cipher::AeadCipher;
use crate::config::{PASSWORD_MIN_LENGTH, SALT_FILENAME, SALT_SIZE};
use crate::error::{Error, Result};
use crate::kdf::{self, KdfAlgorithm};
use crate::secret::Password;
use crate::tree::{ProgressObserver, TreeProcessor, TreeSummary};

/// Encryption-time options.
#[derive(Clone, Copy, Debug)]
pub struct EncryptOptions {
    pub algorithm: KdfAlgorithm,
    pub check_strength: bool,
}

impl Default for EncryptOptions {
    fn default() -> Self {
        Self { algorithm: KdfAlgorithm::default(), check_strength: true }
    }
}

/// Encrypts the folder at `input` into an encrypted directory at `output`.
pub fn encrypt_folder(
    input: &Path,
    output: &Path,
    password: &Password,
    options: EncryptOptions,
    observer: Option<&mut ProgressObserver<'_>>,
) -> Result<TreeSummary> {
    ensure_directory(input)?;

    if options.check_strength {
        let (acceptable, tier) = kdf::score_strength(password.expose());
        if !acceptable {
            return Err(Error::WeakPassword(format!("password must be at least {PASSWORD_MIN_LENGTH} characters")));
        }
        info!(strength = tier.label(), "password accepted");
    }

    info!(input = %input.display(), output = %output.display(), kdf = options.algorithm.label(), "encrypting folder");

    let salt = kdf::generate_salt()?;
    let key = kdf::derive_key(password, &salt, options.algorithm)?;
    let cipher = AeadCipher::new(&key);

    let summary = TreeProcessor::new(&cipher).encrypt_tree(input, output, observer)?;

    // The salt is committed last; a directory holding one always holds a
    // complete tree and manifest.
    let salt_path = output.join(SALT_FILENAME);
    fs::write(&salt_path, salt).map_err(|e| Error::io(&salt_path, e))?;

    info!(files = summary.files, directories = summary.directories, "encryption complete");
    Ok(summary)
}

/// Decrypts the encrypted directory at `input` into a plaintext tree at
/// `output`.
///
/// `algorithm` must match the one used at encryption time; the on-disk
/// format does not record it.
pub fn decrypt_folder(
    input: &Path,
    output: &Path,
    password: &Password,
    algorithm: KdfAlgorithm,
    observer: Option<&mut ProgressObserver<'_>>,
) -> Result<TreeSummary> {
    ensure_directory(input)?;

    let salt = read_salt(input)?;

    info!(input = %input.display(), output = %output.display(), kdf = algorithm.label(), "decrypting folder");

    let key = kdf::derive_key(password, &salt, algorithm)?;
    let cipher = AeadCipher::new(&key);

    let summary = TreeProcessor::new(&cipher).decrypt_tree(input, output, observer)?;

    info!(files = summary.files, directories = summary.directories, "decryption complete");
    Ok(summary)
}

fn read_salt(input: &Path) -> Result<[u8; SALT_SIZE]> {
    let salt_path = input.join(SALT_FILENAME);
    let bytes = match fs::read(&salt_path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::malformed("salt file not found; not an encrypted directory"));
        }
        Err(e) => return Err(Error::io(&salt_path, e)),
    };

    bytes
        .try_into()
        .map_err(|_| Error::malformed(format!("salt file must be exactly {SALT_SIZE} bytes")))
}

fn ensure_directory(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;
    if !metadata.is_dir() {
        return Err(Error::io(path, io::Error::new(ErrorKind::NotADirectory, "not a directory")));
    }
    Ok(())
}
