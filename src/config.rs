//! Application configuration and cryptographic constants.
//!
//! This module defines the core constants used throughout the application:
//! cryptographic parameters (key sizes, nonce sizes, KDF costs), the on-disk
//! file format values, and the reserved file names of an encrypted
//! directory. These constants are the single source of truth for the file
//! format specification.

/// The application name used in user-facing output and prompts.
pub const APP_NAME: &str = "FolderVault";

/// The extension appended to each encrypted file inside an encrypted
/// directory: `docs/report.txt` is stored as `docs/report.txt.encrypted`.
pub const ENCRYPTED_EXTENSION: &str = ".encrypted";

/// Name of the salt sidecar file at the root of an encrypted directory.
///
/// Holds exactly [`SALT_SIZE`] raw bytes. It is written only after the tree
/// and manifest have been fully emitted.
pub const SALT_FILENAME: &str = ".salt";

/// Name of the encrypted manifest file at the root of an encrypted
/// directory.
pub const MANIFEST_FILENAME: &str = ".folder_crypto_metadata.enc";

/// Associated data bound to the manifest blob.
///
/// Tree files are bound to their relative path instead, so a manifest can
/// never be confused with a file chunk and vice versa.
pub const MANIFEST_AD: &[u8] = b"metadata";

/// The current encrypted file format version, stored as the first header
/// byte of every encrypted file.
pub const FORMAT_VERSION: u8 = 1;

/// The current manifest schema version.
pub const MANIFEST_VERSION: u32 = 1;

/// Size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of the random per-tree salt in bytes.
///
/// 32 bytes (256 bits) fully defeats precomputation attacks and keeps
/// per-tree derivations independent.
pub const SALT_SIZE: usize = 32;

/// Size of the AES-GCM nonce in bytes.
///
/// Standard 12 bytes (96 bits) as recommended by NIST SP 800-38D.
pub const NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag appended to every sealed chunk.
pub const TAG_SIZE: usize = 16;

/// Plaintext chunk size for the streaming file cipher.
///
/// 64 KiB keeps the peak working set small while amortizing per-chunk
/// sealing overhead. Every chunk is exactly this size except possibly the
/// last one of a file.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Size of the encrypted file header in bytes:
/// version (1) + base nonce (12) + plaintext size (8).
pub const HEADER_SIZE: usize = 1 + NONCE_SIZE + 8;

/// Largest valid chunk ciphertext length: a full plaintext chunk plus the
/// GCM tag. Any length prefix above this is malformed.
pub const MAX_CHUNK_CIPHERTEXT: usize = CHUNK_SIZE + TAG_SIZE;

/// PBKDF2-HMAC-SHA256 iteration count.
///
/// 600 000 iterations, the OWASP recommendation for SHA-256.
pub const PBKDF2_ITERATIONS: u32 = 600_000;

/// Argon2id time cost (number of passes).
pub const ARGON_TIME: u32 = 3;

/// Argon2id memory cost in KiB (64 MiB).
pub const ARGON_MEMORY: u32 = 64 * 1024;

/// Argon2id parallelism factor (number of threads).
pub const ARGON_THREADS: u32 = 4;

/// Minimum accepted password length when strength checking is enabled.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Length at which character-class diversity starts counting toward the
/// strength tier.
pub const PASSWORD_STRONG_LENGTH: usize = 12;
