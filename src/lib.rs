//! FolderVault - password-based authenticated encryption for directory trees.
//!
//! Transforms a source directory into an opaque ciphertext directory from
//! which the original tree can be recovered byte-for-byte given the
//! password, detecting any tampering or corruption along the way:
//! - AES-256-GCM streaming file cipher with per-chunk derived nonces
//! - PBKDF2-HMAC-SHA256 or Argon2id key derivation
//! - Encrypted manifest carrying structure, sizes, and permissions

pub mod cipher;
pub mod cli;
pub mod config;
pub mod error;
pub mod kdf;
pub mod manifest;
pub mod secret;
pub mod service;
pub mod tree;
pub mod ui;
