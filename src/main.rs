// FolderVault - password-based authenticated folder encryption
//
// Encryption: AES-256-GCM with per-chunk derived nonces and path-bound
// associated data
// Key Derivation: PBKDF2-HMAC-SHA256 or Argon2id
// Layout: per-file chunked ciphertexts + encrypted manifest + salt sidecar

mod allocator;

use std::process;

use foldervault_rs::cli::Cli;

/// Entry point for the FolderVault encryption tool.
///
/// # Exit Codes
/// * 0 - Success
/// * 1 - Error (message printed to stderr)
fn main() {
    if let Err(e) = Cli::init().and_then(Cli::execute) {
        eprintln!("Error: {e:?}");
        process::exit(1);
    }
}
