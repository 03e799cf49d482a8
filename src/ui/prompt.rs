//! Interactive password prompts.

use anyhow::{Context, Result};
use inquire::Password;
use inquire::validator::Validation;

use crate::config::PASSWORD_MIN_LENGTH;

/// Prompts for an encryption password with confirmation.
///
/// A typo here would lose the data for good, so the password is entered
/// twice and must meet the minimum length.
pub fn encryption_password() -> Result<String> {
    Password::new("Encryption password:")
        .with_validator(|input: &str| {
            if input.chars().count() < PASSWORD_MIN_LENGTH {
                Ok(Validation::Invalid(format!("password must be at least {PASSWORD_MIN_LENGTH} characters").into()))
            } else {
                Ok(Validation::Valid)
            }
        })
        .with_custom_confirmation_message("Confirm password:")
        .with_custom_confirmation_error_message("The passwords do not match.")
        .prompt()
        .context("failed to read password")
}

/// Prompts for a decryption password. No confirmation or strength gate;
/// the ciphertext is the judge.
pub fn decryption_password() -> Result<String> {
    Password::new("Decryption password:")
        .without_confirmation()
        .prompt()
        .context("failed to read password")
}
