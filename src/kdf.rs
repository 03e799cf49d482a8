//! Key derivation and password policy.
//!
//! Derives the 32-byte AES key from (password, salt) with either
//! PBKDF2-HMAC-SHA256 or Argon2id, generates per-tree salts from the OS
//! CSPRNG, and scores password strength for the encryption-time gate.

use std::io;

use argon2::Algorithm::Argon2id;
use argon2::Version::V0x13;
use argon2::{Argon2, Params};
use pbkdf2::pbkdf2_hmac_array;
use rand::rngs::SysRng;
use rand::rand_core::TryRng;
use sha2::Sha256;

use crate::config::{
    ARGON_MEMORY, ARGON_THREADS, ARGON_TIME, KEY_SIZE, PASSWORD_MIN_LENGTH, PASSWORD_STRONG_LENGTH,
    PBKDF2_ITERATIONS, SALT_SIZE,
};
use crate::error::{Error, Result};
use crate::secret::{Key, Password};

/// Selects how the key is derived from (password, salt).
///
/// The encrypted directory does not record the choice; decryption must be
/// told out-of-band which algorithm was used at encryption time.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum KdfAlgorithm {
    /// PBKDF2-HMAC-SHA256 with [`PBKDF2_ITERATIONS`] iterations.
    #[default]
    Pbkdf2,

    /// Argon2id with the costs in [`crate::config`].
    Argon2id,
}

impl KdfAlgorithm {
    /// Returns a short label for logs and CLI output.
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pbkdf2 => "pbkdf2-hmac-sha256",
            Self::Argon2id => "argon2id",
        }
    }
}

/// Password strength classification reported by [`score_strength`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StrengthTier {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
}

impl StrengthTier {
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Self::VeryWeak => "very weak",
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        }
    }
}

/// Generates cryptographically secure random bytes.
pub(crate) fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    SysRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::io("os-rng", io::Error::other(e.to_string())))?;
    Ok(bytes)
}

/// Generates a random salt for key derivation.
pub fn generate_salt() -> Result<[u8; SALT_SIZE]> {
    random_bytes()
}

/// Derives the 32-byte key from a password and salt.
///
/// # Errors
///
/// * [`Error::WeakPassword`] if the password is empty.
/// * [`Error::MalformedCiphertext`] if the salt is not exactly
///   [`SALT_SIZE`] bytes.
pub fn derive_key(password: &Password, salt: &[u8], algorithm: KdfAlgorithm) -> Result<Key> {
    if password.expose().is_empty() {
        return Err(Error::WeakPassword("password cannot be empty".into()));
    }

    if salt.len() != SALT_SIZE {
        return Err(Error::malformed(format!("expected {SALT_SIZE}-byte salt, got {}", salt.len())));
    }

    let bytes = match algorithm {
        KdfAlgorithm::Pbkdf2 => {
            pbkdf2_hmac_array::<Sha256, KEY_SIZE>(password.expose().as_bytes(), salt, PBKDF2_ITERATIONS)
        }
        KdfAlgorithm::Argon2id => derive_argon2id(password.expose().as_bytes(), salt)?,
    };

    Ok(Key::new(bytes))
}

fn derive_argon2id(password: &[u8], salt: &[u8]) -> Result<[u8; KEY_SIZE]> {
    let params = Params::new(ARGON_MEMORY, ARGON_TIME, ARGON_THREADS, Some(KEY_SIZE))
        .map_err(|e| Error::io("argon2", io::Error::other(e.to_string())))?;
    let argon2 = Argon2::new(Argon2id, V0x13, params);

    let mut key = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| Error::io("argon2", io::Error::other(e.to_string())))?;

    Ok(key)
}

/// Scores a password against the encryption-time policy.
///
/// Returns whether the password is acceptable at all, plus its tier.
/// Anything shorter than [`PASSWORD_MIN_LENGTH`] characters is rejected;
/// from [`PASSWORD_STRONG_LENGTH`] characters on, the tier depends on how
/// many of {uppercase, lowercase, digit, other} are present.
pub fn score_strength(password: &str) -> (bool, StrengthTier) {
    let length = password.chars().count();

    if length < PASSWORD_MIN_LENGTH {
        return (false, StrengthTier::VeryWeak);
    }

    if length < PASSWORD_STRONG_LENGTH {
        return (true, StrengthTier::Weak);
    }

    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(char::is_numeric);
    let has_other = password.chars().any(|c| !c.is_alphanumeric());

    let classes = [has_upper, has_lower, has_digit, has_other].into_iter().filter(|present| *present).count();

    let tier = match classes {
        3.. => StrengthTier::Strong,
        2 => StrengthTier::Moderate,
        _ => StrengthTier::Weak,
    };

    (true, tier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pbkdf2_deterministic() {
        let password = Password::new("test_password");
        let salt = [0u8; SALT_SIZE];

        let key1 = derive_key(&password, &salt, KdfAlgorithm::Pbkdf2).unwrap();
        let key2 = derive_key(&password, &salt, KdfAlgorithm::Pbkdf2).unwrap();

        assert_eq!(key1.expose(), key2.expose());
    }

    #[test]
    fn test_argon2id_deterministic() {
        let password = Password::new("test_password");
        let salt = [0u8; SALT_SIZE];

        let key1 = derive_key(&password, &salt, KdfAlgorithm::Argon2id).unwrap();
        let key2 = derive_key(&password, &salt, KdfAlgorithm::Argon2id).unwrap();

        assert_eq!(key1.expose(), key2.expose());
    }

    #[test]
    fn test_algorithms_disagree() {
        let password = Password::new("test_password");
        let salt = [0u8; SALT_SIZE];

        let pbkdf2 = derive_key(&password, &salt, KdfAlgorithm::Pbkdf2).unwrap();
        let argon2 = derive_key(&password, &salt, KdfAlgorithm::Argon2id).unwrap();

        assert_ne!(pbkdf2.expose(), argon2.expose());
    }

    #[test]
    fn test_salt_changes_key() {
        let password = Password::new("test_password");

        let key1 = derive_key(&password, &[0u8; SALT_SIZE], KdfAlgorithm::Pbkdf2).unwrap();
        let key2 = derive_key(&password, &[1u8; SALT_SIZE], KdfAlgorithm::Pbkdf2).unwrap();

        assert_ne!(key1.expose(), key2.expose());
    }

    #[test]
    fn test_empty_password_rejected() {
        let password = Password::new("");
        let salt = [0u8; SALT_SIZE];

        let err = derive_key(&password, &salt, KdfAlgorithm::Pbkdf2).unwrap_err();
        assert!(matches!(err, Error::WeakPassword(_)));
    }

    #[test]
    fn test_bad_salt_length_rejected() {
        let password = Password::new("test_password");

        let err = derive_key(&password, &[0u8; 16], KdfAlgorithm::Pbkdf2).unwrap_err();
        assert!(matches!(err, Error::MalformedCiphertext(_)));
    }

    #[test]
    fn test_generate_salt_is_random() {
        let salt1 = generate_salt().unwrap();
        let salt2 = generate_salt().unwrap();

        // Collisions of 256-bit values do not happen.
        assert_ne!(salt1, salt2);
    }

    #[test]
    fn test_strength_tiers() {
        assert_eq!(score_strength("short"), (false, StrengthTier::VeryWeak));
        assert_eq!(score_strength("1234567"), (false, StrengthTier::VeryWeak));
        assert_eq!(score_strength("12345678"), (true, StrengthTier::Weak));
        assert_eq!(score_strength("aaaaaaaaaaaa"), (true, StrengthTier::Weak));
        assert_eq!(score_strength("aaaaaaaaaaa1"), (true, StrengthTier::Moderate));
        assert_eq!(score_strength("Aaaaaaaaaaa1"), (true, StrengthTier::Strong));
        assert_eq!(score_strength("CorrectHorse7!"), (true, StrengthTier::Strong));
    }
}
