//! CLI commands and argument parsing.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::APP_NAME;
use crate::kdf::KdfAlgorithm;
use crate::secret::Password;
use crate::service::{self, EncryptOptions};
use crate::ui::display::show_summary;
use crate::ui::progress::ProgressBar;
use crate::ui::prompt;

/// FolderVault: password-based authenticated folder encryption.
#[derive(Parser)]
#[command(name = "foldervault", version, about = "Encrypt a directory tree with AES-256-GCM and recover it byte-for-byte with the password.")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt a folder into an opaque ciphertext directory.
    Encrypt {
        /// Source folder.
        #[arg(short, long)]
        input: PathBuf,

        /// Destination for the encrypted tree.
        #[arg(short, long)]
        output: PathBuf,

        /// Password (prompted when omitted).
        #[arg(short, long)]
        password: Option<String>,

        /// Derive the key with Argon2id instead of PBKDF2.
        #[arg(long)]
        argon2: bool,

        /// Skip the password strength gate.
        #[arg(long)]
        no_strength_check: bool,
    },

    /// Decrypt an encrypted folder back into plaintext.
    Decrypt {
        /// Encrypted folder.
        #[arg(short, long)]
        input: PathBuf,

        /// Destination for the restored tree.
        #[arg(short, long)]
        output: PathBuf,

        /// Password (prompted when omitted).
        #[arg(short, long)]
        password: Option<String>,

        /// The folder was encrypted with Argon2id.
        #[arg(long)]
        argon2: bool,
    },
}

impl Cli {
    /// Initializes logging and parses command-line arguments.
    pub fn init() -> Result<Self> {
        let subscriber = tracing_subscriber::fmt().finish();
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(Self::parse())
    }

    /// Runs the parsed command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Encrypt { input, output, password, argon2, no_strength_check } => {
                let password = resolve_password(password, true)?;
                let options = EncryptOptions { algorithm: algorithm(argon2), check_strength: !no_strength_check };

                let bar = ProgressBar::new(&format!("{APP_NAME} encrypting..."))?;
                let mut observer = |path: &str, position: usize, total: usize| bar.observe(path, position, total);

                let summary = service::encrypt_folder(&input, &output, &password, options, Some(&mut observer))
                    .with_context(|| format!("encryption failed for {}", input.display()))?;

                bar.finish();
                show_summary("Encrypted", &output, &summary);
                Ok(())
            }
            Commands::Decrypt { input, output, password, argon2 } => {
                let password = resolve_password(password, false)?;

                let bar = ProgressBar::new(&format!("{APP_NAME} decrypting..."))?;
                let mut observer = |path: &str, position: usize, total: usize| bar.observe(path, position, total);

                let summary = service::decrypt_folder(&input, &output, &password, algorithm(argon2), Some(&mut observer))
                    .with_context(|| format!("decryption failed for {}", input.display()))?;

                bar.finish();
                show_summary("Decrypted", &output, &summary);
                Ok(())
            }
        }
    }
}

fn algorithm(argon2: bool) -> KdfAlgorithm {
    if argon2 { KdfAlgorithm::Argon2id } else { KdfAlgorithm::Pbkdf2 }
}

fn resolve_password(password: Option<String>, encrypting: bool) -> Result<Password> {
    let raw = match password {
        Some(password) => password,
        None if encrypting => prompt::encryption_password()?,
        None => prompt::decryption_password()?,
    };
    Ok(Password::new(raw))
}
