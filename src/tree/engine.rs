//! The tree engine: drives the chunk cipher across a whole directory.
//!
//! Encryption walks the source, streams every file through the chunk cipher
//! with its relative path as associated data, and finishes by sealing the
//! manifest. Decryption replays the manifest in canonical order, so parent
//! directories always exist before their children. Processing is
//! single-threaded with blocking I/O; the working set stays at one chunk of
//! plaintext and one of ciphertext regardless of file sizes.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cipher::{self, AeadCipher};
use crate::config::{ENCRYPTED_EXTENSION, MANIFEST_FILENAME};
use crate::error::{Error, Result};
use crate::manifest::{FileEntry, Manifest};
use crate::tree::walk::{SourceEntry, collect_entries};

/// Callback invoked before each entry is processed, with the entry's
/// relative path, its 1-based position, and the total entry count.
pub type ProgressObserver<'a> = dyn FnMut(&str, usize, usize) + 'a;

/// Counters reported back from a completed pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeSummary {
    pub directories: usize,
    pub files: usize,
    pub plaintext_bytes: u64,
}

/// Runs the encrypt and decrypt passes over a directory tree with one
/// cipher instance.
pub struct TreeProcessor<'a> {
    cipher: &'a AeadCipher,
}

impl<'a> TreeProcessor<'a> {
    pub fn new(cipher: &'a AeadCipher) -> Self {
        Self { cipher }
    }

    /// Encrypts the tree below `source` into `target` and writes the sealed
    /// manifest.
    ///
    /// Directories produce no filesystem artifact; they are carried solely
    /// by the manifest.
    pub fn encrypt_tree(&self, source: &Path, target: &Path, mut observer: Option<&mut ProgressObserver<'_>>) -> Result<TreeSummary> {
        let entries = collect_entries(source)?;
        let total = entries.len();

        fs::create_dir_all(target).map_err(|e| Error::io(target, e))?;

        let mut rows = Vec::with_capacity(total);
        let mut summary = TreeSummary::default();

        for (position, entry) in entries.iter().enumerate() {
            if let Some(callback) = observer.as_deref_mut() {
                callback(&entry.relative_path, position + 1, total);
            }

            if entry.is_directory {
                debug!(path = %entry.relative_path, "recording directory");
                rows.push(FileEntry {
                    relative_path: entry.relative_path.clone(),
                    original_size: 0,
                    encrypted_size: 0,
                    is_directory: true,
                    permissions: entry.permissions,
                });
                summary.directories += 1;
            } else {
                let encrypted_size = self.encrypt_file(entry, target)?;
                rows.push(FileEntry {
                    relative_path: entry.relative_path.clone(),
                    original_size: entry.size,
                    encrypted_size,
                    is_directory: false,
                    permissions: entry.permissions,
                });
                summary.files += 1;
                summary.plaintext_bytes += entry.size;
            }
        }

        let blob = Manifest::new(rows).seal(self.cipher)?;
        let manifest_path = target.join(MANIFEST_FILENAME);
        fs::write(&manifest_path, blob).map_err(|e| Error::io(&manifest_path, e))?;

        Ok(summary)
    }

    /// Reconstructs the plaintext tree below `target` from the encrypted
    /// directory at `source`.
    ///
    /// Ciphertext files not referenced by the manifest are ignored; they
    /// cannot be authenticated.
    pub fn decrypt_tree(&self, source: &Path, target: &Path, mut observer: Option<&mut ProgressObserver<'_>>) -> Result<TreeSummary> {
        let manifest_path = source.join(MANIFEST_FILENAME);
        let blob = match fs::read(&manifest_path) {
            Ok(blob) => blob,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::metadata("manifest not found; not an encrypted directory"));
            }
            Err(e) => return Err(Error::io(&manifest_path, e)),
        };
        let manifest = Manifest::open(self.cipher, &blob)?;

        fs::create_dir_all(target).map_err(|e| Error::io(target, e))?;

        let total = manifest.files.len();
        let mut summary = TreeSummary::default();

        for (position, entry) in manifest.files.iter().enumerate() {
            if let Some(callback) = observer.as_deref_mut() {
                callback(&entry.relative_path, position + 1, total);
            }

            let output_path = target.join(&entry.relative_path);
            if entry.is_directory {
                fs::create_dir_all(&output_path).map_err(|e| Error::io(&output_path, e))?;
                summary.directories += 1;
            } else {
                let produced = self.decrypt_file(source, entry, &output_path)?;
                summary.files += 1;
                summary.plaintext_bytes += produced;
            }

            restore_permissions(&output_path, entry.permissions);
        }

        Ok(summary)
    }

    fn encrypt_file(&self, entry: &SourceEntry, target: &Path) -> Result<u64> {
        let output_path = encrypted_path(target, &entry.relative_path);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        debug!(path = %entry.relative_path, size = entry.size, "encrypting file");

        let input = File::open(&entry.absolute_path).map_err(|e| Error::io(&entry.absolute_path, e))?;
        let mut reader = BufReader::new(input);
        let mut writer = BufWriter::new(File::create(&output_path).map_err(|e| Error::io(&output_path, e))?);

        cipher::encrypt_stream(self.cipher, &mut reader, &mut writer, entry.relative_path.as_bytes(), &entry.absolute_path)?;
        writer.flush().map_err(|e| Error::io(&output_path, e))?;

        let encrypted_size = fs::metadata(&output_path).map_err(|e| Error::io(&output_path, e))?.len();
        Ok(encrypted_size)
    }

    fn decrypt_file(&self, source: &Path, entry: &FileEntry, output_path: &Path) -> Result<u64> {
        let input_path = encrypted_path(source, &entry.relative_path);
        let input = match File::open(&input_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::malformed(format!("missing ciphertext for {}", entry.relative_path)));
            }
            Err(e) => return Err(Error::io(&input_path, e)),
        };

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        debug!(path = %entry.relative_path, "decrypting file");

        let mut reader = BufReader::new(input);
        let mut writer = BufWriter::new(File::create(output_path).map_err(|e| Error::io(output_path, e))?);

        let produced = cipher::decrypt_stream(self.cipher, &mut reader, &mut writer, entry.relative_path.as_bytes(), &input_path)?;
        writer.flush().map_err(|e| Error::io(output_path, e))?;

        if produced != entry.original_size {
            return Err(Error::malformed(format!(
                "size mismatch for {}: manifest records {} bytes, decrypted {produced}",
                entry.relative_path, entry.original_size
            )));
        }

        Ok(produced)
    }
}

/// Maps a relative path to its ciphertext location below `root`.
fn encrypted_path(root: &Path, relative: &str) -> PathBuf {
    let mut path = root.join(relative).into_os_string();
    path.push(ENCRYPTED_EXTENSION);
    PathBuf::from(path)
}

/// Restores captured mode bits, best effort. The file's contents are the
/// contract, not its mode; failures are logged and swallowed.
#[cfg(unix)]
fn restore_permissions(path: &Path, mode: Option<u32>) {
    use std::os::unix::fs::PermissionsExt;

    let Some(mode) = mode else { return };
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(mode)) {
        tracing::warn!(path = %path.display(), error = %e, "failed to restore permissions");
    }
}

#[cfg(not(unix))]
fn restore_permissions(_path: &Path, _mode: Option<u32>) {}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::secret::Key;

    fn cipher() -> AeadCipher {
        AeadCipher::new(&Key::new([7u8; 32]))
    }

    fn encrypt_decrypt(build: impl FnOnce(&Path)) -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        let encrypted = dir.path().join("encrypted");
        let restored = dir.path().join("restored");

        fs::create_dir(&source).unwrap();
        build(&source);

        let cipher = cipher();
        let processor = TreeProcessor::new(&cipher);
        processor.encrypt_tree(&source, &encrypted, None).unwrap();
        processor.decrypt_tree(&encrypted, &restored, None).unwrap();

        (dir, encrypted, restored)
    }

    #[test]
    fn test_roundtrip_nested_tree() {
        let (_dir, encrypted, restored) = encrypt_decrypt(|source| {
            fs::create_dir_all(source.join("a/b")).unwrap();
            fs::create_dir(source.join("empty")).unwrap();
            fs::write(source.join("top.txt"), b"top level").unwrap();
            fs::write(source.join("a/b/deep.bin"), vec![0x5Au8; 70_000]).unwrap();
        });

        assert!(encrypted.join("top.txt.encrypted").is_file());
        assert!(encrypted.join("a/b/deep.bin.encrypted").is_file());
        assert!(encrypted.join(MANIFEST_FILENAME).is_file());
        // Empty directories leave no marker in the encrypted tree.
        assert!(!encrypted.join("empty").exists());

        assert_eq!(fs::read(restored.join("top.txt")).unwrap(), b"top level");
        assert_eq!(fs::read(restored.join("a/b/deep.bin")).unwrap(), vec![0x5Au8; 70_000]);
        assert!(restored.join("empty").is_dir());
    }

    #[test]
    fn test_roundtrip_empty_tree() {
        let (_dir, encrypted, restored) = encrypt_decrypt(|_| {});

        let names: Vec<String> = fs::read_dir(&encrypted)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![MANIFEST_FILENAME.to_owned()]);

        assert!(fs::read_dir(&restored).unwrap().next().is_none());
    }

    #[test]
    fn test_missing_ciphertext_is_malformed() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        let encrypted = dir.path().join("encrypted");

        fs::create_dir(&source).unwrap();
        fs::write(source.join("gone.txt"), b"data").unwrap();

        let cipher = cipher();
        let processor = TreeProcessor::new(&cipher);
        processor.encrypt_tree(&source, &encrypted, None).unwrap();

        fs::remove_file(encrypted.join("gone.txt.encrypted")).unwrap();

        let err = processor.decrypt_tree(&encrypted, &dir.path().join("restored"), None).unwrap_err();
        assert!(matches!(err, Error::MalformedCiphertext(_)));
    }

    #[test]
    fn test_renamed_ciphertext_fails_authentication() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        let encrypted = dir.path().join("encrypted");

        fs::create_dir(&source).unwrap();
        fs::write(source.join("a.txt"), b"data a").unwrap();
        fs::write(source.join("b.txt"), b"data b").unwrap();

        let cipher = cipher();
        let processor = TreeProcessor::new(&cipher);
        processor.encrypt_tree(&source, &encrypted, None).unwrap();

        // Swap the two ciphertexts on disk. The path-bound associated data
        // must reject both.
        let a = encrypted.join("a.txt.encrypted");
        let b = encrypted.join("b.txt.encrypted");
        let tmp = encrypted.join("swap.tmp");
        fs::rename(&a, &tmp).unwrap();
        fs::rename(&b, &a).unwrap();
        fs::rename(&tmp, &b).unwrap();

        let err = processor.decrypt_tree(&encrypted, &dir.path().join("restored"), None).unwrap_err();
        assert!(matches!(err, Error::WrongPasswordOrTampered));
    }

    #[test]
    fn test_extra_ciphertext_is_ignored() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        let encrypted = dir.path().join("encrypted");
        let restored = dir.path().join("restored");

        fs::create_dir(&source).unwrap();
        fs::write(source.join("real.txt"), b"real").unwrap();

        let cipher = cipher();
        let processor = TreeProcessor::new(&cipher);
        processor.encrypt_tree(&source, &encrypted, None).unwrap();

        fs::write(encrypted.join("planted.txt.encrypted"), b"not even a valid header").unwrap();

        processor.decrypt_tree(&encrypted, &restored, None).unwrap();
        assert!(!restored.join("planted.txt").exists());
        assert_eq!(fs::read(restored.join("real.txt")).unwrap(), b"real");
    }

    #[test]
    fn test_missing_manifest_is_metadata_invalid() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("not_encrypted")).unwrap();

        let cipher = cipher();
        let err = TreeProcessor::new(&cipher)
            .decrypt_tree(&dir.path().join("not_encrypted"), &dir.path().join("out"), None)
            .unwrap_err();
        assert!(matches!(err, Error::MetadataInvalid(_)));
    }

    #[test]
    fn test_observer_sees_every_entry() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        let encrypted = dir.path().join("encrypted");

        fs::create_dir(&source).unwrap();
        fs::create_dir(source.join("sub")).unwrap();
        fs::write(source.join("sub/one.txt"), b"1").unwrap();
        fs::write(source.join("two.txt"), b"2").unwrap();

        let cipher = cipher();
        let mut seen = Vec::new();
        let mut observer = |path: &str, position: usize, total: usize| {
            seen.push((path.to_owned(), position, total));
        };

        TreeProcessor::new(&cipher).encrypt_tree(&source, &encrypted, Some(&mut observer)).unwrap();

        assert_eq!(
            seen,
            vec![
                ("sub".to_owned(), 1, 3),
                ("sub/one.txt".to_owned(), 2, 3),
                ("two.txt".to_owned(), 3, 3),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions_restored() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, _encrypted, restored) = encrypt_decrypt(|source| {
            fs::create_dir_all(source.join("a/b")).unwrap();
            fs::write(source.join("a/b/c.txt"), b"x").unwrap();
            fs::set_permissions(source.join("a/b"), fs::Permissions::from_mode(0o750)).unwrap();
        });

        let mode = fs::metadata(restored.join("a/b")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
        assert_eq!(fs::read(restored.join("a/b/c.txt")).unwrap(), b"x");
    }
}
