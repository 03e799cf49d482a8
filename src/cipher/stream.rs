//! Streaming chunked file cipher.
//!
//! Encrypted file layout (multi-byte fields little-endian):
//!
//! ```text
//! [version: u8 = 1][base_nonce: 12 bytes][plaintext_size: u64]   header, 21 bytes
//! [chunk_len: u32][chunk ciphertext + tag]                       repeated until EOF
//! ```
//!
//! Plaintext is sealed in 64 KiB chunks, each under a nonce derived from the
//! file's base nonce and the chunk index, with associated data binding the
//! chunk to both the caller's context (the file's relative path) and its
//! index. A chunk can neither move within its file nor into another file
//! without failing authentication. An empty file is a bare header.

use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::cipher::aead::AeadCipher;
use crate::cipher::nonce::chunk_nonce;
use crate::config::{CHUNK_SIZE, FORMAT_VERSION, HEADER_SIZE, MAX_CHUNK_CIPHERTEXT, NONCE_SIZE};
use crate::error::{Error, Result};
use crate::kdf;

/// Encrypts `input` into the chunked ciphertext format.
///
/// The plaintext size is determined up front by seeking to the end of the
/// input, then the stream is sealed chunk by chunk under a fresh random base
/// nonce. Returns the number of plaintext bytes consumed.
///
/// `origin` attributes I/O failures to the file being processed.
pub fn encrypt_stream<R, W>(cipher: &AeadCipher, input: &mut R, output: &mut W, ad: &[u8], origin: &Path) -> Result<u64>
where
    R: Read + Seek,
    W: Write,
{
    let plaintext_size = input.seek(SeekFrom::End(0)).map_err(|e| Error::io(origin, e))?;
    input.seek(SeekFrom::Start(0)).map_err(|e| Error::io(origin, e))?;

    let base_nonce: [u8; NONCE_SIZE] = kdf::random_bytes()?;

    let mut header = [0u8; HEADER_SIZE];
    header[0] = FORMAT_VERSION;
    header[1..1 + NONCE_SIZE].copy_from_slice(&base_nonce);
    header[1 + NONCE_SIZE..].copy_from_slice(&plaintext_size.to_le_bytes());
    output.write_all(&header).map_err(|e| Error::io(origin, e))?;

    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut index = 0u64;
    let mut consumed = 0u64;

    loop {
        let filled = read_chunk(input, &mut buffer).map_err(|e| Error::io(origin, e))?;
        if filled == 0 {
            break;
        }

        let nonce = chunk_nonce(&base_nonce, index);
        let sealed = cipher.seal(&nonce, &buffer[..filled], &chunk_ad(ad, index))?;

        output.write_all(&(sealed.len() as u32).to_le_bytes()).map_err(|e| Error::io(origin, e))?;
        output.write_all(&sealed).map_err(|e| Error::io(origin, e))?;

        consumed += filled as u64;
        index += 1;
    }

    // The header was committed before the first read; a source that grew or
    // shrank in between would persist a lie.
    if consumed != plaintext_size {
        return Err(Error::io(
            origin,
            io::Error::new(
                ErrorKind::InvalidData,
                format!("source changed size during encryption: expected {plaintext_size} bytes, read {consumed}"),
            ),
        ));
    }

    Ok(consumed)
}

/// Decrypts a chunked ciphertext stream back into plaintext.
///
/// Returns the number of plaintext bytes produced, which is checked against
/// the size the header declares.
///
/// # Errors
///
/// * [`Error::UnsupportedVersion`] if the version byte is not 1.
/// * [`Error::MalformedCiphertext`] for a short header, a zero or oversized
///   chunk length, a truncated chunk, or a declared-size mismatch.
/// * [`Error::WrongPasswordOrTampered`] when any chunk fails authentication.
pub fn decrypt_stream<R, W>(cipher: &AeadCipher, input: &mut R, output: &mut W, ad: &[u8], origin: &Path) -> Result<u64>
where
    R: Read,
    W: Write,
{
    let mut header = [0u8; HEADER_SIZE];
    input.read_exact(&mut header).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => Error::malformed("header too short"),
        _ => Error::io(origin, e),
    })?;

    let version = header[0];
    if version != FORMAT_VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    let mut base_nonce = [0u8; NONCE_SIZE];
    base_nonce.copy_from_slice(&header[1..1 + NONCE_SIZE]);

    let mut size_bytes = [0u8; 8];
    size_bytes.copy_from_slice(&header[1 + NONCE_SIZE..]);
    let declared_size = u64::from_le_bytes(size_bytes);

    let mut index = 0u64;
    let mut produced = 0u64;

    loop {
        let mut len_bytes = [0u8; 4];
        let got = read_chunk(input, &mut len_bytes).map_err(|e| Error::io(origin, e))?;
        if got == 0 {
            break;
        }
        if got < len_bytes.len() {
            return Err(Error::malformed("truncated chunk length prefix"));
        }

        let chunk_len = u32::from_le_bytes(len_bytes) as usize;
        if chunk_len == 0 {
            return Err(Error::malformed("zero-length chunk"));
        }
        if chunk_len > MAX_CHUNK_CIPHERTEXT {
            return Err(Error::malformed(format!(
                "chunk length {chunk_len} exceeds the {MAX_CHUNK_CIPHERTEXT} byte limit"
            )));
        }

        let mut sealed = vec![0u8; chunk_len];
        input.read_exact(&mut sealed).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => Error::malformed("truncated chunk"),
            _ => Error::io(origin, e),
        })?;

        let nonce = chunk_nonce(&base_nonce, index);
        let plaintext = cipher.open(&nonce, &sealed, &chunk_ad(ad, index))?;

        output.write_all(&plaintext).map_err(|e| Error::io(origin, e))?;
        produced += plaintext.len() as u64;
        index += 1;
    }

    if produced != declared_size {
        return Err(Error::malformed(format!(
            "plaintext size mismatch: header declares {declared_size} bytes, chunks decrypted to {produced}"
        )));
    }

    Ok(produced)
}

/// Binds a chunk to its position: caller AD followed by the chunk index as
/// a little-endian u64.
fn chunk_ad(ad: &[u8], index: u64) -> Vec<u8> {
    let mut bound = Vec::with_capacity(ad.len() + 8);
    bound.extend_from_slice(ad);
    bound.extend_from_slice(&index.to_le_bytes());
    bound
}

/// Fills `buf` from `input`, tolerating short reads. Returns the number of
/// bytes read, which is less than `buf.len()` only at end of stream.
fn read_chunk<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
