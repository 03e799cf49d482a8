use crate::config::NONCE_SIZE;

/// Derives the nonce for chunk `index` of a file from its base nonce.
///
/// The chunk counter is XORed, little-endian, into the last 8 bytes of the
/// base nonce; the first 4 bytes pass through untouched. The counter is
/// implicit in stream position, so it is never stored. A random 96-bit base
/// nonce per file plus 2^64 derived values per file keeps every (key, nonce)
/// pair in a tree unique.
pub fn chunk_nonce(base: &[u8; NONCE_SIZE], index: u64) -> [u8; NONCE_SIZE] {
    let mut nonce = *base;
    for (byte, counter) in nonce[4..].iter_mut().zip(index.to_le_bytes()) {
        *byte ^= counter;
    }
    nonce
}
