//! Cryptographic core: AES-256-GCM sealing and the chunked stream format.

mod aead;
mod nonce;
mod stream;

pub use aead::AeadCipher;
pub use nonce::chunk_nonce;
pub use stream::{decrypt_stream, encrypt_stream};
