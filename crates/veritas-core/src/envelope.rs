use serde::{Deserialize, Serialize};

/// Hybrid KEM+AEAD ciphertext envelope (spec §3 `EncryptionEnvelope`, §6 wire
/// format). This module only carries the data shape; sealing/opening lives in
/// `veritas-crypto` so that this crate stays free of cryptographic
/// dependencies and can be shared by every crate that merely stores or
/// forwards envelopes without ever decrypting them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: String,
    /// e.g. "kyber768+xchacha20poly1305".
    pub algorithm: String,
    /// Base64url (no padding) encoded KEM ciphertext.
    pub kem_ct: String,
    /// Base64url (no padding) encoded AEAD nonce.
    pub iv: String,
    /// Base64url (no padding) encoded AEAD ciphertext (includes auth tag).
    pub ct: String,
}
