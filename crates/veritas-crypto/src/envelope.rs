use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use thiserror::Error;

use veritas_core::{Envelope, KemPublicKey, ENVELOPE_VERSION};

use crate::primitives::{aead_open, aead_seal, kem_decap, kem_encap, CryptoError};

const ALGORITHM: &str = "kyber768+xchacha20poly1305";

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("unsupported envelope version or algorithm")]
    Unsupported,
    #[error("malformed base64 field: {0}")]
    Encoding(String),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Seal `plaintext` to `recipient_kem_pub`, binding `aad` into the AEAD tag
/// (spec §4.2). A fresh Kyber768 encapsulation and a fresh 24-byte nonce are
/// drawn per call; envelopes are never reused across calls.
pub fn seal(recipient_kem_pub: &KemPublicKey, aad: &[u8], plaintext: &[u8]) -> Result<Envelope, EnvelopeError> {
    let (kem_ct, shared_key) = kem_encap(recipient_kem_pub)?;

    let mut iv = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut iv);

    let ct = aead_seal(&shared_key[..32], &iv, aad, plaintext)?;

    Ok(Envelope {
        version: ENVELOPE_VERSION.to_string(),
        algorithm: ALGORITHM.to_string(),
        kem_ct: URL_SAFE_NO_PAD.encode(kem_ct),
        iv: URL_SAFE_NO_PAD.encode(iv),
        ct: URL_SAFE_NO_PAD.encode(ct),
    })
}

/// Open `envelope` with `recipient_kem_priv`, checking `aad` matches what it
/// was sealed with. Fails closed on any unsupported version/algorithm,
/// malformed encoding, or AEAD authentication failure.
pub fn open(recipient_kem_priv: &[u8], aad: &[u8], envelope: &Envelope) -> Result<Vec<u8>, EnvelopeError> {
    if envelope.version != ENVELOPE_VERSION || envelope.algorithm != ALGORITHM {
        return Err(EnvelopeError::Unsupported);
    }

    let kem_ct = URL_SAFE_NO_PAD
        .decode(&envelope.kem_ct)
        .map_err(|e| EnvelopeError::Encoding(e.to_string()))?;
    let iv = URL_SAFE_NO_PAD
        .decode(&envelope.iv)
        .map_err(|e| EnvelopeError::Encoding(e.to_string()))?;
    let ct = URL_SAFE_NO_PAD
        .decode(&envelope.ct)
        .map_err(|e| EnvelopeError::Encoding(e.to_string()))?;

    let shared_key = kem_decap(recipient_kem_priv, &kem_ct)?;
    let plaintext = aead_open(&shared_key[..32], &iv, aad, &ct)?;
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::kem_keygen;

    #[test]
    fn round_trip() {
        let (pk, sk) = kem_keygen();
        let envelope = seal(&pk, b"aad", b"hello document").unwrap();
        let plaintext = open(&sk, b"aad", &envelope).unwrap();
        assert_eq!(plaintext, b"hello document");
    }

    #[test]
    fn wrong_aad_fails() {
        let (pk, sk) = kem_keygen();
        let envelope = seal(&pk, b"aad-a", b"secret").unwrap();
        assert!(open(&sk, b"aad-b", &envelope).is_err());
    }

    #[test]
    fn wrong_recipient_key_fails() {
        let (pk, _sk) = kem_keygen();
        let (_pk2, sk2) = kem_keygen();
        let envelope = seal(&pk, b"aad", b"secret").unwrap();
        assert!(open(&sk2, b"aad", &envelope).is_err());
    }

    #[test]
    fn unknown_version_rejected() {
        let (pk, sk) = kem_keygen();
        let mut envelope = seal(&pk, b"aad", b"secret").unwrap();
        envelope.version = "9.9".to_string();
        assert!(matches!(open(&sk, b"aad", &envelope), Err(EnvelopeError::Unsupported)));
    }
}
