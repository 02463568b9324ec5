use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use pqcrypto_dilithium::dilithium2;
use pqcrypto_kyber::kyber768;
use pqcrypto_traits::kem::{Ciphertext as KemCiphertextTrait, PublicKey as KemPublicKeyTrait, SecretKey as KemSecretKeyTrait, SharedSecret as KemSharedSecretTrait};
use pqcrypto_traits::sign::{
    DetachedSignature as SignDetachedTrait, PublicKey as SignPublicKeyTrait, SecretKey as SignSecretKeyTrait,
};
use thiserror::Error;
use zeroize::Zeroizing;

use veritas_core::{Digest, KemPublicKey, SigPublicKey, Signature};

/// Errors raised by the primitive adapter (spec §4.1). Deliberately coarse —
/// callers above this layer must not be able to distinguish "wrong key" from
/// "tampered ciphertext" beyond what these variants already expose.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid ciphertext")]
    InvalidCiphertext,
    #[error("invalid key")]
    InvalidKey,
    #[error("authenticated decryption failed")]
    AeadAuthFailure,
    #[error("{0}")]
    Other(String),
}

// ── KEM (Kyber768) ────────────────────────────────────────────────────────────

pub fn kem_keygen() -> (KemPublicKey, Zeroizing<Vec<u8>>) {
    let (pk, sk) = kyber768::keypair();
    (
        KemPublicKey(pk.as_bytes().to_vec()),
        Zeroizing::new(sk.as_bytes().to_vec()),
    )
}

/// Encapsulate a fresh shared secret to `pub_key`. Returns `(kem_ct, shared_key)`.
pub fn kem_encap(pub_key: &KemPublicKey) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>), CryptoError> {
    let pk = kyber768::PublicKey::from_bytes(&pub_key.0).map_err(|_| CryptoError::InvalidKey)?;
    let (shared, ct) = kyber768::encapsulate(&pk);
    Ok((
        ct.as_bytes().to_vec(),
        Zeroizing::new(shared.as_bytes().to_vec()),
    ))
}

/// Decapsulate `kem_ct` with `priv_key` to recover the shared secret.
pub fn kem_decap(priv_key: &[u8], kem_ct: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let sk = kyber768::SecretKey::from_bytes(priv_key).map_err(|_| CryptoError::InvalidKey)?;
    let ct = kyber768::Ciphertext::from_bytes(kem_ct).map_err(|_| CryptoError::InvalidCiphertext)?;
    let shared = kyber768::decapsulate(&ct, &sk);
    Ok(Zeroizing::new(shared.as_bytes().to_vec()))
}

// ── Signatures (Dilithium2) ────────────────────────────────────────────────────

pub fn sig_keygen() -> (SigPublicKey, Zeroizing<Vec<u8>>) {
    let (pk, sk) = dilithium2::keypair();
    (
        SigPublicKey(pk.as_bytes().to_vec()),
        Zeroizing::new(sk.as_bytes().to_vec()),
    )
}

pub fn sig_sign(priv_key: &[u8], msg: &[u8]) -> Result<Signature, CryptoError> {
    let sk = dilithium2::SecretKey::from_bytes(priv_key).map_err(|_| CryptoError::InvalidKey)?;
    let sig = dilithium2::detached_sign(msg, &sk);
    Ok(Signature(sig.as_bytes().to_vec()))
}

/// Verify a detached signature. Never panics: a structurally invalid public
/// key or signature returns `Ok(false)` rather than propagating a library
/// panic, matching spec §4.1 ("never panics on malformed input").
pub fn sig_verify(pub_key: &SigPublicKey, msg: &[u8], sig: &Signature) -> bool {
    let pk = match dilithium2::PublicKey::from_bytes(&pub_key.0) {
        Ok(pk) => pk,
        Err(_) => return false,
    };
    let detached = match dilithium2::DetachedSignature::from_bytes(&sig.0) {
        Ok(s) => s,
        Err(_) => return false,
    };
    dilithium2::verify_detached_signature(&detached, msg, &pk).is_ok()
}

// ── AEAD (XChaCha20-Poly1305) ──────────────────────────────────────────────────

/// `key` must be 32 bytes; `iv` must be 24 bytes (XChaCha20's extended nonce).
pub fn aead_seal(key: &[u8], iv: &[u8], aad: &[u8], pt: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if key.len() != 32 || iv.len() != 24 {
        return Err(CryptoError::InvalidKey);
    }
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    let nonce = XNonce::from_slice(iv);
    cipher
        .encrypt(nonce, Payload { msg: pt, aad })
        .map_err(|_| CryptoError::Other("aead seal failed".into()))
}

pub fn aead_open(key: &[u8], iv: &[u8], aad: &[u8], ct: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if key.len() != 32 || iv.len() != 24 {
        return Err(CryptoError::InvalidKey);
    }
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    let nonce = XNonce::from_slice(iv);
    cipher
        .decrypt(nonce, Payload { msg: ct, aad })
        .map_err(|_| CryptoError::AeadAuthFailure)
}

// ── KDF (argon2id) ─────────────────────────────────────────────────────────────

/// Derive a 32-byte key from `passphrase` and `salt` using argon2id. `cost`
/// selects the (memory_kib, iterations, parallelism) triple; deterministic
/// for identical inputs, per spec §4.1.
pub struct KdfCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

pub fn kdf_derive(passphrase: &[u8], salt: &[u8], cost: &KdfCost) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    use argon2::{Algorithm, Argon2, Params, Version};

    let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, Some(32))
        .map_err(|e| CryptoError::Other(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut out = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(passphrase, salt, out.as_mut())
        .map_err(|e| CryptoError::Other(e.to_string()))?;
    Ok(out)
}

// ── Content hash ───────────────────────────────────────────────────────────────

/// Collision-resistant content hash (BLAKE3), used for block hashes, Merkle
/// leaves, and content-addressed-tier object digests.
pub fn content_hash(bytes: &[u8]) -> Digest {
    Digest::from_bytes(*blake3::hash(bytes).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sig_round_trip() {
        let (pk, sk) = sig_keygen();
        let msg = b"canonical transaction body bytes";
        let sig = sig_sign(&sk, msg).unwrap();
        assert!(sig_verify(&pk, msg, &sig));
    }

    #[test]
    fn sig_tampered_message_fails() {
        let (pk, sk) = sig_keygen();
        let sig = sig_sign(&sk, b"original").unwrap();
        assert!(!sig_verify(&pk, b"tampered", &sig));
    }

    #[test]
    fn sig_verify_never_panics_on_garbage() {
        let pk = SigPublicKey(vec![1, 2, 3]);
        let sig = Signature(vec![4, 5, 6]);
        assert!(!sig_verify(&pk, b"msg", &sig));
    }

    #[test]
    fn kem_round_trip() {
        let (pk, sk) = kem_keygen();
        let (ct, shared_a) = kem_encap(&pk).unwrap();
        let shared_b = kem_decap(&sk, &ct).unwrap();
        assert_eq!(*shared_a, *shared_b);
    }

    #[test]
    fn aead_round_trip() {
        let key = [7u8; 32];
        let iv = [9u8; 24];
        let aad = b"aad";
        let pt = b"plaintext";
        let ct = aead_seal(&key, &iv, aad, pt).unwrap();
        let opened = aead_open(&key, &iv, aad, &ct).unwrap();
        assert_eq!(opened, pt);
    }

    #[test]
    fn aead_tamper_detected() {
        let key = [7u8; 32];
        let iv = [9u8; 24];
        let mut ct = aead_seal(&key, &iv, b"aad", b"plaintext").unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 0x01;
        assert!(aead_open(&key, &iv, b"aad", &ct).is_err());
    }

    #[test]
    fn kdf_is_deterministic() {
        let cost = KdfCost {
            memory_kib: 8 * 1024,
            iterations: 1,
            parallelism: 1,
        };
        let k1 = kdf_derive(b"hunter2", b"0123456789abcdef", &cost).unwrap();
        let k2 = kdf_derive(b"hunter2", b"0123456789abcdef", &cost).unwrap();
        assert_eq!(*k1, *k2);
    }

    #[test]
    fn content_hash_is_deterministic_and_collision_resistant_in_practice() {
        let a = content_hash(b"hello");
        let b = content_hash(b"hello");
        let c = content_hash(b"hellp");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
