pub mod wordlist;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use veritas_core::{
    KemPublicKey, SigPublicKey, Timestamp, KDF_ITERATIONS, KDF_MEMORY_KIB, KDF_PARALLELISM, KDF_SALT_LEN, KEYPACK_AAD,
    KEYPACK_FORMAT, KEYPACK_VERSION, PASSPHRASE_WORD_COUNT,
};
use veritas_crypto::{aead_open, aead_seal, kdf_derive, CryptoError, KdfCost};

/// `keyType` value for this system's fixed parameter choice (Kyber768 KEM,
/// Dilithium2 signatures). Spec §6 leaves the `<params>` placeholders open;
/// this is the one combination the rest of the workspace ever produces.
pub const KEY_TYPE: &str = "pqc-kem-kyber768-sig-dilithium2";

#[derive(Debug, Error)]
pub enum KeypackError {
    #[error("wrong passphrase or corrupt keypack")]
    WrongPassphraseOrCorrupt,
    #[error("unsupported keypack format or version")]
    Unsupported,
    #[error("passphrase word not recognized")]
    UnknownWord(String),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// The full recovery bundle a user must be able to reconstruct client-side
/// from nothing but a recovery passphrase (spec §3/§6 `Keypack`).
pub struct Keypack {
    pub version: String,
    pub email: String,
    pub timestamp: Timestamp,
    pub key_type: String,
    pub kem_public_key: KemPublicKey,
    pub kem_secret_key: Zeroizing<Vec<u8>>,
    pub sig_public_key: SigPublicKey,
    pub sig_secret_key: Zeroizing<Vec<u8>>,
}

#[derive(Clone, Serialize, Deserialize)]
struct KeyMaterial {
    public: String,
    private: String,
}

#[derive(Clone, Serialize, Deserialize)]
struct KeyBundle {
    kem: KeyMaterial,
    sig: KeyMaterial,
}

/// The plaintext wire shape sealed inside a `KeypackFile` (spec §6: the
/// inner `Keypack` after unwrap).
#[derive(Serialize, Deserialize)]
struct KeypackPlaintext {
    version: String,
    email: String,
    timestamp: Timestamp,
    #[serde(rename = "keyType")]
    key_type: String,
    keys: KeyBundle,
}

/// The `encrypted` block of a `KeypackFile` (spec §6: `{salt, iv, ct}`,
/// base64url-encoded byte fields).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncryptedBlock {
    pub salt: String,
    pub iv: String,
    pub ct: String,
}

/// The on-disk/wire shape a keypack is persisted as (spec §6 `KeypackFile`):
/// `{format:"veritas-keypack-v1", encrypted:{salt, iv, ct}}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeypackFile {
    pub format: String,
    pub encrypted: EncryptedBlock,
}

fn default_cost() -> KdfCost {
    KdfCost {
        memory_kib: KDF_MEMORY_KIB,
        iterations: KDF_ITERATIONS,
        parallelism: KDF_PARALLELISM,
    }
}

/// Draw a fresh recovery passphrase: 12 words from the 2048-word list, drawn
/// with `OsRng` (~132 bits of entropy, spec §4.5).
pub fn generate_passphrase() -> String {
    let mut rng = rand::rngs::OsRng;
    let mut words = Vec::with_capacity(PASSPHRASE_WORD_COUNT);
    for _ in 0..PASSPHRASE_WORD_COUNT {
        let index = (rng.next_u32() as usize) % veritas_core::PASSPHRASE_WORDLIST_LEN;
        words.push(wordlist::word_at(index));
    }
    words.join(" ")
}

/// Validate that every word in `passphrase` is drawn from the word list,
/// without reconstructing or deriving any key from it.
pub fn validate_passphrase_words(passphrase: &str) -> Result<(), KeypackError> {
    for word in passphrase.split_whitespace() {
        if wordlist::index_of(word).is_none() {
            return Err(KeypackError::UnknownWord(word.to_string()));
        }
    }
    Ok(())
}

/// Seal a freshly-issued key pair behind `passphrase` into a `KeypackFile`.
/// A fresh random salt and AEAD nonce are drawn per call.
#[allow(clippy::too_many_arguments)]
pub fn wrap(
    email: &str,
    timestamp: Timestamp,
    kem_public_key: &KemPublicKey,
    kem_secret_key: &[u8],
    sig_public_key: &SigPublicKey,
    sig_secret_key: &[u8],
    passphrase: &str,
) -> Result<KeypackFile, KeypackError> {
    let mut salt = vec![0u8; KDF_SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let key = kdf_derive(passphrase.as_bytes(), &salt, &default_cost())?;

    let mut iv = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut iv);

    let plaintext = KeypackPlaintext {
        version: KEYPACK_VERSION.to_string(),
        email: email.to_string(),
        timestamp,
        key_type: KEY_TYPE.to_string(),
        keys: KeyBundle {
            kem: KeyMaterial {
                public: URL_SAFE_NO_PAD.encode(&kem_public_key.0),
                private: URL_SAFE_NO_PAD.encode(kem_secret_key),
            },
            sig: KeyMaterial {
                public: URL_SAFE_NO_PAD.encode(&sig_public_key.0),
                private: URL_SAFE_NO_PAD.encode(sig_secret_key),
            },
        },
    };
    let plaintext_bytes = Zeroizing::new(
        serde_json::to_vec(&plaintext).map_err(|e| CryptoError::Other(e.to_string()))?,
    );

    let ciphertext = aead_seal(&key[..], &iv, KEYPACK_AAD, &plaintext_bytes)?;

    Ok(KeypackFile {
        format: KEYPACK_FORMAT.to_string(),
        encrypted: EncryptedBlock {
            salt: URL_SAFE_NO_PAD.encode(&salt),
            iv: URL_SAFE_NO_PAD.encode(iv),
            ct: URL_SAFE_NO_PAD.encode(&ciphertext),
        },
    })
}

/// Reconstruct a `Keypack` from `file` and `passphrase`. A wrong passphrase
/// and a corrupted file are indistinguishable to the caller — both fail with
/// `WrongPassphraseOrCorrupt` — so a brute-force attempt against the AEAD tag
/// learns nothing more than "that guess was wrong".
pub fn unwrap(file: &KeypackFile, passphrase: &str) -> Result<Keypack, KeypackError> {
    if file.format != KEYPACK_FORMAT {
        return Err(KeypackError::Unsupported);
    }

    let salt = URL_SAFE_NO_PAD
        .decode(&file.encrypted.salt)
        .map_err(|_| KeypackError::WrongPassphraseOrCorrupt)?;
    let iv = URL_SAFE_NO_PAD
        .decode(&file.encrypted.iv)
        .map_err(|_| KeypackError::WrongPassphraseOrCorrupt)?;
    let ciphertext = URL_SAFE_NO_PAD
        .decode(&file.encrypted.ct)
        .map_err(|_| KeypackError::WrongPassphraseOrCorrupt)?;

    let key = kdf_derive(passphrase.as_bytes(), &salt, &default_cost())
        .map_err(|_| KeypackError::WrongPassphraseOrCorrupt)?;

    let plaintext_bytes = aead_open(&key[..], &iv, KEYPACK_AAD, &ciphertext)
        .map_err(|_| KeypackError::WrongPassphraseOrCorrupt)?;

    let plaintext: KeypackPlaintext = serde_json::from_slice(&plaintext_bytes)
        .map_err(|_| KeypackError::WrongPassphraseOrCorrupt)?;

    if plaintext.version != KEYPACK_VERSION || plaintext.key_type != KEY_TYPE {
        return Err(KeypackError::Unsupported);
    }

    let kem_secret_key = URL_SAFE_NO_PAD
        .decode(&plaintext.keys.kem.private)
        .map_err(|_| KeypackError::WrongPassphraseOrCorrupt)?;
    let kem_public_key = URL_SAFE_NO_PAD
        .decode(&plaintext.keys.kem.public)
        .map_err(|_| KeypackError::WrongPassphraseOrCorrupt)?;
    let sig_secret_key = URL_SAFE_NO_PAD
        .decode(&plaintext.keys.sig.private)
        .map_err(|_| KeypackError::WrongPassphraseOrCorrupt)?;
    let sig_public_key = URL_SAFE_NO_PAD
        .decode(&plaintext.keys.sig.public)
        .map_err(|_| KeypackError::WrongPassphraseOrCorrupt)?;

    Ok(Keypack {
        version: plaintext.version,
        email: plaintext.email,
        timestamp: plaintext.timestamp,
        key_type: plaintext.key_type,
        kem_public_key: KemPublicKey(kem_public_key),
        kem_secret_key: Zeroizing::new(kem_secret_key),
        sig_public_key: SigPublicKey(sig_public_key),
        sig_secret_key: Zeroizing::new(sig_secret_key),
    })
}
