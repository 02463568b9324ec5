//! The system's own signing identity (spec §4.3). The master signing key is
//! never assembled in memory as a whole except inside `sign_as_system`'s stack
//! frame, and only for the duration of a single `sig_sign` call.

use std::collections::HashMap;

use thiserror::Error;
use zeroize::Zeroizing;

use veritas_core::{KeyVersion, SigPublicKey, Signature};
use veritas_crypto::{sig_sign, sig_verify, CryptoError};

#[derive(Debug, Error)]
pub enum SystemIdentityError {
    #[error("system signing key shares have mismatched or zero length")]
    MalformedShares,
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// The system's master Dilithium2 secret key, held as two independently
/// sourced halves (e.g. one baked into the binary's config, one supplied at
/// startup via environment/secret store). Neither half alone signs anything.
pub struct SystemIdentityConfig {
    share_a: Zeroizing<Vec<u8>>,
    share_b: Zeroizing<Vec<u8>>,
    pub public_key: SigPublicKey,
    pub key_version: KeyVersion,
}

impl SystemIdentityConfig {
    pub fn new(
        share_a: Zeroizing<Vec<u8>>,
        share_b: Zeroizing<Vec<u8>>,
        public_key: SigPublicKey,
        key_version: KeyVersion,
    ) -> Result<Self, SystemIdentityError> {
        if share_a.is_empty() || share_b.is_empty() {
            return Err(SystemIdentityError::MalformedShares);
        }
        Ok(Self {
            share_a,
            share_b,
            public_key,
            key_version,
        })
    }

    /// Sign `msg` with the reconstructed master key. The two shares are
    /// concatenated into a local `Zeroizing` buffer that lives only for this
    /// call and is wiped on return, win or lose — the full secret key never
    /// exists anywhere else in process memory.
    pub fn sign_as_system(&self, msg: &[u8]) -> Result<Signature, SystemIdentityError> {
        let mut reconstructed = Zeroizing::new(Vec::with_capacity(self.share_a.len() + self.share_b.len()));
        reconstructed.extend_from_slice(&self.share_a);
        reconstructed.extend_from_slice(&self.share_b);

        let sig = sig_sign(&reconstructed, msg)?;
        Ok(sig)
    }

    pub fn verify_system(&self, msg: &[u8], sig: &Signature) -> bool {
        sig_verify(&self.public_key, msg, sig)
    }
}

/// Tracks every system public key that has ever signed a block, keyed by
/// `keyVersion`, so that a historical block remains verifiable after a key
/// rotation (spec §4.3: "rotation must not invalidate prior signatures").
/// Backed by whatever the caller's persistence layer provides; ledger and
/// node wiring plug in a storage-backed implementation, tests use the
/// in-memory one below.
pub trait SystemKeyRegistry {
    fn register(&mut self, key_version: KeyVersion, public_key: SigPublicKey);
    fn lookup(&self, key_version: KeyVersion) -> Option<SigPublicKey>;
    fn current_version(&self) -> Option<KeyVersion>;
}

#[derive(Default)]
pub struct InMemoryKeyRegistry {
    keys: HashMap<KeyVersion, SigPublicKey>,
    latest: Option<KeyVersion>,
}

impl SystemKeyRegistry for InMemoryKeyRegistry {
    fn register(&mut self, key_version: KeyVersion, public_key: SigPublicKey) {
        tracing::info!(key_version, "registering system signing key");
        self.latest = Some(self.latest.map_or(key_version, |v| v.max(key_version)));
        self.keys.insert(key_version, public_key);
    }

    fn lookup(&self, key_version: KeyVersion) -> Option<SigPublicKey> {
        self.keys.get(&key_version).cloned()
    }

    fn current_version(&self) -> Option<KeyVersion> {
        self.latest
    }
}

/// Verify a block or transaction's system signature against whatever public
/// key was registered for the `keyVersion` it claims, rather than always
/// the latest one.
pub fn verify_with_registry(
    registry: &dyn SystemKeyRegistry,
    key_version: KeyVersion,
    msg: &[u8],
    sig: &Signature,
) -> bool {
    match registry.lookup(key_version) {
        Some(pub_key) => sig_verify(&pub_key, msg, sig),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veritas_crypto::sig_keygen;

    fn make_identity(key_version: KeyVersion) -> SystemIdentityConfig {
        let (pk, sk) = sig_keygen();
        let mid = sk.len() / 2;
        let share_a = Zeroizing::new(sk[..mid].to_vec());
        let share_b = Zeroizing::new(sk[mid..].to_vec());
        SystemIdentityConfig::new(share_a, share_b, pk, key_version).unwrap()
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let identity = make_identity(1);
        let sig = identity.sign_as_system(b"block bytes").unwrap();
        assert!(identity.verify_system(b"block bytes", &sig));
    }

    #[test]
    fn rotation_keeps_old_signatures_verifiable() {
        let old = make_identity(1);
        let new = make_identity(2);

        let mut registry = InMemoryKeyRegistry::default();
        registry.register(1, old.public_key.clone());
        registry.register(2, new.public_key.clone());

        let old_sig = old.sign_as_system(b"old block").unwrap();
        let new_sig = new.sign_as_system(b"new block").unwrap();

        assert!(verify_with_registry(&registry, 1, b"old block", &old_sig));
        assert!(verify_with_registry(&registry, 2, b"new block", &new_sig));
        assert_eq!(registry.current_version(), Some(2));
    }

    #[test]
    fn wrong_key_version_fails() {
        let old = make_identity(1);
        let new = make_identity(2);
        let mut registry = InMemoryKeyRegistry::default();
        registry.register(1, old.public_key.clone());
        registry.register(2, new.public_key.clone());

        let sig = old.sign_as_system(b"block").unwrap();
        assert!(!verify_with_registry(&registry, 2, b"block", &sig));
    }
}
