use veritas_core::{KeyVersion, SigPublicKey};
use veritas_storage::KvTier;
use veritas_system::SystemKeyRegistry;

const CURRENT_VERSION_KEY: &[u8] = b"system_key:current_version";

fn version_key(version: KeyVersion) -> Vec<u8> {
    let mut key = b"system_key:".to_vec();
    key.extend_from_slice(&version.to_be_bytes());
    key
}

/// A `SystemKeyRegistry` backed by the storage fabric's key-value tier, so
/// the mapping survives process restarts (spec §4.3: genesis registers
/// version 0, `rotate_system_key` admin actions register later versions).
pub struct StorageKeyRegistry<'a> {
    kv: &'a KvTier,
}

impl<'a> StorageKeyRegistry<'a> {
    pub fn new(kv: &'a KvTier) -> Self {
        Self { kv }
    }
}

impl SystemKeyRegistry for StorageKeyRegistry<'_> {
    fn register(&mut self, key_version: KeyVersion, public_key: SigPublicKey) {
        let _ = self.kv.put_json(&version_key(key_version), &public_key.0);
        let current = self.current_version();
        if current.map_or(true, |v| key_version > v) {
            let _ = self.kv.put_json(CURRENT_VERSION_KEY, &key_version);
        }
    }

    fn lookup(&self, key_version: KeyVersion) -> Option<SigPublicKey> {
        self.kv
            .get_json::<Vec<u8>>(&version_key(key_version))
            .ok()
            .flatten()
            .map(SigPublicKey)
    }

    fn current_version(&self) -> Option<KeyVersion> {
        self.kv.get_json::<KeyVersion>(CURRENT_VERSION_KEY).ok().flatten()
    }
}
