use serde::{de::DeserializeOwned, Serialize};
use veritas_core::Digest;

use crate::error::StorageError;
use crate::store::StoredObject;

/// Fast/hot key-value tier: accounts, sessions, invites, the system key
/// registry. One `sled::Tree` per caller-chosen namespace, mirroring the
/// one-tree-per-record-class layout used throughout this storage engine.
pub struct KvTier {
    pub(crate) tree: sled::Tree,
}

impl KvTier {
    pub fn put_bytes(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.tree.insert(key, value)?;
        Ok(())
    }

    pub fn get_bytes(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.tree.get(key)?.map(|v| v.to_vec()))
    }

    pub fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        self.tree.remove(key)?;
        Ok(())
    }

    pub fn put_json<T: Serialize>(&self, key: &[u8], value: &T) -> Result<(), StorageError> {
        self.put_bytes(key, &serde_json::to_vec(value)?)
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, StorageError> {
        match self.get_bytes(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn iter_prefix(&self, prefix: &[u8]) -> impl Iterator<Item = Result<(Vec<u8>, Vec<u8>), StorageError>> + '_ {
        self.tree.scan_prefix(prefix).map(|res| {
            res.map(|(k, v)| (k.to_vec(), v.to_vec())).map_err(StorageError::from)
        })
    }

    pub fn put_stored_object(&self, key: &[u8], object: &StoredObject) -> Result<(), StorageError> {
        self.put_json(key, object)
    }

    pub fn get_stored_object(&self, key: &[u8]) -> Result<Option<StoredObject>, StorageError> {
        self.get_json(key)
    }
}

/// Durable/versioned object tier: ledger blocks and private asset metadata.
/// Every write appends a new version rather than overwriting the previous
/// one; `get_latest` is what ordinary reads want.
pub struct ObjectTier {
    pub(crate) tree: sled::Tree,
}

fn latest_marker_key(key: &[u8]) -> Vec<u8> {
    [key, b"\0latest"].concat()
}

fn version_key(key: &[u8], version: u64) -> Vec<u8> {
    let mut out = key.to_vec();
    out.push(0);
    out.extend_from_slice(&version.to_be_bytes());
    out
}

impl ObjectTier {
    pub fn put_version(&self, key: &[u8], value: &[u8]) -> Result<u64, StorageError> {
        let marker = latest_marker_key(key);
        let next_version = match self.tree.get(&marker)? {
            Some(v) => u64::from_be_bytes(v.as_ref().try_into().unwrap_or([0u8; 8])) + 1,
            None => 1,
        };
        self.tree.insert(version_key(key, next_version), value)?;
        self.tree.insert(marker, &next_version.to_be_bytes())?;
        Ok(next_version)
    }

    pub fn get_version(&self, key: &[u8], version: u64) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.tree.get(version_key(key, version))?.map(|v| v.to_vec()))
    }

    pub fn latest_version(&self, key: &[u8]) -> Result<Option<u64>, StorageError> {
        match self.tree.get(latest_marker_key(key))? {
            Some(v) => Ok(Some(u64::from_be_bytes(v.as_ref().try_into().unwrap_or([0u8; 8])))),
            None => Ok(None),
        }
    }

    pub fn get_latest(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        match self.latest_version(key)? {
            Some(version) => self.get_version(key, version),
            None => Ok(None),
        }
    }

    pub fn put_json<T: Serialize>(&self, key: &[u8], value: &T) -> Result<u64, StorageError> {
        self.put_version(key, &serde_json::to_vec(value)?)
    }

    pub fn get_latest_json<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, StorageError> {
        match self.get_latest(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn put_stored_object(&self, key: &[u8], object: &StoredObject) -> Result<u64, StorageError> {
        self.put_json(key, object)
    }

    pub fn get_latest_stored_object(&self, key: &[u8]) -> Result<Option<StoredObject>, StorageError> {
        self.get_latest_json(key)
    }
}

/// Public, immutable-by-digest tier: the key *is* the content's BLAKE3
/// digest, so a write is idempotent and a read can verify what it got back.
pub struct ContentAddressedTier {
    pub(crate) tree: sled::Tree,
}

impl ContentAddressedTier {
    pub fn put_content(&self, bytes: &[u8]) -> Result<Digest, StorageError> {
        let digest = veritas_crypto::content_hash(bytes);
        self.tree.insert(digest.as_bytes(), bytes)?;
        Ok(digest)
    }

    pub fn get_content(&self, digest: &Digest) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.tree.get(digest.as_bytes())?.map(|v| v.to_vec()))
    }

    /// Read back `digest` and confirm its stored bytes still hash to it
    /// (spec §4.4: tamper-evidence of the public tier).
    pub fn verify(&self, digest: &Digest) -> Result<bool, StorageError> {
        match self.get_content(digest)? {
            Some(bytes) => Ok(veritas_crypto::content_hash(&bytes) == *digest),
            None => Ok(false),
        }
    }

    pub fn put_json<T: Serialize>(&self, value: &T) -> Result<Digest, StorageError> {
        self.put_content(&serde_json::to_vec(value)?)
    }

    pub fn get_json<T: DeserializeOwned>(&self, digest: &Digest) -> Result<Option<T>, StorageError> {
        match self.get_content(digest)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Like `put_content`, but the digest is computed over `bytes` alone
    /// (so a reader who only has the digest can still verify it) while the
    /// stored record also carries `customMetadata` alongside it.
    pub fn put_stored_object(&self, bytes: &[u8], custom_metadata: crate::store::CustomMetadata) -> Result<Digest, StorageError> {
        let digest = veritas_crypto::content_hash(bytes);
        let object = StoredObject {
            key: digest.to_hex(),
            data: bytes.to_vec(),
            custom_metadata,
        };
        self.tree.insert(digest.as_bytes(), serde_json::to_vec(&object)?)?;
        Ok(digest)
    }

    pub fn get_stored_object(&self, digest: &Digest) -> Result<Option<StoredObject>, StorageError> {
        match self.tree.get(digest.as_bytes())? {
            Some(v) => Ok(Some(serde_json::from_slice(&v)?)),
            None => Ok(None),
        }
    }
}
