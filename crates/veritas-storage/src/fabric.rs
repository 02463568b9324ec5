use std::path::Path;

use crate::error::StorageError;
use crate::tier::{ContentAddressedTier, KvTier, ObjectTier};

/// Owns the three storage tiers over a single `sled::Db`, grounded on the
/// one-tree-per-class layout (spec §4.4). Each tier is exposed as its own
/// typed handle rather than one generic `get`/`put` pair, so that a caller's
/// choice of tier is visible at the call site instead of hidden behind a
/// class-to-tier lookup it has to trust blindly.
pub struct StorageFabric {
    _db: sled::Db,
    kv: KvTier,
    object: ObjectTier,
    content: ContentAddressedTier,
}

impl StorageFabric {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        tracing::info!(path = %path.display(), "opening storage fabric");
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    pub fn open_temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        let kv = KvTier {
            tree: db.open_tree("kv")?,
        };
        let object = ObjectTier {
            tree: db.open_tree("object")?,
        };
        let content = ContentAddressedTier {
            tree: db.open_tree("content")?,
        };
        Ok(Self {
            _db: db,
            kv,
            object,
            content,
        })
    }

    pub fn kv(&self) -> &KvTier {
        &self.kv
    }

    pub fn object(&self) -> &ObjectTier {
        &self.object
    }

    pub fn content(&self) -> &ContentAddressedTier {
        &self.content
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self._db.flush()?;
        Ok(())
    }
}
