pub mod error;
pub mod fabric;
pub mod policy;
pub mod projection;
pub mod store;
pub mod tier;

pub use error::StorageError;
pub use fabric::StorageFabric;
pub use policy::{RecordClass, StoragePolicy, TierKind};
pub use projection::{project_public, AssetMetadataPrivate, AssetMetadataPublic};
pub use store::{CustomMetadata, EncryptionSource, GetOptions, PutOptions, StoredObject, StoredRef};
pub use tier::{ContentAddressedTier, KvTier, ObjectTier};
