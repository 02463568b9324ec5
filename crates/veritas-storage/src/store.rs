//! The policy-driven read/write contract over the three tiers (spec §4.4).
//! `StorageFabric::put`/`get`/`verify_encryption` are what ledger/identity
//! code should call instead of reaching for a tier directly, so that a
//! record class's encryption and replication rules are enforced in one
//! place rather than re-implemented at every call site.

use serde::{Deserialize, Serialize};

use veritas_core::{Digest, KemPublicKey};

use crate::error::StorageError;
use crate::fabric::StorageFabric;
use crate::policy::{RecordClass, TierKind};

/// Who produced the envelope wrapped around a record at rest (spec §6's
/// bit-exact `encryption_source` enum).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncryptionSource {
    Client,
    Server,
    System,
}

/// Object-tier custom metadata (spec §6: bit-exact key set). Absent keys
/// imply a no-encryption class — fields are omitted from the wire
/// representation rather than emitted as `null`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_source: Option<EncryptionSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_owner: Option<String>,
    #[serde(rename = "contentType", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// The unit written to the object tier: bytes plus their encryption
/// provenance (spec §3: `StoredObject`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredObject {
    pub key: String,
    pub data: Vec<u8>,
    #[serde(rename = "customMetadata")]
    pub custom_metadata: CustomMetadata,
}

/// What `put` hands back: the logical key it was given, the content-addressed
/// digest if that tier was written, and the encryption provenance recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredRef {
    pub key: Vec<u8>,
    pub content_digest: Option<Digest>,
    pub encryption_meta: CustomMetadata,
}

#[derive(Clone, Copy, Default)]
pub struct PutOptions<'a> {
    /// Recipient KEM public key to encrypt under, when the class requires
    /// encryption at rest. `None` when the class has no such requirement.
    pub encryption_key: Option<&'a KemPublicKey>,
    pub encryption_source: Option<EncryptionSource>,
    pub encryption_owner: Option<&'a str>,
    pub content_type: Option<&'a str>,
}

#[derive(Clone, Copy, Default)]
pub struct GetOptions<'a> {
    /// Recipient KEM secret key bytes, when the class requires decryption.
    pub decryption_key: Option<&'a [u8]>,
}

const KEYPACK_AAD: &[u8] = b"veritas-storage-put";

impl StorageFabric {
    /// Write `value` under `key` according to `class`'s policy, replicating
    /// to every tier the policy names (spec §4.4 `put` steps 1-5).
    pub fn put(&self, class: RecordClass, key: &[u8], value: &[u8], opts: PutOptions<'_>) -> Result<StoredRef, StorageError> {
        let policy = class.policy();

        let (stored_bytes, meta) = if policy.encrypt_at_rest {
            let recipient = opts.encryption_key.ok_or(StorageError::EncryptionRequired)?;
            let envelope = veritas_crypto::seal(recipient, KEYPACK_AAD, value)?;
            let meta = CustomMetadata {
                encryption_algorithm: Some(envelope.algorithm.clone()),
                encryption_version: Some(envelope.version.clone()),
                encryption_source: Some(opts.encryption_source.unwrap_or(EncryptionSource::Server)),
                encryption_owner: opts.encryption_owner.map(str::to_string),
                content_type: opts.content_type.map(str::to_string),
            };
            (serde_json::to_vec(&envelope)?, meta)
        } else {
            let meta = CustomMetadata {
                content_type: opts.content_type.map(str::to_string),
                ..CustomMetadata::default()
            };
            (value.to_vec(), meta)
        };

        let object = StoredObject {
            key: String::from_utf8_lossy(key).into_owned(),
            data: stored_bytes.clone(),
            custom_metadata: meta.clone(),
        };

        let mut content_digest = None;
        for tier in policy.tiers {
            match tier {
                TierKind::Kv => self
                    .kv()
                    .put_bytes(key, &serde_json::to_vec(&object)?)
                    .map_err(|_| StorageError::TierWriteFailed { tier: TierKind::Kv })?,
                TierKind::Object => {
                    self.object()
                        .put_stored_object(key, &object)
                        .map_err(|_| StorageError::TierWriteFailed { tier: TierKind::Object })?;
                }
                TierKind::ContentAddressed => {
                    let digest = self
                        .content()
                        .put_stored_object(&stored_bytes, meta.clone())
                        .map_err(|_| StorageError::TierWriteFailed {
                            tier: TierKind::ContentAddressed,
                        })?;
                    content_digest = Some(digest);
                }
            }
        }

        Ok(StoredRef {
            key: key.to_vec(),
            content_digest,
            encryption_meta: meta,
        })
    }

    /// Read a record back under `class`'s policy (spec §4.4 `get` steps
    /// 1-3): try each declared tier in order, decrypt if required.
    pub fn get(&self, class: RecordClass, key: &[u8], opts: GetOptions<'_>) -> Result<Option<(Vec<u8>, CustomMetadata)>, StorageError> {
        let policy = class.policy();

        let mut found: Option<StoredObject> = None;
        for tier in policy.tiers {
            let object = match tier {
                TierKind::Kv => self
                    .kv()
                    .get_bytes(key)?
                    .map(|bytes| serde_json::from_slice::<StoredObject>(&bytes))
                    .transpose()?,
                TierKind::Object => self.object().get_latest_stored_object(key)?,
                TierKind::ContentAddressed => {
                    if key.len() == 32 {
                        let mut arr = [0u8; 32];
                        arr.copy_from_slice(key);
                        self.content().get_stored_object(&Digest::from_bytes(arr))?
                    } else {
                        None
                    }
                }
            };
            if object.is_some() {
                found = object;
                break;
            }
        }

        let Some(object) = found else {
            return Ok(None);
        };

        if policy.encrypt_at_rest {
            let secret = opts.decryption_key.ok_or(StorageError::DecryptionKeyRequired)?;
            let envelope: veritas_core::Envelope = serde_json::from_slice(&object.data)?;
            let plaintext = veritas_crypto::open(secret, KEYPACK_AAD, &envelope)?;
            Ok(Some((plaintext, object.custom_metadata)))
        } else {
            Ok(Some((object.data, object.custom_metadata)))
        }
    }

    /// Inspect a record's object-tier `customMetadata` without decrypting
    /// it (spec §4.4: used to audit that a record at rest carries the
    /// expected envelope).
    pub fn verify_encryption(&self, key: &[u8]) -> Result<Option<CustomMetadata>, StorageError> {
        Ok(self.object().get_latest_stored_object(key)?.map(|o| o.custom_metadata))
    }
}
