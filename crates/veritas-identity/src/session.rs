use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use veritas_core::{Timestamp, UserId, SESSION_LIFETIME_MS};
use veritas_storage::{KvTier, StorageError};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: UserId,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
}

#[derive(Clone, Debug)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: Timestamp,
}

fn session_key(token: &str) -> Vec<u8> {
    let mut key = b"session:".to_vec();
    key.extend_from_slice(token.as_bytes());
    key
}

/// Opaque bearer sessions over the KV tier, modeled after the teacher's flat
/// bookkeeping tree: one key per token, no secondary index, lifetime
/// enforced on every lookup rather than via background eviction.
pub struct SessionStore<'a> {
    kv: &'a KvTier,
}

impl<'a> SessionStore<'a> {
    pub fn new(kv: &'a KvTier) -> Self {
        Self { kv }
    }

    pub fn issue(&self, user_id: UserId, now: Timestamp) -> Result<Session, StorageError> {
        let mut raw = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut raw);
        let token = URL_SAFE_NO_PAD.encode(raw);

        let record = SessionRecord {
            user_id: user_id.clone(),
            issued_at: now,
            expires_at: now + SESSION_LIFETIME_MS,
        };
        self.kv.put_json(&session_key(&token), &record)?;

        Ok(Session {
            token,
            user_id,
            expires_at: record.expires_at,
        })
    }

    /// Look up `token`, treating an expired record the same as a missing
    /// one — the caller cannot tell "never existed" from "timed out".
    pub fn validate(&self, token: &str, now: Timestamp) -> Result<Option<SessionRecord>, StorageError> {
        match self.kv.get_json::<SessionRecord>(&session_key(token))? {
            Some(record) if record.expires_at > now => Ok(Some(record)),
            _ => Ok(None),
        }
    }

    pub fn revoke(&self, token: &str) -> Result<(), StorageError> {
        self.kv.delete(&session_key(token))
    }
}
