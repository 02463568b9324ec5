use serde::{Deserialize, Serialize};

use veritas_core::{AccountType, Timestamp};
use veritas_storage::KvTier;

use crate::error::InviteError;

/// A pending activation, written to the storage fabric by invite-issuance
/// tooling outside this workspace (spec §4.6: "writes an ActivationToken
/// record to the storage fabric"). `email` is `None` when the invite was
/// not bound to a specific address.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivationToken {
    pub token: String,
    pub account_type: AccountType,
    pub email: Option<String>,
    pub issued_at: Timestamp,
    pub consumed: bool,
}

pub trait InviteStore {
    fn lookup(&self, token: &str) -> Result<Option<ActivationToken>, InviteError>;
    fn consume(&self, token: &str) -> Result<(), InviteError>;
    /// Issuance is not this workspace's concern end-to-end, but a default
    /// implementation is provided so tests and the admin binary can seed
    /// invites without a separate issuance tool.
    fn issue(&self, token: ActivationToken) -> Result<(), InviteError>;
}

fn invite_key(token: &str) -> Vec<u8> {
    let mut key = b"invite:".to_vec();
    key.extend_from_slice(token.as_bytes());
    key
}

pub struct StorageInviteStore<'a> {
    kv: &'a KvTier,
}

impl<'a> StorageInviteStore<'a> {
    pub fn new(kv: &'a KvTier) -> Self {
        Self { kv }
    }
}

impl InviteStore for StorageInviteStore<'_> {
    fn lookup(&self, token: &str) -> Result<Option<ActivationToken>, InviteError> {
        Ok(self.kv.get_json(&invite_key(token))?)
    }

    fn consume(&self, token: &str) -> Result<(), InviteError> {
        let mut invite = self.lookup(token)?.ok_or(InviteError::NotFound)?;
        if invite.consumed {
            return Err(InviteError::AlreadyConsumed);
        }
        invite.consumed = true;
        self.kv.put_json(&invite_key(token), &invite)?;
        Ok(())
    }

    fn issue(&self, token: ActivationToken) -> Result<(), InviteError> {
        self.kv.put_json(&invite_key(&token.token), &token)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veritas_storage::StorageFabric;

    #[test]
    fn consume_is_rejected_once_already_consumed() {
        let fabric = StorageFabric::open_temporary().unwrap();
        let store = StorageInviteStore::new(fabric.kv());
        store
            .issue(ActivationToken {
                token: "inv-1".into(),
                account_type: AccountType::Invited,
                email: Some("a@example.com".into()),
                issued_at: 0,
                consumed: false,
            })
            .unwrap();

        store.consume("inv-1").unwrap();
        assert!(matches!(store.consume("inv-1"), Err(InviteError::AlreadyConsumed)));
    }

    #[test]
    fn unknown_token_is_not_found() {
        let fabric = StorageFabric::open_temporary().unwrap();
        let store = StorageInviteStore::new(fabric.kv());
        assert!(store.lookup("missing").unwrap().is_none());
        assert!(matches!(store.consume("missing"), Err(InviteError::NotFound)));
    }
}
