use serde::{Deserialize, Serialize};

use veritas_core::{AccountType, KemPublicKey, SigPublicKey, UserId};
use veritas_ledger::{AccountPolicyLookup, LedgerError};
use veritas_storage::{KvTier, StorageError};

/// The public, server-visible half of an activated account — enough to
/// verify a login challenge and address an envelope, nothing secret.
/// Populated when a `USER_REGISTRATION` transaction lands in a mined block;
/// the replay step that does so lives with the node binary's mining loop.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountRecord {
    pub user_id: UserId,
    pub email: String,
    pub kem_public_key: KemPublicKey,
    pub sig_public_key: SigPublicKey,
    pub account_type: AccountType,
}

pub trait AccountStore {
    fn lookup_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StorageError>;
    fn lookup_by_user_id(&self, user_id: &str) -> Result<Option<AccountRecord>, StorageError>;
    fn lookup_by_sig_key(&self, sig_key: &SigPublicKey) -> Result<Option<AccountRecord>, StorageError>;
    fn register(&self, account: AccountRecord) -> Result<(), StorageError>;
}

/// Adapt any `AccountStore` into the narrow read-only view
/// `veritas_ledger::submit_transaction` needs to enforce ownership/role
/// policy, without that crate taking a dependency on this one.
pub struct AccountPolicyView<'a>(pub &'a dyn AccountStore);

impl<'a> AccountPolicyLookup for AccountPolicyView<'a> {
    fn sig_key_for_owner(&self, owner_id: &str) -> Result<Option<SigPublicKey>, LedgerError> {
        Ok(self.0.lookup_by_user_id(owner_id)?.map(|a| a.sig_public_key))
    }

    fn account_type_for_key(&self, sig_key: &SigPublicKey) -> Result<Option<AccountType>, LedgerError> {
        Ok(self.0.lookup_by_sig_key(sig_key)?.map(|a| a.account_type))
    }
}

fn email_key(email: &str) -> Vec<u8> {
    let mut key = b"account:email:".to_vec();
    key.extend_from_slice(email.as_bytes());
    key
}

fn id_key(user_id: &str) -> Vec<u8> {
    let mut key = b"account:id:".to_vec();
    key.extend_from_slice(user_id.as_bytes());
    key
}

fn sig_key_key(sig_key: &SigPublicKey) -> Vec<u8> {
    let mut key = b"account:sigkey:".to_vec();
    key.extend_from_slice(&sig_key.0);
    key
}

pub struct StorageAccountStore<'a> {
    kv: &'a KvTier,
}

impl<'a> StorageAccountStore<'a> {
    pub fn new(kv: &'a KvTier) -> Self {
        Self { kv }
    }
}

impl AccountStore for StorageAccountStore<'_> {
    fn lookup_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StorageError> {
        self.kv.get_json(&email_key(email))
    }

    fn lookup_by_user_id(&self, user_id: &str) -> Result<Option<AccountRecord>, StorageError> {
        self.kv.get_json(&id_key(user_id))
    }

    fn lookup_by_sig_key(&self, sig_key: &SigPublicKey) -> Result<Option<AccountRecord>, StorageError> {
        self.kv.get_json(&sig_key_key(sig_key))
    }

    fn register(&self, account: AccountRecord) -> Result<(), StorageError> {
        self.kv.put_json(&email_key(&account.email), &account)?;
        self.kv.put_json(&id_key(&account.user_id), &account)?;
        self.kv.put_json(&sig_key_key(&account.sig_public_key), &account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veritas_storage::StorageFabric;

    #[test]
    fn register_and_lookup_round_trip() {
        let fabric = StorageFabric::open_temporary().unwrap();
        let store = StorageAccountStore::new(fabric.kv());
        store
            .register(AccountRecord {
                user_id: "user-1".into(),
                email: "a@example.com".into(),
                kem_public_key: KemPublicKey(vec![1, 2, 3]),
                sig_public_key: SigPublicKey(vec![4, 5, 6]),
                account_type: AccountType::Invited,
            })
            .unwrap();

        let found = store.lookup_by_email("a@example.com").unwrap().unwrap();
        assert_eq!(found.user_id, "user-1");
        assert!(store.lookup_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn account_policy_lookup_resolves_owner_and_role_through_the_same_store() {
        let fabric = StorageFabric::open_temporary().unwrap();
        let store = StorageAccountStore::new(fabric.kv());
        let sig_key = SigPublicKey(vec![7, 7, 7]);
        store
            .register(AccountRecord {
                user_id: "user-1".into(),
                email: "a@example.com".into(),
                kem_public_key: KemPublicKey(vec![1, 2, 3]),
                sig_public_key: sig_key.clone(),
                account_type: AccountType::Admin,
            })
            .unwrap();

        let view = AccountPolicyView(&store);
        let lookup: &dyn AccountPolicyLookup = &view;
        assert_eq!(lookup.sig_key_for_owner("user-1").unwrap(), Some(sig_key.clone()));
        assert_eq!(lookup.account_type_for_key(&sig_key).unwrap(), Some(AccountType::Admin));
        assert!(lookup.sig_key_for_owner("nobody").unwrap().is_none());
    }
}
