use veritas_core::{Signature, Timestamp, CHALLENGE_SKEW_WINDOW_MS};
use veritas_crypto::sig_verify;

use crate::account::AccountStore;
use crate::error::AuthError;
use crate::session::{Session, SessionStore};

/// The exact bytes a login signature covers: the literal string
/// `login:{email}:{timestamp}` (spec §4.6 step 1), not a serialized struct.
/// Binding the timestamp in is what lets the server bound replay to the skew
/// window rather than forever.
fn challenge_bytes(email: &str, timestamp: Timestamp) -> Vec<u8> {
    format!("login:{email}:{timestamp}").into_bytes()
}

/// Challenge-response login (spec §4.6 step order): look the account up by
/// email, check the claimed timestamp is within the allowed skew, verify
/// the signature against the account's registered signing key, then issue
/// a session.
pub fn login(
    accounts: &dyn AccountStore,
    sessions: &SessionStore<'_>,
    email: &str,
    timestamp: Timestamp,
    signature: &Signature,
    now: Timestamp,
) -> Result<Session, AuthError> {
    let account = accounts.lookup_by_email(email)?.ok_or(AuthError::UnknownAccount)?;

    if (timestamp - now).abs() > CHALLENGE_SKEW_WINDOW_MS {
        return Err(AuthError::ChallengeSkew);
    }

    let body = challenge_bytes(email, timestamp);
    if !sig_verify(&account.sig_public_key, &body, signature) {
        return Err(AuthError::InvalidChallengeSignature);
    }

    Ok(sessions.issue(account.user_id, now)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use veritas_core::{AccountType, KemPublicKey};
    use veritas_crypto::sig_keygen;
    use veritas_storage::StorageFabric;

    use crate::account::{AccountRecord, StorageAccountStore};

    fn seed_account(accounts: &dyn AccountStore, sig_sk: &[u8], sig_pk: veritas_core::SigPublicKey) {
        accounts
            .register(AccountRecord {
                user_id: "user-1".into(),
                email: "person@example.com".into(),
                kem_public_key: KemPublicKey(vec![1, 2, 3]),
                sig_public_key: sig_pk,
                account_type: AccountType::Invited,
            })
            .unwrap();
        let _ = sig_sk;
    }

    #[test]
    fn valid_signature_issues_a_session() {
        let fabric = StorageFabric::open_temporary().unwrap();
        let accounts = StorageAccountStore::new(fabric.kv());
        let sessions = SessionStore::new(fabric.kv());
        let (pk, sk) = sig_keygen();
        seed_account(&accounts, &sk, pk);

        let timestamp = 1_700_000_000_000;
        let body = challenge_bytes("person@example.com", timestamp);
        let signature = veritas_crypto::sig_sign(&sk, &body).unwrap();

        let session = login(&accounts, &sessions, "person@example.com", timestamp, &signature, timestamp).unwrap();
        assert_eq!(session.user_id, "user-1");
    }

    #[test]
    fn wrong_key_signature_is_rejected() {
        let fabric = StorageFabric::open_temporary().unwrap();
        let accounts = StorageAccountStore::new(fabric.kv());
        let sessions = SessionStore::new(fabric.kv());
        let (pk, _sk) = sig_keygen();
        let (_other_pk, other_sk) = sig_keygen();
        seed_account(&accounts, &other_sk, pk);

        let timestamp = 1_700_000_000_000;
        let body = challenge_bytes("person@example.com", timestamp);
        let signature = veritas_crypto::sig_sign(&other_sk, &body).unwrap();

        let result = login(&accounts, &sessions, "person@example.com", timestamp, &signature, timestamp);
        assert!(matches!(result, Err(AuthError::InvalidChallengeSignature)));
    }

    #[test]
    fn skewed_timestamp_is_rejected() {
        let fabric = StorageFabric::open_temporary().unwrap();
        let accounts = StorageAccountStore::new(fabric.kv());
        let sessions = SessionStore::new(fabric.kv());
        let (pk, sk) = sig_keygen();
        seed_account(&accounts, &sk, pk);

        let timestamp = 1_700_000_000_000;
        let body = challenge_bytes("person@example.com", timestamp);
        let signature = veritas_crypto::sig_sign(&sk, &body).unwrap();

        let result = login(
            &accounts,
            &sessions,
            "person@example.com",
            timestamp,
            &signature,
            timestamp + CHALLENGE_SKEW_WINDOW_MS * 10,
        );
        assert!(matches!(result, Err(AuthError::ChallengeSkew)));
    }

    #[test]
    fn unknown_email_is_rejected() {
        let fabric = StorageFabric::open_temporary().unwrap();
        let accounts = StorageAccountStore::new(fabric.kv());
        let sessions = SessionStore::new(fabric.kv());
        let (_pk, sk) = sig_keygen();

        let timestamp = 1_700_000_000_000;
        let body = challenge_bytes("nobody@example.com", timestamp);
        let signature = veritas_crypto::sig_sign(&sk, &body).unwrap();

        let result = login(&accounts, &sessions, "nobody@example.com", timestamp, &signature, timestamp);
        assert!(matches!(result, Err(AuthError::UnknownAccount)));
    }
}
