use veritas_core::{AccountType, Envelope, KemPublicKey, Transaction, TransactionData, UserSignature, ENVELOPE_VERSION};
use veritas_crypto::{sig_keygen, sig_sign};
use veritas_identity::invite::ActivationToken;
use veritas_identity::{activate, login, ActivationRequest, AccountStore, InviteStore, SessionStore, StorageAccountStore, StorageInviteStore};
use veritas_ledger::{user_signed_bytes, PendingPool};
use veritas_storage::StorageFabric;
use veritas_system::SystemIdentityConfig;
use zeroize::Zeroizing;

fn make_system() -> SystemIdentityConfig {
    let (pk, sk) = sig_keygen();
    let mid = sk.len() / 2;
    SystemIdentityConfig::new(Zeroizing::new(sk[..mid].to_vec()), Zeroizing::new(sk[mid..].to_vec()), pk, 0).unwrap()
}

fn placeholder_envelope() -> Envelope {
    Envelope {
        version: ENVELOPE_VERSION.to_string(),
        algorithm: "kyber768+xchacha20poly1305".into(),
        kem_ct: "AAAA".into(),
        iv: "AAAA".into(),
        ct: "AAAA".into(),
    }
}

/// Scenario A: an invited user activates with a pre-signed registration
/// transaction, then logs in with the same signing key.
#[test]
fn invited_user_activates_then_logs_in() {
    let fabric = StorageFabric::open_temporary().unwrap();
    let system = make_system();
    let pool = PendingPool::new();
    let invites = StorageInviteStore::new(fabric.kv());
    let accounts = StorageAccountStore::new(fabric.kv());
    let sessions = SessionStore::new(fabric.kv());

    invites
        .issue(ActivationToken {
            token: "invite-1".into(),
            account_type: AccountType::Invited,
            email: Some("person@example.com".into()),
            issued_at: 0,
            consumed: false,
        })
        .unwrap();

    let (sig_pk, sig_sk) = sig_keygen();
    let mut tx = Transaction::new(
        "user-1".into(),
        1_700_000_000_000,
        TransactionData::UserRegistration {
            user_id: "user-1".into(),
            email: "person@example.com".into(),
            kem_public_key: KemPublicKey(vec![1, 2, 3]),
            sig_public_key: sig_pk.clone(),
            encrypted_user_data: placeholder_envelope(),
            account_type: AccountType::Invited,
        },
    );
    let body = user_signed_bytes(&tx).unwrap();
    tx.signatures.user = Some(UserSignature {
        public_key: sig_pk.clone(),
        signature: sig_sign(&sig_sk, &body).unwrap(),
    });

    activate(
        &pool,
        &system,
        &invites,
        &accounts,
        ActivationRequest {
            invite_token: "invite-1".into(),
            transaction: tx,
        },
        1_700_000_000_000,
    )
    .unwrap();

    assert!(accounts.lookup_by_email("person@example.com").unwrap().is_some());
    assert_eq!(pool.len(), 1);

    let login_ts = 1_700_000_001_000;
    let challenge_bytes = format!("login:{}:{}", "person@example.com", login_ts).into_bytes();
    let challenge_sig = sig_sign(&sig_sk, &challenge_bytes).unwrap();

    let session = login(&accounts, &sessions, "person@example.com", login_ts, &challenge_sig, login_ts).unwrap();
    assert_eq!(session.user_id, "user-1");
    assert!(sessions.validate(&session.token, login_ts + 1).unwrap().is_some());
}

/// Scenario B: an open (email-unbound) invite accepts any activating
/// email, but activation is refused once the invite is reused.
#[test]
fn open_invite_cannot_be_replayed() {
    let fabric = StorageFabric::open_temporary().unwrap();
    let system = make_system();
    let pool = PendingPool::new();
    let invites = StorageInviteStore::new(fabric.kv());
    let accounts = StorageAccountStore::new(fabric.kv());

    invites
        .issue(ActivationToken {
            token: "open-invite".into(),
            account_type: AccountType::Invited,
            email: None,
            issued_at: 0,
            consumed: false,
        })
        .unwrap();

    let build_tx = |email: &str| {
        let (sig_pk, sig_sk) = sig_keygen();
        let mut tx = Transaction::new(
            "user-2".into(),
            1_700_000_000_000,
            TransactionData::UserRegistration {
                user_id: "user-2".into(),
                email: email.to_string(),
                kem_public_key: KemPublicKey(vec![9, 9, 9]),
                sig_public_key: sig_pk.clone(),
                encrypted_user_data: placeholder_envelope(),
                account_type: AccountType::Invited,
            },
        );
        let body = user_signed_bytes(&tx).unwrap();
        tx.signatures.user = Some(UserSignature {
            public_key: sig_pk,
            signature: sig_sign(&sig_sk, &body).unwrap(),
        });
        tx
    };

    activate(
        &pool,
        &system,
        &invites,
        &accounts,
        ActivationRequest {
            invite_token: "open-invite".into(),
            transaction: build_tx("first@example.com"),
        },
        1_700_000_000_000,
    )
    .unwrap();

    let replay = activate(
        &pool,
        &system,
        &invites,
        &accounts,
        ActivationRequest {
            invite_token: "open-invite".into(),
            transaction: build_tx("second@example.com"),
        },
        1_700_000_000_001,
    );
    assert!(replay.is_err());
    assert_eq!(pool.len(), 1);
}
