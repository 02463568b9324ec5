use serde::Serialize;

use veritas_core::{Envelope, KemPublicKey, SigPublicKey, Timestamp, Transaction, TransactionData, TransactionType};
use veritas_crypto::{canonical_bytes, sig_verify};
use veritas_system::{verify_with_registry, SystemKeyRegistry};

use crate::error::LedgerError;

/// Every transaction type except `ADMIN_ACTION` must carry a user signature
/// before the system will co-sign it — admin actions originate inside the
/// server itself (genesis, key rotation) and have no external signer.
pub fn requires_user_signature(transaction_type: TransactionType) -> bool {
    !matches!(transaction_type, TransactionType::AdminAction)
}

/// `USER_REGISTRATION`'s user signature covers a narrower tuple than every
/// other transaction type: `(kemPublicKey, sigPublicKey, encryptedUserData,
/// timestamp)` (spec §4.6 step 3), not the general `(id, type, timestamp,
/// data)` body every other type signs — the client produces this signature
/// before the transaction id is minted at intake, so the id can't be part of
/// what it covers.
#[derive(Serialize)]
struct UserRegistrationSignedBody<'a> {
    #[serde(rename = "kemPublicKey")]
    kem_public_key: &'a KemPublicKey,
    #[serde(rename = "sigPublicKey")]
    sig_public_key: &'a SigPublicKey,
    #[serde(rename = "encryptedUserData")]
    encrypted_user_data: &'a Envelope,
    timestamp: Timestamp,
}

/// The exact bytes the user half of a transaction's signature covers. Public
/// so that callers assembling a transaction (the CLI's `activate`/`submit`
/// paths, tests) can produce a signature that will actually verify, rather
/// than duplicating the per-type special-casing themselves.
pub fn user_signed_bytes(tx: &Transaction) -> Result<Vec<u8>, LedgerError> {
    match &tx.data {
        TransactionData::UserRegistration {
            kem_public_key,
            sig_public_key,
            encrypted_user_data,
            ..
        } => Ok(canonical_bytes(&UserRegistrationSignedBody {
            kem_public_key,
            sig_public_key,
            encrypted_user_data,
            timestamp: tx.timestamp,
        })?),
        _ => Ok(canonical_bytes(&tx.signed_body())?),
    }
}

/// Check the structural and user-signature half of the dual-signature rule,
/// before the system has had a chance to co-sign (spec property 6, first
/// half). Called at intake, before `intake::submit_transaction` attaches the
/// system signature.
pub fn validate_user_signature(tx: &Transaction) -> Result<(), LedgerError> {
    tx.validate_structure()?;

    if !requires_user_signature(tx.transaction_type) {
        return Ok(());
    }

    let user_sig = tx.signatures.user.as_ref().ok_or(LedgerError::MissingUserSignature)?;
    let body = user_signed_bytes(tx)?;
    if !sig_verify(&user_sig.public_key, &body, &user_sig.signature) {
        return Err(LedgerError::InvalidUserSignature);
    }
    Ok(())
}

/// Check the system half of the dual-signature rule, used when verifying a
/// transaction that already sits inside a mined block. The system
/// co-signature always commits the full `(id, type, timestamp, data)` record
/// — its role is to attest the record as mined, not to re-check what the
/// user specifically attested to.
pub fn validate_system_signature(tx: &Transaction, registry: &dyn SystemKeyRegistry) -> Result<(), LedgerError> {
    let system_sig = tx.signatures.system.as_ref().ok_or(LedgerError::MissingSystemSignature)?;
    let body = canonical_bytes(&tx.signed_body())?;
    if !verify_with_registry(registry, system_sig.key_version, &body, &system_sig.signature) {
        return Err(LedgerError::InvalidSystemSignature);
    }
    Ok(())
}

/// Full dual-signature check for a transaction already inside a block: both
/// halves must verify (spec property 6).
pub fn validate_dual_signature(tx: &Transaction, registry: &dyn SystemKeyRegistry) -> Result<(), LedgerError> {
    if requires_user_signature(tx.transaction_type) {
        let user_sig = tx.signatures.user.as_ref().ok_or(LedgerError::MissingUserSignature)?;
        let body = user_signed_bytes(tx)?;
        if !sig_verify(&user_sig.public_key, &body, &user_sig.signature) {
            return Err(LedgerError::InvalidUserSignature);
        }
    }
    validate_system_signature(tx, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use veritas_core::{AccountType, Envelope, KemPublicKey, Transaction, TransactionData, UserSignature, ENVELOPE_VERSION};
    use veritas_crypto::sig_keygen;
    use veritas_system::InMemoryKeyRegistry;

    fn admin_tx() -> Transaction {
        Transaction::new(
            "tx-admin".into(),
            1_700_000_000_000,
            TransactionData::AdminAction {
                action: "rotate_system_key".into(),
                payload: serde_json::json!({}),
            },
        )
    }

    fn transfer_tx() -> Transaction {
        Transaction::new(
            "tx-transfer".into(),
            1_700_000_000_000,
            TransactionData::AssetTransfer {
                asset_id: "asset-1".into(),
                from_owner_id: "user-a".into(),
                to_owner_id: "user-b".into(),
            },
        )
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

    fn registration_tx(sig_pk: SigPublicKey) -> Transaction {
        Transaction::new(
            "tx-registration".into(),
            1_700_000_000_000,
            TransactionData::UserRegistration {
                user_id: "user-1".into(),
                email: "person@example.com".into(),
                kem_public_key: KemPublicKey(vec![1, 2, 3]),
                sig_public_key: sig_pk,
                encrypted_user_data: placeholder_envelope(),
                account_type: AccountType::Invited,
            },
        )
    }

    #[test]
    fn admin_action_needs_no_user_signature() {
        let tx = admin_tx();
        assert!(validate_user_signature(&tx).is_ok());
    }

    #[test]
    fn transfer_without_user_signature_is_rejected() {
        let tx = transfer_tx();
        assert!(matches!(
            validate_user_signature(&tx),
            Err(LedgerError::MissingUserSignature)
        ));
    }

    #[test]
    fn transfer_with_valid_user_signature_passes() {
        let (pk, sk) = sig_keygen();
        let mut tx = transfer_tx();
        let body = canonical_bytes(&tx.signed_body()).unwrap();
        let sig = veritas_crypto::sig_sign(&sk, &body).unwrap();
        tx.signatures.user = Some(UserSignature {
            public_key: pk,
            signature: sig,
        });
        assert!(validate_user_signature(&tx).is_ok());
    }

    #[test]
    fn registration_signature_covers_the_narrow_tuple_not_the_general_body() {
        let (pk, sk) = sig_keygen();
        let mut tx = registration_tx(pk.clone());

        // Signing the general (id, type, timestamp, data) body, as every
        // other transaction type does, must NOT satisfy registration.
        let wrong_body = canonical_bytes(&tx.signed_body()).unwrap();
        tx.signatures.user = Some(UserSignature {
            public_key: pk.clone(),
            signature: veritas_crypto::sig_sign(&sk, &wrong_body).unwrap(),
        });
        assert!(matches!(
            validate_user_signature(&tx),
            Err(LedgerError::InvalidUserSignature)
        ));

        // Signing the narrow tuple succeeds.
        let right_body = user_signed_bytes(&tx).unwrap();
        tx.signatures.user = Some(UserSignature {
            public_key: pk,
            signature: veritas_crypto::sig_sign(&sk, &right_body).unwrap(),
        });
        assert!(validate_user_signature(&tx).is_ok());
    }

    #[test]
    fn full_dual_signature_check_needs_registered_system_key() {
        let (user_pk, user_sk) = sig_keygen();
        let (sys_pk, sys_sk) = sig_keygen();
        let mut registry = InMemoryKeyRegistry::default();
        registry.register(1, sys_pk.clone());

        let mut tx = transfer_tx();
        let body = canonical_bytes(&tx.signed_body()).unwrap();
        tx.signatures.user = Some(UserSignature {
            public_key: user_pk,
            signature: veritas_crypto::sig_sign(&user_sk, &body).unwrap(),
        });
        tx.signatures.system = Some(veritas_core::SystemSignature {
            public_key: sys_pk,
            signature: veritas_crypto::sig_sign(&sys_sk, &body).unwrap(),
            key_version: 1,
        });

        assert!(validate_dual_signature(&tx, &registry).is_ok());
    }
}
