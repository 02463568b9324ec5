use veritas_core::{AccountType, SigPublicKey, Timestamp, Transaction, TransactionData, TRANSACTION_SKEW_WINDOW_MS};
use veritas_crypto::canonical_bytes;
use veritas_system::SystemIdentityConfig;

use crate::error::LedgerError;
use crate::pool::PendingPool;
use crate::transaction_validate::validate_user_signature;

/// What intake needs to know about registered accounts to enforce
/// ownership/role policy (spec §4.7 step 3), without taking a dependency on
/// the identity crate that owns the real account store (that crate already
/// depends on this one, so the dependency would be circular). A caller
/// wires its own `AccountStore` into an implementation of this trait.
pub trait AccountPolicyLookup {
    /// The signature key currently on record for `owner_id`, if the account
    /// exists.
    fn sig_key_for_owner(&self, owner_id: &str) -> Result<Option<SigPublicKey>, LedgerError>;
    /// The account type of the account whose registered signature key is
    /// `sig_key`, if one is registered under that key.
    fn account_type_for_key(&self, sig_key: &SigPublicKey) -> Result<Option<AccountType>, LedgerError>;
}

fn check_timestamp_skew(tx_timestamp: Timestamp, now: Timestamp) -> Result<(), LedgerError> {
    if (tx_timestamp - now).abs() > TRANSACTION_SKEW_WINDOW_MS {
        return Err(LedgerError::TimestampOutOfSkew(tx_timestamp));
    }
    Ok(())
}

fn check_owner_matches_signer(
    tx: &Transaction,
    owner_id: &str,
    accounts: &dyn AccountPolicyLookup,
) -> Result<(), LedgerError> {
    let signer = tx.signatures.user.as_ref().ok_or(LedgerError::MissingUserSignature)?;
    match accounts.sig_key_for_owner(owner_id)? {
        Some(registered) if registered == signer.public_key => Ok(()),
        _ => Err(LedgerError::PolicyViolation(format!(
            "signature key does not match the registered key for ownerId `{owner_id}`"
        ))),
    }
}

/// Enforce spec §4.7 step 3: DOCUMENT_CREATION/ASSET_TRANSFER must be signed
/// by the key on record for the asset's owner, and ADMIN_ACTION must be
/// signed by an admin account. USER_REGISTRATION has no prior account to
/// check against — that's the point of the transaction.
fn enforce_ownership_policy(tx: &Transaction, accounts: &dyn AccountPolicyLookup) -> Result<(), LedgerError> {
    match &tx.data {
        TransactionData::DocumentCreation { owner_id, .. } => check_owner_matches_signer(tx, owner_id, accounts),
        TransactionData::AssetTransfer { from_owner_id, .. } => check_owner_matches_signer(tx, from_owner_id, accounts),
        TransactionData::AdminAction { .. } => {
            let signer = tx.signatures.user.as_ref().ok_or_else(|| {
                LedgerError::PolicyViolation("ADMIN_ACTION requires a user signature from an admin account".into())
            })?;
            match accounts.account_type_for_key(&signer.public_key)? {
                Some(AccountType::Admin) => Ok(()),
                _ => Err(LedgerError::PolicyViolation("ADMIN_ACTION signer is not an admin account".into())),
            }
        }
        TransactionData::UserRegistration { .. } => Ok(()),
    }
}

/// Accept a client-submitted, user-signed transaction into the pending pool.
/// Validates structure, timestamp skew, the user signature, and ownership/
/// role policy; then attaches the system's co-signature before inserting
/// (spec §4.7 steps 1-4). A transaction that fails validation is never
/// inserted and never mutates the pool's state (spec property 9's
/// idempotency guarantee composes with this: retries of a failed submission
/// keep failing the same way, and retries of a succeeded one are no-ops).
pub fn submit_transaction(
    pool: &PendingPool,
    system: &SystemIdentityConfig,
    accounts: &dyn AccountPolicyLookup,
    mut tx: Transaction,
    now: Timestamp,
) -> Result<(), LedgerError> {
    validate_user_signature(&tx)?;
    check_timestamp_skew(tx.timestamp, now)?;
    enforce_ownership_policy(&tx, accounts)?;

    let body = canonical_bytes(&tx.signed_body())?;
    let system_signature = system.sign_as_system(&body)?;

    tx.signatures.system = Some(veritas_core::SystemSignature {
        public_key: system.public_key.clone(),
        signature: system_signature,
        key_version: system.key_version,
    });

    pool.insert(tx)?;
    Ok(())
}
