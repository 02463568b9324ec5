use veritas_core::{Timestamp, Transaction, TransactionData};
use veritas_ledger::{submit_transaction, PendingPool};
use veritas_system::SystemIdentityConfig;

use crate::account::{AccountPolicyView, AccountRecord, AccountStore};
use crate::error::AuthError;
use crate::invite::InviteStore;

/// A pre-signed `USER_REGISTRATION` transaction plus the invite token that
/// authorizes it. Assembling `transaction` (drawing the user's key pair,
/// signing the body) happens client-side or in the admin binary's
/// `activate` subcommand; this function only validates and submits it.
pub struct ActivationRequest {
    pub invite_token: String,
    pub transaction: Transaction,
}

/// Drive the activation flow end to end (spec §4.6 step order):
/// 1. the invite must exist and not already be consumed,
/// 2. the transaction's declared email/account type must match the invite,
/// 3. the transaction is submitted through the normal ledger intake path
///    (which independently verifies the user signature and attaches the
///    system co-signature),
/// 4. only once intake accepts it is the invite marked consumed and the
///    account registered for login.
pub fn activate(
    pool: &PendingPool,
    system: &SystemIdentityConfig,
    invites: &dyn InviteStore,
    accounts: &dyn AccountStore,
    request: ActivationRequest,
    now: Timestamp,
) -> Result<(), AuthError> {
    let invite = invites.lookup(&request.invite_token)?.ok_or(AuthError::InviteNotFound)?;
    if invite.consumed {
        return Err(AuthError::InviteAlreadyConsumed);
    }

    let (user_id, email, kem_public_key, sig_public_key, account_type) = match &request.transaction.data {
        TransactionData::UserRegistration {
            user_id,
            email,
            kem_public_key,
            sig_public_key,
            account_type,
            ..
        } => (
            user_id.clone(),
            email.clone(),
            kem_public_key.clone(),
            sig_public_key.clone(),
            *account_type,
        ),
        _ => return Err(AuthError::WrongTransactionType),
    };

    if let Some(expected_email) = &invite.email {
        if expected_email != &email {
            return Err(AuthError::EmailMismatch);
        }
    }
    if account_type != invite.account_type {
        return Err(AuthError::AccountTypeMismatch);
    }

    submit_transaction(pool, system, &AccountPolicyView(accounts), request.transaction, now)?;
    invites.consume(&request.invite_token)?;
    accounts.register(AccountRecord {
        user_id,
        email: email.clone(),
        kem_public_key,
        sig_public_key,
        account_type,
    })?;

    tracing::info!(email = %email, "account activated");
    Ok(())
}
