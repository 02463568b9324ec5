use thiserror::Error;

#[derive(Debug, Error)]
pub enum InviteError {
    #[error("invite token not found")]
    NotFound,
    #[error("invite token already consumed")]
    AlreadyConsumed,
    #[error(transparent)]
    Storage(#[from] veritas_storage::StorageError),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invite token not found")]
    InviteNotFound,
    #[error("invite token already consumed")]
    InviteAlreadyConsumed,
    #[error("activation transaction must be a USER_REGISTRATION")]
    WrongTransactionType,
    #[error("activation email does not match the invite")]
    EmailMismatch,
    #[error("activation account type does not match the invite")]
    AccountTypeMismatch,
    #[error("no account registered for this email")]
    UnknownAccount,
    #[error("login challenge timestamp is outside the allowed clock skew window")]
    ChallengeSkew,
    #[error("login challenge signature does not verify")]
    InvalidChallengeSignature,
    #[error("session token not found or expired")]
    InvalidSession,
    #[error(transparent)]
    Invite(#[from] InviteError),
    #[error(transparent)]
    Ledger(#[from] veritas_ledger::LedgerError),
    #[error(transparent)]
    Crypto(#[from] veritas_crypto::CryptoError),
    #[error(transparent)]
    Canonical(#[from] veritas_crypto::CanonicalError),
    #[error(transparent)]
    Storage(#[from] veritas_storage::StorageError),
}

/// Ethereum anchoring is an interface-only collaborator — no transport is
/// implemented in this workspace (spec §4.6/§6).
#[derive(Debug, Error)]
pub enum AnchorError {
    #[error("{0}")]
    Other(String),
}
