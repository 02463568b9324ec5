use thiserror::Error;
use veritas_core::{KeyVersion, TxId};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Core(#[from] veritas_core::CoreError),
    #[error(transparent)]
    Crypto(#[from] veritas_crypto::CryptoError),
    #[error(transparent)]
    Canonical(#[from] veritas_crypto::CanonicalError),
    #[error(transparent)]
    Storage(#[from] veritas_storage::StorageError),
    #[error(transparent)]
    SystemIdentity(#[from] veritas_system::SystemIdentityError),

    #[error("transaction requires a user signature but none was attached")]
    MissingUserSignature,
    #[error("user signature does not verify against its declared public key")]
    InvalidUserSignature,
    #[error("transaction is missing its system co-signature")]
    MissingSystemSignature,
    #[error("system signature does not verify against the registered key for its version")]
    InvalidSystemSignature,
    #[error("transaction timestamp {0} is outside the allowed clock skew window")]
    TimestampOutOfSkew(i64),
    #[error("transaction `{0}` already present in the pending pool")]
    DuplicateTransaction(TxId),
    #[error("transaction `{0}` conflicts with a different transaction already pooled under the same id")]
    Conflict(TxId),
    #[error("transaction violates ownership/role policy: {0}")]
    PolicyViolation(String),

    #[error("nothing to mine: pending pool is empty")]
    NothingToMine,
    #[error("no genesis block found; run `init` first")]
    GenesisMissing,
    #[error("block {block_number} does not chain from the recorded tip")]
    ChainLinkageBroken { block_number: u64 },
    #[error("block {block_number}'s merkle root does not match its transactions")]
    MerkleRootMismatch { block_number: u64 },
    #[error("block {block_number}'s hash does not match its header fields")]
    BlockHashMismatch { block_number: u64 },
    #[error("block {block_number}'s signature does not verify")]
    BlockSignatureInvalid { block_number: u64 },
    #[error("no system key registered for version {0}")]
    UnknownKeyVersion(KeyVersion),
}
