use thiserror::Error;

use crate::policy::TierKind;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage engine error: {0}")]
    Engine(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("record class `{0:?}` has no route into this tier")]
    PolicyViolation(crate::policy::RecordClass),
    #[error("policy requires encryption at rest but no encryption key was supplied")]
    EncryptionRequired,
    #[error("policy requires decryption but no decryption key was supplied")]
    DecryptionKeyRequired,
    #[error(transparent)]
    Envelope(#[from] veritas_crypto::EnvelopeError),
    #[error("write to required tier {tier:?} failed")]
    TierWriteFailed { tier: TierKind },
    #[error("read from required tier {tier:?} failed")]
    TierReadFailed { tier: TierKind },
    #[error("operation on tier {tier:?} exceeded its deadline")]
    Timeout { tier: TierKind },
}
