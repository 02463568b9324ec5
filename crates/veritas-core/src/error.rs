use thiserror::Error;

/// Structural/schema errors raised while validating a `Transaction`'s `data`
/// payload against its declared `type` (spec §6). Distinct from signature or
/// policy errors, which live closer to the ledger engine that can check them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("missing required field `{0}` for this transaction type")]
    MissingField(&'static str),

    #[error("unknown transaction type: {0}")]
    UnknownTransactionType(String),

    #[error("transaction id must be non-empty")]
    EmptyTransactionId,

    #[error("{0}")]
    Malformed(String),
}
