pub mod block;
pub mod constants;
pub mod envelope;
pub mod error;
pub mod transaction;
pub mod types;

pub use block::{Block, UnsignedBlockBody};
pub use constants::*;
pub use envelope::Envelope;
pub use error::CoreError;
pub use transaction::{
    AccountType, SignedBody, SystemSignature, Transaction, TransactionData, TransactionSignatures,
    TransactionType, UserSignature,
};
pub use types::{
    AssetId, Digest, KemPublicKey, KeyVersion, SigPublicKey, Signature, Timestamp, TxId, UserId,
};
