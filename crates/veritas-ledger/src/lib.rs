pub mod engine;
pub mod error;
pub mod intake;
pub mod key_registry;
pub mod merkle;
pub mod pool;
pub mod transaction_validate;

pub use engine::{block_key, get_block, mine_block, mine_block_with_sink, read_tip, verify_block, verify_chain, write_tip, Tip};
pub use error::LedgerError;
pub use intake::{submit_transaction, AccountPolicyLookup};
pub use key_registry::StorageKeyRegistry;
pub use merkle::{merkle_proof, merkle_root, verify_proof, ProofStep, Side};
pub use pool::PendingPool;
pub use transaction_validate::{requires_user_signature, user_signed_bytes, validate_dual_signature, validate_user_signature};
