//! Builds block 0 and registers the system's initial signing key — the one
//! place this chain writes ledger state outside the normal submit/mine
//! pipeline (spec §4.8).

use thiserror::Error;

use veritas_core::{
    Block, Digest, SystemSignature, Transaction, TransactionData, UnsignedBlockBody, GENESIS_BLOCK_NUMBER,
};
use veritas_crypto::{canonical_bytes, content_hash, CanonicalError};
use veritas_ledger::{block_key, merkle_root, read_tip, write_tip, LedgerError, StorageKeyRegistry, Tip};
use veritas_storage::{StorageError, StorageFabric};
use veritas_system::{SystemIdentityConfig, SystemKeyRegistry};

#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("genesis has already been applied; a tip already exists")]
    AlreadyInitialized,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    SystemIdentity(#[from] veritas_system::SystemIdentityError),
    #[error(transparent)]
    Canonical(#[from] CanonicalError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

const GENESIS_TX_ID: &str = "genesis-system-key-anchor";

fn genesis_transaction(system: &SystemIdentityConfig) -> Result<Transaction, GenesisError> {
    let payload = serde_json::json!({
        "keyVersion": system.key_version,
        "systemPublicKey": hex::encode(&system.public_key.0),
    });
    let mut tx = Transaction::new(
        GENESIS_TX_ID.to_string(),
        0,
        TransactionData::AdminAction {
            action: "anchor_system_key".into(),
            payload,
        },
    );
    let body = canonical_bytes(&tx.signed_body())?;
    let signature = system.sign_as_system(&body)?;
    tx.signatures.system = Some(SystemSignature {
        public_key: system.public_key.clone(),
        signature,
        key_version: system.key_version,
    });
    Ok(tx)
}

/// Construct and persist block 0, and register `system`'s public key in the
/// storage-backed key registry at its version. A no-op error (not a panic)
/// if a tip already exists — callers are expected to check first, but this
/// guards against a double `init`.
pub fn apply_genesis(fabric: &StorageFabric, system: &SystemIdentityConfig) -> Result<Block, GenesisError> {
    if read_tip(fabric)?.is_some() {
        return Err(GenesisError::AlreadyInitialized);
    }

    let tx = genesis_transaction(system)?;
    let leaves = vec![content_hash(&canonical_bytes(&tx)?)];
    let merkle_root = merkle_root(&leaves);

    let unsigned_body = UnsignedBlockBody {
        block_number: GENESIS_BLOCK_NUMBER,
        timestamp: 0,
        previous_hash: Digest::ZERO,
        merkle_root,
    };
    let hash = content_hash(&canonical_bytes(&unsigned_body)?);
    let block_signature = system.sign_as_system(hash.as_bytes())?;

    let block = Block {
        block_number: GENESIS_BLOCK_NUMBER,
        timestamp: 0,
        previous_hash: Digest::ZERO,
        transactions: vec![tx],
        merkle_root,
        hash,
        block_signature: SystemSignature {
            public_key: system.public_key.clone(),
            signature: block_signature,
            key_version: system.key_version,
        },
        ipfs_hash: None,
    };

    fabric.object().put_json(&block_key(GENESIS_BLOCK_NUMBER), &block)?;
    write_tip(
        fabric,
        Tip {
            block_number: GENESIS_BLOCK_NUMBER,
            hash,
        },
    )?;

    let mut registry = StorageKeyRegistry::new(fabric.kv());
    registry.register(system.key_version, system.public_key.clone());

    tracing::info!(block_number = GENESIS_BLOCK_NUMBER, "genesis applied");
    Ok(block)
}

pub fn is_genesis_applied(fabric: &StorageFabric) -> Result<bool, GenesisError> {
    Ok(read_tip(fabric)?.is_some())
}
