use veritas_core::{Block, Digest, Timestamp, Transaction, UnsignedBlockBody};
use veritas_crypto::{canonical_bytes, content_hash};
use veritas_storage::StorageFabric;
use veritas_system::{verify_with_registry, SystemIdentityConfig, SystemKeyRegistry};

use crate::error::LedgerError;
use crate::merkle::merkle_root;
use crate::pool::PendingPool;
use crate::transaction_validate::validate_dual_signature;

const TIP_KEY: &[u8] = b"ledger:tip";

/// The object-tier key a block is stored under. Exposed so callers that
/// need to reach into the storage fabric directly (genesis bootstrap,
/// tests) use the same layout the engine does.
pub fn block_key(number: u64) -> Vec<u8> {
    let mut key = b"block:".to_vec();
    key.extend_from_slice(&number.to_be_bytes());
    key
}

fn transaction_leaves(transactions: &[Transaction]) -> Result<Vec<Digest>, LedgerError> {
    transactions
        .iter()
        .map(|tx| Ok(content_hash(&canonical_bytes(tx)?)))
        .collect()
}

fn block_hash(body: &UnsignedBlockBody) -> Result<Digest, LedgerError> {
    Ok(content_hash(&canonical_bytes(body)?))
}

/// Current chain tip: the highest block number known and its hash.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct Tip {
    pub block_number: u64,
    pub hash: Digest,
}

pub fn read_tip(fabric: &StorageFabric) -> Result<Option<Tip>, LedgerError> {
    Ok(fabric.kv().get_json::<Tip>(TIP_KEY)?)
}

pub fn write_tip(fabric: &StorageFabric, tip: Tip) -> Result<(), LedgerError> {
    fabric.kv().put_json(TIP_KEY, &tip)?;
    Ok(())
}

pub fn get_block(fabric: &StorageFabric, number: u64) -> Result<Option<Block>, LedgerError> {
    Ok(fabric.object().get_latest_json::<Block>(&block_key(number))?)
}

/// Drain the pending pool, form a new block over whatever it held, sign it
/// with the system identity, and persist it — or, on any failure after the
/// drain, put every drained transaction back through the pool's normal
/// insert path so a concurrent submitter never observes a torn state
/// (spec §4.7 step 9, testable property 11).
pub fn mine_block(
    fabric: &StorageFabric,
    pool: &PendingPool,
    system: &SystemIdentityConfig,
    now: Timestamp,
) -> Result<Block, LedgerError> {
    mine_block_with_sink(fabric, pool, system, now, |block| {
        fabric.object().put_json(&block_key(block.block_number), block)?;
        Ok(())
    })
}

/// Same as [`mine_block`], but the final persistence step is supplied as a
/// closure rather than hardcoded to the real storage fabric. Production code
/// always goes through `mine_block`; tests use this entry point with a
/// closure that fails on demand, standing in for the "FailingTier" double a
/// networked object store would need a real fault injector for.
pub fn mine_block_with_sink(
    fabric: &StorageFabric,
    pool: &PendingPool,
    system: &SystemIdentityConfig,
    now: Timestamp,
    persist: impl FnOnce(&Block) -> Result<(), LedgerError>,
) -> Result<Block, LedgerError> {
    let tip = read_tip(fabric)?.ok_or(LedgerError::GenesisMissing)?;

    let drained = pool.drain_all();
    if drained.is_empty() {
        return Err(LedgerError::NothingToMine);
    }

    match form_block(system, &tip, drained.clone(), now).and_then(|block| persist(&block).map(|_| block)) {
        Ok(block) => {
            write_tip(
                fabric,
                Tip {
                    block_number: block.block_number,
                    hash: block.hash,
                },
            )?;
            Ok(block)
        }
        Err(err) => {
            for tx in drained {
                let _ = pool.insert(tx);
            }
            Err(err)
        }
    }
}

fn form_block(
    system: &SystemIdentityConfig,
    tip: &Tip,
    transactions: Vec<Transaction>,
    now: Timestamp,
) -> Result<Block, LedgerError> {
    let leaves = transaction_leaves(&transactions)?;
    let merkle_root = merkle_root(&leaves);

    let block_number = tip.block_number + 1;
    let unsigned_body = UnsignedBlockBody {
        block_number,
        timestamp: now,
        previous_hash: tip.hash,
        merkle_root,
    };
    let hash = block_hash(&unsigned_body)?;
    let signature = system.sign_as_system(hash.as_bytes())?;

    Ok(Block {
        block_number,
        timestamp: now,
        previous_hash: tip.hash,
        transactions,
        merkle_root,
        hash,
        block_signature: veritas_core::SystemSignature {
            public_key: system.public_key.clone(),
            signature,
            key_version: system.key_version,
        },
        ipfs_hash: None,
    })
}

/// Verify one block in isolation: header fields are self-consistent, every
/// transaction is structurally valid and dual-signed, and the block
/// signature verifies under the registered key for its claimed version.
pub fn verify_block(block: &Block, registry: &dyn SystemKeyRegistry) -> Result<(), LedgerError> {
    let leaves = transaction_leaves(&block.transactions)?;
    let expected_root = merkle_root(&leaves);
    if expected_root != block.merkle_root {
        return Err(LedgerError::MerkleRootMismatch {
            block_number: block.block_number,
        });
    }

    let expected_hash = block_hash(&block.unsigned_body())?;
    if expected_hash != block.hash {
        return Err(LedgerError::BlockHashMismatch {
            block_number: block.block_number,
        });
    }

    if !verify_with_registry(
        registry,
        block.block_signature.key_version,
        block.hash.as_bytes(),
        &block.block_signature.signature,
    ) {
        return Err(LedgerError::BlockSignatureInvalid {
            block_number: block.block_number,
        });
    }

    for tx in &block.transactions {
        validate_dual_signature(tx, registry)?;
    }

    Ok(())
}

/// Walk the chain from genesis to the recorded tip, verifying every block
/// and the hash linkage between consecutive blocks. Returns the number of
/// the first block that fails, if any.
pub fn verify_chain(fabric: &StorageFabric, registry: &dyn SystemKeyRegistry) -> Result<(), LedgerError> {
    let tip = read_tip(fabric)?.ok_or(LedgerError::GenesisMissing)?;

    let mut previous_hash = Digest::ZERO;
    for number in 0..=tip.block_number {
        let block = get_block(fabric, number)?.ok_or(LedgerError::ChainLinkageBroken { block_number: number })?;

        if number > 0 && block.previous_hash != previous_hash {
            return Err(LedgerError::ChainLinkageBroken { block_number: number });
        }

        verify_block(&block, registry)?;
        previous_hash = block.hash;
    }

    Ok(())
}
