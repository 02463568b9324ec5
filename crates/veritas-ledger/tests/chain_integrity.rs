use veritas_core::{Block, Digest, TransactionData, UnsignedBlockBody, UserSignature};
use veritas_crypto::{canonical_bytes, content_hash, sig_keygen, sig_sign};
use veritas_ledger::{get_block, mine_block, verify_chain, PendingPool};
use veritas_storage::StorageFabric;
use veritas_system::{InMemoryKeyRegistry, SystemIdentityConfig, SystemKeyRegistry};
use zeroize::Zeroizing;

fn make_system(key_version: u32) -> SystemIdentityConfig {
    let (pk, sk) = sig_keygen();
    let mid = sk.len() / 2;
    SystemIdentityConfig::new(
        Zeroizing::new(sk[..mid].to_vec()),
        Zeroizing::new(sk[mid..].to_vec()),
        pk,
        key_version,
    )
    .unwrap()
}

fn seed_genesis(fabric: &StorageFabric, system: &SystemIdentityConfig) {
    let unsigned_body = UnsignedBlockBody {
        block_number: 0,
        timestamp: 0,
        previous_hash: Digest::ZERO,
        merkle_root: Digest::ZERO,
    };
    let hash = content_hash(&canonical_bytes(&unsigned_body).unwrap());
    let signature = system.sign_as_system(hash.as_bytes()).unwrap();
    let genesis = Block {
        block_number: 0,
        timestamp: 0,
        previous_hash: Digest::ZERO,
        transactions: vec![],
        merkle_root: Digest::ZERO,
        hash,
        block_signature: veritas_core::SystemSignature {
            public_key: system.public_key.clone(),
            signature,
            key_version: system.key_version,
        },
        ipfs_hash: None,
    };
    fabric
        .object()
        .put_json(&veritas_ledger::block_key(0), &genesis)
        .unwrap();
    veritas_ledger::write_tip(
        fabric,
        veritas_ledger::Tip {
            block_number: 0,
            hash,
        },
    )
    .unwrap();
}

fn signed_transfer(id: &str, now: i64) -> veritas_core::Transaction {
    let (pk, sk) = sig_keygen();
    let mut tx = veritas_core::Transaction::new(
        id.to_string(),
        now,
        TransactionData::AssetTransfer {
            asset_id: "asset-1".into(),
            from_owner_id: "user-a".into(),
            to_owner_id: "user-b".into(),
        },
    );
    let body = canonical_bytes(&tx.signed_body()).unwrap();
    tx.signatures.user = Some(UserSignature {
        public_key: pk,
        signature: sig_sign(&sk, &body).unwrap(),
    });
    tx
}

#[test]
fn multi_block_chain_verifies_end_to_end() {
    let fabric = StorageFabric::open_temporary().unwrap();
    let system = make_system(0);
    seed_genesis(&fabric, &system);

    let pool = PendingPool::new();
    let mut registry = InMemoryKeyRegistry::default();
    registry.register(0, system.public_key.clone());

    for i in 0..3 {
        pool.insert(signed_transfer(&format!("tx-{i}"), 1_700_000_000_000 + i));
        let block = mine_block(&fabric, &pool, &system, 1_700_000_000_000 + i).unwrap();
        assert_eq!(block.block_number, (i + 1) as u64);
    }

    verify_chain(&fabric, &registry).unwrap();
    assert!(get_block(&fabric, 3).unwrap().is_some());
}

#[test]
fn tampered_block_breaks_verification() {
    let fabric = StorageFabric::open_temporary().unwrap();
    let system = make_system(0);
    seed_genesis(&fabric, &system);

    let pool = PendingPool::new();
    pool.insert(signed_transfer("tx-0", 1_700_000_000_000));
    mine_block(&fabric, &pool, &system, 1_700_000_000_000).unwrap();

    let mut registry = InMemoryKeyRegistry::default();
    registry.register(0, system.public_key.clone());
    verify_chain(&fabric, &registry).unwrap();

    // Tamper with block 1's stored bytes directly, bypassing the engine.
    let mut block = get_block(&fabric, 1).unwrap().unwrap();
    block.timestamp += 1;
    fabric
        .object()
        .put_json(&veritas_ledger::block_key(1), &block)
        .unwrap();

    assert!(verify_chain(&fabric, &registry).is_err());
}
