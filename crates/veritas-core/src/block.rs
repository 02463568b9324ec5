use serde::{Deserialize, Serialize};

use crate::transaction::{SystemSignature, Transaction};
use crate::types::{Digest, Timestamp};

/// The tuple hashed to produce `Block::hash` (spec §3: "`hash` equals the
/// content hash of `(blockNumber, timestamp, previousHash, merkleRoot)`").
#[derive(Serialize)]
pub struct UnsignedBlockBody {
    #[serde(rename = "blockNumber")]
    pub block_number: u64,
    pub timestamp: Timestamp,
    #[serde(rename = "previousHash")]
    pub previous_hash: Digest,
    #[serde(rename = "merkleRoot")]
    pub merkle_root: Digest,
}

/// A mined, signed block (spec §3 `Block`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "blockNumber")]
    pub block_number: u64,
    pub timestamp: Timestamp,
    #[serde(rename = "previousHash")]
    pub previous_hash: Digest,
    pub transactions: Vec<Transaction>,
    #[serde(rename = "merkleRoot")]
    pub merkle_root: Digest,
    pub hash: Digest,
    #[serde(rename = "blockSignature")]
    pub block_signature: SystemSignature,
    #[serde(rename = "ipfsHash", skip_serializing_if = "Option::is_none")]
    pub ipfs_hash: Option<String>,
}

impl Block {
    pub fn unsigned_body(&self) -> UnsignedBlockBody {
        UnsignedBlockBody {
            block_number: self.block_number,
            timestamp: self.timestamp,
            previous_hash: self.previous_hash,
            merkle_root: self.merkle_root,
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.block_number == 0
    }
}
