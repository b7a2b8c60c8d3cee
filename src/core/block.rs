use crate::config::ChainConfig;
use crate::core::{ProofOfWork, Transaction};
use crate::error::{BlockchainError, Result};
use crate::utils::{current_timestamp, deserialize, serialize, sha256_digest};
use data_encoding::HEXLOWER;
use log::info;
use serde::{Deserialize, Serialize};

/// Header version stamped on every block
pub const BLOCK_VERSION: u32 = 0;

/// Backward link of a block: either the genesis marker or the parent's hash
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub enum BlockLink {
    Genesis,
    Parent(Vec<u8>),
}

impl BlockLink {
    /// Bytes this link contributes to the header; empty for genesis
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            BlockLink::Genesis => &[],
            BlockLink::Parent(hash) => hash.as_slice(),
        }
    }

    pub fn is_genesis(&self) -> bool {
        matches!(self, BlockLink::Genesis)
    }

    pub fn to_hex(&self) -> String {
        match self {
            BlockLink::Genesis => "None".to_string(),
            BlockLink::Parent(hash) => HEXLOWER.encode(hash),
        }
    }
}

// Field order is the stored order
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Block {
    version: u32,
    pre_block_hash: BlockLink,
    merkle_root: Vec<u8>,
    timestamp: u64,
    difficulty: u32,
    nonce: u64,
    hash: Vec<u8>,
    transactions: Vec<Transaction>,
}

impl Block {
    /// Build a block on top of `pre_block_hash` and seal it with proof-of-work
    pub fn new_block(
        pre_block_hash: BlockLink,
        transactions: &[Transaction],
        config: &ChainConfig,
    ) -> Result<Block> {
        if transactions.is_empty() {
            return Err(BlockchainError::InvalidBlock(
                "Block must contain at least one transaction".to_string(),
            ));
        }

        let mut block = Block {
            version: BLOCK_VERSION,
            pre_block_hash,
            merkle_root: Self::hash_transactions(transactions),
            timestamp: current_timestamp()?,
            difficulty: config.difficulty_bits,
            nonce: 0,
            hash: vec![],
            transactions: transactions.to_vec(),
        };

        let difficulty = block.difficulty;
        info!("Starting proof-of-work with difficulty {difficulty}");
        let (nonce, hash) = ProofOfWork::new_proof_of_work(&block)?.run(config.max_nonce)?;
        block.nonce = nonce;
        block.hash = hash;
        info!(
            "Proof-of-work completed for block: {} (nonce: {nonce})",
            HEXLOWER.encode(&block.hash)
        );

        Ok(block)
    }

    pub fn generate_genesis_block(transaction: &Transaction, config: &ChainConfig) -> Result<Block> {
        Block::new_block(BlockLink::Genesis, &[transaction.clone()], config)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Block> {
        deserialize::<Block>(bytes)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn get_version(&self) -> u32 {
        self.version
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn get_pre_block_hash(&self) -> &BlockLink {
        &self.pre_block_hash
    }

    pub fn get_hash(&self) -> &[u8] {
        self.hash.as_slice()
    }

    pub fn get_hash_hex(&self) -> String {
        HEXLOWER.encode(&self.hash)
    }

    pub fn get_timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn get_difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn get_merkle_root(&self) -> &[u8] {
        &self.merkle_root
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    /// Flat stand-in for a Merkle root: one hash over the concatenated ids
    pub fn hash_transactions(transactions: &[Transaction]) -> Vec<u8> {
        let mut txhashs = vec![];
        for transaction in transactions {
            txhashs.extend(transaction.get_id());
        }
        sha256_digest(txhashs.as_slice())
    }

    /// Check the stored root against the transactions carried by the block
    pub fn verify_merkle_root(&self) -> bool {
        Self::hash_transactions(&self.transactions) == self.merkle_root
    }
}
