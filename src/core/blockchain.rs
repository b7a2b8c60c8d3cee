// This is the chain store - the only place blocks are written
// Sled holds every block keyed by its hash plus one key pointing at the newest block
// Blocks link backwards by hash, so walking the chain is a series of lookups

use crate::config::ChainConfig;
use crate::core::{Block, BlockLink, SpendAuthority, Transaction};
use crate::error::{BlockchainError, Result};
use crate::storage::UTXOSet;
use data_encoding::HEXLOWER;
use log::{info, warn};
use sled::transaction::TransactionError;
use sled::{Db, Tree};
use std::fs;
use std::path::Path;

const TIP_BLOCK_HASH_KEY: &str = "lastHashKey"; // Key holding the hash of the newest block
const BLOCKS_TREE: &str = "blocks"; // Tree holding every block and the tip key

/// Handle to an on-disk chain.
///
/// The handle exclusively owns the database and the cached tip; appending needs
/// `&mut self`, so there is never more than one writer per handle.
pub struct Blockchain {
    tip_hash: Vec<u8>,
    db: Db,
    blocks: Tree,
    config: ChainConfig,
}

impl Blockchain {
    /// Create a new chain whose genesis reward goes to `genesis_address`.
    ///
    /// Fails with `ChainAlreadyExists` if anything is already at the chain path.
    pub fn create_blockchain(config: ChainConfig, genesis_address: &str) -> Result<Blockchain> {
        let path = config.chain_path();
        if path.exists() {
            return Err(BlockchainError::ChainAlreadyExists(
                path.display().to_string(),
            ));
        }

        // Seal genesis before touching the disk so a bad address or an exhausted
        // search leaves nothing behind
        info!("Creating genesis block for address: {genesis_address}");
        let coinbase_tx =
            Transaction::new_coinbase_tx(genesis_address, &config.genesis_message, config.reward)?;
        let genesis = Block::generate_genesis_block(&coinbase_tx, &config)?;

        let (db, blocks) = Self::open_storage(&path)?;
        if let Err(e) = Self::update_blocks_tree(&blocks, &genesis).and_then(|_| Self::flush_db(&db))
        {
            drop(blocks);
            drop(db);
            Self::discard_storage(&path);
            return Err(e);
        }

        info!("Created blockchain at {} with genesis {}", path.display(), genesis.get_hash_hex());
        Ok(Blockchain {
            tip_hash: genesis.get_hash().to_vec(),
            db,
            blocks,
            config,
        })
    }

    /// Open an existing chain, failing with `ChainNotFound` if there is none
    pub fn open_blockchain(config: ChainConfig) -> Result<Blockchain> {
        let path = config.chain_path();
        if !path.exists() {
            return Err(BlockchainError::ChainNotFound(path.display().to_string()));
        }

        let (db, blocks) = Self::open_storage(&path)?;
        let tip_hash = blocks
            .get(TIP_BLOCK_HASH_KEY)
            .map_err(|e| {
                BlockchainError::StorageUnavailable(format!("Failed to get tip hash: {e}"))
            })?
            .ok_or_else(|| BlockchainError::ChainNotFound(path.display().to_string()))?
            .to_vec();

        info!("Opened blockchain at {} (tip {})", path.display(), HEXLOWER.encode(&tip_hash));
        Ok(Blockchain {
            tip_hash,
            db,
            blocks,
            config,
        })
    }

    fn open_storage(path: &Path) -> Result<(Db, Tree)> {
        let db = sled::open(path).map_err(|e| {
            BlockchainError::StorageUnavailable(format!("Failed to open database: {e}"))
        })?;
        let blocks = db.open_tree(BLOCKS_TREE).map_err(|e| {
            BlockchainError::StorageUnavailable(format!("Failed to open blocks tree: {e}"))
        })?;
        Ok((db, blocks))
    }

    fn discard_storage(path: &Path) {
        if let Err(e) = fs::remove_dir_all(path) {
            warn!("Could not remove partially created chain at {}: {e}", path.display());
        }
    }

    fn flush_db(db: &Db) -> Result<()> {
        db.flush().map_err(|e| {
            BlockchainError::StorageUnavailable(format!("Failed to flush database: {e}"))
        })?;
        Ok(())
    }

    // The block record and the tip move together or not at all
    fn update_blocks_tree(blocks_tree: &Tree, block: &Block) -> Result<()> {
        let block_hash = block.get_hash();
        let block_data = block.serialize()?;

        blocks_tree
            .transaction(|tx_db| {
                tx_db.insert(block_hash, block_data.as_slice())?;
                tx_db.insert(TIP_BLOCK_HASH_KEY, block_hash)?;
                Ok(())
            })
            .map_err(|e: TransactionError| {
                BlockchainError::StorageUnavailable(format!("Failed to update blocks tree: {e}"))
            })?;

        Ok(())
    }

    pub fn get_config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn get_tip_hash(&self) -> &[u8] {
        self.tip_hash.as_slice()
    }

    /// Seal `transactions` into a block on top of the current tip and persist it
    pub fn mine_block(&mut self, transactions: &[Transaction]) -> Result<Block> {
        info!(
            "Mining block on {} with {} transactions (difficulty: {})",
            HEXLOWER.encode(&self.tip_hash),
            transactions.len(),
            self.config.difficulty_bits
        );

        let block = Block::new_block(
            BlockLink::Parent(self.tip_hash.clone()),
            transactions,
            &self.config,
        )?;
        Self::update_blocks_tree(&self.blocks, &block)?;
        self.tip_hash = block.get_hash().to_vec();

        info!("Successfully mined block: {}", block.get_hash_hex());
        Ok(block)
    }

    /// Reward `miner` and move `amount` from `from` to `to` in one new block.
    ///
    /// When the sender cannot cover `amount` nothing is appended and
    /// `InsufficientFunds` is returned.
    pub fn send<S: SpendAuthority + ?Sized>(
        &mut self,
        from: &S,
        to: &str,
        amount: u64,
        miner: &str,
        data: &str,
    ) -> Result<Block> {
        let coinbase = Transaction::new_coinbase_tx(miner, data, self.config.reward)?;
        let spend = Transaction::new_utxo_transaction(from, to, amount, &UTXOSet::new(self))?;
        self.mine_block(&[coinbase, spend])
    }

    pub fn get_balance(&self, owner_hash: &[u8]) -> Result<u64> {
        UTXOSet::new(self).get_balance(owner_hash)
    }

    /// Cursor walking from the current tip back to genesis
    pub fn iterator(&self) -> BlockchainIterator {
        BlockchainIterator::new(
            BlockLink::Parent(self.tip_hash.clone()),
            self.blocks.clone(),
        )
    }

    pub fn get_block(&self, block_hash: &[u8]) -> Result<Option<Block>> {
        read_block(&self.blocks, block_hash)
    }

    pub fn find_transaction(&self, txid: &[u8]) -> Result<Option<Transaction>> {
        for block in self.iterator() {
            let block = block?;
            if let Some(tx) = block.get_transactions().iter().find(|tx| tx.get_id() == txid) {
                return Ok(Some(tx.clone()));
            }
        }
        Ok(None)
    }

    /// Force everything written so far to disk
    pub fn flush(&self) -> Result<()> {
        Self::flush_db(&self.db)
    }

    /// Flush and release the database
    pub fn close(self) -> Result<()> {
        self.flush()
    }
}

fn read_block(blocks: &Tree, block_hash: &[u8]) -> Result<Option<Block>> {
    let data = blocks
        .get(block_hash)
        .map_err(|e| BlockchainError::StorageUnavailable(format!("Failed to get block: {e}")))?;
    match data {
        Some(bytes) => Ok(Some(Block::deserialize(bytes.as_ref())?)),
        None => Ok(None),
    }
}

/// Lazy newest-to-oldest walk over the chain.
///
/// Each step reads storage afresh; nothing is buffered. The walk ends after the
/// genesis block, and after the first error.
pub struct BlockchainIterator {
    blocks: Tree,
    current_hash: BlockLink,
}

impl BlockchainIterator {
    fn new(current_hash: BlockLink, blocks: Tree) -> BlockchainIterator {
        BlockchainIterator {
            blocks,
            current_hash,
        }
    }
}

impl Iterator for BlockchainIterator {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = match &self.current_hash {
            BlockLink::Genesis => return None,
            BlockLink::Parent(hash) => hash.clone(),
        };

        let result = read_block(&self.blocks, &hash).and_then(|block| {
            block.ok_or_else(|| {
                BlockchainError::StorageUnavailable(format!(
                    "Block {} is missing from storage",
                    HEXLOWER.encode(&hash)
                ))
            })
        });

        match result {
            Ok(block) => {
                self.current_hash = block.get_pre_block_hash().clone();
                Some(Ok(block))
            }
            Err(e) => {
                self.current_hash = BlockLink::Genesis;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProofOfWork;
    use crate::testing::{create_test_blockchain, create_test_config, TestParty};

    #[test]
    fn test_genesis_pays_creator() {
        let (blockchain, miner, _dir) = create_test_blockchain().unwrap();

        let blocks: Vec<Block> = blockchain.iterator().collect::<Result<_>>().unwrap();
        assert_eq!(blocks.len(), 1);
        let genesis = &blocks[0];
        assert!(genesis.get_pre_block_hash().is_genesis());
        assert_eq!(genesis.get_hash(), blockchain.get_tip_hash());

        let txs = genesis.get_transactions();
        assert_eq!(txs.len(), 1);
        assert!(txs[0].is_coinbase());
        assert_eq!(txs[0].get_vout()[0].get_value(), blockchain.get_config().reward);
        assert!(txs[0].get_vout()[0].is_locked_with_key(&miner.owner_hash));
        assert!(ProofOfWork::validate(genesis));
    }

    #[test]
    fn test_append_links_to_previous_tip() {
        let (mut blockchain, miner, _dir) = create_test_blockchain().unwrap();

        for round in 0..3 {
            let prior_tip = blockchain.get_tip_hash().to_vec();
            let coinbase =
                Transaction::new_coinbase_tx(&miner.address, &format!("round {round}"), 1)
                    .unwrap();
            let block = blockchain.mine_block(&[coinbase]).unwrap();

            assert_eq!(block.get_pre_block_hash(), &BlockLink::Parent(prior_tip));
            assert_eq!(blockchain.get_tip_hash(), block.get_hash());
            assert!(ProofOfWork::validate(&block));
        }
        assert_eq!(blockchain.iterator().count(), 4);
    }

    #[test]
    fn test_empty_append_is_rejected_and_tip_unchanged() {
        let (mut blockchain, _miner, _dir) = create_test_blockchain().unwrap();
        let tip = blockchain.get_tip_hash().to_vec();

        let result = blockchain.mine_block(&[]);
        assert!(matches!(result, Err(BlockchainError::InvalidBlock(_))));
        assert_eq!(blockchain.get_tip_hash(), tip.as_slice());
    }

    #[test]
    fn test_create_twice_fails() {
        let (config, _dir) = create_test_config().unwrap();
        let miner = TestParty::new();
        let blockchain = Blockchain::create_blockchain(config.clone(), &miner.address).unwrap();
        blockchain.close().unwrap();

        let result = Blockchain::create_blockchain(config, &miner.address);
        assert!(matches!(result, Err(BlockchainError::ChainAlreadyExists(_))));
    }

    #[test]
    fn test_open_missing_chain_fails() {
        let (config, _dir) = create_test_config().unwrap();
        let result = Blockchain::open_blockchain(config);
        assert!(matches!(result, Err(BlockchainError::ChainNotFound(_))));
    }

    #[test]
    fn test_failed_genesis_leaves_no_storage() {
        let (config, _dir) = create_test_config().unwrap();
        let result = Blockchain::create_blockchain(config.clone(), "not-an-address");
        assert!(matches!(result, Err(BlockchainError::InvalidAddress(_))));
        assert!(!config.chain_path().exists());
    }

    #[test]
    fn test_failed_append_keeps_tail_on_disk_and_in_memory() {
        let (config, _dir) = create_test_config().unwrap();
        let miner = TestParty::new();
        let tip = {
            let blockchain = Blockchain::create_blockchain(config.clone(), &miner.address).unwrap();
            let tip = blockchain.get_tip_hash().to_vec();
            blockchain.close().unwrap();
            tip
        };

        // Same chain, but no nonce in range can meet the target
        let strict = config.clone().with_difficulty_bits(256).with_max_nonce(8);
        let mut blockchain = Blockchain::open_blockchain(strict).unwrap();
        let coinbase = Transaction::new_coinbase_tx(&miner.address, "lost", 5).unwrap();
        let result = blockchain.mine_block(&[coinbase]);
        assert!(matches!(
            result,
            Err(BlockchainError::ProofOfWorkExhausted { max_nonce: 8 })
        ));
        assert_eq!(blockchain.get_tip_hash(), tip.as_slice());
        blockchain.close().unwrap();

        let blockchain = Blockchain::open_blockchain(config).unwrap();
        assert_eq!(blockchain.get_tip_hash(), tip.as_slice());
        assert_eq!(blockchain.iterator().count(), 1);
    }

    #[test]
    fn test_missing_block_is_a_storage_error() {
        let (mut blockchain, miner, _dir) = create_test_blockchain().unwrap();
        let genesis_hash = blockchain.get_tip_hash().to_vec();
        let coinbase = Transaction::new_coinbase_tx(&miner.address, "next", 5).unwrap();
        blockchain.mine_block(&[coinbase]).unwrap();

        blockchain.blocks.remove(genesis_hash.as_slice()).unwrap();

        let mut cursor = blockchain.iterator();
        assert!(matches!(cursor.next(), Some(Ok(_))));
        assert!(matches!(
            cursor.next(),
            Some(Err(BlockchainError::StorageUnavailable(_)))
        ));
        assert!(cursor.next().is_none());
        assert!(matches!(
            blockchain.get_balance(&miner.owner_hash),
            Err(BlockchainError::StorageUnavailable(_))
        ));
    }

    #[test]
    fn test_lookup_by_hash() {
        let (mut blockchain, miner, _dir) = create_test_blockchain().unwrap();
        let coinbase = Transaction::new_coinbase_tx(&miner.address, "lookup", 5).unwrap();
        let block = blockchain.mine_block(&[coinbase.clone()]).unwrap();

        assert_eq!(blockchain.get_block(block.get_hash()).unwrap(), Some(block));
        assert_eq!(blockchain.get_block(&[0; 32]).unwrap(), None);
        assert_eq!(
            blockchain.find_transaction(coinbase.get_id()).unwrap(),
            Some(coinbase)
        );
        assert_eq!(blockchain.find_transaction(&[0; 32]).unwrap(), None);
    }

    #[test]
    fn test_cursor_starts_at_tail_when_created() {
        let (mut blockchain, miner, _dir) = create_test_blockchain().unwrap();
        let old_cursor = blockchain.iterator();

        let coinbase = Transaction::new_coinbase_tx(&miner.address, "later", 5).unwrap();
        blockchain.mine_block(&[coinbase]).unwrap();

        assert_eq!(old_cursor.count(), 1);
        assert_eq!(blockchain.iterator().count(), 2);
    }
}
