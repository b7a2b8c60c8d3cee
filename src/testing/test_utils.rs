//! Helpers shared by the unit tests

use crate::config::ChainConfig;
use crate::core::{Blockchain, SpendAuthority};
use crate::error::Result;
use crate::wallet::Wallet;
use tempfile::TempDir;

/// Difficulty low enough that sealing is effectively instant
pub const TEST_DIFFICULTY_BITS: u32 = 4;

/// A wallet together with the address and owner hash derived from it
pub struct TestParty {
    pub wallet: Wallet,
    pub address: String,
    pub owner_hash: Vec<u8>,
}

impl TestParty {
    pub fn new() -> TestParty {
        let wallet = Wallet::new().expect("key generation should work in tests");
        let address = wallet.get_address();
        let owner_hash = wallet.owner_hash();
        TestParty {
            wallet,
            address,
            owner_hash,
        }
    }
}

/// Configuration rooted in a fresh temporary directory
pub fn create_test_config() -> Result<(ChainConfig, TempDir)> {
    let temp_dir = tempfile::tempdir()?;
    let config =
        ChainConfig::with_data_dir(temp_dir.path()).with_difficulty_bits(TEST_DIFFICULTY_BITS);
    Ok((config, temp_dir))
}

/// A fresh chain whose genesis reward belongs to the returned party
pub fn create_test_blockchain() -> Result<(Blockchain, TestParty, TempDir)> {
    let (config, temp_dir) = create_test_config()?;
    let miner = TestParty::new();
    let blockchain = Blockchain::create_blockchain(config, &miner.address)?;
    Ok((blockchain, miner, temp_dir))
}
