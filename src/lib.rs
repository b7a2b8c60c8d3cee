//! # Ledgerchain - My Single-Node Append-Only Ledger
//!
//! This is a small proof-of-work ledger that lives entirely on one machine.
//! When I come back to this code, here's what I need to remember:
//!
//! ## What I Built
//! - **Proof-of-Work Sealing**: Every block is sealed by searching for a nonce whose hash beats a target
//! - **Durable Chain Store**: Blocks live in Sled, keyed by hash, with one key pointing at the tail
//! - **Backward Cursor**: The chain is walked newest to oldest by following parent hashes
//! - **UTXO Resolution**: Balances and spendable outputs come from replaying the whole chain
//! - **Transaction Assembly**: Spends pick outputs in order and send change back to the sender
//! - **Wallets**: ECDSA P-256 key pairs with Bitcoin-style base58check addresses
//!
//! ## How I Organized My Code
//! - `core/`: Blocks, transactions, proof-of-work and the chain store
//! - `storage/`: The scan-based unspent output resolver
//! - `wallet/`: Key management and address encoding
//! - `config/`: Layered configuration (defaults, TOML file, environment)
//! - `utils/`: Hashing, encoding and serialization helpers
//! - `cli/`: Command-line argument parsing
//!
//! ## Key Design Decisions I Made
//! - Amounts are whole base units (1 coin = 100,000,000) so nothing rounds inside the ledger
//! - Appending a block and moving the tail happen in one Sled transaction
//! - There is no UTXO index; every query scans the chain from the tail
//! - Authorization is an opaque public key compared by hash, nothing is signed
//!
//! ## When I Need to Understand Something
//! 1. Start with `main.rs` to see the CLI commands
//! 2. Look at `core/blockchain.rs` for how blocks are stored and walked
//! 3. Check `core/transaction.rs` for how value moves
//! 4. Review `storage/utxo_set.rs` for how balances are worked out

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod utils;
pub mod wallet;

#[cfg(test)]
pub mod testing;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::ChainConfig;
pub use core::monetary::conversions::{coins_to_satoshis, format_satoshis, satoshis_to_coins};
pub use core::{
    Block, BlockLink, Blockchain, BlockchainIterator, ProofOfWork, SpendAuthority, TXInput,
    TXOutput, Transaction, INITIAL_BLOCK_REWARD, SATOSHIS_PER_COIN,
};
pub use error::{BlockchainError, Result};
pub use storage::{Selection, SpendableOutput, UTXOSet};
pub use wallet::{
    convert_address, hash_pub_key, owner_hash_of, validate_address, Wallet, Wallets,
    ADDRESS_CHECK_SUM_LEN,
};
