//! Core ledger functionality
//!
//! Blocks, transactions, proof-of-work sealing and the persistent chain store.

pub mod block;
pub mod blockchain;
pub mod monetary;
pub mod proof_of_work;
pub mod transaction;

pub use block::{Block, BlockLink, BLOCK_VERSION};
pub use blockchain::{Blockchain, BlockchainIterator};
pub use monetary::{INITIAL_BLOCK_REWARD, SATOSHIS_PER_COIN};
pub use proof_of_work::ProofOfWork;
pub use transaction::{SpendAuthority, TXInput, TXOutput, Transaction};
