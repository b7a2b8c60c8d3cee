//! Wallet management and address encoding
//!
//! The ledger core only ever sees owner hashes and opaque authorization blobs.
//! This module is where those come from: key pairs, base58check addresses and
//! the on-disk wallet file.

#[allow(clippy::module_inception)]
pub mod wallet;
pub mod wallets;

pub use wallet::{
    convert_address, hash_pub_key, owner_hash_of, validate_address, Wallet, ADDRESS_CHECK_SUM_LEN,
};
pub use wallets::{Wallets, WALLET_FILE};
