//! Utility functions and helpers
//!
//! Hashing, base58 encoding, key generation and the bincode wrappers used
//! for everything that goes to disk.

pub mod crypto;
pub mod serialization;

pub use crypto::{
    base58_decode, base58_encode, current_timestamp, new_key_pair, ripemd160_digest,
    sha256_digest,
};

pub use serialization::{deserialize, serialize};
