//! Error handling for the ledger
//!
//! Every fallible operation in the crate returns [`Result`], and every failure is
//! surfaced to the caller. Nothing here is retried automatically.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, BlockchainError>;

/// Error types for ledger operations
#[derive(Debug, Clone)]
pub enum BlockchainError {
    /// The embedded store could not be opened, read or written
    StorageUnavailable(String),
    /// `create` was called on a path that already holds a chain
    ChainAlreadyExists(String),
    /// `open` was called on a path with no chain in it
    ChainNotFound(String),
    /// A spend could not be covered by the sender's unspent outputs
    InsufficientFunds { required: u64, available: u64 },
    /// A stored or supplied record failed to encode or decode
    Serialization(String),
    /// The nonce search ran past its configured bound
    ProofOfWorkExhausted { max_nonce: u64 },
    /// Cryptographic operation errors
    Crypto(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
    /// Invalid address format
    InvalidAddress(String),
    /// Block construction errors
    InvalidBlock(String),
    /// Transaction construction errors
    Transaction(String),
}

impl fmt::Display for BlockchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockchainError::StorageUnavailable(msg) => write!(f, "Storage unavailable: {msg}"),
            BlockchainError::ChainAlreadyExists(path) => {
                write!(f, "Blockchain already exists at {path}")
            }
            BlockchainError::ChainNotFound(path) => {
                write!(f, "No existing blockchain found at {path}. Create one first.")
            }
            BlockchainError::InsufficientFunds {
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient funds: required {required}, available {available}"
                )
            }
            BlockchainError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            BlockchainError::ProofOfWorkExhausted { max_nonce } => {
                write!(f, "Proof-of-work exhausted the nonce space up to {max_nonce}")
            }
            BlockchainError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            BlockchainError::Config(msg) => write!(f, "Configuration error: {msg}"),
            BlockchainError::Io(msg) => write!(f, "I/O error: {msg}"),
            BlockchainError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            BlockchainError::InvalidBlock(msg) => write!(f, "Invalid block: {msg}"),
            BlockchainError::Transaction(msg) => write!(f, "Transaction error: {msg}"),
        }
    }
}

impl std::error::Error for BlockchainError {}

impl From<std::io::Error> for BlockchainError {
    fn from(err: std::io::Error) -> Self {
        BlockchainError::Io(err.to_string())
    }
}

impl From<sled::Error> for BlockchainError {
    fn from(err: sled::Error) -> Self {
        BlockchainError::StorageUnavailable(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for BlockchainError {
    fn from(err: bincode::error::EncodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for BlockchainError {
    fn from(err: bincode::error::DecodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for BlockchainError {
    fn from(err: toml::de::Error) -> Self {
        BlockchainError::Config(err.to_string())
    }
}
