//! Configuration management
//!
//! The chain never reads process-wide constants: genesis message, difficulty
//! and reward all travel in a [`ChainConfig`] handed to the chain store.

pub mod settings;

pub use settings::{ChainConfig, DEFAULT_DIFFICULTY_BITS, DEFAULT_GENESIS_MESSAGE};
