use crate::core::monetary::INITIAL_BLOCK_REWARD;
use crate::error::{BlockchainError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_GENESIS_MESSAGE: &str =
    "The Times 03/Jan/2009 Chancellor on brink of second bailout for banks";
pub const DEFAULT_DIFFICULTY_BITS: u32 = 20;

const DEFAULT_DATA_DIR: &str = "data";
const CHAIN_DIR: &str = "blockchain";

const DATA_DIR_KEY: &str = "LEDGER_DATA_DIR";
const DIFFICULTY_BITS_KEY: &str = "LEDGER_DIFFICULTY_BITS";
const REWARD_KEY: &str = "LEDGER_REWARD";

/// Settings the chain store is constructed with.
///
/// Values are layered: built-in defaults, then an optional TOML file, then
/// `LEDGER_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Directory holding the sled database and the wallet file
    pub data_dir: PathBuf,
    /// Payload of the genesis coinbase input
    pub genesis_message: String,
    /// Leading zero bits required of every block hash
    pub difficulty_bits: u32,
    /// Coinbase reward in base units
    pub reward: u64,
    /// Upper bound of the nonce search
    pub max_nonce: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            genesis_message: DEFAULT_GENESIS_MESSAGE.to_string(),
            difficulty_bits: DEFAULT_DIFFICULTY_BITS,
            reward: INITIAL_BLOCK_REWARD,
            max_nonce: u64::MAX,
        }
    }
}

impl ChainConfig {
    /// Load configuration from an optional TOML file and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<ChainConfig> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => ChainConfig::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<ChainConfig> {
        let raw = fs::read_to_string(path).map_err(|e| {
            BlockchainError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<ChainConfig> {
        let config: ChainConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration rooted at `data_dir` with every other value defaulted
    pub fn with_data_dir<P: Into<PathBuf>>(data_dir: P) -> ChainConfig {
        ChainConfig {
            data_dir: data_dir.into(),
            ..ChainConfig::default()
        }
    }

    pub fn with_difficulty_bits(mut self, difficulty_bits: u32) -> ChainConfig {
        self.difficulty_bits = difficulty_bits;
        self
    }

    pub fn with_max_nonce(mut self, max_nonce: u64) -> ChainConfig {
        self.max_nonce = max_nonce;
        self
    }

    /// Location of the sled database
    pub fn chain_path(&self) -> PathBuf {
        self.data_dir.join(CHAIN_DIR)
    }

    pub fn validate(&self) -> Result<()> {
        if self.difficulty_bits > 256 {
            return Err(BlockchainError::Config(format!(
                "difficulty_bits must be at most 256, got {}",
                self.difficulty_bits
            )));
        }
        if self.reward == 0 {
            return Err(BlockchainError::Config(
                "reward must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(dir) = env::var(DATA_DIR_KEY) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(bits) = env::var(DIFFICULTY_BITS_KEY) {
            self.difficulty_bits = bits.parse().map_err(|e| {
                BlockchainError::Config(format!("Invalid {DIFFICULTY_BITS_KEY} '{bits}': {e}"))
            })?;
        }
        if let Ok(reward) = env::var(REWARD_KEY) {
            self.reward = reward.parse().map_err(|e| {
                BlockchainError::Config(format!("Invalid {REWARD_KEY} '{reward}': {e}"))
            })?;
        }
        Ok(())
    }
}
