//! Ledger monetary units
//!
//! Every amount the ledger stores is a whole number of base units ("satoshis").
//! Coins only exist at the edges: the CLI parses and prints them.

/// Number of base units in one coin
pub const SATOSHIS_PER_COIN: u64 = 100_000_000;

/// Coinbase reward in base units (12.5 coins)
pub const INITIAL_BLOCK_REWARD: u64 = 12 * SATOSHIS_PER_COIN + SATOSHIS_PER_COIN / 2;

/// Utility functions for monetary conversions
pub mod conversions {
    use super::*;
    use crate::error::{BlockchainError, Result};

    /// Convert coins to base units, rounding to the nearest unit
    ///
    /// # Examples
    /// ```
    /// use ledgerchain::core::monetary::conversions::coins_to_satoshis;
    /// assert_eq!(coins_to_satoshis(12.5).unwrap(), 1_250_000_000);
    /// ```
    pub fn coins_to_satoshis(coins: f64) -> Result<u64> {
        if !coins.is_finite() || coins < 0.0 {
            return Err(BlockchainError::Transaction(format!(
                "Amount must be a non-negative number, got {coins}"
            )));
        }
        let units = (coins * SATOSHIS_PER_COIN as f64).round();
        if units > u64::MAX as f64 {
            return Err(BlockchainError::Transaction(format!(
                "Amount {coins} is too large"
            )));
        }
        Ok(units as u64)
    }

    /// Convert base units to coins
    pub fn satoshis_to_coins(satoshis: u64) -> f64 {
        satoshis as f64 / SATOSHIS_PER_COIN as f64
    }

    /// Format base units as a human-readable string
    ///
    /// # Examples
    /// ```
    /// use ledgerchain::core::monetary::conversions::format_satoshis;
    /// assert_eq!(format_satoshis(750_000_000), "7.50000000 coins");
    /// ```
    pub fn format_satoshis(satoshis: u64) -> String {
        format!("{:.8} coins", satoshis_to_coins(satoshis))
    }
}
