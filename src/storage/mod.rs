//! Derived views over stored data
//!
//! Nothing here is persisted: the unspent-output view is recomputed from the
//! chain store on every query.

pub mod utxo_set;

pub use utxo_set::{Selection, SpendableOutput, UTXOSet};
