//! Command-line interface
//!
//! Argument parsing for the `ledgerchain` binary. Each subcommand maps onto one
//! chain or wallet operation in `main.rs`.

pub mod commands;

pub use commands::{Command, Opt};
