//! Test utilities
//!
//! Isolated, low-difficulty chains in temporary directories for unit tests.

pub mod test_utils;

pub use test_utils::*;
