//! Shared utilities.
//!
//! Test helpers used across the crate.

#[cfg(test)]
pub mod testutil;
