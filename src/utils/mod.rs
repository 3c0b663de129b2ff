//! Utility functions for the Tally aggregator.
//!
//! This module is organized into focused submodules:
//!
//! - [`ids`] - Composite store keys for every entity
//! - [`period`] - Hourly/daily/weekly bucketing
//! - [`ratio`] - Decimal velocity computation
//! - [`conversion`] - Type conversions (U256, BigInt, hex encoding)

mod conversion;
pub mod ids;
mod period;
mod ratio;

// ============================================
// Common Constants
// ============================================

/// The Ethereum zero address (0x0000000000000000000000000000000000000000)
/// Used as the sender of mints and the receiver of burns.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

// ============================================
// Re-exports
// ============================================

pub use conversion::{bigint_string, hex_encode, pow10, u256_to_bigint};
pub use period::Period;
pub use ratio::velocity;
