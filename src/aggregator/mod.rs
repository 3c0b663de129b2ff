//! Event-to-state reduction.
//!
//! - [`accounts`] - Account ledger (the only writer of balances)
//! - [`supply`] - Per-token supply ledger
//! - [`rollups`] - Hourly/daily/weekly and cross-token daily rollups
//! - [`activity`] - Unique active addresses and per-account daily activity
//! - [`allowances`] - Approval records
//! - [`snapshots`] - Balance snapshot trigger policy and emission
//! - [`reducer`] - Transfer and Approval reducers driving all of the above

pub mod accounts;
pub mod activity;
pub mod allowances;
pub mod rollups;
pub mod snapshots;
pub mod supply;

mod reducer;

use num_bigint::BigInt;
use num_traits::Zero;

use crate::db::models::TransferType;

pub use reducer::{Aggregator, EventOutcome};
pub use snapshots::SnapshotPolicy;

/// Values derived once from a transfer and shared by every ledger update.
#[derive(Debug, Clone, PartialEq)]
pub struct EventFlow {
    pub transfer_type: TransferType,
    pub value: BigInt,
    /// `value` for mints, zero otherwise.
    pub mint_value: BigInt,
    /// `value` for burns, zero otherwise.
    pub burn_value: BigInt,
}

impl EventFlow {
    pub fn new(transfer_type: TransferType, value: BigInt) -> Self {
        let (mint_value, burn_value) = match transfer_type {
            TransferType::Mint => (value.clone(), BigInt::zero()),
            TransferType::Burn => (BigInt::zero(), value.clone()),
            TransferType::Transfer => (BigInt::zero(), BigInt::zero()),
        };
        Self {
            transfer_type,
            value,
            mint_value,
            burn_value,
        }
    }

    pub fn is_mint(&self) -> bool {
        self.transfer_type == TransferType::Mint
    }

    pub fn is_burn(&self) -> bool {
        self.transfer_type == TransferType::Burn
    }
}
