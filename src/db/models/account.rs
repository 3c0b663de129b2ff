use num_bigint::BigInt;
use serde::Serialize;

use crate::{
    db::store::{Entity, EntityKind},
    utils::ids,
};

/// Per-token account state.
///
/// Primary Key: (chain_id, token, address)
/// The only record whose balance the aggregator mutates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: String,
    pub chain_id: u64,
    pub token: String,
    pub address: String,

    // May go negative; see the account ledger.
    pub balance: BigInt,

    // Lifetime activity
    pub total_volume_in: BigInt,
    pub total_volume_out: BigInt,
    pub transfers_in: u64,
    pub transfers_out: u64,

    pub first_seen_block: u64,
    pub first_seen_timestamp: u64,
    pub last_active_block: u64,
    pub last_active_timestamp: u64,
}

impl Account {
    /// Zero-balance account first observed at `block_number`.
    pub fn new(
        chain_id: u64,
        token: &str,
        address: &str,
        block_number: u64,
        timestamp: u64,
    ) -> Self {
        Self {
            id: ids::account_id(chain_id, token, address),
            chain_id,
            token: token.to_string(),
            address: address.to_string(),
            balance: BigInt::default(),
            total_volume_in: BigInt::default(),
            total_volume_out: BigInt::default(),
            transfers_in: 0,
            transfers_out: 0,
            first_seen_block: block_number,
            first_seen_timestamp: timestamp,
            last_active_block: block_number,
            last_active_timestamp: timestamp,
        }
    }
}

impl Entity for Account {
    const KIND: EntityKind = EntityKind::Account;

    fn id(&self) -> &str {
        &self.id
    }
}
