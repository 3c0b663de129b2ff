use num_bigint::BigInt;
use serde::Serialize;

use crate::{
    db::store::{Entity, EntityKind},
    utils::ids,
};

/// Point-in-time account balance, written when the snapshot policy fires.
///
/// Primary Key: (chain_id, token, address, block_number, log_index)
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountBalanceSnapshot {
    pub id: String,
    pub chain_id: u64,
    pub token: String,
    pub address: String,
    pub block_number: u64,
    pub log_index: u32,
    pub timestamp: u64,
    pub tx_hash: String,

    /// Balance after the transfer.
    pub balance: BigInt,
    /// Negative for the sending side, positive for the receiving side.
    pub balance_change: BigInt,
}

impl AccountBalanceSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chain_id: u64,
        token: &str,
        address: &str,
        block_number: u64,
        log_index: u32,
        timestamp: u64,
        tx_hash: &str,
        balance: BigInt,
        balance_change: BigInt,
    ) -> Self {
        Self {
            id: ids::balance_snapshot_id(chain_id, token, address, block_number, log_index),
            chain_id,
            token: token.to_string(),
            address: address.to_string(),
            block_number,
            log_index,
            timestamp,
            tx_hash: tx_hash.to_string(),
            balance,
            balance_change,
        }
    }
}

impl Entity for AccountBalanceSnapshot {
    const KIND: EntityKind = EntityKind::AccountBalanceSnapshot;

    fn id(&self) -> &str {
        &self.id
    }
}
