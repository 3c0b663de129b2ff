use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use num_traits::Zero;
use serde::Serialize;

use crate::{
    db::{
        models::TransferType,
        store::{Entity, EntityKind},
    },
    utils::{ids, Period},
};

/// Chain-wide daily totals summed across every token.
///
/// Primary Key: (chain_id, day)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTokenDailySnapshot {
    pub id: String,
    pub chain_id: u64,
    pub day: u64,
    pub period_start: DateTime<Utc>,

    pub total_volume: BigInt,
    pub total_transfer_count: u64,
    pub total_mint_volume: BigInt,
    pub total_burn_volume: BigInt,
    pub total_mint_count: u64,
    pub total_burn_count: u64,
    pub net_mint_burn_flow: BigInt,

    pub first_block_of_day: u64,
    pub last_block_of_day: u64,
}

impl CrossTokenDailySnapshot {
    pub fn new(chain_id: u64, day: u64, first_block: u64) -> Self {
        Self {
            id: ids::cross_token_id(chain_id, day),
            chain_id,
            day,
            period_start: Period::Day.start(day),
            total_volume: BigInt::zero(),
            total_transfer_count: 0,
            total_mint_volume: BigInt::zero(),
            total_burn_volume: BigInt::zero(),
            total_mint_count: 0,
            total_burn_count: 0,
            net_mint_burn_flow: BigInt::zero(),
            first_block_of_day: first_block,
            last_block_of_day: first_block,
        }
    }

    pub fn accumulate(&mut self, transfer_type: TransferType, value: &BigInt, block_number: u64) {
        self.total_volume += value;
        self.total_transfer_count += 1;
        match transfer_type {
            TransferType::Mint => {
                self.total_mint_volume += value;
                self.total_mint_count += 1;
                self.net_mint_burn_flow += value;
            },
            TransferType::Burn => {
                self.total_burn_volume += value;
                self.total_burn_count += 1;
                self.net_mint_burn_flow -= value;
            },
            TransferType::Transfer => {},
        }
        self.last_block_of_day = block_number;
    }
}

impl Entity for CrossTokenDailySnapshot {
    const KIND: EntityKind = EntityKind::CrossTokenDailySnapshot;

    fn id(&self) -> &str {
        &self.id
    }
}
