use bigdecimal::BigDecimal;
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

/// Counters shared by the hourly, daily and weekly rollups of one token.
///
/// Each period starts from zero; nothing carries over between periods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub volume: BigInt,
    pub transfer_count: u64,
    pub mint_volume: BigInt,
    pub burn_volume: BigInt,
    pub mint_count: u64,
    pub burn_count: u64,
    /// mint_volume - burn_volume
    pub net_mint_burn_flow: BigInt,
    /// Token supply after the latest event of the period.
    pub end_of_period_supply: BigInt,
    pub first_block_of_period: u64,
    pub last_block_of_period: u64,
}

impl PeriodTotals {
    pub fn new(first_block: u64) -> Self {
        Self {
            volume: BigInt::zero(),
            transfer_count: 0,
            mint_volume: BigInt::zero(),
            burn_volume: BigInt::zero(),
            mint_count: 0,
            burn_count: 0,
            net_mint_burn_flow: BigInt::zero(),
            end_of_period_supply: BigInt::zero(),
            first_block_of_period: first_block,
            last_block_of_period: first_block,
        }
    }

    /// Fold one transfer into the period.
    pub fn accumulate(
        &mut self,
        transfer_type: TransferType,
        value: &BigInt,
        supply_after: &BigInt,
        block_number: u64,
    ) {
        self.volume += value;
        self.transfer_count += 1;
        match transfer_type {
            TransferType::Mint => {
                self.mint_volume += value;
                self.mint_count += 1;
                self.net_mint_burn_flow += value;
            },
            TransferType::Burn => {
                self.burn_volume += value;
                self.burn_count += 1;
                self.net_mint_burn_flow -= value;
            },
            TransferType::Transfer => {},
        }
        self.end_of_period_supply = supply_after.clone();
        self.last_block_of_period = block_number;
    }
}

/// Common access to the three per-token period rollups.
pub trait PeriodSnapshot: Entity {
    const PERIOD: Period;

    fn new(chain_id: u64, token: &str, period_index: u64, first_block: u64) -> Self;
    fn totals(&self) -> &PeriodTotals;
    fn totals_mut(&mut self) -> &mut PeriodTotals;

    /// Hook run after the totals were updated. Rollups carrying a velocity
    /// recompute it here.
    fn refresh_derived(&mut self) {}
}

/// Hourly rollup.
///
/// Primary Key: (chain_id, token, hour)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySnapshot {
    pub id: String,
    pub chain_id: u64,
    pub token: String,
    pub hour: u64,
    pub period_start: DateTime<Utc>,
    #[serde(flatten)]
    pub totals: PeriodTotals,
}

/// Daily rollup.
///
/// Primary Key: (chain_id, token, day)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySnapshot {
    pub id: String,
    pub chain_id: u64,
    pub token: String,
    pub day: u64,
    pub period_start: DateTime<Utc>,
    #[serde(flatten)]
    pub totals: PeriodTotals,
    pub unique_active_addresses: u64,
    /// Accounts first seen during this day.
    pub new_address_count: u64,
    pub velocity: BigDecimal,
}

/// Weekly rollup.
///
/// Primary Key: (chain_id, token, week)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySnapshot {
    pub id: String,
    pub chain_id: u64,
    pub token: String,
    pub week: u64,
    pub period_start: DateTime<Utc>,
    #[serde(flatten)]
    pub totals: PeriodTotals,
    pub unique_active_addresses: u64,
    pub velocity: BigDecimal,
}

impl PeriodSnapshot for HourlySnapshot {
    const PERIOD: Period = Period::Hour;

    fn new(chain_id: u64, token: &str, period_index: u64, first_block: u64) -> Self {
        Self {
            id: ids::period_id(chain_id, token, period_index),
            chain_id,
            token: token.to_string(),
            hour: period_index,
            period_start: Self::PERIOD.start(period_index),
            totals: PeriodTotals::new(first_block),
        }
    }

    fn totals(&self) -> &PeriodTotals {
        &self.totals
    }

    fn totals_mut(&mut self) -> &mut PeriodTotals {
        &mut self.totals
    }
}

impl PeriodSnapshot for DailySnapshot {
    const PERIOD: Period = Period::Day;

    fn new(chain_id: u64, token: &str, period_index: u64, first_block: u64) -> Self {
        Self {
            id: ids::period_id(chain_id, token, period_index),
            chain_id,
            token: token.to_string(),
            day: period_index,
            period_start: Self::PERIOD.start(period_index),
            totals: PeriodTotals::new(first_block),
            unique_active_addresses: 0,
            new_address_count: 0,
            velocity: BigDecimal::zero(),
        }
    }

    fn totals(&self) -> &PeriodTotals {
        &self.totals
    }

    fn totals_mut(&mut self) -> &mut PeriodTotals {
        &mut self.totals
    }

    fn refresh_derived(&mut self) {
        self.velocity =
            crate::utils::velocity(&self.totals.volume, &self.totals.end_of_period_supply);
    }
}

impl PeriodSnapshot for WeeklySnapshot {
    const PERIOD: Period = Period::Week;

    fn new(chain_id: u64, token: &str, period_index: u64, first_block: u64) -> Self {
        Self {
            id: ids::period_id(chain_id, token, period_index),
            chain_id,
            token: token.to_string(),
            week: period_index,
            period_start: Self::PERIOD.start(period_index),
            totals: PeriodTotals::new(first_block),
            unique_active_addresses: 0,
            velocity: BigDecimal::zero(),
        }
    }

    fn totals(&self) -> &PeriodTotals {
        &self.totals
    }

    fn totals_mut(&mut self) -> &mut PeriodTotals {
        &mut self.totals
    }

    fn refresh_derived(&mut self) {
        self.velocity =
            crate::utils::velocity(&self.totals.volume, &self.totals.end_of_period_supply);
    }
}

impl Entity for HourlySnapshot {
    const KIND: EntityKind = EntityKind::HourlySnapshot;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for DailySnapshot {
    const KIND: EntityKind = EntityKind::DailySnapshot;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for WeeklySnapshot {
    const KIND: EntityKind = EntityKind::WeeklySnapshot;

    fn id(&self) -> &str {
        &self.id
    }
}
