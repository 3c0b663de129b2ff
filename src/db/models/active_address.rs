use serde::Serialize;

use crate::{
    db::store::{Entity, EntityKind},
    utils::{ids, Period},
};

/// Presence marker: `address` was active for `token` during one period.
///
/// Write-once. Existence of the record is the uniqueness test.
pub trait ActiveAddressMarker: Entity {
    const PERIOD: Period;

    fn new(chain_id: u64, token: &str, period_index: u64, address: &str) -> Self;
}

/// Primary Key: (chain_id, token, day, address)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyActiveAddress {
    pub id: String,
    pub chain_id: u64,
    pub token: String,
    pub day: u64,
    pub address: String,
}

/// Primary Key: (chain_id, token, week, address)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyActiveAddress {
    pub id: String,
    pub chain_id: u64,
    pub token: String,
    pub week: u64,
    pub address: String,
}

impl ActiveAddressMarker for DailyActiveAddress {
    const PERIOD: Period = Period::Day;

    fn new(chain_id: u64, token: &str, period_index: u64, address: &str) -> Self {
        Self {
            id: ids::active_address_id(chain_id, token, period_index, address),
            chain_id,
            token: token.to_string(),
            day: period_index,
            address: address.to_string(),
        }
    }
}

impl ActiveAddressMarker for WeeklyActiveAddress {
    const PERIOD: Period = Period::Week;

    fn new(chain_id: u64, token: &str, period_index: u64, address: &str) -> Self {
        Self {
            id: ids::active_address_id(chain_id, token, period_index, address),
            chain_id,
            token: token.to_string(),
            week: period_index,
            address: address.to_string(),
        }
    }
}

impl Entity for DailyActiveAddress {
    const KIND: EntityKind = EntityKind::DailyActiveAddress;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for WeeklyActiveAddress {
    const KIND: EntityKind = EntityKind::WeeklyActiveAddress;

    fn id(&self) -> &str {
        &self.id
    }
}
