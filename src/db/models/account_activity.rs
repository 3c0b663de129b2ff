use num_bigint::BigInt;
use serde::Serialize;

use crate::{
    db::store::{Entity, EntityKind},
    utils::ids,
};

/// Per-account daily flow for one token.
///
/// Primary Key: (chain_id, token, account, day)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountDailyActivity {
    pub id: String,
    pub chain_id: u64,
    pub token: String,
    pub account: String,
    pub day: u64,
    pub transfer_count: u64,
    pub volume_in: BigInt,
    pub volume_out: BigInt,
}

impl AccountDailyActivity {
    pub fn new(chain_id: u64, token: &str, account: &str, day: u64) -> Self {
        Self {
            id: ids::account_activity_id(chain_id, token, account, day),
            chain_id,
            token: token.to_string(),
            account: account.to_string(),
            day,
            transfer_count: 0,
            volume_in: BigInt::default(),
            volume_out: BigInt::default(),
        }
    }
}

impl Entity for AccountDailyActivity {
    const KIND: EntityKind = EntityKind::AccountDailyActivity;

    fn id(&self) -> &str {
        &self.id
    }
}
