use num_bigint::BigInt;
use serde::Serialize;

use crate::{
    db::store::{Entity, EntityKind},
    utils::ids,
};

/// Aggregate issuance and holder statistics of one token.
///
/// Primary Key: (chain_id, token)
/// Singleton per token, created by the first transfer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenSupply {
    pub id: String,
    pub chain_id: u64,
    pub token: String,

    // total_supply == total_minted - total_burned
    pub total_supply: BigInt,
    pub total_minted: BigInt,
    pub total_burned: BigInt,
    pub all_time_volume: BigInt,

    /// Addresses with a non-zero balance.
    pub holder_count: i64,

    pub mint_count: u64,
    pub burn_count: u64,
    /// Every transfer event, mints and burns included.
    pub transfer_count: u64,

    pub last_updated_block: u64,
    pub last_updated_timestamp: u64,
}

impl TokenSupply {
    pub fn new(chain_id: u64, token: &str) -> Self {
        Self {
            id: ids::token_id(chain_id, token),
            chain_id,
            token: token.to_string(),
            total_supply: BigInt::default(),
            total_minted: BigInt::default(),
            total_burned: BigInt::default(),
            all_time_volume: BigInt::default(),
            holder_count: 0,
            mint_count: 0,
            burn_count: 0,
            transfer_count: 0,
            last_updated_block: 0,
            last_updated_timestamp: 0,
        }
    }
}

impl Entity for TokenSupply {
    const KIND: EntityKind = EntityKind::TokenSupply;

    fn id(&self) -> &str {
        &self.id
    }
}
