use num_bigint::BigInt;
use serde::Serialize;

use crate::{
    db::store::{Entity, EntityKind},
    utils::ids,
};

/// Latest ERC20 allowance granted by `owner` to `spender`.
///
/// Primary Key: (chain_id, token, owner, spender)
/// Fully overwritten by every Approval event; no history is kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Approval {
    pub id: String,
    pub chain_id: u64,
    pub token: String,
    pub owner: String,
    pub spender: String,
    pub amount: BigInt,
    pub last_updated_block: u64,
    pub last_updated_timestamp: u64,
}

impl Approval {
    pub fn new(
        chain_id: u64,
        token: &str,
        owner: &str,
        spender: &str,
        amount: BigInt,
        block_number: u64,
        timestamp: u64,
    ) -> Self {
        Self {
            id: ids::approval_id(chain_id, token, owner, spender),
            chain_id,
            token: token.to_string(),
            owner: owner.to_string(),
            spender: spender.to_string(),
            amount,
            last_updated_block: block_number,
            last_updated_timestamp: timestamp,
        }
    }
}

impl Entity for Approval {
    const KIND: EntityKind = EntityKind::Approval;

    fn id(&self) -> &str {
        &self.id
    }
}
