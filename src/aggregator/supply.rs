//! Supply ledger: the per-token singleton issuance record.

use anyhow::Context;
use num_bigint::BigInt;

use crate::{
    aggregator::EventFlow,
    db::{models::TokenSupply, Store},
    utils::ids,
};

/// Fold one transfer into the token's supply record and return the new
/// `total_supply`, so the rollups never need a second read.
///
/// `holder_delta` is the sum of the holder deltas the account ledger reported
/// for both sides of the transfer.
pub fn apply_event<S: Store>(
    store: &mut S,
    chain_id: u64,
    token: &str,
    flow: &EventFlow,
    holder_delta: i64,
    block_number: u64,
    timestamp: u64,
) -> anyhow::Result<BigInt> {
    let id = ids::token_id(chain_id, token);
    let mut supply: TokenSupply = store
        .get(&id)
        .with_context(|| format!("Failed to load token supply {id}"))?
        .unwrap_or_else(|| TokenSupply::new(chain_id, token));

    supply.total_supply += &flow.mint_value;
    supply.total_supply -= &flow.burn_value;
    supply.total_minted += &flow.mint_value;
    supply.total_burned += &flow.burn_value;
    supply.all_time_volume += &flow.value;
    supply.holder_count += holder_delta;
    if flow.is_mint() {
        supply.mint_count += 1;
    }
    if flow.is_burn() {
        supply.burn_count += 1;
    }
    supply.transfer_count += 1;
    supply.last_updated_block = block_number;
    supply.last_updated_timestamp = timestamp;

    let total_supply = supply.total_supply.clone();
    store
        .set(supply)
        .with_context(|| format!("Failed to write token supply {id}"))?;

    Ok(total_supply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::models::TransferType, db::MemoryStore};

    #[test]
    fn test_mint_then_burn() {
        let mut store = MemoryStore::new();
        let mint = EventFlow::new(TransferType::Mint, BigInt::from(1_000));
        let burn = EventFlow::new(TransferType::Burn, BigInt::from(300));

        assert_eq!(apply_event(&mut store, 1, "0xt", &mint, 1, 1, 10).unwrap(), BigInt::from(1_000));
        assert_eq!(apply_event(&mut store, 1, "0xt", &burn, 0, 2, 20).unwrap(), BigInt::from(700));

        let supply: TokenSupply = store.get(&ids::token_id(1, "0xt")).unwrap().unwrap();
        assert_eq!(supply.total_minted, BigInt::from(1_000));
        assert_eq!(supply.total_burned, BigInt::from(300));
        assert_eq!(supply.all_time_volume, BigInt::from(1_300));
        assert_eq!(supply.holder_count, 1);
        assert_eq!(supply.mint_count, 1);
        assert_eq!(supply.burn_count, 1);
        assert_eq!(supply.transfer_count, 2);
        assert_eq!(supply.last_updated_block, 2);
        assert_eq!(
            supply.total_supply,
            &supply.total_minted - &supply.total_burned
        );
    }

    #[test]
    fn test_plain_transfer_leaves_supply() {
        let mut store = MemoryStore::new();
        let flow = EventFlow::new(TransferType::Transfer, BigInt::from(55));
        assert_eq!(apply_event(&mut store, 1, "0xt", &flow, 2, 1, 1).unwrap(), BigInt::from(0));

        let supply: TokenSupply = store.get(&ids::token_id(1, "0xt")).unwrap().unwrap();
        assert_eq!(supply.holder_count, 2);
        assert_eq!(supply.mint_count, 0);
        assert_eq!(supply.all_time_volume, BigInt::from(55));
    }
}
