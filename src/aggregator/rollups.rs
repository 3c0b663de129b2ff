//! Time-bucketed rollups: hourly, daily and weekly per token, plus the
//! chain-wide daily rollup across all tokens.

use anyhow::Context;
use num_bigint::BigInt;

use crate::{
    aggregator::EventFlow,
    db::{
        models::{
            CrossTokenDailySnapshot, DailySnapshot, HourlySnapshot, PeriodSnapshot, WeeklySnapshot,
        },
        Store,
    },
    utils::{ids, Period},
    worker::TransferEvent,
};

/// Load-or-create the period record of `P` for this event, fold the event in,
/// run `extra`, recompute derived fields, and write the whole record back.
fn upsert_period<P, S, F>(
    store: &mut S,
    event: &TransferEvent,
    flow: &EventFlow,
    supply_after: &BigInt,
    extra: F,
) -> anyhow::Result<()>
where
    P: PeriodSnapshot,
    S: Store,
    F: FnOnce(&mut P),
{
    let index = P::PERIOD.index(event.timestamp);
    let id = ids::period_id(event.chain_id, &event.token, index);
    let mut record: P = store
        .get(&id)
        .with_context(|| format!("Failed to load {} snapshot {id}", P::PERIOD.label()))?
        .unwrap_or_else(|| P::new(event.chain_id, &event.token, index, event.block_number));

    record.totals_mut().accumulate(
        flow.transfer_type,
        &flow.value,
        supply_after,
        event.block_number,
    );
    extra(&mut record);
    record.refresh_derived();

    store
        .set(record)
        .with_context(|| format!("Failed to write {} snapshot {id}", P::PERIOD.label()))
}

/// Update the hourly, daily, weekly and cross-token rollups for one transfer.
///
/// `supply_after` is the total supply returned by the supply ledger for this
/// same event. `new_accounts` counts the sides the account ledger reported as
/// first seen; it feeds the daily `new_address_count`.
pub fn update_rollups<S: Store>(
    store: &mut S,
    event: &TransferEvent,
    flow: &EventFlow,
    supply_after: &BigInt,
    new_accounts: u64,
) -> anyhow::Result<()> {
    upsert_period::<HourlySnapshot, _, _>(store, event, flow, supply_after, |_| {})?;
    upsert_period::<DailySnapshot, _, _>(store, event, flow, supply_after, |daily| {
        daily.new_address_count += new_accounts;
    })?;
    upsert_period::<WeeklySnapshot, _, _>(store, event, flow, supply_after, |_| {})?;

    update_cross_token(store, event, flow)
}

/// Chain-wide daily totals; independent of the per-token rollups.
pub fn update_cross_token<S: Store>(
    store: &mut S,
    event: &TransferEvent,
    flow: &EventFlow,
) -> anyhow::Result<()> {
    let day = Period::Day.index(event.timestamp);
    let id = ids::cross_token_id(event.chain_id, day);
    let mut record: CrossTokenDailySnapshot = store
        .get(&id)
        .with_context(|| format!("Failed to load cross-token snapshot {id}"))?
        .unwrap_or_else(|| CrossTokenDailySnapshot::new(event.chain_id, day, event.block_number));

    record.accumulate(flow.transfer_type, &flow.value, event.block_number);

    store
        .set(record)
        .with_context(|| format!("Failed to write cross-token snapshot {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{models::TransferType, MemoryStore},
        utils::ZERO_ADDRESS,
    };
    use bigdecimal::BigDecimal;

    const DAY: u64 = 86_400;

    fn event(token: &str, timestamp: u64, block_number: u64) -> TransferEvent {
        TransferEvent {
            chain_id: 1,
            token: token.to_string(),
            from: ZERO_ADDRESS.to_string(),
            to: "0xbob".to_string(),
            value: BigInt::from(100),
            block_number,
            timestamp,
            log_index: 0,
            tx_hash: "0xtx".to_string(),
        }
    }

    #[test]
    fn test_periods_do_not_carry_over() {
        let mut store = MemoryStore::new();
        let flow = EventFlow::new(TransferType::Mint, BigInt::from(100));

        let first = event("0xt", 10 * DAY + 5, 1);
        let second = event("0xt", 11 * DAY + 5, 2);
        update_rollups(&mut store, &first, &flow, &BigInt::from(100), 1).unwrap();
        update_rollups(&mut store, &second, &flow, &BigInt::from(200), 0).unwrap();

        let day10: DailySnapshot = store.get(&ids::period_id(1, "0xt", 10)).unwrap().unwrap();
        let day11: DailySnapshot = store.get(&ids::period_id(1, "0xt", 11)).unwrap().unwrap();
        assert_eq!(day10.totals.volume, BigInt::from(100));
        assert_eq!(day10.new_address_count, 1);
        assert_eq!(day11.totals.volume, BigInt::from(100));
        assert_eq!(day11.totals.end_of_period_supply, BigInt::from(200));
        assert_eq!(day11.new_address_count, 0);
        assert_eq!(day11.velocity, "0.5".parse::<BigDecimal>().unwrap());

        // Both days fall into week 1.
        let week: WeeklySnapshot = store.get(&ids::period_id(1, "0xt", 1)).unwrap().unwrap();
        assert_eq!(week.totals.volume, BigInt::from(200));
        assert_eq!(week.totals.first_block_of_period, 1);
        assert_eq!(week.totals.last_block_of_period, 2);
        assert_eq!(week.velocity, BigDecimal::from(1));

        assert_eq!(store.count::<HourlySnapshot>(), 2);
    }

    #[test]
    fn test_cross_token_sums_all_tokens() {
        let mut store = MemoryStore::new();
        let mint = EventFlow::new(TransferType::Mint, BigInt::from(100));
        let burn = EventFlow::new(TransferType::Burn, BigInt::from(100));

        update_rollups(&mut store, &event("0xa", 5, 1), &mint, &BigInt::from(100), 1).unwrap();
        update_rollups(&mut store, &event("0xb", 6, 2), &mint, &BigInt::from(100), 1).unwrap();
        update_rollups(&mut store, &event("0xb", 7, 3), &burn, &BigInt::from(0), 0).unwrap();

        let cross: CrossTokenDailySnapshot =
            store.get(&ids::cross_token_id(1, 0)).unwrap().unwrap();
        assert_eq!(cross.total_volume, BigInt::from(300));
        assert_eq!(cross.total_transfer_count, 3);
        assert_eq!(cross.total_mint_volume, BigInt::from(200));
        assert_eq!(cross.total_burn_volume, BigInt::from(100));
        assert_eq!(cross.net_mint_burn_flow, BigInt::from(100));

        // the burn drained token b: velocity falls back to zero
        let daily_b: DailySnapshot = store.get(&ids::period_id(1, "0xb", 0)).unwrap().unwrap();
        assert_eq!(daily_b.velocity, BigDecimal::from(0));
    }
}
