//! Unique active address tracking and per-account daily activity.

use anyhow::Context;
use num_bigint::BigInt;

use crate::{
    aggregator::accounts::Side,
    db::{
        models::{
            AccountDailyActivity, ActiveAddressMarker, DailyActiveAddress, DailySnapshot,
            PeriodSnapshot, WeeklyActiveAddress, WeeklySnapshot,
        },
        Store,
    },
    utils::{ids, Period},
    worker::TransferEvent,
};

/// Record that `address` was active in period `period_index` of marker kind `M`.
///
/// Returns `true` the first time the (period, address) pair is seen. An
/// existing marker is never rewritten.
pub fn track_unique<M: ActiveAddressMarker, S: Store>(
    store: &mut S,
    chain_id: u64,
    token: &str,
    period_index: u64,
    address: &str,
) -> anyhow::Result<bool> {
    let id = ids::active_address_id(chain_id, token, period_index, address);
    if store.contains::<M>(&id)? {
        return Ok(false);
    }

    store
        .set(M::new(chain_id, token, period_index, address))
        .with_context(|| format!("Failed to write {} marker {id}", M::PERIOD.label()))?;
    Ok(true)
}

/// Bump `unique_active_addresses` of the period rollup `P` by `novel`.
fn add_unique<P, S, F>(
    store: &mut S,
    event: &TransferEvent,
    novel: u64,
    bump: F,
) -> anyhow::Result<()>
where
    P: PeriodSnapshot,
    S: Store,
    F: FnOnce(&mut P, u64),
{
    if novel == 0 {
        return Ok(());
    }

    let index = P::PERIOD.index(event.timestamp);
    let id = ids::period_id(event.chain_id, &event.token, index);
    let mut record: P = store
        .get(&id)?
        .unwrap_or_else(|| P::new(event.chain_id, &event.token, index, event.block_number));
    bump(&mut record, novel);
    store.set(record)
}

/// Track the event's participants for the day and the week and fold the
/// newly seen ones into the daily and weekly rollups.
///
/// `addresses` must already be deduplicated and exclude the zero address;
/// a self-transfer therefore counts once.
/// Returns the number of novel addresses for (day, week).
pub fn record_unique_addresses<S: Store>(
    store: &mut S,
    event: &TransferEvent,
    addresses: &[&str],
) -> anyhow::Result<(u64, u64)> {
    let day = Period::Day.index(event.timestamp);
    let week = Period::Week.index(event.timestamp);

    let mut novel_daily = 0;
    let mut novel_weekly = 0;
    for address in addresses {
        if track_unique::<DailyActiveAddress, _>(store, event.chain_id, &event.token, day, address)? {
            novel_daily += 1;
        }
        if track_unique::<WeeklyActiveAddress, _>(store, event.chain_id, &event.token, week, address)? {
            novel_weekly += 1;
        }
    }

    add_unique::<DailySnapshot, _, _>(store, event, novel_daily, |daily, n| {
        daily.unique_active_addresses += n;
    })
    .context("Failed to update daily unique addresses")?;
    add_unique::<WeeklySnapshot, _, _>(store, event, novel_weekly, |weekly, n| {
        weekly.unique_active_addresses += n;
    })
    .context("Failed to update weekly unique addresses")?;

    Ok((novel_daily, novel_weekly))
}

/// Add one side of a transfer to the account's daily activity record.
pub fn record_activity<S: Store>(
    store: &mut S,
    event: &TransferEvent,
    account: &str,
    side: Side,
    value: &BigInt,
) -> anyhow::Result<()> {
    let day = Period::Day.index(event.timestamp);
    let id = ids::account_activity_id(event.chain_id, &event.token, account, day);
    let mut activity: AccountDailyActivity = store
        .get(&id)
        .with_context(|| format!("Failed to load account activity {id}"))?
        .unwrap_or_else(|| AccountDailyActivity::new(event.chain_id, &event.token, account, day));

    activity.transfer_count += 1;
    match side {
        Side::Sender => activity.volume_out += value,
        Side::Receiver => activity.volume_in += value,
    }

    store
        .set(activity)
        .with_context(|| format!("Failed to write account activity {id}"))
}
