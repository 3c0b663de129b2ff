use anyhow::Context;
use log::{debug, warn};

use crate::{
    aggregator::{
        accounts::{self, Side},
        activity, allowances, rollups,
        snapshots::{self, SnapshotPolicy},
        supply, EventFlow,
    },
    config::SnapshotSettings,
    db::{
        models::{Transfer, TransferType},
        StagedStore, Store,
    },
    utils::ZERO_ADDRESS,
    worker::{ApprovalEvent, TokenEvent, TransferEvent},
};

/// Summary of one applied event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventOutcome {
    /// `None` for approvals.
    pub transfer_type: Option<TransferType>,
    /// Net change of the token's holder count.
    pub holder_delta: i64,
    pub snapshots_written: usize,
    /// Accounts seen for the first time.
    pub new_accounts: u64,
    /// Distinct records committed to the store.
    pub writes: usize,
}

/// Applies token events to a store, one event at a time.
///
/// Stateless apart from its configuration; all state lives in the store, so a
/// single `Aggregator` can serve any number of partitions.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    snapshot_settings: SnapshotSettings,
}

impl Aggregator {
    pub fn new(snapshot_settings: SnapshotSettings) -> Self {
        Self { snapshot_settings }
    }

    /// Apply one event atomically: every write is staged and only committed
    /// once the reducer has finished. On error the store is left untouched.
    pub fn apply<S: Store>(&self, store: &mut S, event: &TokenEvent) -> anyhow::Result<EventOutcome> {
        let mut staged = StagedStore::new(store);

        let mut outcome = match event {
            TokenEvent::Transfer(transfer) => self.reduce_transfer(&mut staged, transfer),
            TokenEvent::Approval(approval) => self.reduce_approval(&mut staged, approval),
        }
        .with_context(|| {
            format!(
                "Failed to apply event at block {} log {} on chain {}",
                event.block_number(),
                event.log_index(),
                event.chain_id()
            )
        })?;

        outcome.writes = staged.commit()?;
        Ok(outcome)
    }

    /// Transfer reducer. Fixed order:
    /// 1. classify and persist the immutable transfer record
    /// 2. sender account (skipped for mints), then receiver (skipped for burns),
    ///    each followed by its balance snapshot check
    /// 3. supply ledger with the holder deltas from step 2
    /// 4. hourly/daily/weekly/cross-token rollups with the new supply
    /// 5. unique active addresses for the deduplicated participants
    /// 6. per-account daily activity for each side
    pub fn reduce_transfer<S: Store>(
        &self,
        store: &mut S,
        event: &TransferEvent,
    ) -> anyhow::Result<EventOutcome> {
        let transfer_type = TransferType::classify(&event.from, &event.to);
        let flow = EventFlow::new(transfer_type, event.value.clone());
        let policy = SnapshotPolicy::for_token(&self.snapshot_settings, &event.token);

        // 1. immutable transfer record
        let record = Transfer::from_event(event, transfer_type);
        if store.contains::<Transfer>(&record.id)? {
            warn!(
                "Transfer {} was already applied; applying it again double counts",
                record.id
            );
        }
        store.set(record).context("Failed to write transfer record")?;

        let mut outcome = EventOutcome {
            transfer_type: Some(transfer_type),
            ..Default::default()
        };

        // 2. account ledger + balance snapshots
        if !flow.is_mint() {
            let delta = -event.value.clone();
            let update = accounts::apply_delta(
                store,
                event.chain_id,
                &event.token,
                &event.from,
                &delta,
                Side::Sender,
                event.block_number,
                event.timestamp,
            )?;
            outcome.holder_delta += update.holder_delta;
            outcome.new_accounts += update.is_new as u64;
            if snapshots::emit_balance_snapshot(store, &policy, event, &event.from, &update, delta)? {
                outcome.snapshots_written += 1;
            }
        }

        if !flow.is_burn() {
            let update = accounts::apply_delta(
                store,
                event.chain_id,
                &event.token,
                &event.to,
                &event.value,
                Side::Receiver,
                event.block_number,
                event.timestamp,
            )?;
            outcome.holder_delta += update.holder_delta;
            outcome.new_accounts += update.is_new as u64;
            if snapshots::emit_balance_snapshot(
                store,
                &policy,
                event,
                &event.to,
                &update,
                event.value.clone(),
            )? {
                outcome.snapshots_written += 1;
            }
        }

        // 3. supply ledger
        let supply_after = supply::apply_event(
            store,
            event.chain_id,
            &event.token,
            &flow,
            outcome.holder_delta,
            event.block_number,
            event.timestamp,
        )?;

        // 4. period rollups
        rollups::update_rollups(store, event, &flow, &supply_after, outcome.new_accounts)?;

        // 5. unique active addresses
        let participants = participants(event);
        activity::record_unique_addresses(store, event, &participants)?;

        // 6. account activity
        if !flow.is_mint() {
            activity::record_activity(store, event, &event.from, Side::Sender, &event.value)?;
        }
        if !flow.is_burn() {
            activity::record_activity(store, event, &event.to, Side::Receiver, &event.value)?;
        }

        debug!(
            "Applied {} of {} on {} (chain {}) at {}/{}: supply={}, holders{:+}, snapshots={}",
            transfer_type.as_str(),
            event.value,
            event.token,
            event.chain_id,
            event.block_number,
            event.log_index,
            supply_after,
            outcome.holder_delta,
            outcome.snapshots_written,
        );

        Ok(outcome)
    }

    /// Approval reducer: ensure both party accounts exist, then overwrite the
    /// allowance record.
    pub fn reduce_approval<S: Store>(
        &self,
        store: &mut S,
        event: &ApprovalEvent,
    ) -> anyhow::Result<EventOutcome> {
        allowances::apply_approval(store, event)?;

        debug!(
            "Applied approval {} -> {} of {} on {} (chain {})",
            event.owner, event.spender, event.value, event.token, event.chain_id
        );

        Ok(EventOutcome::default())
    }
}

/// Distinct non-zero addresses taking part in a transfer.
fn participants(event: &TransferEvent) -> Vec<&str> {
    let mut addresses: Vec<&str> = Vec::with_capacity(2);
    for address in [event.from.as_str(), event.to.as_str()] {
        if address != ZERO_ADDRESS && !addresses.contains(&address) {
            addresses.push(address);
        }
    }
    addresses
}
