//! Allowance ledger.

use anyhow::Context;

use crate::{
    aggregator::accounts::ensure_account,
    db::{models::Approval, Store},
    worker::ApprovalEvent,
};

/// Make sure owner and spender accounts exist, then overwrite the allowance
/// record for the pair with the approved amount.
pub fn apply_approval<S: Store>(store: &mut S, event: &ApprovalEvent) -> anyhow::Result<()> {
    for party in [&event.owner, &event.spender] {
        ensure_account(
            store,
            event.chain_id,
            &event.token,
            party,
            event.block_number,
            event.timestamp,
        )?;
    }

    let approval = Approval::new(
        event.chain_id,
        &event.token,
        &event.owner,
        &event.spender,
        event.value.clone(),
        event.block_number,
        event.timestamp,
    );
    let id = approval.id.clone();

    store
        .set(approval)
        .with_context(|| format!("Failed to write approval {id}"))
}
