//! Account ledger: per-(chain, token, address) balances and activity counters.
//!
//! Balances are allowed to go negative. Within one transaction a transfer out
//! can be observed before the transfer that funded it, so rejecting the
//! underflow would drop real activity.

use anyhow::Context;
use log::warn;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::{
    db::{models::Account, Store},
    utils::ids,
};

/// Which side of a transfer an account is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Sender,
    Receiver,
}

/// Result of applying a balance delta to one account.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountUpdate {
    pub old_balance: BigInt,
    pub new_balance: BigInt,
    /// +1 on 0 -> non-zero, -1 on non-zero -> 0, otherwise 0.
    pub holder_delta: i64,
    /// No record existed before this update.
    pub is_new: bool,
}

impl AccountUpdate {
    fn new(old_balance: BigInt, new_balance: BigInt, is_new: bool) -> Self {
        let holder_delta = match (old_balance.is_zero(), new_balance.is_zero()) {
            (true, false) => 1,
            (false, true) => -1,
            _ => 0,
        };
        Self {
            old_balance,
            new_balance,
            holder_delta,
            is_new,
        }
    }
}

/// Apply a signed balance delta to one account and write the full record back.
///
/// Only the counters of `side` move: the sender gets `total_volume_out` and
/// `transfers_out`, the receiver the inbound pair. Volume counters always add
/// the magnitude of `delta`.
#[allow(clippy::too_many_arguments)]
pub fn apply_delta<S: Store>(
    store: &mut S,
    chain_id: u64,
    token: &str,
    address: &str,
    delta: &BigInt,
    side: Side,
    block_number: u64,
    timestamp: u64,
) -> anyhow::Result<AccountUpdate> {
    let id = ids::account_id(chain_id, token, address);
    let existing: Option<Account> = store
        .get(&id)
        .with_context(|| format!("Failed to load account {id}"))?;
    let is_new = existing.is_none();
    let mut account = existing
        .unwrap_or_else(|| Account::new(chain_id, token, address, block_number, timestamp));

    let old_balance = account.balance.clone();
    let new_balance = &old_balance + delta;
    let volume = delta.abs();

    account.balance = new_balance.clone();
    match side {
        Side::Sender => {
            account.total_volume_out += &volume;
            account.transfers_out += 1;
        },
        Side::Receiver => {
            account.total_volume_in += &volume;
            account.transfers_in += 1;
        },
    }
    account.last_active_block = block_number;
    account.last_active_timestamp = timestamp;

    if new_balance.is_negative() {
        warn!(
            "Account {} on token {} (chain {}) went negative: {}",
            address, token, chain_id, new_balance
        );
    }

    store
        .set(account)
        .with_context(|| format!("Failed to write account {id}"))?;

    Ok(AccountUpdate::new(old_balance, new_balance, is_new))
}

/// Make sure an account record exists without touching an existing one.
///
/// Used by the approval path: a fresh record starts at zero balance, first
/// seen at the given block.
pub fn ensure_account<S: Store>(
    store: &mut S,
    chain_id: u64,
    token: &str,
    address: &str,
    block_number: u64,
    timestamp: u64,
) -> anyhow::Result<Account> {
    let id = ids::account_id(chain_id, token, address);
    store
        .get_or_create(&id, || {
            Account::new(chain_id, token, address, block_number, timestamp)
        })
        .with_context(|| format!("Failed to ensure account {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    const TOKEN: &str = "0xtoken";
    const ALICE: &str = "0x1111111111111111111111111111111111111111";

    fn load(store: &MemoryStore) -> Account {
        store.get(&ids::account_id(1, TOKEN, ALICE)).unwrap().unwrap()
    }

    #[test]
    fn test_first_credit_creates_holder() {
        let mut store = MemoryStore::new();
        let update =
            apply_delta(&mut store, 1, TOKEN, ALICE, &BigInt::from(100), Side::Receiver, 5, 50)
                .unwrap();

        assert!(update.is_new);
        assert_eq!(update.holder_delta, 1);
        assert_eq!(update.new_balance, BigInt::from(100));

        let account = load(&store);
        assert_eq!(account.total_volume_in, BigInt::from(100));
        assert_eq!(account.transfers_in, 1);
        assert_eq!(account.transfers_out, 0);
        assert_eq!(account.first_seen_block, 5);
    }

    #[test]
    fn test_debit_to_zero_removes_holder() {
        let mut store = MemoryStore::new();
        apply_delta(&mut store, 1, TOKEN, ALICE, &BigInt::from(100), Side::Receiver, 5, 50)
            .unwrap();
        let update =
            apply_delta(&mut store, 1, TOKEN, ALICE, &BigInt::from(-100), Side::Sender, 9, 90)
                .unwrap();

        assert!(!update.is_new);
        assert_eq!(update.holder_delta, -1);

        let account = load(&store);
        assert_eq!(account.balance, BigInt::zero());
        assert_eq!(account.total_volume_out, BigInt::from(100));
        assert_eq!(account.first_seen_block, 5);
        assert_eq!(account.last_active_block, 9);
        assert_eq!(account.last_active_timestamp, 90);
    }

    #[test]
    fn test_negative_balance_is_kept() {
        let mut store = MemoryStore::new();
        let update =
            apply_delta(&mut store, 1, TOKEN, ALICE, &BigInt::from(-40), Side::Sender, 1, 1)
                .unwrap();

        // 0 -> -40 is a zero transition like any other
        assert_eq!(update.holder_delta, 1);
        assert_eq!(load(&store).balance, BigInt::from(-40));
    }

    #[test]
    fn test_ensure_account_does_not_clobber() {
        let mut store = MemoryStore::new();
        apply_delta(&mut store, 1, TOKEN, ALICE, &BigInt::from(70), Side::Receiver, 5, 50)
            .unwrap();

        let account = ensure_account(&mut store, 1, TOKEN, ALICE, 99, 990).unwrap();
        assert_eq!(account.balance, BigInt::from(70));
        assert_eq!(account.last_active_block, 5);
    }
}
