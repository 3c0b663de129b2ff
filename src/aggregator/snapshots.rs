//! Balance snapshot trigger policy and emission.
//!
//! A point-in-time [`AccountBalanceSnapshot`] is written after an account
//! update only when the balance change is significant:
//!
//! 1. ZERO TRANSITION: the old or the new balance is zero.
//! 2. RELATIVE CHANGE: `|new - old| * 10000 >= |old| * threshold_bps`.
//!    The old balance is the denominator; the default threshold is 0.10%.
//! 3. ROUND BOUNDARY: a round balance `b` (10k, 100k, 1M, 10M whole tokens)
//!    lies in the half-open range `[min(old, new), max(old, new))`, so the
//!    rule fires in both directions.

use anyhow::Context;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::{
    aggregator::accounts::AccountUpdate,
    config::SnapshotSettings,
    db::{models::AccountBalanceSnapshot, Store},
    utils::pow10,
    worker::TransferEvent,
};

const BPS_DENOMINATOR: u64 = 10_000;

/// Snapshot trigger policy for one token.
#[derive(Debug, Clone)]
pub struct SnapshotPolicy {
    change_threshold_bps: Option<u64>,
    /// Ascending, in base units.
    boundaries: Vec<BigInt>,
}

impl SnapshotPolicy {
    pub fn new(change_threshold_bps: Option<u64>, boundaries: Vec<BigInt>) -> Self {
        let mut boundaries = boundaries;
        boundaries.sort();
        Self {
            change_threshold_bps,
            boundaries,
        }
    }

    /// Policy for `token`, with boundaries scaled by the token's decimals.
    pub fn for_token(settings: &SnapshotSettings, token: &str) -> Self {
        let scale = pow10(settings.decimals_for(token));
        let boundaries = settings
            .boundaries
            .iter()
            .map(|b| BigInt::from(*b) * &scale)
            .collect();
        Self::new(settings.change_threshold_bps, boundaries)
    }

    /// Whether a move from `old` to `new` warrants a snapshot.
    pub fn should_snapshot(&self, old: &BigInt, new: &BigInt) -> bool {
        if old.is_zero() || new.is_zero() {
            return true;
        }

        if let Some(bps) = self.change_threshold_bps {
            let change = (new - old).abs() * BPS_DENOMINATOR;
            if change >= old.abs() * bps {
                return true;
            }
        }

        self.crosses_boundary(old, new)
    }

    fn crosses_boundary(&self, old: &BigInt, new: &BigInt) -> bool {
        let (low, high) = if old <= new { (old, new) } else { (new, old) };
        self.boundaries
            .iter()
            .any(|boundary| low <= boundary && boundary < high)
    }
}

/// Write a balance snapshot for one side of `event` if the policy fires.
///
/// `balance_change` is negative for the sender and positive for the receiver.
/// Snapshots are write-once: when a record already exists under the same key
/// (a self-transfer touches one key twice) the later side is skipped.
/// Returns whether a snapshot was written.
pub fn emit_balance_snapshot<S: Store>(
    store: &mut S,
    policy: &SnapshotPolicy,
    event: &TransferEvent,
    address: &str,
    update: &AccountUpdate,
    balance_change: BigInt,
) -> anyhow::Result<bool> {
    if !policy.should_snapshot(&update.old_balance, &update.new_balance) {
        return Ok(false);
    }

    let snapshot = AccountBalanceSnapshot::new(
        event.chain_id,
        &event.token,
        address,
        event.block_number,
        event.log_index,
        event.timestamp,
        &event.tx_hash,
        update.new_balance.clone(),
        balance_change,
    );

    if store.contains::<AccountBalanceSnapshot>(&snapshot.id)? {
        return Ok(false);
    }

    store
        .set(snapshot)
        .with_context(|| format!("Failed to write balance snapshot for {address}"))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> BigInt {
        BigInt::from(v)
    }

    fn plain_policy() -> SnapshotPolicy {
        let settings = SnapshotSettings {
            default_decimals: 0,
            ..Default::default()
        };
        SnapshotPolicy::for_token(&settings, "0xtoken")
    }

    fn boundary_only_policy() -> SnapshotPolicy {
        let settings = SnapshotSettings {
            change_threshold_bps: None,
            default_decimals: 0,
            ..Default::default()
        };
        SnapshotPolicy::for_token(&settings, "0xtoken")
    }

    #[test]
    fn test_zero_transitions_trigger() {
        let policy = plain_policy();
        assert!(policy.should_snapshot(&int(0), &int(1)));
        assert!(policy.should_snapshot(&int(5_000_000), &int(0)));
        assert!(policy.should_snapshot(&int(0), &int(-3)));
        assert!(boundary_only_policy().should_snapshot(&int(0), &int(1)));
    }

    #[test]
    fn test_relative_change_threshold() {
        // Boundaries scaled far away so only the percentage rule applies.
        let settings = SnapshotSettings::default();
        let policy = SnapshotPolicy::for_token(&settings, "0xtoken");

        // exactly 0.10%
        assert!(policy.should_snapshot(&int(1_000_000), &int(1_001_000)));
        assert!(policy.should_snapshot(&int(1_000_000), &int(999_000)));
        // 0.0999%
        assert!(!policy.should_snapshot(&int(1_000_000), &int(1_000_999)));
        assert!(!policy.should_snapshot(&int(1_000_000), &int(999_001)));
        // negative balances use the magnitude
        assert!(policy.should_snapshot(&int(-1_000_000), &int(-1_001_000)));
        assert!(!policy.should_snapshot(&int(-1_000_000), &int(-1_000_500)));
    }

    #[test]
    fn test_boundary_crossing_in_isolation() {
        let policy = boundary_only_policy();

        assert!(policy.should_snapshot(&int(9_999), &int(10_001)));
        assert!(policy.should_snapshot(&int(10_001), &int(9_999)));
        assert!(policy.should_snapshot(&int(99_000), &int(2_000_000)));
        assert!(!policy.should_snapshot(&int(20_000), &int(30_000)));
        assert!(!policy.should_snapshot(&int(30_000), &int(20_000)));
        assert!(!policy.should_snapshot(&int(10_000_001), &int(90_000_000)));
    }

    #[test]
    fn test_boundary_range_is_half_open() {
        let policy = boundary_only_policy();

        // [10_000, 10_500) contains the boundary
        assert!(policy.should_snapshot(&int(10_000), &int(10_500)));
        assert!(policy.should_snapshot(&int(10_500), &int(10_000)));
        // [9_500, 10_000) does not
        assert!(!policy.should_snapshot(&int(9_500), &int(10_000)));
        assert!(!policy.should_snapshot(&int(10_000), &int(9_500)));
    }

    #[test]
    fn test_boundaries_scale_with_decimals() {
        let mut settings = SnapshotSettings {
            change_threshold_bps: None,
            ..Default::default()
        };
        settings.token_decimals.insert("0xusdc".to_string(), 6);
        let policy = SnapshotPolicy::for_token(&settings, "0xusdc");

        let just_below = int(9_999) * pow10(6);
        let just_above = int(10_001) * pow10(6);
        assert!(policy.should_snapshot(&just_below, &just_above));
        assert!(!policy.should_snapshot(&int(9_999), &int(10_001)));
    }

    #[test]
    fn test_unchanged_balance_does_not_trigger() {
        let policy = plain_policy();
        assert!(!policy.should_snapshot(&int(20_000), &int(20_000)));
    }
}
