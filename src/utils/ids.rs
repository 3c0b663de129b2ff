//! Composite identifiers used as store keys.
//!
//! Every key is namespaced by chain, and all but the cross-token key by token,
//! so records from different partitions can never collide. Addresses are
//! expected to be normalized (lowercase, 0x-prefixed) by the caller.

/// Key of an [`Account`](crate::db::models::Account): `chain-token-address`.
pub fn account_id(chain_id: u64, token: &str, address: &str) -> String {
    format!("{chain_id}-{token}-{address}")
}

/// Key of the singleton [`TokenSupply`](crate::db::models::TokenSupply) record.
pub fn token_id(chain_id: u64, token: &str) -> String {
    format!("{chain_id}-{token}")
}

/// Key of a per-token period rollup (hourly, daily or weekly).
pub fn period_id(chain_id: u64, token: &str, period_index: u64) -> String {
    format!("{chain_id}-{token}-{period_index}")
}

/// Key of the immutable transfer record.
pub fn transfer_id(chain_id: u64, token: &str, block_number: u64, log_index: u32) -> String {
    format!("{chain_id}-{token}-{block_number}-{log_index}")
}

pub fn balance_snapshot_id(
    chain_id: u64,
    token: &str,
    address: &str,
    block_number: u64,
    log_index: u32,
) -> String {
    format!("{chain_id}-{token}-{address}-{block_number}-{log_index}")
}

/// Key of the chain-wide daily rollup. Not token scoped.
pub fn cross_token_id(chain_id: u64, day: u64) -> String {
    format!("{chain_id}-{day}")
}

pub fn account_activity_id(chain_id: u64, token: &str, account: &str, day: u64) -> String {
    format!("{chain_id}-{token}-{account}-{day}")
}

/// Key of a uniqueness marker for `address` within one period.
pub fn active_address_id(chain_id: u64, token: &str, period_index: u64, address: &str) -> String {
    format!("{chain_id}-{token}-{period_index}-{address}")
}

pub fn approval_id(chain_id: u64, token: &str, owner: &str, spender: &str) -> String {
    format!("{chain_id}-{token}-{owner}-{spender}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
    const ALICE: &str = "0x1111111111111111111111111111111111111111";
    const BOB: &str = "0x2222222222222222222222222222222222222222";

    #[test]
    fn test_ids_are_namespaced_by_chain() {
        assert_ne!(account_id(1, TOKEN, ALICE), account_id(10, TOKEN, ALICE));
        assert_ne!(token_id(1, TOKEN), token_id(137, TOKEN));
        assert_ne!(cross_token_id(1, 19_000), cross_token_id(8453, 19_000));
    }

    #[test]
    fn test_approval_id_is_directional() {
        assert_ne!(approval_id(1, TOKEN, ALICE, BOB), approval_id(1, TOKEN, BOB, ALICE));
    }

    #[test]
    fn test_ids_are_stable() {
        assert_eq!(
            transfer_id(1, TOKEN, 18_000_000, 7),
            format!("1-{TOKEN}-18000000-7")
        );
        assert_eq!(
            active_address_id(1, TOKEN, 19_723, ALICE),
            format!("1-{TOKEN}-19723-{ALICE}")
        );
    }
}
