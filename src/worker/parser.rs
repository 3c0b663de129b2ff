//! Log decoding for ERC20 token events.
//!
//! Turns raw RPC logs into [`TokenEvent`] records. Logs of any other
//! signature, or logs still missing block metadata (pending), are skipped.
//!
//! Entry point for an RPC or log-streaming source feeding [`crate::ChainRouter`].
//! The bundled `tally` binary replays JSON feeds instead and does not call it.

use alloy::{rpc::types::Log, sol_types::SolEvent};
use log::debug;

use crate::{
    abis::erc20,
    utils::{hex_encode, u256_to_bigint},
    worker::events::{ApprovalEvent, TokenEvent, TransferEvent},
};

/// Decode a single log. Returns `None` for foreign or pending logs.
pub fn parse_log(chain_id: u64, log: &Log) -> Option<TokenEvent> {
    let data = &log.inner.data;
    let topic0 = data.topics().first()?;

    let block_number = log.block_number?;
    let timestamp = log.block_timestamp?;
    let log_index = log.log_index? as u32;
    let tx_hash = log
        .transaction_hash
        .as_ref()
        .map(|h| hex_encode(h.as_slice()))
        .unwrap_or_default();
    let token = hex_encode(log.inner.address.as_slice());

    match topic0 {
        t if *t == erc20::Transfer::SIGNATURE_HASH => {
            let event = match erc20::Transfer::decode_log_data(data) {
                Ok(event) => event,
                Err(e) => {
                    // Transfer-shaped logs from non-ERC20 contracts (e.g. ERC721)
                    debug!("Skipping undecodable Transfer log at {block_number}/{log_index}: {e}");
                    return None;
                },
            };
            Some(TokenEvent::Transfer(TransferEvent {
                chain_id,
                token,
                from: hex_encode(event.from.as_slice()),
                to: hex_encode(event.to.as_slice()),
                value: u256_to_bigint(event.value),
                block_number,
                timestamp,
                log_index,
                tx_hash,
            }))
        },
        t if *t == erc20::Approval::SIGNATURE_HASH => {
            let event = erc20::Approval::decode_log_data(data).ok()?;
            Some(TokenEvent::Approval(ApprovalEvent {
                chain_id,
                token,
                owner: hex_encode(event.owner.as_slice()),
                spender: hex_encode(event.spender.as_slice()),
                value: u256_to_bigint(event.value),
                block_number,
                timestamp,
                log_index,
                tx_hash,
            }))
        },
        _ => None,
    }
}

/// Decode a batch of logs, preserving their order.
pub fn parse_logs<'a>(chain_id: u64, logs: impl IntoIterator<Item = &'a Log>) -> Vec<TokenEvent> {
    logs.into_iter()
        .filter_map(|log| parse_log(chain_id, log))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, Address, LogData, B256, U256};
    use num_bigint::BigInt;

    const TOKEN: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");

    fn rpc_log(data: LogData, block_number: Option<u64>) -> Log {
        Log {
            inner: alloy::primitives::Log {
                address: TOKEN,
                data,
            },
            block_hash: None,
            block_number,
            block_timestamp: Some(1_700_000_000),
            transaction_hash: Some(B256::repeat_byte(0xab)),
            transaction_index: None,
            log_index: Some(4),
            removed: false,
        }
    }

    #[test]
    fn test_parse_transfer() {
        let event = erc20::Transfer {
            from: Address::ZERO,
            to: address!("2222222222222222222222222222222222222222"),
            value: U256::from(1_000u64),
        };
        let log = rpc_log(event.encode_log_data(), Some(18_000_000));

        let Some(TokenEvent::Transfer(parsed)) = parse_log(1, &log) else {
            panic!("expected a transfer");
        };
        assert_eq!(parsed.token, "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
        assert_eq!(parsed.from, crate::utils::ZERO_ADDRESS);
        assert_eq!(parsed.to, "0x2222222222222222222222222222222222222222");
        assert_eq!(parsed.value, BigInt::from(1_000));
        assert_eq!(parsed.block_number, 18_000_000);
        assert_eq!(parsed.log_index, 4);
        assert_eq!(parsed.timestamp, 1_700_000_000);
    }

    #[test]
    fn test_parse_approval() {
        let event = erc20::Approval {
            owner: address!("1111111111111111111111111111111111111111"),
            spender: address!("2222222222222222222222222222222222222222"),
            value: U256::MAX,
        };
        let log = rpc_log(event.encode_log_data(), Some(1));

        let Some(TokenEvent::Approval(parsed)) = parse_log(1, &log) else {
            panic!("expected an approval");
        };
        assert_eq!(parsed.value.to_string(), U256::MAX.to_string());
    }

    #[test]
    fn test_pending_and_foreign_logs_are_skipped() {
        let event = erc20::Transfer {
            from: Address::ZERO,
            to: Address::ZERO,
            value: U256::from(1u64),
        };
        assert!(parse_log(1, &rpc_log(event.encode_log_data(), None)).is_none());

        let foreign = LogData::new_unchecked(vec![B256::repeat_byte(1)], Default::default());
        assert!(parse_log(1, &rpc_log(foreign, Some(1))).is_none());
        assert!(parse_logs(1, [&rpc_log(foreign_data(), Some(1))]).is_empty());
    }

    fn foreign_data() -> LogData {
        LogData::new_unchecked(vec![B256::repeat_byte(2)], Default::default())
    }
}
