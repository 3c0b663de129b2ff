//! Decoded, ordered event records handed to the aggregator.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::utils::bigint_string;

/// ERC20 `Transfer(from, to, value)` with its block metadata.
///
/// Addresses are lowercase 0x-prefixed hex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub chain_id: u64,
    pub token: String,
    pub from: String,
    pub to: String,
    #[serde(with = "bigint_string")]
    pub value: BigInt,
    pub block_number: u64,
    /// Block timestamp, unix seconds.
    pub timestamp: u64,
    pub log_index: u32,
    pub tx_hash: String,
}

/// ERC20 `Approval(owner, spender, value)` with its block metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalEvent {
    pub chain_id: u64,
    pub token: String,
    pub owner: String,
    pub spender: String,
    #[serde(with = "bigint_string")]
    pub value: BigInt,
    pub block_number: u64,
    pub timestamp: u64,
    pub log_index: u32,
    pub tx_hash: String,
}

/// One entry of the event feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TokenEvent {
    Transfer(TransferEvent),
    Approval(ApprovalEvent),
}

impl TokenEvent {
    pub fn chain_id(&self) -> u64 {
        match self {
            TokenEvent::Transfer(e) => e.chain_id,
            TokenEvent::Approval(e) => e.chain_id,
        }
    }

    pub fn block_number(&self) -> u64 {
        match self {
            TokenEvent::Transfer(e) => e.block_number,
            TokenEvent::Approval(e) => e.block_number,
        }
    }

    pub fn log_index(&self) -> u32 {
        match self {
            TokenEvent::Transfer(e) => e.log_index,
            TokenEvent::Approval(e) => e.log_index,
        }
    }
}
