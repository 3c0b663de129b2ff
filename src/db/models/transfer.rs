use num_bigint::BigInt;
use serde::Serialize;

use crate::{
    db::store::{Entity, EntityKind},
    utils::{ids, ZERO_ADDRESS},
    worker::TransferEvent,
};

/// Classification of a transfer by its zero-address endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransferType {
    Mint,
    Burn,
    Transfer,
}

impl TransferType {
    /// MINT when the sender is the zero address, BURN when the receiver is,
    /// TRANSFER otherwise.
    ///
    /// A zero-to-zero transfer counts as a mint: the zero address is credited
    /// as the receiver, raises the supply and becomes a holder.
    pub fn classify(from: &str, to: &str) -> Self {
        if from == ZERO_ADDRESS {
            TransferType::Mint
        } else if to == ZERO_ADDRESS {
            TransferType::Burn
        } else {
            TransferType::Transfer
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferType::Mint => "MINT",
            TransferType::Burn => "BURN",
            TransferType::Transfer => "TRANSFER",
        }
    }
}

/// Immutable, append-only record of an ERC20 Transfer event.
///
/// Primary Key: (chain_id, token, block_number, log_index)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transfer {
    pub id: String,
    pub chain_id: u64,
    pub token: String,
    pub block_number: u64,
    pub log_index: u32,
    pub tx_hash: String,
    pub timestamp: u64,

    pub from: String,
    pub to: String,
    pub value: BigInt,
    pub transfer_type: TransferType,
}

impl Transfer {
    pub fn from_event(event: &TransferEvent, transfer_type: TransferType) -> Self {
        Self {
            id: ids::transfer_id(event.chain_id, &event.token, event.block_number, event.log_index),
            chain_id: event.chain_id,
            token: event.token.clone(),
            block_number: event.block_number,
            log_index: event.log_index,
            tx_hash: event.tx_hash.clone(),
            timestamp: event.timestamp,
            from: event.from.clone(),
            to: event.to.clone(),
            value: event.value.clone(),
            transfer_type,
        }
    }
}

impl Entity for Transfer {
    const KIND: EntityKind = EntityKind::Transfer;

    fn id(&self) -> &str {
        &self.id
    }
}
