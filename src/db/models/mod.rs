mod account;
mod account_activity;
mod active_address;
mod approval;
mod balance_snapshot;
mod cross_token;
mod period_snapshot;
mod token_supply;
mod transfer;

pub use account::Account;
pub use account_activity::AccountDailyActivity;
pub use active_address::{ActiveAddressMarker, DailyActiveAddress, WeeklyActiveAddress};
pub use approval::Approval;
pub use balance_snapshot::AccountBalanceSnapshot;
pub use cross_token::CrossTokenDailySnapshot;
pub use period_snapshot::{
    DailySnapshot, HourlySnapshot, PeriodSnapshot, PeriodTotals, WeeklySnapshot,
};
pub use token_supply::TokenSupply;
pub use transfer::{Transfer, TransferType};
