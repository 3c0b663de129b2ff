pub mod erc20;

pub use erc20::{Approval, Transfer};
