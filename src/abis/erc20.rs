//! ERC20 event signatures decoded by [`crate::worker::parser`].

use alloy::sol;

sol! {
    event Transfer(address indexed from, address indexed to, uint256 value);
    event Approval(address indexed owner, address indexed spender, uint256 value);
}
