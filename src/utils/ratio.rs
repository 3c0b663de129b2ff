//! Decimal ratio helpers.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::Zero;

/// Velocity of a period: `volume / supply` as an exact decimal.
///
/// Returns zero when `supply` is zero. `BigDecimal` division keeps 100 significant
/// digits, well beyond the magnitude of any uint256 token amount.
pub fn velocity(volume: &BigInt, supply: &BigInt) -> BigDecimal {
    if supply.is_zero() {
        return BigDecimal::zero();
    }

    BigDecimal::from(volume.clone()) / BigDecimal::from(supply.clone())
}
