//! Type conversion and formatting utilities.
//!
//! Functions for converting between on-chain numeric types (U256) and the
//! arbitrary-precision integers used by the aggregates.

use alloy::primitives::{hex, U256};
use num_bigint::{BigInt, Sign};
use once_cell::sync::Lazy;

// ============================================
// Hex Encoding
// ============================================

/// Encode bytes as a lowercase hex string with 0x prefix.
pub fn hex_encode(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

// ============================================
// U256 Conversions
// ============================================

/// Convert alloy U256 to a non-negative BigInt.
///
/// Goes through little-endian bytes rather than a decimal string.
pub fn u256_to_bigint(value: U256) -> BigInt {
    let bytes: [u8; 32] = value.to_le_bytes();
    BigInt::from_bytes_le(Sign::Plus, &bytes)
}

// ============================================
// Powers of ten
// ============================================

static POW10_CACHE: Lazy<[BigInt; 37]> =
    Lazy::new(|| std::array::from_fn(|i| BigInt::from(10u32).pow(i as u32)));

/// Compute 10^exp as BigInt.
pub fn pow10(exp: u8) -> BigInt {
    if (exp as usize) < POW10_CACHE.len() {
        POW10_CACHE[exp as usize].clone()
    } else {
        BigInt::from(10u32).pow(exp as u32)
    }
}

// ============================================
// Serde helpers
// ============================================

/// Serialize a BigInt as a decimal string, the format used by the event feed.
pub mod bigint_string {
    use std::str::FromStr;

    use num_bigint::BigInt;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let s = String::deserialize(deserializer)?;
        BigInt::from_str(s.trim()).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u256_to_bigint() {
        assert_eq!(u256_to_bigint(U256::ZERO), BigInt::from(0));
        assert_eq!(
            u256_to_bigint(U256::from(1_000_000_000_000_000_000u128)),
            BigInt::from(1_000_000_000_000_000_000u128)
        );
        assert_eq!(u256_to_bigint(U256::MAX).to_string(), U256::MAX.to_string());
    }

    #[test]
    fn test_pow10() {
        assert_eq!(pow10(0), BigInt::from(1));
        assert_eq!(pow10(18), BigInt::from(1_000_000_000_000_000_000u64));
        assert_eq!(pow10(40), BigInt::from(10u32).pow(40));
    }
}
