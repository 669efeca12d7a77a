//! Fixed-point math utilities for deterministic simulation.
//!
//! Player stress and currency are fractional quantities. They use
//! fixed-point arithmetic so a seed and an intent stream reproduce the
//! same state on every platform.

use fixed::types::I32F32;

/// Fixed-point number type for fractional player resources.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Clamp a fixed-point value so it never drops below zero.
#[must_use]
pub fn non_negative(value: Fixed) -> Fixed {
    if value < Fixed::ZERO {
        Fixed::ZERO
    } else {
        value
    }
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_negative_floors_at_zero() {
        assert_eq!(non_negative(Fixed::from_num(-3)), Fixed::ZERO);
        assert_eq!(non_negative(Fixed::from_num(7)), Fixed::from_num(7));
    }

    #[test]
    fn test_fixed_serde_preserves_bits() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrapper {
            #[serde(with = "fixed_serde")]
            value: Fixed,
        }

        let original = Wrapper {
            value: Fixed::from_num(12.375),
        };
        let bytes = bincode::serialize(&original).unwrap();
        let restored: Wrapper = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored.value, original.value);
    }
}
