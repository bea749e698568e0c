//! Bit codec for `f64` components
//!
//! Components are reinterpreted, never converted: every bit pattern,
//! NaN payloads and signed zeros included, passes through unchanged.

use memview_core::ByteOrder;

/// Raw bits of `value` as stored with byte order `order` on a platform of byte order `native`
#[inline]
pub fn encode(value: f64, order: ByteOrder, native: ByteOrder) -> u64 {
    let bits = value.to_bits();
    if order == native {
        bits
    } else {
        bits.swap_bytes()
    }
}

/// Inverse of [`encode`]
#[inline]
pub fn decode(bits: u64, order: ByteOrder, native: ByteOrder) -> f64 {
    let bits = if order == native { bits } else { bits.swap_bytes() };
    f64::from_bits(bits)
}

/// [`encode`] for the executing platform
#[inline]
pub fn to_raw(value: f64, order: ByteOrder) -> u64 {
    encode(value, order, ByteOrder::NATIVE)
}

/// [`decode`] for the executing platform
#[inline]
pub fn from_raw(bits: u64, order: ByteOrder) -> f64 {
    decode(bits, order, ByteOrder::NATIVE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BE: ByteOrder = ByteOrder::BigEndian;
    const LE: ByteOrder = ByteOrder::LittleEndian;

    #[test]
    fn test_same_order_is_identity() {
        assert_eq!(encode(1.0, LE, LE), 1.0f64.to_bits());
        assert_eq!(encode(1.0, BE, BE), 1.0f64.to_bits());
    }

    #[test]
    fn test_foreign_order_swaps() {
        // 1.0 = 0x3FF0_0000_0000_0000
        assert_eq!(encode(1.0, BE, LE), 0x0000_0000_0000_F03F);
        assert_eq!(decode(0x0000_0000_0000_F03F, BE, LE), 1.0);
    }

    #[test]
    fn test_special_values() {
        for value in [0.0, -0.0, f64::INFINITY, f64::NEG_INFINITY, f64::MIN_POSITIVE, f64::MAX] {
            for order in [BE, LE] {
                let back = from_raw(to_raw(value, order), order);
                assert_eq!(back.to_bits(), value.to_bits());
            }
        }
    }

    #[test]
    fn test_stored_bytes_follow_order() {
        let value = 0.1f64;
        assert_eq!(to_raw(value, BE).to_ne_bytes(), value.to_be_bytes());
        assert_eq!(to_raw(value, LE).to_ne_bytes(), value.to_le_bytes());
    }

    proptest! {
        #[test]
        fn test_roundtrip_any_bits(bits in any::<u64>()) {
            let value = f64::from_bits(bits);
            for native in [BE, LE] {
                for order in [BE, LE] {
                    let back = decode(encode(value, order, native), order, native);
                    prop_assert_eq!(back.to_bits(), bits);
                }
            }
        }

        #[test]
        fn test_endian_symmetry(bits in any::<u64>()) {
            let value = f64::from_bits(bits);
            for native in [BE, LE] {
                prop_assert_eq!(
                    encode(value, BE, native),
                    encode(value, LE, native).swap_bytes()
                );
            }
        }
    }
}
