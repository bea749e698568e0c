//! Composite values carried by memory views

use std::fmt;

/// Size of one complex double in bytes (two `f64` components)
pub const COMPLEX_DOUBLE_SIZE: u64 = 16;

/// Size of one component in bytes
pub const COMPONENT_SIZE: u64 = 8;

/// A pair of double-precision components, real and imaginary
///
/// Equality follows IEEE semantics per component. Use [`ComplexDouble::to_bits`]
/// for bit-exact comparison (NaN payloads, signed zeros).
#[derive(Clone, Copy, PartialEq, Default)]
pub struct ComplexDouble {
    re: f64,
    im: f64,
}

impl ComplexDouble {
    pub const ZERO: ComplexDouble = ComplexDouble { re: 0.0, im: 0.0 };

    #[inline]
    pub const fn new(re: f64, im: f64) -> Self {
        ComplexDouble { re, im }
    }

    #[inline]
    pub const fn re(self) -> f64 {
        self.re
    }

    #[inline]
    pub const fn im(self) -> f64 {
        self.im
    }

    /// Raw bit patterns of both components
    #[inline]
    pub fn to_bits(self) -> (u64, u64) {
        (self.re.to_bits(), self.im.to_bits())
    }

    #[inline]
    pub fn from_bits(re: u64, im: u64) -> Self {
        ComplexDouble {
            re: f64::from_bits(re),
            im: f64::from_bits(im),
        }
    }

    /// Bit-exact equality of both components
    #[inline]
    pub fn bit_eq(self, other: ComplexDouble) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl From<(f64, f64)> for ComplexDouble {
    fn from((re, im): (f64, f64)) -> Self {
        ComplexDouble::new(re, im)
    }
}

impl From<ComplexDouble> for (f64, f64) {
    fn from(c: ComplexDouble) -> Self {
        (c.re, c.im)
    }
}

impl fmt::Debug for ComplexDouble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Complex({:?}, {:?})", self.re, self.im)
    }
}

impl fmt::Display for ComplexDouble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im.is_sign_negative() {
            write!(f, "{}-{}i", self.re, -self.im)
        } else {
            write!(f, "{}+{}i", self.re, self.im)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_structural_equality() {
        assert_eq!(ComplexDouble::new(1.0, 2.0), ComplexDouble::new(1.0, 2.0));
        assert_ne!(ComplexDouble::new(1.0, 2.0), ComplexDouble::new(2.0, 1.0));
        // IEEE: NaN != NaN, but the bits agree
        let nan = ComplexDouble::new(f64::NAN, 0.0);
        assert_ne!(nan, nan);
        assert!(nan.bit_eq(nan));
    }

    #[test]
    fn test_signed_zero_bits() {
        let pos = ComplexDouble::new(0.0, 0.0);
        let neg = ComplexDouble::new(-0.0, -0.0);
        assert_eq!(pos, neg);
        assert!(!pos.bit_eq(neg));
    }

    #[test]
    fn test_display() {
        assert_eq!(ComplexDouble::new(1.5, -2.0).to_string(), "1.5-2i");
        assert_eq!(ComplexDouble::new(0.0, 3.0).to_string(), "0+3i");
    }

    #[test]
    fn test_tuple_conversions() {
        let c = ComplexDouble::from((1.5, -0.25));
        assert_eq!(c, ComplexDouble::new(1.5, -0.25));
        let (re, im): (f64, f64) = c.into();
        assert_eq!((re, im), (1.5, -0.25));
    }

    proptest! {
        #[test]
        fn test_bits_roundtrip(re in any::<u64>(), im in any::<u64>()) {
            let c = ComplexDouble::from_bits(re, im);
            prop_assert_eq!(c.to_bits(), (re, im));
        }
    }
}
