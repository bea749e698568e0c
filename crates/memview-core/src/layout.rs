//! Value layouts: carrier, byte order and alignment of a value in memory
//!
//! A layout is the static description a memory view handle is built from.
//! The handle keeps only what it needs at access time (byte order, size and
//! the alignment mask `byte_alignment - 1`).

use crate::{AccessError, AccessResult, ByteOrder, COMPLEX_DOUBLE_SIZE, COMPONENT_SIZE};

/// Carrier type of a layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Carrier {
    /// Single `f64`
    Double,
    /// Two consecutive `f64` components, real then imaginary
    ComplexDouble,
}

impl Carrier {
    #[inline]
    pub fn byte_size(self) -> u64 {
        match self {
            Carrier::Double => COMPONENT_SIZE,
            Carrier::ComplexDouble => COMPLEX_DOUBLE_SIZE,
        }
    }

    /// Default alignment: that of one `f64` component (C `double _Complex` aligns to 8)
    #[inline]
    pub fn natural_alignment(self) -> u64 {
        COMPONENT_SIZE
    }

    pub fn name(self) -> &'static str {
        match self {
            Carrier::Double => "double",
            Carrier::ComplexDouble => "complex_double",
        }
    }
}

/// Layout of a value in memory
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ValueLayout {
    carrier: Carrier,
    order: ByteOrder,
    byte_alignment: u64,
}

/// Native-order, naturally aligned `f64`
pub const DOUBLE: ValueLayout = ValueLayout::new(Carrier::Double);

/// Native-order, 8-byte aligned complex double
pub const COMPLEX_DOUBLE: ValueLayout = ValueLayout::new(Carrier::ComplexDouble);

impl ValueLayout {
    pub const fn new(carrier: Carrier) -> Self {
        ValueLayout {
            carrier,
            order: ByteOrder::NATIVE,
            byte_alignment: COMPONENT_SIZE,
        }
    }

    #[inline]
    pub fn carrier(&self) -> Carrier {
        self.carrier
    }

    #[inline]
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    #[inline]
    pub fn byte_size(&self) -> u64 {
        self.carrier.byte_size()
    }

    #[inline]
    pub fn byte_alignment(&self) -> u64 {
        self.byte_alignment
    }

    /// Mask such that `address & mask == 0` means aligned
    #[inline]
    pub fn alignment_mask(&self) -> u64 {
        self.byte_alignment - 1
    }

    /// Same layout with another byte order
    pub fn with_order(self, order: ByteOrder) -> Self {
        ValueLayout { order, ..self }
    }

    /// Same layout with another alignment, which must be a power of two
    pub fn with_byte_alignment(self, byte_alignment: u64) -> AccessResult<Self> {
        if !byte_alignment.is_power_of_two() {
            return Err(AccessError::InvalidAlignment(byte_alignment));
        }
        Ok(ValueLayout {
            byte_alignment,
            ..self
        })
    }

    /// Same layout with no alignment requirement
    pub fn unaligned(self) -> Self {
        ValueLayout {
            byte_alignment: 1,
            ..self
        }
    }
}
