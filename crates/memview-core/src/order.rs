//! Byte order of values stored in memory

/// Byte order of a multi-byte value in memory
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

impl ByteOrder {
    /// Byte order of the executing platform
    #[cfg(target_endian = "big")]
    pub const NATIVE: ByteOrder = ByteOrder::BigEndian;
    #[cfg(target_endian = "little")]
    pub const NATIVE: ByteOrder = ByteOrder::LittleEndian;

    #[inline]
    pub fn is_big_endian(self) -> bool {
        self == ByteOrder::BigEndian
    }

    #[inline]
    pub fn is_native(self) -> bool {
        self == Self::NATIVE
    }

    /// The opposite byte order
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            ByteOrder::BigEndian => ByteOrder::LittleEndian,
            ByteOrder::LittleEndian => ByteOrder::BigEndian,
        }
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        Self::NATIVE
    }
}
