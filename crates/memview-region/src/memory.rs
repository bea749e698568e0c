//! Raw backing memory for regions
//!
//! Memory is stored as 64-bit atomic words. Byte `b` of the store lives in
//! word `b / 8` at bit position `8 * (b % 8)`, independent of the host byte
//! order. Raw values are exchanged in native byte order, so an 8-byte read
//! at byte index `i` returns `u64::from_ne_bytes(bytes[i..i + 8])`.
//!
//! Word-aligned accesses are single atomic operations. Unaligned accesses
//! touch two neighbouring words and are not atomic as a whole.

use std::sync::atomic::{AtomicU64, Ordering};

use memview_core::{AccessError, AccessResult};

const WORD: u64 = 8;

/// Kind of backing memory, which decides how addresses are formed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryKind {
    /// Off-heap memory; addresses are real process addresses
    Native,
    /// Memory modelled on an array of carriers; addresses are byte offsets
    /// from the start of the array
    Heap(HeapCarrier),
}

/// Element type of a heap carrier array
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeapCarrier {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl HeapCarrier {
    /// Width of one carrier element in bytes
    #[inline]
    pub fn width(self) -> u64 {
        match self {
            HeapCarrier::Byte => 1,
            HeapCarrier::Short => 2,
            HeapCarrier::Int | HeapCarrier::Float => 4,
            HeapCarrier::Long | HeapCarrier::Double => 8,
        }
    }
}

/// Word-backed byte store
pub struct RawMemory {
    words: Box<[AtomicU64]>,
    /// Address of storage byte 0
    origin: u64,
    /// Storage byte index of the first usable byte
    start: u64,
    /// Usable length in bytes
    len: u64,
    kind: MemoryKind,
}

impl RawMemory {
    /// Allocate zeroed native memory whose first usable byte is aligned to `byte_alignment`
    pub fn native(len: u64, byte_alignment: u64) -> AccessResult<Self> {
        if !byte_alignment.is_power_of_two() {
            return Err(AccessError::InvalidAlignment(byte_alignment));
        }
        let padding = Self::padding(byte_alignment);
        let words = zeroed_words(len.checked_add(padding).ok_or(AccessError::AllocationFailed {
            requested: len,
            limit: u64::MAX - padding,
        })?)?;
        let origin = words.as_ptr() as u64;
        let start = (byte_alignment - origin % byte_alignment) % byte_alignment;

        Ok(RawMemory {
            words,
            origin,
            start,
            len,
            kind: MemoryKind::Native,
        })
    }

    /// Extra bytes reserved so that an aligned start always fits
    #[inline]
    pub fn padding(byte_alignment: u64) -> u64 {
        byte_alignment.max(WORD)
    }

    /// Allocate zeroed heap memory of `count` carrier elements
    pub fn heap(carrier: HeapCarrier, count: u64) -> AccessResult<Self> {
        let len = count
            .checked_mul(carrier.width())
            .ok_or(AccessError::AllocationFailed {
                requested: u64::MAX,
                limit: u64::MAX,
            })?;
        Ok(RawMemory {
            words: zeroed_words(len)?,
            origin: 0,
            start: 0,
            len,
            kind: MemoryKind::Heap(carrier),
        })
    }

    #[inline]
    pub fn kind(&self) -> MemoryKind {
        self.kind
    }

    /// Address of the first usable byte
    #[inline]
    pub fn base_address(&self) -> u64 {
        self.origin + self.start
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bits folded into every address before the alignment test
    ///
    /// Native memory supports any alignment its addresses satisfy. Heap memory
    /// is only aligned to its carrier width, so requests coarser than the
    /// carrier always fail.
    #[inline]
    pub fn max_align_mask(&self) -> u64 {
        match self.kind {
            MemoryKind::Native => 0,
            MemoryKind::Heap(carrier) => carrier.width(),
        }
    }

    #[inline]
    fn index(&self, address: u64) -> u64 {
        address - self.origin
    }

    /// Read 8 bytes at `address` in native byte order
    pub fn read_u64(&self, address: u64) -> u64 {
        let index = self.index(address);
        let word = (index / WORD) as usize;
        let shift = (index % WORD) * 8;

        let le = if shift == 0 {
            self.words[word].load(Ordering::Relaxed)
        } else {
            let lo = self.words[word].load(Ordering::Relaxed) >> shift;
            let hi = self.words[word + 1].load(Ordering::Relaxed) << (64 - shift);
            lo | hi
        };
        u64::from_ne_bytes(le.to_le_bytes())
    }

    /// Write 8 bytes at `address` in native byte order
    pub fn write_u64(&self, address: u64, bits: u64) {
        let index = self.index(address);
        let word = (index / WORD) as usize;
        let shift = (index % WORD) * 8;
        let le = u64::from_le_bytes(bits.to_ne_bytes());

        if shift == 0 {
            self.words[word].store(le, Ordering::Relaxed);
            return;
        }

        let lo_mask = u64::MAX << shift;
        let lo_bits = le << shift;
        merge(&self.words[word], lo_mask, lo_bits);

        let hi_mask = u64::MAX >> (64 - shift);
        let hi_bits = le >> (64 - shift);
        merge(&self.words[word + 1], hi_mask, hi_bits);
    }

    /// Atomic 8-byte load at a word-aligned `address`
    pub fn load_u64(&self, address: u64, ordering: Ordering) -> u64 {
        let index = self.index(address);
        debug_assert_eq!(index % WORD, 0, "atomic load at unaligned index {}", index);
        let le = self.words[(index / WORD) as usize].load(ordering);
        u64::from_ne_bytes(le.to_le_bytes())
    }

    /// Atomic 8-byte store at a word-aligned `address`
    pub fn store_u64(&self, address: u64, bits: u64, ordering: Ordering) {
        let index = self.index(address);
        debug_assert_eq!(index % WORD, 0, "atomic store at unaligned index {}", index);
        let le = u64::from_le_bytes(bits.to_ne_bytes());
        self.words[(index / WORD) as usize].store(le, ordering);
    }

    pub fn read_u8(&self, address: u64) -> u8 {
        let index = self.index(address);
        let shift = (index % WORD) * 8;
        (self.words[(index / WORD) as usize].load(Ordering::Relaxed) >> shift) as u8
    }

    pub fn write_u8(&self, address: u64, byte: u8) {
        let index = self.index(address);
        let shift = (index % WORD) * 8;
        merge(
            &self.words[(index / WORD) as usize],
            0xFFu64 << shift,
            (byte as u64) << shift,
        );
    }
}

impl std::fmt::Debug for RawMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawMemory")
            .field("kind", &self.kind)
            .field("base", &format_args!("{:#x}", self.base_address()))
            .field("len", &self.len)
            .finish()
    }
}

/// Replace the bits selected by `mask` in `word` with `bits`
#[inline]
fn merge(word: &AtomicU64, mask: u64, bits: u64) {
    let mut current = word.load(Ordering::Relaxed);
    loop {
        let next = (current & !mask) | (bits & mask);
        match word.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return,
            Err(actual) => current = actual,
        }
    }
}

fn zeroed_words(len: u64) -> AccessResult<Box<[AtomicU64]>> {
    let count = len.div_ceil(WORD);
    let count = usize::try_from(count).map_err(|_| AccessError::AllocationFailed {
        requested: len,
        limit: usize::MAX as u64,
    })?;
    Ok((0..count).map(|_| AtomicU64::new(0)).collect())
}
