//! Segments - bounded views over backing memory
//!
//! A segment is `[address, address + byte_size)` over a shared [`RawMemory`],
//! tied to a [`Session`]. Raw reads and writes are only available through a
//! [`ValidatedRegion`], which [`check_access`] hands out after the bounds,
//! mutability and liveness checks have passed.

use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use memview_core::{AccessError, AccessResult};

use crate::{HeapCarrier, MemoryKind, RawMemory, Session, SessionGuard};

/// Bounded view over backing memory
#[derive(Clone)]
pub struct Segment {
    memory: Arc<RawMemory>,
    session: Session,
    address: u64,
    byte_size: u64,
    read_only: bool,
}

impl Segment {
    pub(crate) fn new(memory: RawMemory, session: Session) -> Self {
        Segment {
            address: memory.base_address(),
            byte_size: memory.len(),
            memory: Arc::new(memory),
            session,
            read_only: false,
        }
    }

    /// Zeroed heap segment of `count` carrier elements, in the global session
    pub fn heap(carrier: HeapCarrier, count: u64) -> AccessResult<Self> {
        Ok(Segment::new(RawMemory::heap(carrier, count)?, Session::global()))
    }

    /// Heap segment over a copy of `values`, stored in native byte order
    pub fn from_f64s(values: &[f64]) -> AccessResult<Self> {
        let segment = Segment::heap(HeapCarrier::Double, values.len() as u64)?;
        {
            let region = check_access(Some(&segment), 0, segment.byte_size, false)?;
            for (i, value) in values.iter().enumerate() {
                region.write_u64(segment.address + i as u64 * 8, value.to_bits());
            }
        }
        Ok(segment)
    }

    /// Address of the first byte
    #[inline]
    pub fn address(&self) -> u64 {
        self.address
    }

    #[inline]
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    #[inline]
    pub fn is_native(&self) -> bool {
        self.memory.kind() == MemoryKind::Native
    }

    #[inline]
    pub fn kind(&self) -> MemoryKind {
        self.memory.kind()
    }

    /// See [`RawMemory::max_align_mask`]
    #[inline]
    pub fn max_align_mask(&self) -> u64 {
        self.memory.max_align_mask()
    }

    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_alive(&self) -> bool {
        self.session.is_alive()
    }

    /// Read-only view of the same bytes
    pub fn as_read_only(&self) -> Segment {
        Segment {
            read_only: true,
            ..self.clone()
        }
    }

    /// Sub-segment `[offset, offset + new_size)`
    pub fn as_slice(&self, offset: i64, new_size: u64) -> AccessResult<Segment> {
        self.check_bounds(offset, new_size)?;
        Ok(Segment {
            address: self.address + offset as u64,
            byte_size: new_size,
            ..self.clone()
        })
    }

    /// Sub-segment from `offset` to the end
    pub fn as_slice_from(&self, offset: i64) -> AccessResult<Segment> {
        let remaining = u64::try_from(offset)
            .ok()
            .and_then(|start| self.byte_size.checked_sub(start))
            .ok_or(AccessError::OutOfBounds {
                offset,
                size: 0,
                length: self.byte_size,
            })?;
        self.as_slice(offset, remaining)
    }

    /// Check `[offset, offset + size)` lies within the segment
    pub fn check_bounds(&self, offset: i64, size: u64) -> AccessResult<()> {
        let fits = offset >= 0 && size <= self.byte_size && offset as u64 <= self.byte_size - size;
        if fits {
            Ok(())
        } else {
            Err(AccessError::OutOfBounds {
                offset,
                size,
                length: self.byte_size,
            })
        }
    }

    /// Copy of the segment contents
    pub fn snapshot(&self) -> AccessResult<Bytes> {
        let region = check_access(Some(self), 0, self.byte_size, true)?;
        let mut buf = BytesMut::with_capacity(buffer_len(self.byte_size)?);
        for i in 0..self.byte_size {
            buf.extend_from_slice(&[region.read_u8(self.address + i)]);
        }
        Ok(buf.freeze())
    }

    /// Overwrite bytes starting at `offset`
    pub fn copy_from_slice(&self, offset: i64, data: &[u8]) -> AccessResult<()> {
        let region = check_access(Some(self), offset, data.len() as u64, false)?;
        let start = self.address + offset as u64;
        for (i, byte) in data.iter().enumerate() {
            region.write_u8(start + i as u64, *byte);
        }
        Ok(())
    }

    /// Set every byte to `value`
    pub fn fill(&self, value: u8) -> AccessResult<()> {
        let region = check_access(Some(self), 0, self.byte_size, false)?;
        for i in 0..self.byte_size {
            region.write_u8(self.address + i, value);
        }
        Ok(())
    }
}

/// In-memory buffer length for `byte_size` bytes
fn buffer_len(byte_size: u64) -> AccessResult<usize> {
    usize::try_from(byte_size).map_err(|_| AccessError::AllocationFailed {
        requested: byte_size,
        limit: usize::MAX as u64,
    })
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segment")
            .field("kind", &self.memory.kind())
            .field("address", &format_args!("{:#x}", self.address))
            .field("byte_size", &self.byte_size)
            .field("read_only", &self.read_only)
            .field("session", &self.session)
            .finish()
    }
}

/// Validated access to a span of a segment
///
/// Holds the segment's session open. Raw access is confined to the span that
/// was checked; writes require a span checked for writing.
pub struct ValidatedRegion<'a> {
    segment: &'a Segment,
    start: u64,
    end: u64,
    writable: bool,
    _session: SessionGuard<'a>,
}

impl<'a> ValidatedRegion<'a> {
    #[inline]
    pub fn segment(&self) -> &'a Segment {
        self.segment
    }

    /// Base address of the validated segment
    #[inline]
    pub fn base_address(&self) -> u64 {
        self.segment.address
    }

    #[inline]
    pub fn max_align_mask(&self) -> u64 {
        self.segment.max_align_mask()
    }

    #[inline]
    fn debug_check(&self, address: u64, width: u64) {
        debug_assert!(
            address >= self.start && address + width <= self.end,
            "raw access at {:#x}+{} outside validated span {:#x}..{:#x}",
            address,
            width,
            self.start,
            self.end
        );
    }

    /// Read 8 bytes at `address` in native byte order
    #[inline]
    pub fn read_u64(&self, address: u64) -> u64 {
        self.debug_check(address, 8);
        self.segment.memory.read_u64(address)
    }

    /// Write 8 bytes at `address` in native byte order
    #[inline]
    pub fn write_u64(&self, address: u64, bits: u64) {
        debug_assert!(self.writable, "write through a read-only validation");
        self.debug_check(address, 8);
        self.segment.memory.write_u64(address, bits)
    }

    /// Atomic 8-byte load; `address` must be 8-byte aligned
    #[inline]
    pub fn load_u64(&self, address: u64, ordering: Ordering) -> u64 {
        self.debug_check(address, 8);
        self.segment.memory.load_u64(address, ordering)
    }

    /// Atomic 8-byte store; `address` must be 8-byte aligned
    #[inline]
    pub fn store_u64(&self, address: u64, bits: u64, ordering: Ordering) {
        debug_assert!(self.writable, "write through a read-only validation");
        self.debug_check(address, 8);
        self.segment.memory.store_u64(address, bits, ordering)
    }

    #[inline]
    pub fn read_u8(&self, address: u64) -> u8 {
        self.debug_check(address, 1);
        self.segment.memory.read_u8(address)
    }

    #[inline]
    pub fn write_u8(&self, address: u64, byte: u8) {
        debug_assert!(self.writable, "write through a read-only validation");
        self.debug_check(address, 1);
        self.segment.memory.write_u8(address, byte)
    }
}

/// Gate an access of `size` bytes at `offset`
///
/// Fails when the segment is absent, when a write targets a read-only
/// segment, when the span exceeds the segment, or when the session is
/// closed or confined to another thread. The returned guard keeps the
/// session open until dropped.
pub fn check_access(
    segment: Option<&Segment>,
    offset: i64,
    size: u64,
    read_only: bool,
) -> AccessResult<ValidatedRegion<'_>> {
    let segment = segment.ok_or(AccessError::InvalidRegion)?;
    let result = gate(segment, offset, size, read_only);
    if let Err(err) = &result {
        tracing::trace!(offset, size, read_only, error = %err, "access rejected");
    }
    result
}

fn gate(segment: &Segment, offset: i64, size: u64, read_only: bool) -> AccessResult<ValidatedRegion<'_>> {
    if !read_only && segment.read_only {
        return Err(AccessError::ReadOnlyViolation);
    }
    segment.check_bounds(offset, size)?;
    let session = segment.session.acquire()?;

    let start = segment.address + offset as u64;
    Ok(ValidatedRegion {
        segment,
        start,
        end: start + size,
        writable: !read_only,
        _session: session,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arena, ArenaConfig};

    #[test]
    fn test_absent_region() {
        assert!(matches!(
            check_access(None, 0, 16, true),
            Err(AccessError::InvalidRegion)
        ));
    }

    #[test]
    fn test_bounds_edges() {
        let arena = Arena::confined();
        let segment = arena.allocate(64, 8).unwrap();

        assert!(check_access(Some(&segment), 48, 16, true).is_ok());
        assert!(matches!(
            check_access(Some(&segment), 49, 16, true),
            Err(AccessError::OutOfBounds {
                offset: 49,
                size: 16,
                length: 64
            })
        ));
        assert!(matches!(
            check_access(Some(&segment), -1, 16, true),
            Err(AccessError::OutOfBounds { .. })
        ));
        assert!(matches!(
            check_access(Some(&segment), 0, 65, true),
            Err(AccessError::OutOfBounds { .. })
        ));
        assert!(matches!(
            check_access(Some(&segment), i64::MAX, 16, true),
            Err(AccessError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_read_only_view() {
        let arena = Arena::confined();
        let segment = arena.allocate(16, 8).unwrap();
        let view = segment.as_read_only();

        assert!(check_access(Some(&view), 0, 16, true).is_ok());
        assert!(matches!(
            check_access(Some(&view), 0, 16, false),
            Err(AccessError::ReadOnlyViolation)
        ));
        assert!(!segment.is_read_only());
    }

    #[test]
    fn test_closed_session() {
        let arena = Arena::confined();
        let segment = arena.allocate(16, 8).unwrap();
        arena.close().unwrap();

        assert!(!segment.is_alive());
        assert!(matches!(
            check_access(Some(&segment), 0, 16, true),
            Err(AccessError::RegionReleased)
        ));
    }

    #[test]
    fn test_bounds_checked_before_liveness() {
        let arena = Arena::confined();
        let segment = arena.allocate(16, 8).unwrap();
        arena.close().unwrap();

        assert!(matches!(
            check_access(Some(&segment), 8, 16, true),
            Err(AccessError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_slices_share_memory() {
        let arena = Arena::new(ArenaConfig::shared());
        let segment = arena.allocate(32, 8).unwrap();
        let tail = segment.as_slice(16, 16).unwrap();
        assert_eq!(tail.address(), segment.address() + 16);

        tail.copy_from_slice(0, &[0xAB; 4]).unwrap();
        let bytes = segment.snapshot().unwrap();
        assert_eq!(&bytes[16..20], &[0xAB; 4]);
        assert_eq!(&bytes[..16], &[0u8; 16]);

        assert!(segment.as_slice(24, 16).is_err());
        assert_eq!(segment.as_slice_from(24).unwrap().byte_size(), 8);
        assert!(segment.as_slice_from(33).is_err());
    }

    #[test]
    fn test_fill_and_snapshot() {
        let segment = Segment::heap(HeapCarrier::Byte, 10).unwrap();
        segment.fill(0x5A).unwrap();
        assert_eq!(segment.snapshot().unwrap().as_ref(), &[0x5A; 10]);
        assert_eq!(
            segment.as_read_only().fill(0),
            Err(AccessError::ReadOnlyViolation)
        );
    }

    #[test]
    fn test_buffer_len() {
        assert_eq!(buffer_len(0), Ok(0));
        assert_eq!(buffer_len(64), Ok(64));
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn test_buffer_len_exceeds_address_space() {
        assert_eq!(
            buffer_len(1 << 32),
            Err(AccessError::AllocationFailed {
                requested: 1 << 32,
                limit: u32::MAX as u64
            })
        );
    }

    #[test]
    fn test_kind_and_validated_segment() {
        let arena = Arena::confined();
        let native = arena.allocate(16, 8).unwrap();
        assert_eq!(native.kind(), MemoryKind::Native);

        let heap = Segment::heap(HeapCarrier::Int, 4).unwrap();
        assert_eq!(heap.kind(), MemoryKind::Heap(HeapCarrier::Int));
        assert!(!heap.is_native());

        let region = check_access(Some(&native), 8, 8, true).unwrap();
        assert_eq!(region.segment().address(), native.address());
        assert_eq!(region.base_address(), native.address());
    }

    #[test]
    fn test_snapshot_while_validated_and_close_pending() {
        let arena = Arc::new(Arena::shared());
        let segment = arena.allocate(16, 8).unwrap();
        segment.fill(0x11).unwrap();

        let region = check_access(Some(&segment), 0, 16, true).unwrap();
        let closer = {
            let arena = Arc::clone(&arena);
            std::thread::spawn(move || arena.close())
        };
        std::thread::sleep(std::time::Duration::from_millis(100));

        assert!(segment.is_alive());
        assert_eq!(segment.snapshot().unwrap().as_ref(), &[0x11; 16]);
        drop(region);

        assert_eq!(closer.join().unwrap(), Ok(()));
        assert_eq!(segment.snapshot(), Err(AccessError::RegionReleased));
    }

    #[test]
    fn test_from_f64s() {
        let segment = Segment::from_f64s(&[1.0, -2.5]).unwrap();
        assert_eq!(segment.byte_size(), 16);
        assert_eq!(segment.max_align_mask(), 8);

        let bytes = segment.snapshot().unwrap();
        assert_eq!(&bytes[..8], &1.0f64.to_ne_bytes());
        assert_eq!(&bytes[8..], &(-2.5f64).to_ne_bytes());
    }
}
