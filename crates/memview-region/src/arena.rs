//! Arenas - allocation and lifetime of native segments

use memview_core::{AccessError, AccessResult, ValueLayout};

use crate::{RawMemory, Segment, Session, SessionKind};

/// Arena configuration
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    /// Session kind of every segment allocated in the arena
    pub kind: SessionKind,
    /// Largest single allocation in bytes, alignment padding included
    pub max_allocation: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        ArenaConfig {
            kind: SessionKind::Confined,
            max_allocation: 1 << 40,
        }
    }
}

impl ArenaConfig {
    /// Configuration for arenas accessed from several threads
    pub fn shared() -> Self {
        ArenaConfig {
            kind: SessionKind::Shared,
            ..Default::default()
        }
    }

    /// Configuration for arenas that live for the whole process
    pub fn global() -> Self {
        ArenaConfig {
            kind: SessionKind::Global,
            ..Default::default()
        }
    }
}

/// Arena - owns a session and allocates native segments in it
///
/// Dropping the arena closes its session; segments outliving the arena
/// remain memory-safe but every access fails with `RegionReleased`.
#[derive(Debug)]
pub struct Arena {
    session: Session,
    config: ArenaConfig,
}

impl Arena {
    pub fn new(config: ArenaConfig) -> Self {
        let session = Session::new(config.kind);
        tracing::debug!(session = session.id(), kind = ?config.kind, "arena opened");
        Arena { session, config }
    }

    /// Arena confined to the current thread
    pub fn confined() -> Self {
        Arena::new(ArenaConfig::default())
    }

    /// Arena accessible from any thread
    pub fn shared() -> Self {
        Arena::new(ArenaConfig::shared())
    }

    /// Arena that can never be closed
    pub fn global() -> Self {
        Arena::new(ArenaConfig::global())
    }

    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[inline]
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Allocate a zeroed segment of `byte_size` bytes aligned to `byte_alignment`
    pub fn allocate(&self, byte_size: u64, byte_alignment: u64) -> AccessResult<Segment> {
        if !byte_alignment.is_power_of_two() {
            return Err(AccessError::InvalidAlignment(byte_alignment));
        }
        let footprint = byte_size.saturating_add(RawMemory::padding(byte_alignment));
        if footprint > self.config.max_allocation {
            return Err(AccessError::AllocationFailed {
                requested: footprint,
                limit: self.config.max_allocation,
            });
        }
        // allocation in a closed arena would hand out dead segments
        drop(self.session.acquire()?);

        let memory = RawMemory::native(byte_size, byte_alignment)?;
        tracing::debug!(
            session = self.session.id(),
            byte_size,
            byte_alignment,
            address = memory.base_address(),
            "segment allocated"
        );
        Ok(Segment::new(memory, self.session.clone()))
    }

    /// Allocate room for `count` values of `layout`, aligned as the layout requires
    pub fn allocate_array(&self, layout: &ValueLayout, count: u64) -> AccessResult<Segment> {
        let byte_size = layout
            .byte_size()
            .checked_mul(count)
            .ok_or(AccessError::AllocationFailed {
                requested: u64::MAX,
                limit: self.config.max_allocation,
            })?;
        self.allocate(byte_size, layout.byte_alignment())
    }

    /// Allocate a segment holding a copy of `data`
    pub fn allocate_from(&self, data: &[u8], byte_alignment: u64) -> AccessResult<Segment> {
        let segment = self.allocate(data.len() as u64, byte_alignment)?;
        segment.copy_from_slice(0, data)?;
        Ok(segment)
    }

    /// Close the arena's session
    pub fn close(&self) -> AccessResult<()> {
        self.session.close()
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        if self.session.is_closable() && self.session.is_alive() {
            if let Err(err) = self.session.close() {
                tracing::warn!(session = self.session.id(), error = %err, "arena dropped without closing");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memview_core::COMPLEX_DOUBLE;

    #[test]
    fn test_allocate_aligned() {
        let arena = Arena::confined();
        let segment = arena.allocate(48, 16).unwrap();
        assert_eq!(segment.byte_size(), 48);
        assert_eq!(segment.address() % 16, 0);
        assert!(segment.is_native());
        assert!(segment.session().same_as(arena.session()));
    }

    #[test]
    fn test_allocate_array() {
        let arena = Arena::confined();
        let layout = COMPLEX_DOUBLE.with_byte_alignment(16).unwrap();
        let segment = arena.allocate_array(&layout, 4).unwrap();
        assert_eq!(segment.byte_size(), 64);
        assert_eq!(segment.address() % 16, 0);
    }

    #[test]
    fn test_allocation_limit() {
        let arena = Arena::new(ArenaConfig {
            max_allocation: 32,
            ..Default::default()
        });
        assert!(arena.allocate(24, 8).is_ok());
        assert_eq!(
            arena.allocate(25, 8).map(|_| ()),
            Err(AccessError::AllocationFailed {
                requested: 33,
                limit: 32
            })
        );
    }

    #[test]
    fn test_allocation_limit_counts_padding() {
        let arena = Arena::confined();
        assert_eq!(
            arena.allocate(16, 1 << 40).map(|_| ()),
            Err(AccessError::AllocationFailed {
                requested: 16 + (1 << 40),
                limit: 1 << 40
            })
        );
        assert_eq!(
            arena.allocate(16, 1 << 63).map(|_| ()),
            Err(AccessError::AllocationFailed {
                requested: (1 << 63) + 16,
                limit: 1 << 40
            })
        );
        assert_eq!(
            arena.allocate(16, 24).map(|_| ()),
            Err(AccessError::InvalidAlignment(24))
        );
    }

    #[test]
    fn test_allocate_after_close() {
        let arena = Arena::confined();
        arena.close().unwrap();
        assert_eq!(
            arena.allocate(8, 8).map(|_| ()),
            Err(AccessError::RegionReleased)
        );
    }

    #[test]
    fn test_allocate_from() {
        let arena = Arena::confined();
        let segment = arena.allocate_from(&[1, 2, 3, 4, 5], 1).unwrap();
        assert_eq!(segment.snapshot().unwrap().as_ref(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_drop_releases_segments() {
        let segment = {
            let arena = Arena::confined();
            arena.allocate(16, 8).unwrap()
        };
        assert!(!segment.is_alive());
        assert_eq!(segment.snapshot(), Err(AccessError::RegionReleased));
    }

    #[test]
    fn test_global_arena_survives_drop() {
        let segment = {
            let arena = Arena::global();
            assert_eq!(arena.close(), Err(AccessError::SessionNotClosable));
            arena.allocate(16, 8).unwrap()
        };
        assert!(segment.is_alive());
    }
}
