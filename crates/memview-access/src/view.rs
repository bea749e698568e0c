//! The memory view family
//!
//! Every typed handle implements [`MemoryView`]: a mode-aware `read`/`write`
//! pair over an optional segment, from which the typed API (`get`, `set`,
//! indexed access) and the dynamically typed [`MemoryView::invoke`] follow.

use memview_core::{AccessError, AccessMode, AccessResult, Invocation};
use memview_region::Segment;

use crate::dispatch::{self, Call, Scalar, ScalarValue};

/// A typed view of values in memory segments
pub trait MemoryView {
    /// Value type read and written by the view
    type Value: ScalarValue;

    /// Size of one value in bytes
    fn byte_size(&self) -> u64;

    /// How dynamically typed arguments are matched
    fn invocation(&self) -> Invocation;

    /// Whether the view implements `mode`
    fn is_supported(&self, mode: AccessMode) -> bool {
        mode.is_plain()
    }

    /// Read one value at `offset` with a get-type `mode`
    fn read(&self, mode: AccessMode, segment: Option<&Segment>, offset: i64) -> AccessResult<Self::Value>;

    /// Write one value at `offset` with a set-type `mode`
    fn write(
        &self,
        mode: AccessMode,
        segment: Option<&Segment>,
        offset: i64,
        value: Self::Value,
    ) -> AccessResult<()>;

    #[inline]
    fn get(&self, segment: &Segment, offset: i64) -> AccessResult<Self::Value> {
        self.read(AccessMode::Get, Some(segment), offset)
    }

    #[inline]
    fn set(&self, segment: &Segment, offset: i64, value: Self::Value) -> AccessResult<()> {
        self.write(AccessMode::Set, Some(segment), offset, value)
    }

    /// Get the `index`-th value of a segment holding consecutive values
    fn get_at_index(&self, segment: &Segment, index: u64) -> AccessResult<Self::Value> {
        let offset = index_offset(segment, index, self.byte_size())?;
        self.get(segment, offset)
    }

    /// Set the `index`-th value of a segment holding consecutive values
    fn set_at_index(&self, segment: &Segment, index: u64, value: Self::Value) -> AccessResult<()> {
        let offset = index_offset(segment, index, self.byte_size())?;
        self.set(segment, offset, value)
    }

    /// Perform `mode` with dynamically typed arguments
    fn invoke(&self, mode: AccessMode, call: Call<'_>) -> AccessResult<Option<Scalar>>
    where
        Self: Sized,
    {
        dispatch::invoke(self, mode, call)
    }
}

fn index_offset(segment: &Segment, index: u64, size: u64) -> AccessResult<i64> {
    index
        .checked_mul(size)
        .and_then(|offset| i64::try_from(offset).ok())
        .ok_or(AccessError::OutOfBounds {
            offset: i64::MAX,
            size,
            length: segment.byte_size(),
        })
}

/// Reject `mode` unless the view supports it and it has the expected shape
pub(crate) fn check_mode<V: MemoryView + ?Sized>(
    view: &V,
    mode: AccessMode,
    expected: memview_core::AccessType,
) -> AccessResult<()> {
    if view.is_supported(mode) && mode.access_type() == expected {
        Ok(())
    } else {
        Err(AccessError::UnsupportedAccessMode(mode.name()))
    }
}
