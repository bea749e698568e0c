//! Double view handle
//!
//! Plain `get`/`set` tolerate any address the layout's alignment allows.
//! The ordered modes are single atomic word accesses and additionally
//! require the platform minimum alignment.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use memview_core::{
    AccessError, AccessMode, AccessResult, AccessType, ByteOrder, Carrier, Invocation, ValueLayout,
    COMPONENT_SIZE,
};
use memview_region::{check_access, Segment};

use crate::address::{offset, offset_no_vm_align_check};
use crate::view::check_mode;
use crate::{codec, MemoryView};

/// Handle reading and writing `f64` values in segments
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DoubleHandle {
    order: ByteOrder,
    alignment_mask: u64,
    exact: bool,
}

impl DoubleHandle {
    pub fn new(order: ByteOrder, alignment_mask: u64, exact: bool) -> Self {
        DoubleHandle {
            order,
            alignment_mask,
            exact,
        }
    }

    /// Coercing handle for a double layout
    pub fn from_layout(layout: &ValueLayout) -> AccessResult<Arc<Self>> {
        if layout.carrier() != Carrier::Double {
            return Err(AccessError::WrongMethodType {
                expected: Carrier::Double.name(),
                found: layout.carrier().name(),
            });
        }
        Ok(Arc::new(DoubleHandle::new(
            layout.order(),
            layout.alignment_mask(),
            false,
        )))
    }

    #[inline]
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    #[inline]
    pub fn has_invoke_exact_behavior(&self) -> bool {
        self.exact
    }

    pub fn with_invoke_exact_behavior(self: &Arc<Self>) -> Arc<Self> {
        if self.exact {
            Arc::clone(self)
        } else {
            Arc::new(DoubleHandle {
                exact: true,
                ..(**self).clone()
            })
        }
    }

    pub fn with_invoke_behavior(self: &Arc<Self>) -> Arc<Self> {
        if !self.exact {
            Arc::clone(self)
        } else {
            Arc::new(DoubleHandle {
                exact: false,
                ..(**self).clone()
            })
        }
    }
}

/// Memory ordering of an ordered mode
fn ordering(mode: AccessMode) -> Option<Ordering> {
    match mode {
        AccessMode::GetVolatile | AccessMode::SetVolatile => Some(Ordering::SeqCst),
        AccessMode::GetAcquire => Some(Ordering::Acquire),
        AccessMode::SetRelease => Some(Ordering::Release),
        AccessMode::GetOpaque | AccessMode::SetOpaque => Some(Ordering::Relaxed),
        _ => None,
    }
}

impl MemoryView for DoubleHandle {
    type Value = f64;

    #[inline]
    fn byte_size(&self) -> u64 {
        COMPONENT_SIZE
    }

    #[inline]
    fn invocation(&self) -> Invocation {
        if self.exact {
            Invocation::Exact
        } else {
            Invocation::Coercing
        }
    }

    fn is_supported(&self, mode: AccessMode) -> bool {
        mode.is_plain() || ordering(mode).is_some()
    }

    fn read(&self, mode: AccessMode, segment: Option<&Segment>, base: i64) -> AccessResult<f64> {
        check_mode(self, mode, AccessType::Get)?;
        let region = check_access(segment, base, COMPONENT_SIZE, true)?;

        let bits = match ordering(mode) {
            None => region.read_u64(offset_no_vm_align_check(&region, base, self.alignment_mask)?),
            Some(ordering) => region.load_u64(offset(&region, base, self.alignment_mask)?, ordering),
        };
        Ok(codec::from_raw(bits, self.order))
    }

    fn write(&self, mode: AccessMode, segment: Option<&Segment>, base: i64, value: f64) -> AccessResult<()> {
        check_mode(self, mode, AccessType::Set)?;
        let region = check_access(segment, base, COMPONENT_SIZE, false)?;
        let bits = codec::to_raw(value, self.order);

        match ordering(mode) {
            None => {
                let address = offset_no_vm_align_check(&region, base, self.alignment_mask)?;
                region.write_u64(address, bits);
            }
            Some(ordering) => {
                let address = offset(&region, base, self.alignment_mask)?;
                region.store_u64(address, bits, ordering);
            }
        }
        Ok(())
    }
}
