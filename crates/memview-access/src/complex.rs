//! Complex double view handle
//!
//! Reads and writes a [`ComplexDouble`] as two consecutive `f64` components
//! (real at `offset`, imaginary at `offset + 8`) in the handle's byte order.
//!
//! Each call gates the full 16-byte span and checks alignment once before
//! touching memory, so a failed call never leaves a half-written value.
//! Nothing makes the two component accesses atomic as a pair: a concurrent
//! writer may be observed as a torn value.

use std::sync::Arc;

use memview_core::{
    AccessError, AccessMode, AccessResult, AccessType, ByteOrder, Carrier, ComplexDouble, Invocation,
    ValueLayout, COMPLEX_DOUBLE_SIZE, COMPONENT_SIZE,
};
use memview_region::{check_access, Segment};

use crate::address::offset_no_vm_align_check;
use crate::view::check_mode;
use crate::{codec, MemoryView};

/// Handle reading and writing complex doubles in segments
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComplexDoubleHandle {
    order: ByteOrder,
    length: u64,
    alignment_mask: u64,
    exact: bool,
}

impl ComplexDoubleHandle {
    pub fn new(order: ByteOrder, alignment_mask: u64, exact: bool) -> Self {
        ComplexDoubleHandle {
            order,
            length: COMPLEX_DOUBLE_SIZE,
            alignment_mask,
            exact,
        }
    }

    /// Coercing handle for a complex double layout
    pub fn from_layout(layout: &ValueLayout) -> AccessResult<Arc<Self>> {
        if layout.carrier() != Carrier::ComplexDouble {
            return Err(AccessError::WrongMethodType {
                expected: Carrier::ComplexDouble.name(),
                found: layout.carrier().name(),
            });
        }
        Ok(Arc::new(ComplexDoubleHandle::new(
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
    pub fn alignment_mask(&self) -> u64 {
        self.alignment_mask
    }

    #[inline]
    pub fn has_invoke_exact_behavior(&self) -> bool {
        self.exact
    }

    /// This handle with exact invocation; the same handle if already exact
    pub fn with_invoke_exact_behavior(self: &Arc<Self>) -> Arc<Self> {
        if self.exact {
            Arc::clone(self)
        } else {
            Arc::new(ComplexDoubleHandle {
                exact: true,
                ..(**self).clone()
            })
        }
    }

    /// This handle with coercing invocation; the same handle if already coercing
    pub fn with_invoke_behavior(self: &Arc<Self>) -> Arc<Self> {
        if !self.exact {
            Arc::clone(self)
        } else {
            Arc::new(ComplexDoubleHandle {
                exact: false,
                ..(**self).clone()
            })
        }
    }
}

impl MemoryView for ComplexDoubleHandle {
    type Value = ComplexDouble;

    #[inline]
    fn byte_size(&self) -> u64 {
        self.length
    }

    #[inline]
    fn invocation(&self) -> Invocation {
        if self.exact {
            Invocation::Exact
        } else {
            Invocation::Coercing
        }
    }

    fn read(&self, mode: AccessMode, segment: Option<&Segment>, base: i64) -> AccessResult<ComplexDouble> {
        check_mode(self, mode, AccessType::Get)?;
        let region = check_access(segment, base, self.length, true)?;
        // alignment is checked once for both components
        let address = offset_no_vm_align_check(&region, base, self.alignment_mask)?;

        let re = codec::from_raw(region.read_u64(address), self.order);
        let im = codec::from_raw(region.read_u64(address + COMPONENT_SIZE), self.order);
        Ok(ComplexDouble::new(re, im))
    }

    fn write(
        &self,
        mode: AccessMode,
        segment: Option<&Segment>,
        base: i64,
        value: ComplexDouble,
    ) -> AccessResult<()> {
        check_mode(self, mode, AccessType::Set)?;
        let region = check_access(segment, base, self.length, false)?;
        let address = offset_no_vm_align_check(&region, base, self.alignment_mask)?;

        region.write_u64(address, codec::to_raw(value.re(), self.order));
        region.write_u64(address + COMPONENT_SIZE, codec::to_raw(value.im(), self.order));
        Ok(())
    }
}
