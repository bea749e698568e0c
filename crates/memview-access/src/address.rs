//! Address resolution and alignment checks
//!
//! An address is aligned for a handle when
//! `(address | max_align_mask) & alignment_mask == 0`. Folding in the
//! region's `max_align_mask` makes a request coarser than the region can
//! ever guarantee fail regardless of the address.

use memview_core::{AccessError, AccessResult};
use memview_region::ValidatedRegion;

/// Platform minimum alignment mask for 8-byte raw accesses
pub const VM_ALIGN: u64 = 8 - 1;

/// Resolve `base + offset` with the combined alignment check only
#[inline]
pub fn resolve_no_vm_align_check(
    base: u64,
    offset: i64,
    alignment_mask: u64,
    max_align_mask: u64,
) -> AccessResult<u64> {
    let address = base.wrapping_add(offset as u64);
    if (address | max_align_mask) & alignment_mask != 0 {
        return Err(misaligned(address));
    }
    Ok(address)
}

/// Resolve `base + offset` with the combined check and the platform minimum
#[inline]
pub fn resolve(base: u64, offset: i64, alignment_mask: u64, max_align_mask: u64) -> AccessResult<u64> {
    let address = resolve_no_vm_align_check(base, offset, alignment_mask, max_align_mask)?;
    if address & VM_ALIGN != 0 {
        return Err(misaligned(address));
    }
    Ok(address)
}

/// Resolve an offset within a validated region, skipping the platform minimum check
#[inline]
pub fn offset_no_vm_align_check(
    region: &ValidatedRegion<'_>,
    offset: i64,
    alignment_mask: u64,
) -> AccessResult<u64> {
    resolve_no_vm_align_check(
        region.base_address(),
        offset,
        alignment_mask,
        region.max_align_mask(),
    )
}

/// Resolve an offset within a validated region, including the platform minimum check
#[inline]
pub fn offset(region: &ValidatedRegion<'_>, offset: i64, alignment_mask: u64) -> AccessResult<u64> {
    resolve(
        region.base_address(),
        offset,
        alignment_mask,
        region.max_align_mask(),
    )
}

#[cold]
fn misaligned(address: u64) -> AccessError {
    tracing::trace!(address, "misaligned access");
    AccessError::Misaligned { address }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_native() {
        assert_eq!(resolve(0x1000, 16, 15, 0), Ok(0x1010));
        assert_eq!(resolve_no_vm_align_check(0x1000, 8, 7, 0), Ok(0x1008));
    }

    #[test]
    fn test_requested_alignment() {
        assert_eq!(
            resolve_no_vm_align_check(0x1000, 8, 15, 0),
            Err(AccessError::Misaligned { address: 0x1008 })
        );
    }

    #[test]
    fn test_unaligned_request_skips_only_combined_check() {
        // mask 0 accepts any address on the combined check
        assert_eq!(resolve_no_vm_align_check(0x1000, 3, 0, 0), Ok(0x1003));
        // the platform minimum still applies on the full path
        assert_eq!(
            resolve(0x1000, 3, 0, 0),
            Err(AccessError::Misaligned { address: 0x1003 })
        );
    }

    #[test]
    fn test_coarse_request_on_fine_region() {
        // a byte carrier region can never satisfy 2-byte alignment
        assert!(resolve_no_vm_align_check(0, 0, 1, 1).is_err());
        // a long carrier region satisfies 8 but never 16
        assert_eq!(resolve_no_vm_align_check(0, 8, 7, 8), Ok(8));
        assert!(resolve_no_vm_align_check(0, 0, 15, 8).is_err());
        assert!(resolve_no_vm_align_check(0, 16, 15, 8).is_err());
    }

    #[test]
    fn test_negative_offset_is_twos_complement() {
        assert_eq!(resolve_no_vm_align_check(0x1010, -16, 15, 0), Ok(0x1000));
    }
}
