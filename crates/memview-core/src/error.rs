//! Error types for memory view access

use thiserror::Error;

/// Memory view access errors
///
/// Every variant is raised before any byte of the target region is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    // Region errors
    #[error("Invalid region: no segment supplied")]
    InvalidRegion,

    #[error("Region released: session already closed")]
    RegionReleased,

    #[error("Confinement violation: session accessed outside its owner thread")]
    ConfinementViolation,

    #[error("Session cannot be closed")]
    SessionNotClosable,

    #[error("Session in use by an access on the closing thread")]
    SessionInUse,

    #[error("Out of bounds: offset {offset} size {size} exceeds region length {length}")]
    OutOfBounds { offset: i64, size: u64, length: u64 },

    #[error("Read-only violation: write attempted on a read-only region")]
    ReadOnlyViolation,

    #[error("Allocation failed: requested {requested} bytes, limit {limit}")]
    AllocationFailed { requested: u64, limit: u64 },

    // Argument errors
    #[error("Misaligned access at address {address:#x}")]
    Misaligned { address: u64 },

    #[error("Invalid alignment: {0} is not a power of two")]
    InvalidAlignment(u64),

    // Dispatch errors
    #[error("Unsupported access mode: {0}")]
    UnsupportedAccessMode(&'static str),

    #[error("Unknown access mode: {0}")]
    UnknownAccessMode(String),

    #[error("Wrong method type: expected {expected}, found {found}")]
    WrongMethodType {
        expected: &'static str,
        found: &'static str,
    },
}

impl AccessError {
    /// Whether this error reports a bad argument rather than a region fault
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            AccessError::Misaligned { .. }
                | AccessError::InvalidAlignment(_)
                | AccessError::WrongMethodType { .. }
        )
    }

    /// Whether this error reports a lifecycle fault of the region
    pub fn is_lifecycle_error(&self) -> bool {
        matches!(
            self,
            AccessError::RegionReleased | AccessError::ConfinementViolation
        )
    }
}

/// Result type for memory view operations
pub type AccessResult<T> = Result<T, AccessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(AccessError::Misaligned { address: 3 }.is_argument_error());
        assert!(AccessError::InvalidAlignment(3).is_argument_error());
        assert!(!AccessError::ReadOnlyViolation.is_argument_error());

        assert!(AccessError::RegionReleased.is_lifecycle_error());
        assert!(AccessError::ConfinementViolation.is_lifecycle_error());
        assert!(!AccessError::InvalidRegion.is_lifecycle_error());
    }

    #[test]
    fn test_misaligned_message_has_hex_address() {
        let err = AccessError::Misaligned { address: 0x1003 };
        assert_eq!(err.to_string(), "Misaligned access at address 0x1003");
    }
}
