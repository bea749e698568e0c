//! Access modes and invocation behavior for memory view handles

use crate::{AccessError, AccessResult};

/// Shape of an access mode's call signature
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// `(segment, offset) -> value`
    Get,
    /// `(segment, offset, value) -> ()`
    Set,
    /// `(segment, offset, expected, value) -> bool`
    CompareAndSet,
    /// `(segment, offset, value) -> value`
    GetAndUpdate,
}

/// Operations a memory view handle may be asked to perform
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessMode {
    Get,
    Set,
    GetVolatile,
    SetVolatile,
    GetAcquire,
    SetRelease,
    GetOpaque,
    SetOpaque,
    CompareAndSet,
    GetAndSet,
    GetAndAdd,
}

impl AccessMode {
    pub const ALL: [AccessMode; 11] = [
        AccessMode::Get,
        AccessMode::Set,
        AccessMode::GetVolatile,
        AccessMode::SetVolatile,
        AccessMode::GetAcquire,
        AccessMode::SetRelease,
        AccessMode::GetOpaque,
        AccessMode::SetOpaque,
        AccessMode::CompareAndSet,
        AccessMode::GetAndSet,
        AccessMode::GetAndAdd,
    ];

    /// Symbolic method name of the mode
    pub fn name(self) -> &'static str {
        match self {
            AccessMode::Get => "get",
            AccessMode::Set => "set",
            AccessMode::GetVolatile => "getVolatile",
            AccessMode::SetVolatile => "setVolatile",
            AccessMode::GetAcquire => "getAcquire",
            AccessMode::SetRelease => "setRelease",
            AccessMode::GetOpaque => "getOpaque",
            AccessMode::SetOpaque => "setOpaque",
            AccessMode::CompareAndSet => "compareAndSet",
            AccessMode::GetAndSet => "getAndSet",
            AccessMode::GetAndAdd => "getAndAdd",
        }
    }

    /// Resolve a symbolic method name
    pub fn from_name(name: &str) -> AccessResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.name() == name)
            .ok_or_else(|| AccessError::UnknownAccessMode(name.to_string()))
    }

    pub fn access_type(self) -> AccessType {
        match self {
            AccessMode::Get
            | AccessMode::GetVolatile
            | AccessMode::GetAcquire
            | AccessMode::GetOpaque => AccessType::Get,
            AccessMode::Set
            | AccessMode::SetVolatile
            | AccessMode::SetRelease
            | AccessMode::SetOpaque => AccessType::Set,
            AccessMode::CompareAndSet => AccessType::CompareAndSet,
            AccessMode::GetAndSet | AccessMode::GetAndAdd => AccessType::GetAndUpdate,
        }
    }

    /// Plain (non-atomic) get or set
    #[inline]
    pub fn is_plain(self) -> bool {
        matches!(self, AccessMode::Get | AccessMode::Set)
    }
}

/// How a handle matches dynamically typed call arguments
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Invocation {
    /// Arguments are implicitly converted where a lossless conversion exists
    #[default]
    Coercing,
    /// Arguments must match the handle's signature exactly
    Exact,
}

impl Invocation {
    #[inline]
    pub fn is_exact(self) -> bool {
        self == Invocation::Exact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_roundtrip() {
        for mode in AccessMode::ALL {
            assert_eq!(AccessMode::from_name(mode.name()).unwrap(), mode);
        }
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(
            AccessMode::from_name("getAndBitwiseOr"),
            Err(AccessError::UnknownAccessMode("getAndBitwiseOr".into()))
        );
    }

    #[test]
    fn test_access_types() {
        assert_eq!(AccessMode::Get.access_type(), AccessType::Get);
        assert_eq!(AccessMode::SetRelease.access_type(), AccessType::Set);
        assert_eq!(AccessMode::GetAndAdd.access_type(), AccessType::GetAndUpdate);
        assert!(AccessMode::Set.is_plain());
        assert!(!AccessMode::GetVolatile.is_plain());
    }

    #[test]
    fn test_invocation_default() {
        assert_eq!(Invocation::default(), Invocation::Coercing);
        assert!(!Invocation::Coercing.is_exact());
        assert!(Invocation::Exact.is_exact());
    }
}
