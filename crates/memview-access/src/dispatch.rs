//! Dynamically typed dispatch over memory views
//!
//! A [`Call`] carries loosely typed arguments. Under [`Invocation::Exact`]
//! each argument must carry exactly the type of the view's signature
//! (`Long` offsets, the view's own value type). Under
//! [`Invocation::Coercing`] lossless widenings are applied first:
//! - offsets: `Byte`, `Short`, `Int` widen to `Long`
//! - `f64` values: `Byte`, `Short`, `Int`, `Float` widen to `Double`
//! - complex values: `Float` and `Double` promote to `(re, 0.0)`

use memview_core::{AccessError, AccessMode, AccessResult, AccessType, ComplexDouble, Invocation};
use memview_region::Segment;

use crate::MemoryView;

/// Loosely typed argument or result
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Complex(ComplexDouble),
}

impl Scalar {
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Byte(_) => "byte",
            Scalar::Short(_) => "short",
            Scalar::Int(_) => "int",
            Scalar::Long(_) => "long",
            Scalar::Float(_) => "float",
            Scalar::Double(_) => "double",
            Scalar::Complex(_) => "complex_double",
        }
    }

    /// The argument as an offset
    pub fn to_offset(self, invocation: Invocation) -> AccessResult<i64> {
        match (self, invocation) {
            (Scalar::Long(v), _) => Ok(v),
            (Scalar::Int(v), Invocation::Coercing) => Ok(v as i64),
            (Scalar::Short(v), Invocation::Coercing) => Ok(v as i64),
            (Scalar::Byte(v), Invocation::Coercing) => Ok(v as i64),
            (other, _) => Err(mismatch("long", other)),
        }
    }
}

fn mismatch(expected: &'static str, found: Scalar) -> AccessError {
    AccessError::WrongMethodType {
        expected,
        found: found.type_name(),
    }
}

/// Value types that cross the dynamic dispatch boundary
pub trait ScalarValue: Sized + Copy {
    const TYPE_NAME: &'static str;

    fn from_scalar(scalar: Scalar, invocation: Invocation) -> AccessResult<Self>;

    fn into_scalar(self) -> Scalar;
}

impl ScalarValue for f64 {
    const TYPE_NAME: &'static str = "double";

    fn from_scalar(scalar: Scalar, invocation: Invocation) -> AccessResult<Self> {
        match (scalar, invocation) {
            (Scalar::Double(v), _) => Ok(v),
            (Scalar::Float(v), Invocation::Coercing) => Ok(v as f64),
            (Scalar::Int(v), Invocation::Coercing) => Ok(v as f64),
            (Scalar::Short(v), Invocation::Coercing) => Ok(v as f64),
            (Scalar::Byte(v), Invocation::Coercing) => Ok(v as f64),
            (other, _) => Err(mismatch(Self::TYPE_NAME, other)),
        }
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Double(self)
    }
}

impl ScalarValue for ComplexDouble {
    const TYPE_NAME: &'static str = "complex_double";

    fn from_scalar(scalar: Scalar, invocation: Invocation) -> AccessResult<Self> {
        match (scalar, invocation) {
            (Scalar::Complex(v), _) => Ok(v),
            (Scalar::Double(re), Invocation::Coercing) => Ok(ComplexDouble::new(re, 0.0)),
            (Scalar::Float(re), Invocation::Coercing) => Ok(ComplexDouble::new(re as f64, 0.0)),
            (other, _) => Err(mismatch(Self::TYPE_NAME, other)),
        }
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Complex(self)
    }
}

/// Arguments of a dynamically typed access
#[derive(Clone, Copy, Debug)]
pub struct Call<'a> {
    pub segment: Option<&'a Segment>,
    pub offset: Scalar,
    pub value: Option<Scalar>,
}

impl<'a> Call<'a> {
    /// `(segment, offset)`
    pub fn get(segment: Option<&'a Segment>, offset: Scalar) -> Self {
        Call {
            segment,
            offset,
            value: None,
        }
    }

    /// `(segment, offset, value)`
    pub fn set(segment: Option<&'a Segment>, offset: Scalar, value: Scalar) -> Self {
        Call {
            segment,
            offset,
            value: Some(value),
        }
    }
}

/// Perform `mode` on `view` with the arguments of `call`
///
/// Get-type modes return `Some(value)`, set-type modes return `None`.
pub fn invoke<V: MemoryView>(view: &V, mode: AccessMode, call: Call<'_>) -> AccessResult<Option<Scalar>> {
    if !view.is_supported(mode) {
        return Err(AccessError::UnsupportedAccessMode(mode.name()));
    }
    let invocation = view.invocation();

    match (mode.access_type(), call.value) {
        (AccessType::Get, None) => {
            let offset = call.offset.to_offset(invocation)?;
            let value = view.read(mode, call.segment, offset)?;
            Ok(Some(value.into_scalar()))
        }
        (AccessType::Set, Some(value)) => {
            let offset = call.offset.to_offset(invocation)?;
            let value = V::Value::from_scalar(value, invocation)?;
            view.write(mode, call.segment, offset, value)?;
            Ok(None)
        }
        (AccessType::Get, Some(extra)) => Err(AccessError::WrongMethodType {
            expected: "(segment, long)",
            found: extra.type_name(),
        }),
        (AccessType::Set, None) => Err(AccessError::WrongMethodType {
            expected: V::Value::TYPE_NAME,
            found: "nothing",
        }),
        _ => Err(AccessError::UnsupportedAccessMode(mode.name())),
    }
}

/// [`invoke`] with the mode given by its symbolic name
pub fn invoke_by_name<V: MemoryView>(view: &V, name: &str, call: Call<'_>) -> AccessResult<Option<Scalar>> {
    invoke(view, AccessMode::from_name(name)?, call)
}
