//! memview Access - Typed views of values in memory segments
//!
//! This crate implements the accessor side of a memory view:
//! - Bit codec with byte order conversion
//! - Address resolution with combined alignment checks
//! - Complex double and double view handles
//! - Exact and coercing invocation variants
//! - Dynamically typed dispatch over access modes

pub mod address;
pub mod codec;
pub mod complex;
pub mod dispatch;
pub mod double;
pub mod view;

pub use address::*;
pub use complex::*;
pub use dispatch::{invoke, invoke_by_name, Call, Scalar, ScalarValue};
pub use double::*;
pub use view::MemoryView;
