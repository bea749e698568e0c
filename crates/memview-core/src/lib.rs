//! memview Core - Fundamental types for typed memory views
//!
//! This crate defines the types shared by regions and accessors:
//! - Composite values (ComplexDouble)
//! - Byte order and value layouts
//! - Access modes and invocation behavior
//! - Error taxonomy

pub mod error;
pub mod layout;
pub mod mode;
pub mod order;
pub mod value;

pub use error::*;
pub use layout::*;
pub use mode::*;
pub use order::*;
pub use value::*;
