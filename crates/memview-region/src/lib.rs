//! memview Region - Bounded memory regions with checked raw access
//!
//! This crate implements the region side of a memory view:
//! - Word-backed native and heap memory
//! - Sessions with liveness and thread confinement
//! - Arenas owning a session and allocating segments
//! - Segments with bounds, read-only views and slicing
//! - The access gate handing out validated raw access

pub mod arena;
pub mod memory;
pub mod segment;
pub mod session;

pub use arena::*;
pub use memory::*;
pub use segment::*;
pub use session::*;
