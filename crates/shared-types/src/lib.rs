//! # Shared Types Crate
//!
//! Domain entities shared between `claimcheck-core` and the crates that
//! consume it: the pointer record, the outgoing/resolved message shapes,
//! property values, and the reserved property names that make up the wire
//! protocol.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
