//! Domain types and DTOs

pub mod records;

pub use records::*;
