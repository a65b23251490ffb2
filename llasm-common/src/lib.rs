//! LLVM assembly encoder - Shared Helpers
//! 
//! This crate contains the leaf utilities used by the IR crate and the
//! driver: binary16 widening for constant printing and the identifier
//! encoding rules of LLVM assembly.

pub mod enc;
pub mod floats;

pub use floats::{Float16, ParseFloat16Error};
