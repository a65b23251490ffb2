//! LLVM assembly encoder - Driver Library
//! 
//! Loads JSON program descriptions into the IR model and renders them as
//! LLVM assembly. The binary in `main.rs` is a thin wrapper over this crate.

pub mod program;

pub use program::{build_module, describe_half, emit_program, ProgramDesc};
