//! LLVM IR object model and textual encoder
//! 
//! This crate builds functions, basic blocks and typed instructions in
//! memory and renders them as LLVM assembly through their `Display` impls.
//! 
//! ## Architecture
//! 
//! The crate is structured as follows:
//! - `types` - Type system (Type, PointerType, StructType, NamedType, ...)
//! - `values` - Local and global value handles, identifiers
//! - `constant` - Constants and floating-point text
//! - `gep` - getelementptr result type inference
//! - `instructions` - IR instructions
//! - `blocks` - Basic block management
//! - `function` - Functions and local numbering
//! - `module` - Modules and named type definitions
//! - `builder` - IR construction utilities
//! 
//! Values use `Rc` handles, so a model belongs to one thread.

// Public exports - clean API surface
pub use self::types::{Type, FloatKind, PointerType, ArrayType, StructType, FuncType, NamedType};
pub use self::values::{Value, Local, Global, Ident};
pub use self::constant::{Constant, format_float};
pub use self::gep::indexed_type;
pub use self::instructions::{
    Instruction, InstKind, InstAlloca, InstLoad, InstStore, InstGetElementPtr, InstRet,
};
pub use self::blocks::BasicBlock;
pub use self::function::Function;
pub use self::module::Module;
pub use self::builder::IrBuilder;
pub use self::error::{IrError, IrResult};

// Internal modules
mod types;
mod values;
mod constant;
mod gep;
mod instructions;
mod blocks;
mod function;
mod module;
mod builder;
mod error;

#[cfg(test)]
mod tests;
