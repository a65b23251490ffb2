//! IR construction error types
//!
//! Offending types are carried as their LLVM text so errors stay `Send`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IrError {
    #[error("invalid source address type for {op}; expected pointer type, got {ty}")]
    InvalidSourceType {
        op: &'static str,
        ty: String,
    },
    
    #[error("invalid named type {name}; expected underlying type definition, got none")]
    UnresolvedNamedType {
        name: String,
    },
    
    #[error("unable to index into element of pointer type {ty}; split the address computation into two getelementptr instructions")]
    CannotIndexPointer {
        ty: String,
    },
    
    #[error("invalid index {index} into structure {ty}; expected integer constant")]
    StructIndexMustBeConstant {
        index: String,
        ty: String,
    },
    
    #[error("structure index {index} out of range for {ty} with {len} fields")]
    StructIndexOutOfRange {
        index: i64,
        len: usize,
        ty: String,
    },
    
    #[error("indexing into element type {ty} is not supported")]
    UnsupportedIndexTarget {
        ty: String,
    },
    
    #[error("local name {name} is defined more than once in function {function}")]
    DuplicateLocalName {
        name: String,
        function: String,
    },
    
    #[error("no current {what} to build into")]
    NoInsertionPoint {
        what: &'static str,
    },
    
    #[error("{op} does not produce a value")]
    NoResult {
        op: String,
    },
}

pub type IrResult<T> = Result<T, IrError>;
