//! IR Type System
//! 
//! Defines the LLVM types the object model can describe: scalars, typed
//! pointers, arrays, literal structs, function signatures and named types.
//! Aggregate element types are reference counted so one element type can be
//! shared by any number of pointers and aggregates.

use llasm_common::enc;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Floating-point formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatKind {
    Half,   // binary16
    Float,  // binary32
    Double, // binary64
}

impl fmt::Display for FloatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FloatKind::Half => "half",
            FloatKind::Float => "float",
            FloatKind::Double => "double",
        };
        write!(f, "{name}")
    }
}

/// IR Type
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Void type
    Void,
    
    /// Label type (basic blocks)
    Label,
    
    /// Integer type with bit width
    Int(u32),
    
    /// Floating-point type
    Float(FloatKind),
    
    /// Typed pointer `T*`
    Pointer(PointerType),
    
    /// Array type `[N x T]`
    Array(ArrayType),
    
    /// Literal struct type `{ A, B }`
    Struct(StructType),
    
    /// Function signature `R (A, B)`
    Function(FuncType),
    
    /// Named type `%T`, possibly not yet defined
    Named(NamedType),
}

impl Type {
    pub fn i1() -> Type {
        Type::Int(1)
    }
    
    pub fn i8() -> Type {
        Type::Int(8)
    }
    
    pub fn i32() -> Type {
        Type::Int(32)
    }
    
    pub fn i64() -> Type {
        Type::Int(64)
    }
    
    pub fn pointer(elem: Type) -> Type {
        Type::Pointer(PointerType::new(elem))
    }
    
    pub fn array(len: u64, elem: Type) -> Type {
        Type::Array(ArrayType::new(len, elem))
    }
    
    pub fn structure(fields: Vec<Type>) -> Type {
        Type::Struct(StructType::new(fields))
    }
    
    pub fn function(result: Type, params: Vec<Type>, variadic: bool) -> Type {
        Type::Function(FuncType::new(result, params, variadic))
    }
    
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }
    
    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Int(_))
    }
    
    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }
    
    pub fn as_pointer(&self) -> Option<&PointerType> {
        match self {
            Type::Pointer(ptr) => Some(ptr),
            _ => None,
        }
    }
    
    pub fn as_function(&self) -> Option<&FuncType> {
        match self {
            Type::Function(sig) => Some(sig),
            _ => None,
        }
    }
}

impl From<PointerType> for Type {
    fn from(t: PointerType) -> Self {
        Type::Pointer(t)
    }
}

impl From<ArrayType> for Type {
    fn from(t: ArrayType) -> Self {
        Type::Array(t)
    }
}

impl From<StructType> for Type {
    fn from(t: StructType) -> Self {
        Type::Struct(t)
    }
}

impl From<FuncType> for Type {
    fn from(t: FuncType) -> Self {
        Type::Function(t)
    }
}

impl From<NamedType> for Type {
    fn from(t: NamedType) -> Self {
        Type::Named(t)
    }
}

/// Pointer type; the element type is shared
#[derive(Debug, Clone, PartialEq)]
pub struct PointerType {
    elem: Rc<Type>,
}

impl PointerType {
    pub fn new(elem: Type) -> Self {
        Self { elem: Rc::new(elem) }
    }
    
    /// Build a pointer over an element type that is already shared.
    pub fn from_shared(elem: Rc<Type>) -> Self {
        Self { elem }
    }
    
    pub fn elem(&self) -> &Type {
        &self.elem
    }
    
    pub fn shared_elem(&self) -> Rc<Type> {
        Rc::clone(&self.elem)
    }
}

/// Array type
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    len: u64,
    elem: Rc<Type>,
}

impl ArrayType {
    pub fn new(len: u64, elem: Type) -> Self {
        Self { len, elem: Rc::new(elem) }
    }
    
    pub fn len(&self) -> u64 {
        self.len
    }
    
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    
    pub fn elem(&self) -> &Type {
        &self.elem
    }
}

/// Literal struct type
#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    fields: Rc<[Type]>,
}

impl StructType {
    pub fn new(fields: Vec<Type>) -> Self {
        Self { fields: fields.into() }
    }
    
    pub fn fields(&self) -> &[Type] {
        &self.fields
    }
    
    /// Field at `index`, or `None` when out of range.
    pub fn field(&self, index: usize) -> Option<&Type> {
        self.fields.get(index)
    }
}

/// Function signature
#[derive(Debug, Clone, PartialEq)]
pub struct FuncType {
    result: Rc<Type>,
    params: Rc<[Type]>,
    variadic: bool,
}

impl FuncType {
    pub fn new(result: Type, params: Vec<Type>, variadic: bool) -> Self {
        Self {
            result: Rc::new(result),
            params: params.into(),
            variadic,
        }
    }
    
    pub fn result(&self) -> &Type {
        &self.result
    }
    
    pub fn params(&self) -> &[Type] {
        &self.params
    }
    
    pub fn is_variadic(&self) -> bool {
        self.variadic
    }
    
    /// Parameter list as printed inside parentheses, e.g. `i8*, ...`.
    pub(crate) fn param_list(&self) -> String {
        let mut parts: Vec<String> = self.params.iter().map(Type::to_string).collect();
        if self.variadic {
            parts.push("...".to_string());
        }
        parts.join(", ")
    }
}

/// Named type `%name`
///
/// The definition may be attached after the type has been referenced, which
/// is how recursive and forward-declared types are built. Handles are shared:
/// every clone sees the same definition.
#[derive(Clone)]
pub struct NamedType(Rc<NamedTypeData>);

struct NamedTypeData {
    name: String,
    def: RefCell<Option<Type>>,
}

impl NamedType {
    /// Create an unresolved (opaque) named type.
    pub fn new(name: impl Into<String>) -> Self {
        NamedType(Rc::new(NamedTypeData {
            name: name.into(),
            def: RefCell::new(None),
        }))
    }
    
    pub fn with_def(name: impl Into<String>, def: Type) -> Self {
        let named = Self::new(name);
        named.set_def(def);
        named
    }
    
    pub fn name(&self) -> &str {
        &self.0.name
    }
    
    /// Underlying definition, or `None` while the type is unresolved.
    pub fn def(&self) -> Option<Type> {
        self.0.def.borrow().clone()
    }
    
    pub fn set_def(&self, def: Type) {
        *self.0.def.borrow_mut() = Some(def);
    }
    
    pub fn is_resolved(&self) -> bool {
        self.0.def.borrow().is_some()
    }
}

// Named types are nominal; comparing definitions could also recurse forever.
impl PartialEq for NamedType {
    fn eq(&self, other: &Self) -> bool {
        self.0.name == other.0.name
    }
}

impl fmt::Debug for NamedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamedType").field(&self.0.name).finish()
    }
}

impl fmt::Display for NamedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", enc::local(&self.0.name))
    }
}

impl fmt::Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.result, self.param_list())
    }
}

impl fmt::Display for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return write!(f, "{{}}");
        }
        write!(f, "{{ ")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 { write!(f, ", ")?; }
            write!(f, "{field}")?;
        }
        write!(f, " }}")
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Label => write!(f, "label"),
            Type::Int(bits) => write!(f, "i{bits}"),
            Type::Float(kind) => write!(f, "{kind}"),
            Type::Pointer(ptr) => write!(f, "{}*", ptr.elem),
            Type::Array(arr) => write!(f, "[{} x {}]", arr.len, arr.elem),
            Type::Struct(st) => write!(f, "{st}"),
            Type::Function(sig) => write!(f, "{sig}"),
            Type::Named(named) => write!(f, "{named}"),
        }
    }
}
