//! IR Value Representations
//! 
//! Defines the operands that instructions refer to. Locals (instruction
//! results, parameters and block labels) and globals are shared handles:
//! every instruction that uses a value holds a clone of the same handle, so
//! an identifier assigned later is seen by all users.

use llasm_common::enc;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use crate::constant::Constant;
use crate::types::Type;

/// Identifier of a local value or basic block
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ident {
    /// Not yet numbered
    Unnamed,
    /// Caller-supplied name
    Name(String),
    /// Number assigned by `Function::assign_ids`
    Id(u32),
}

impl Ident {
    pub fn is_name(&self) -> bool {
        matches!(self, Ident::Name(_))
    }
}

struct LocalData {
    ident: RefCell<Ident>,
    ty: Type,
}

/// Local value slot, shared between its definition and all of its uses
#[derive(Clone)]
pub struct Local(Rc<LocalData>);

impl Local {
    /// Create an unnamed local of the given type.
    pub fn new(ty: Type) -> Self {
        Local(Rc::new(LocalData {
            ident: RefCell::new(Ident::Unnamed),
            ty,
        }))
    }
    
    pub fn named(name: impl Into<String>, ty: Type) -> Self {
        let local = Self::new(ty);
        local.set_name(name);
        local
    }
    
    pub fn ty(&self) -> &Type {
        &self.0.ty
    }
    
    pub fn ident(&self) -> Ident {
        self.0.ident.borrow().clone()
    }
    
    /// Caller-supplied name, if any.
    pub fn name(&self) -> Option<String> {
        match &*self.0.ident.borrow() {
            Ident::Name(name) => Some(name.clone()),
            _ => None,
        }
    }
    
    /// Set the name; an empty name makes the local unnamed again.
    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        *self.0.ident.borrow_mut() = if name.is_empty() {
            Ident::Unnamed
        } else {
            Ident::Name(name)
        };
    }
    
    pub fn is_named(&self) -> bool {
        self.0.ident.borrow().is_name()
    }
    
    pub(crate) fn set_id(&self, id: u32) {
        *self.0.ident.borrow_mut() = Ident::Id(id);
    }
    
    pub fn ptr_eq(&self, other: &Local) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
    
    pub(crate) fn downgrade(&self) -> WeakLocal {
        WeakLocal(Rc::downgrade(&self.0))
    }
    
    /// Encoded identifier, e.g. `%x` or `%3`.
    ///
    /// A local that has neither a name nor a number prints as `<badref>`.
    pub fn encoded(&self) -> String {
        match &*self.0.ident.borrow() {
            Ident::Name(name) => enc::local(name),
            Ident::Id(id) => enc::local_id(*id),
            Ident::Unnamed => "<badref>".to_string(),
        }
    }
}

impl PartialEq for Local {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Local({}: {})", self.encoded(), self.0.ty)
    }
}

/// Non-owning back-reference to a local slot
#[derive(Clone, Default)]
pub(crate) struct WeakLocal(Weak<LocalData>);

impl WeakLocal {
    pub(crate) fn upgrade(&self) -> Option<Local> {
        self.0.upgrade().map(Local)
    }
}

impl fmt::Debug for WeakLocal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(local) => write!(f, "WeakLocal({})", local.encoded()),
            None => write!(f, "WeakLocal(<dropped>)"),
        }
    }
}

struct GlobalData {
    name: String,
    ty: Type,
}

/// Global value (function), referenced as `@name`
#[derive(Clone)]
pub struct Global(Rc<GlobalData>);

impl Global {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Global(Rc::new(GlobalData {
            name: name.into(),
            ty,
        }))
    }
    
    pub fn name(&self) -> &str {
        &self.0.name
    }
    
    pub fn ty(&self) -> &Type {
        &self.0.ty
    }
    
    pub fn ptr_eq(&self, other: &Global) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
    
    pub(crate) fn downgrade(&self) -> WeakGlobal {
        WeakGlobal(Rc::downgrade(&self.0))
    }
    
    pub fn encoded(&self) -> String {
        enc::global(&self.0.name)
    }
}

impl PartialEq for Global {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Global {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Global({}: {})", self.encoded(), self.0.ty)
    }
}

/// Non-owning back-reference to a global
#[derive(Clone, Default)]
pub(crate) struct WeakGlobal(Weak<GlobalData>);

impl WeakGlobal {
    pub(crate) fn upgrade(&self) -> Option<Global> {
        self.0.upgrade().map(Global)
    }
}

impl fmt::Debug for WeakGlobal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(global) => write!(f, "WeakGlobal({})", global.encoded()),
            None => write!(f, "WeakGlobal(<dropped>)"),
        }
    }
}

/// IR Value - an operand of an instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Instruction result, parameter or block label
    Local(Local),
    
    /// Function reference
    Global(Global),
    
    /// Constant
    Const(Constant),
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Value::Local(local) => local.ty().clone(),
            Value::Global(global) => global.ty().clone(),
            Value::Const(c) => c.ty(),
        }
    }
    
    pub fn as_const(&self) -> Option<&Constant> {
        match self {
            Value::Const(c) => Some(c),
            _ => None,
        }
    }
    
    pub fn as_local(&self) -> Option<&Local> {
        match self {
            Value::Local(local) => Some(local),
            _ => None,
        }
    }
    
    /// Operand form `<type> <ident>`, e.g. `i32* %x`.
    pub fn typed(&self) -> String {
        format!("{} {}", self.ty(), self)
    }
}

impl From<Local> for Value {
    fn from(local: Local) -> Self {
        Value::Local(local)
    }
}

impl From<Global> for Value {
    fn from(global: Global) -> Self {
        Value::Global(global)
    }
}

impl From<Constant> for Value {
    fn from(c: Constant) -> Self {
        Value::Const(c)
    }
}

/// Identifier only; types are printed by the instruction that uses the value.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Local(local) => write!(f, "{}", local.encoded()),
            Value::Global(global) => write!(f, "{}", global.encoded()),
            Value::Const(c) => write!(f, "{c}"),
        }
    }
}
