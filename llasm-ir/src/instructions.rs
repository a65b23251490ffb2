//! IR Instructions
//! 
//! Memory access and addressing instructions plus the `ret` terminator.
//! Constructors check operand types and compute the result type once; a
//! constructor that fails never produces an instruction, so nothing
//! malformed can reach a basic block. Later operand updates (`set_src` and
//! friends) never re-derive the type.
//!
//! References: <http://llvm.org/docs/LangRef.html#memory-access-and-addressing-operations>

use log::warn;
use std::fmt;
use crate::error::{IrError, IrResult};
use crate::gep;
use crate::types::Type;
use crate::values::{Local, Value, WeakLocal};

/// `alloca` - stack allocation of one or `count` elements
#[derive(Debug)]
pub struct InstAlloca {
    elem: Type,
    count: Option<Value>,
}

impl InstAlloca {
    pub fn elem_type(&self) -> &Type {
        &self.elem
    }
    
    /// Number of elements, or `None` for a single element.
    pub fn count(&self) -> Option<&Value> {
        self.count.as_ref()
    }
    
    pub fn set_count(&mut self, count: Option<Value>) {
        self.count = count;
    }
}

/// `load` - read from a source address
#[derive(Debug)]
pub struct InstLoad {
    src: Value,
}

impl InstLoad {
    pub fn src(&self) -> &Value {
        &self.src
    }
    
    pub fn set_src(&mut self, src: Value) {
        self.src = src;
    }
}

/// `store` - write a value to a destination address
#[derive(Debug)]
pub struct InstStore {
    src: Value,
    dst: Value,
}

impl InstStore {
    pub fn src(&self) -> &Value {
        &self.src
    }
    
    pub fn set_src(&mut self, src: Value) {
        self.src = src;
    }
    
    pub fn dst(&self) -> &Value {
        &self.dst
    }
    
    pub fn set_dst(&mut self, dst: Value) {
        self.dst = dst;
    }
}

/// `getelementptr` - address of an element inside an aggregate
#[derive(Debug)]
pub struct InstGetElementPtr {
    /// Element type of the source address, fixed at construction
    elem: Type,
    src: Value,
    indices: Vec<Value>,
}

impl InstGetElementPtr {
    pub fn elem_type(&self) -> &Type {
        &self.elem
    }
    
    pub fn src(&self) -> &Value {
        &self.src
    }
    
    pub fn set_src(&mut self, src: Value) {
        self.src = src;
    }
    
    pub fn indices(&self) -> &[Value] {
        &self.indices
    }
    
    pub fn set_indices(&mut self, indices: Vec<Value>) {
        self.indices = indices;
    }
}

/// `ret` - return from the function
#[derive(Debug)]
pub struct InstRet {
    value: Option<Value>,
}

impl InstRet {
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}

/// Instruction variants
#[derive(Debug)]
pub enum InstKind {
    Alloca(InstAlloca),
    Load(InstLoad),
    Store(InstStore),
    GetElementPtr(InstGetElementPtr),
    Ret(InstRet),
}

/// IR Instruction
#[derive(Debug)]
pub struct Instruction {
    kind: InstKind,
    /// Result slot; `None` for instructions that produce no value
    result: Option<Local>,
    /// Label of the parent basic block, set when appended
    parent: WeakLocal,
}

impl Instruction {
    fn with_result(kind: InstKind, ty: Type) -> Self {
        Self {
            kind,
            result: Some(Local::new(ty)),
            parent: WeakLocal::default(),
        }
    }
    
    fn without_result(kind: InstKind) -> Self {
        Self {
            kind,
            result: None,
            parent: WeakLocal::default(),
        }
    }
    
    /// `alloca`; the result is always a pointer to `elem`.
    pub fn alloca(elem: Type, count: Option<Value>) -> Self {
        let ty = Type::pointer(elem.clone());
        Self::with_result(InstKind::Alloca(InstAlloca { elem, count }), ty)
    }
    
    /// `load`; `src` must be a pointer and the result is its element type.
    pub fn load(src: Value) -> IrResult<Self> {
        let ty = match src.ty() {
            Type::Pointer(ptr) => ptr.elem().clone(),
            other => {
                warn!("rejected load from non-pointer operand {}", src.typed());
                return Err(IrError::InvalidSourceType { op: "load", ty: other.to_string() });
            }
        };
        Ok(Self::with_result(InstKind::Load(InstLoad { src }), ty))
    }
    
    /// `store`; `dst` must be a pointer.
    pub fn store(src: Value, dst: Value) -> IrResult<Self> {
        let dst_ty = dst.ty();
        if !dst_ty.is_pointer() {
            return Err(IrError::InvalidSourceType { op: "store", ty: dst_ty.to_string() });
        }
        Ok(Self::without_result(InstKind::Store(InstStore { src, dst })))
    }
    
    /// `getelementptr`; `src` must be a pointer. The result type is the
    /// pointer to the type reached by walking `indices`.
    pub fn getelementptr(src: Value, indices: Vec<Value>) -> IrResult<Self> {
        let elem = match src.ty() {
            Type::Pointer(ptr) => ptr.elem().clone(),
            other => {
                warn!("rejected getelementptr on non-pointer operand {}", src.typed());
                return Err(IrError::InvalidSourceType { op: "getelementptr", ty: other.to_string() });
            }
        };
        let target = gep::indexed_type(&elem, &indices)?;
        let kind = InstKind::GetElementPtr(InstGetElementPtr { elem, src, indices });
        Ok(Self::with_result(kind, Type::pointer(target)))
    }
    
    /// `ret` with an optional return value.
    pub fn ret(value: Option<Value>) -> Self {
        Self::without_result(InstKind::Ret(InstRet { value }))
    }
    
    pub fn kind(&self) -> &InstKind {
        &self.kind
    }
    
    pub fn kind_mut(&mut self) -> &mut InstKind {
        &mut self.kind
    }
    
    /// Type of the produced value; `void` when there is none.
    pub fn ty(&self) -> Type {
        self.result.as_ref().map_or(Type::Void, |local| local.ty().clone())
    }
    
    /// The produced value, usable as an operand of later instructions.
    pub fn result(&self) -> Option<Value> {
        self.result.clone().map(Value::Local)
    }
    
    pub(crate) fn result_slot(&self) -> Option<&Local> {
        self.result.as_ref()
    }
    
    pub fn name(&self) -> Option<String> {
        self.result.as_ref().and_then(Local::name)
    }
    
    /// Name the result. Instructions without a result have nothing to name.
    pub fn set_name(&self, name: impl Into<String>) {
        if let Some(local) = &self.result {
            local.set_name(name);
        }
    }
    
    pub fn is_terminator(&self) -> bool {
        matches!(self.kind, InstKind::Ret(_))
    }
    
    /// Label of the parent basic block.
    pub fn parent(&self) -> Option<Local> {
        self.parent.upgrade()
    }
    
    pub(crate) fn set_parent(&mut self, parent: WeakLocal) {
        self.parent = parent;
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(local) = &self.result {
            write!(f, "{} = ", local.encoded())?;
        }
        match &self.kind {
            InstKind::Alloca(inst) => {
                write!(f, "alloca {}", inst.elem)?;
                if let Some(count) = &inst.count {
                    write!(f, ", {}", count.typed())?;
                }
                Ok(())
            }
            InstKind::Load(inst) => {
                write!(f, "load {}, {}", self.ty(), inst.src.typed())
            }
            InstKind::Store(inst) => {
                write!(f, "store {}, {}", inst.src.typed(), inst.dst.typed())
            }
            InstKind::GetElementPtr(inst) => {
                write!(f, "getelementptr {}, {}", inst.elem, inst.src.typed())?;
                for index in &inst.indices {
                    write!(f, ", {}", index.typed())?;
                }
                Ok(())
            }
            InstKind::Ret(InstRet { value: Some(value) }) => write!(f, "ret {}", value.typed()),
            InstKind::Ret(InstRet { value: None }) => write!(f, "ret void"),
        }
    }
}
