//! Basic Block Management
//! 
//! Defines basic blocks - sequences of instructions with a single entry point.
//! A block's label is a local slot of type `label`; unnamed blocks are
//! numbered from the same per-function counter as unnamed instructions.

use llasm_common::enc;
use std::fmt;
use crate::error::IrResult;
use crate::function::IdScope;
use crate::instructions::Instruction;
use crate::types::Type;
use crate::values::{Global, Ident, Local, Value, WeakGlobal};

/// Basic Block - a sequence of instructions with a single entry
#[derive(Debug)]
pub struct BasicBlock {
    label: Local,
    insts: Vec<Instruction>,
    /// Owning function, set when the block is attached
    parent: WeakGlobal,
}

impl BasicBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            label: Local::named(name, Type::Label),
            insts: Vec::new(),
            parent: WeakGlobal::default(),
        }
    }
    
    pub fn unnamed() -> Self {
        Self {
            label: Local::new(Type::Label),
            insts: Vec::new(),
            parent: WeakGlobal::default(),
        }
    }
    
    pub fn name(&self) -> Option<String> {
        self.label.name()
    }
    
    pub fn set_name(&self, name: impl Into<String>) {
        self.label.set_name(name);
    }
    
    /// The block as a `label` operand.
    pub fn label(&self) -> Value {
        Value::Local(self.label.clone())
    }
    
    /// Append an instruction and make this block its parent.
    pub fn append_inst(&mut self, mut inst: Instruction) {
        inst.set_parent(self.label.downgrade());
        self.insts.push(inst);
    }
    
    pub fn insts(&self) -> &[Instruction] {
        &self.insts
    }
    
    pub fn insts_mut(&mut self) -> &mut [Instruction] {
        &mut self.insts
    }
    
    pub fn len(&self) -> usize {
        self.insts.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }
    
    pub fn has_terminator(&self) -> bool {
        self.insts.last().is_some_and(Instruction::is_terminator)
    }
    
    /// Owning function.
    pub fn parent(&self) -> Option<Global> {
        self.parent.upgrade()
    }
    
    pub(crate) fn set_parent(&mut self, parent: WeakGlobal) {
        self.parent = parent;
    }
    
    pub(crate) fn assign_ids(&self, scope: &mut IdScope<'_>) -> IrResult<()> {
        scope.assign(&self.label)?;
        for inst in &self.insts {
            if let Some(result) = inst.result_slot() {
                scope.assign(result)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label.ident() {
            Ident::Name(name) => write!(f, "{}", enc::label(&name))?,
            Ident::Id(id) => write!(f, "{}", enc::label_id(id))?,
            Ident::Unnamed => write!(f, "<badref>:")?,
        }
        for inst in &self.insts {
            write!(f, "\n  {inst}")?;
        }
        Ok(())
    }
}
