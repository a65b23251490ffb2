//! Function Definitions
//! 
//! A function without a body is a declaration. Bodies are attached either in
//! bulk with `set_blocks`, which also numbers unnamed locals, or one block at
//! a time with `append_block`, after which the caller runs `assign_ids` once
//! the body is complete.

use llasm_common::enc;
use log::debug;
use std::collections::HashSet;
use std::fmt;
use crate::blocks::BasicBlock;
use crate::error::{IrError, IrResult};
use crate::types::{FuncType, Type};
use crate::values::{Global, Ident, Local, Value};

/// Numbering state for one `assign_ids` pass over a function
pub(crate) struct IdScope<'a> {
    function: &'a str,
    next_id: &'a mut u32,
    names: HashSet<String>,
}

impl<'a> IdScope<'a> {
    fn new(function: &'a str, next_id: &'a mut u32) -> Self {
        Self {
            function,
            next_id,
            names: HashSet::new(),
        }
    }
    
    /// Number `local` unless it carries an explicit name.
    pub(crate) fn assign(&mut self, local: &Local) -> IrResult<()> {
        match local.ident() {
            Ident::Name(name) => {
                if !self.names.insert(name.clone()) {
                    return Err(IrError::DuplicateLocalName {
                        name: enc::local(&name),
                        function: enc::global(self.function),
                    });
                }
            }
            Ident::Id(_) | Ident::Unnamed => {
                local.set_id(*self.next_id);
                *self.next_id += 1;
            }
        }
        Ok(())
    }
}

/// Function in IR
#[derive(Debug)]
pub struct Function {
    value: Global,
    sig: FuncType,
    params: Vec<Local>,
    /// Basic blocks, or `None` for a declaration
    blocks: Option<Vec<BasicBlock>>,
    /// Counter for numbering unnamed parameters, blocks and instructions
    local_id: u32,
}

impl Function {
    /// Create a declaration. Parameters start out unnamed.
    pub fn new(name: impl Into<String>, sig: FuncType) -> Self {
        let ty = Type::pointer(Type::Function(sig.clone()));
        let params = sig.params().iter().cloned().map(Local::new).collect();
        Self {
            value: Global::new(name, ty),
            sig,
            params,
            blocks: None,
            local_id: 0,
        }
    }
    
    pub fn name(&self) -> &str {
        self.value.name()
    }
    
    pub fn sig(&self) -> &FuncType {
        &self.sig
    }
    
    /// The function as an operand; its type is a pointer to the signature.
    pub fn value(&self) -> Value {
        Value::Global(self.value.clone())
    }
    
    pub fn params(&self) -> &[Local] {
        &self.params
    }
    
    pub fn param(&self, index: usize) -> Option<Value> {
        self.params.get(index).cloned().map(Value::Local)
    }
    
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_none()
    }
    
    pub fn blocks(&self) -> Option<&[BasicBlock]> {
        self.blocks.as_deref()
    }
    
    pub fn blocks_mut(&mut self) -> Option<&mut [BasicBlock]> {
        self.blocks.as_deref_mut()
    }
    
    /// Replace the body, adopt every block and number unnamed locals.
    ///
    /// On error the new body stays attached but numbering may be incomplete.
    pub fn set_blocks(&mut self, mut blocks: Vec<BasicBlock>) -> IrResult<()> {
        for block in &mut blocks {
            block.set_parent(self.value.downgrade());
        }
        debug!("{}: attached {} blocks", self.value.encoded(), blocks.len());
        self.blocks = Some(blocks);
        self.assign_ids()
    }
    
    /// Append one block. Numbering is left to a later `assign_ids` call.
    pub fn append_block(&mut self, mut block: BasicBlock) {
        block.set_parent(self.value.downgrade());
        self.blocks.get_or_insert_with(Vec::new).push(block);
    }
    
    /// Number unnamed parameters, blocks and instructions.
    ///
    /// Each call starts a fresh numbering from 0 in parameter, then block,
    /// then instruction order, so previously assigned numbers are replaced.
    /// Named locals are left untouched; a name used twice is an error.
    pub fn assign_ids(&mut self) -> IrResult<()> {
        self.local_id = 0;
        let mut scope = IdScope::new(self.value.name(), &mut self.local_id);
        for param in &self.params {
            scope.assign(param)?;
        }
        for block in self.blocks.iter().flatten() {
            block.assign_ids(&mut scope)?;
        }
        debug!("{}: numbered {} unnamed locals", self.value.encoded(), self.local_id);
        Ok(())
    }
    
    fn param_list(&self) -> String {
        let mut parts: Vec<String> = self
            .params
            .iter()
            .map(|param| format!("{} {}", param.ty(), param.encoded()))
            .collect();
        if self.sig.is_variadic() {
            parts.push("...".to_string());
        }
        parts.join(", ")
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.sig.result();
        let ident = self.value.encoded();
        
        // Declaration; e.g.
        //    declare i32 @printf(i8*, ...)
        let Some(blocks) = &self.blocks else {
            return write!(f, "declare {result} {ident}({})", self.sig.param_list());
        };
        
        // Definition; e.g.
        //    define i32 @main() {
        //    entry:
        //      ret i32 42
        //    }
        writeln!(f, "define {result} {ident}({}) {{", self.param_list())?;
        for block in blocks {
            writeln!(f, "{block}")?;
        }
        write!(f, "}}")
    }
}
