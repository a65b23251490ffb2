//! IR Builder
//! 
//! Provides utilities for constructing IR programmatically. Every `build_*`
//! method constructs the instruction first and appends it only when
//! construction succeeded, so a rejected instruction leaves the current
//! block unchanged.

use log::trace;
use crate::blocks::BasicBlock;
use crate::error::{IrError, IrResult};
use crate::function::Function;
use crate::instructions::Instruction;
use crate::types::{FuncType, Type};
use crate::values::Value;

/// Builder for constructing IR
#[derive(Debug, Default)]
pub struct IrBuilder {
    current_function: Option<Function>,
    blocks: Vec<BasicBlock>,
    current_block: Option<usize>,
}

impl IrBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Start a new function, dropping any unfinished one.
    pub fn create_function(&mut self, name: impl Into<String>, sig: FuncType) -> &mut Function {
        self.blocks.clear();
        self.current_block = None;
        self.current_function.insert(Function::new(name, sig))
    }
    
    pub fn function(&self) -> Option<&Function> {
        self.current_function.as_ref()
    }
    
    /// Parameter `index` of the current function.
    pub fn param(&self, index: usize) -> Option<Value> {
        self.current_function.as_ref().and_then(|f| f.param(index))
    }
    
    /// Add a block to the current function and position at its end.
    /// An empty name creates an unnamed block.
    pub fn create_block(&mut self, name: &str) -> IrResult<usize> {
        if self.current_function.is_none() {
            return Err(IrError::NoInsertionPoint { what: "function" });
        }
        let block = if name.is_empty() {
            BasicBlock::unnamed()
        } else {
            BasicBlock::new(name)
        };
        self.blocks.push(block);
        let index = self.blocks.len() - 1;
        self.current_block = Some(index);
        Ok(index)
    }
    
    pub fn position_at_end(&mut self, block: usize) -> IrResult<()> {
        if block >= self.blocks.len() {
            return Err(IrError::NoInsertionPoint { what: "block" });
        }
        self.current_block = Some(block);
        Ok(())
    }
    
    pub fn current_block(&self) -> Option<&BasicBlock> {
        self.current_block.and_then(|i| self.blocks.get(i))
    }
    
    /// Label of block `index`, for use as an operand.
    pub fn block_label(&self, index: usize) -> Option<Value> {
        self.blocks.get(index).map(BasicBlock::label)
    }
    
    pub fn build_alloca(&mut self, elem: Type, count: Option<Value>, name: &str) -> IrResult<Value> {
        self.insert_named(Instruction::alloca(elem, count), name)
    }
    
    pub fn build_load(&mut self, src: Value, name: &str) -> IrResult<Value> {
        self.insertion_index()?;
        self.insert_named(Instruction::load(src)?, name)
    }
    
    pub fn build_store(&mut self, src: Value, dst: Value) -> IrResult<()> {
        self.insertion_index()?;
        self.insert(Instruction::store(src, dst)?)
    }
    
    pub fn build_gep(&mut self, src: Value, indices: Vec<Value>, name: &str) -> IrResult<Value> {
        self.insertion_index()?;
        self.insert_named(Instruction::getelementptr(src, indices)?, name)
    }
    
    pub fn build_ret(&mut self, value: Option<Value>) -> IrResult<()> {
        self.insert(Instruction::ret(value))
    }
    
    pub fn current_block_has_terminator(&self) -> bool {
        self.current_block().is_some_and(BasicBlock::has_terminator)
    }
    
    /// Take the finished function. Without blocks it stays a declaration;
    /// otherwise the body is attached in bulk and numbered.
    pub fn finish_function(&mut self) -> IrResult<Option<Function>> {
        self.current_block = None;
        let blocks = std::mem::take(&mut self.blocks);
        let Some(mut function) = self.current_function.take() else {
            return Ok(None);
        };
        if !blocks.is_empty() {
            function.set_blocks(blocks)?;
        }
        Ok(Some(function))
    }
    
    fn insertion_index(&self) -> IrResult<usize> {
        self.current_block
            .filter(|&i| i < self.blocks.len())
            .ok_or(IrError::NoInsertionPoint { what: "block" })
    }
    
    fn insert_named(&mut self, inst: Instruction, name: &str) -> IrResult<Value> {
        inst.set_name(name);
        let result = inst.result().ok_or_else(|| IrError::NoResult { op: inst.to_string() })?;
        self.insert(inst)?;
        Ok(result)
    }
    
    fn insert(&mut self, inst: Instruction) -> IrResult<()> {
        let index = self.insertion_index()?;
        trace!("append to block {index}: {inst}");
        self.blocks[index].append_inst(inst);
        Ok(())
    }
}
