//! Module
//! 
//! Top-level container: named type definitions followed by functions.

use llasm_common::enc;
use std::fmt;
use crate::function::Function;
use crate::types::NamedType;

/// IR Module - a named collection of type definitions and functions
#[derive(Debug)]
pub struct Module {
    pub name: String,
    pub type_defs: Vec<NamedType>,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_defs: Vec::new(),
            functions: Vec::new(),
        }
    }
    
    pub fn add_type_def(&mut self, named: NamedType) {
        self.type_defs.push(named);
    }
    
    pub fn add_function(&mut self, function: Function) {
        self.functions.push(function);
    }
    
    pub fn get_type_def(&self, name: &str) -> Option<&NamedType> {
        self.type_defs.iter().find(|t| t.name() == name)
    }
    
    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name() == name)
    }
    
    pub fn get_function_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.functions.iter_mut().find(|f| f.name() == name)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", enc::escape(&self.name))?;
        if !self.type_defs.is_empty() {
            writeln!(f)?;
            for named in &self.type_defs {
                match named.def() {
                    Some(def) => writeln!(f, "{named} = type {def}")?,
                    None => writeln!(f, "{named} = type opaque")?,
                }
            }
        }
        for function in &self.functions {
            writeln!(f)?;
            writeln!(f, "{function}")?;
        }
        Ok(())
    }
}
