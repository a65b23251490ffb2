//! JSON program descriptions
//! 
//! A description lists named types and functions; function bodies are given
//! as blocks of instruction records. Operands refer back to parameters and
//! earlier instructions through their names or `bind` keys, or spell out
//! constants inline. Everything is built through `IrBuilder`, so the usual
//! construction checks apply.
//!
//! ```json
//! {
//!   "module": "demo",
//!   "types": [{ "name": "pair", "def": { "struct": ["i32", "i8"] } }],
//!   "functions": [
//!     { "name": "main", "ret": "i32", "blocks": [
//!       { "name": "entry", "insts": [
//!         { "op": "alloca", "name": "x", "elem": "i32" },
//!         { "op": "store", "src": { "int": [32, 7] }, "dst": { "ref": "x" } },
//!         { "op": "load", "bind": "v", "src": { "ref": "x" } },
//!         { "op": "ret", "value": { "ref": "v" } }
//!       ] }
//!     ] }
//!   ]
//! }
//! ```

use anyhow::{anyhow, bail, Context, Result};
use llasm_common::Float16;
use llasm_ir::{
    format_float, Constant, FloatKind, FuncType, IrBuilder, Module, NamedType, PointerType, Type,
    Value,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Whole program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDesc {
    pub module: String,
    #[serde(default)]
    pub types: Vec<TypeDefDesc>,
    #[serde(default)]
    pub functions: Vec<FunctionDesc>,
}

/// Named type definition; no `def` means opaque
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefDesc {
    pub name: String,
    #[serde(default)]
    pub def: Option<TypeDesc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDesc {
    Void,
    I1,
    I8,
    I16,
    I32,
    I64,
    Int(u32),
    Half,
    Float,
    Double,
    Ptr(Box<TypeDesc>),
    Array(u64, Box<TypeDesc>),
    Struct(Vec<TypeDesc>),
    Named(String),
    Func {
        ret: Box<TypeDesc>,
        #[serde(default)]
        params: Vec<TypeDesc>,
        #[serde(default)]
        variadic: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDesc {
    #[serde(rename = "type")]
    pub ty: TypeDesc,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bind: Option<String>,
}

/// Function; `blocks` absent means declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDesc {
    pub name: String,
    pub ret: TypeDesc,
    #[serde(default)]
    pub params: Vec<ParamDesc>,
    #[serde(default)]
    pub variadic: bool,
    #[serde(default)]
    pub blocks: Option<Vec<BlockDesc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDesc {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub insts: Vec<InstDesc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum InstDesc {
    Alloca {
        #[serde(default)]
        name: String,
        #[serde(default)]
        bind: Option<String>,
        elem: TypeDesc,
        #[serde(default)]
        count: Option<OperandDesc>,
    },
    Load {
        #[serde(default)]
        name: String,
        #[serde(default)]
        bind: Option<String>,
        src: OperandDesc,
    },
    Store {
        src: OperandDesc,
        dst: OperandDesc,
    },
    Getelementptr {
        #[serde(default)]
        name: String,
        #[serde(default)]
        bind: Option<String>,
        src: OperandDesc,
        #[serde(default)]
        indices: Vec<OperandDesc>,
    },
    Ret {
        #[serde(default)]
        value: Option<OperandDesc>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandDesc {
    /// Parameter or instruction result, by name or bind key
    Ref(String),
    /// Function, by name
    Func(String),
    /// `[bits, value]`
    Int(u32, i64),
    Bool(bool),
    /// binary16 bit pattern in hex
    Half(String),
    Float(f32),
    Double(f64),
    /// Null pointer to the given element type
    Null(TypeDesc),
    Undef(TypeDesc),
}

/// Named types of the module being built
struct TypeEnv {
    named: HashMap<String, NamedType>,
}

impl TypeEnv {
    fn lower(&self, desc: &TypeDesc) -> Result<Type> {
        Ok(match desc {
            TypeDesc::Void => Type::Void,
            TypeDesc::I1 => Type::i1(),
            TypeDesc::I8 => Type::i8(),
            TypeDesc::I16 => Type::Int(16),
            TypeDesc::I32 => Type::i32(),
            TypeDesc::I64 => Type::i64(),
            TypeDesc::Int(bits) => {
                if *bits == 0 {
                    bail!("integer type must have at least one bit");
                }
                Type::Int(*bits)
            }
            TypeDesc::Half => Type::Float(FloatKind::Half),
            TypeDesc::Float => Type::Float(FloatKind::Float),
            TypeDesc::Double => Type::Float(FloatKind::Double),
            TypeDesc::Ptr(elem) => Type::pointer(self.lower(elem)?),
            TypeDesc::Array(len, elem) => Type::array(*len, self.lower(elem)?),
            TypeDesc::Struct(fields) => Type::structure(self.lower_all(fields)?),
            TypeDesc::Named(name) => {
                let named = self
                    .named
                    .get(name)
                    .ok_or_else(|| anyhow!("unknown named type %{name}"))?;
                Type::Named(named.clone())
            }
            TypeDesc::Func { ret, params, variadic } => {
                Type::Function(FuncType::new(self.lower(ret)?, self.lower_all(params)?, *variadic))
            }
        })
    }
    
    fn lower_all(&self, descs: &[TypeDesc]) -> Result<Vec<Type>> {
        descs.iter().map(|d| self.lower(d)).collect()
    }
}

/// Values visible while building one function
struct Scope<'a> {
    env: &'a TypeEnv,
    module: &'a Module,
    locals: HashMap<String, Value>,
}

impl Scope<'_> {
    fn bind(&mut self, name: &str, bind: Option<&String>, value: Value) {
        if let Some(key) = bind {
            self.locals.insert(key.clone(), value.clone());
        }
        if !name.is_empty() {
            self.locals.insert(name.to_string(), value);
        }
    }
    
    fn operand(&self, desc: &OperandDesc, builder: &IrBuilder) -> Result<Value> {
        let c = match desc {
            OperandDesc::Ref(name) => {
                return self
                    .locals
                    .get(name)
                    .cloned()
                    .ok_or_else(|| anyhow!("unknown local %{name}"));
            }
            OperandDesc::Func(name) => {
                let current = builder.function().filter(|f| f.name() == name.as_str());
                return current
                    .or_else(|| self.module.get_function(name))
                    .map(|f| f.value())
                    .ok_or_else(|| anyhow!("unknown function @{name}"));
            }
            OperandDesc::Int(bits, value) => Constant::int(*bits, *value),
            OperandDesc::Bool(value) => Constant::bool(*value),
            OperandDesc::Half(hex) => Constant::half(Float16::from_hex(hex)?),
            OperandDesc::Float(value) => Constant::float(*value),
            OperandDesc::Double(value) => Constant::double(*value),
            OperandDesc::Null(elem) => Constant::Null(PointerType::new(self.env.lower(elem)?)),
            OperandDesc::Undef(ty) => Constant::Undef(self.env.lower(ty)?),
        };
        Ok(Value::Const(c))
    }
    
    fn operands(&self, descs: &[OperandDesc], builder: &IrBuilder) -> Result<Vec<Value>> {
        descs.iter().map(|d| self.operand(d, builder)).collect()
    }
}

/// Build a module from a program description.
pub fn build_module(desc: &ProgramDesc) -> Result<Module> {
    let mut module = Module::new(desc.module.clone());
    
    // Create every named type before lowering definitions so they can refer
    // to each other.
    let mut env = TypeEnv { named: HashMap::new() };
    for def in &desc.types {
        if env.named.contains_key(&def.name) {
            bail!("named type %{} defined twice", def.name);
        }
        env.named.insert(def.name.clone(), NamedType::new(def.name.clone()));
    }
    for def in &desc.types {
        let named = env.named[&def.name].clone();
        if let Some(ty) = &def.def {
            named.set_def(env.lower(ty).with_context(|| format!("in type %{}", def.name))?);
        }
        module.add_type_def(named);
    }
    
    let mut builder = IrBuilder::new();
    for func in &desc.functions {
        let function = build_function(&mut builder, &env, &module, func)
            .with_context(|| format!("in function @{}", func.name))?;
        debug!("built @{} ({})", func.name, if function.is_declaration() { "declaration" } else { "definition" });
        module.add_function(function);
    }
    info!("built module '{}' with {} functions", module.name, module.functions.len());
    Ok(module)
}

fn build_function(
    builder: &mut IrBuilder,
    env: &TypeEnv,
    module: &Module,
    desc: &FunctionDesc,
) -> Result<llasm_ir::Function> {
    let params: Vec<Type> = desc
        .params
        .iter()
        .map(|p| env.lower(&p.ty))
        .collect::<Result<_>>()?;
    let sig = FuncType::new(env.lower(&desc.ret)?, params, desc.variadic);
    let function = builder.create_function(desc.name.clone(), sig);
    
    let mut scope = Scope { env, module, locals: HashMap::new() };
    for (param, local) in desc.params.iter().zip(function.params()) {
        local.set_name(param.name.clone());
        scope.bind(&param.name, param.bind.as_ref(), Value::Local(local.clone()));
    }
    
    let blocks = desc.blocks.as_deref().unwrap_or_default();
    for (i, block) in blocks.iter().enumerate() {
        builder.create_block(&block.name)?;
        for inst in &block.insts {
            build_inst(builder, &mut scope, inst)
                .with_context(|| format!("in block {i} ({})", display_block_name(&block.name)))?;
        }
    }
    
    let mut function = builder
        .finish_function()?
        .ok_or_else(|| anyhow!("builder lost the current function"))?;
    if function.is_declaration() && desc.blocks.is_some() {
        // An explicit empty body is a definition with no blocks.
        function.set_blocks(Vec::new())?;
    }
    Ok(function)
}

fn display_block_name(name: &str) -> &str {
    if name.is_empty() { "unnamed" } else { name }
}

fn build_inst(builder: &mut IrBuilder, scope: &mut Scope<'_>, desc: &InstDesc) -> Result<()> {
    match desc {
        InstDesc::Alloca { name, bind, elem, count } => {
            let elem = scope.env.lower(elem)?;
            let count = count.as_ref().map(|c| scope.operand(c, builder)).transpose()?;
            let value = builder.build_alloca(elem, count, name)?;
            scope.bind(name, bind.as_ref(), value);
        }
        InstDesc::Load { name, bind, src } => {
            let src = scope.operand(src, builder)?;
            let value = builder.build_load(src, name)?;
            scope.bind(name, bind.as_ref(), value);
        }
        InstDesc::Store { src, dst } => {
            let src = scope.operand(src, builder)?;
            let dst = scope.operand(dst, builder)?;
            builder.build_store(src, dst)?;
        }
        InstDesc::Getelementptr { name, bind, src, indices } => {
            let src = scope.operand(src, builder)?;
            let indices = scope.operands(indices, builder)?;
            let value = builder.build_gep(src, indices, name)?;
            scope.bind(name, bind.as_ref(), value);
        }
        InstDesc::Ret { value } => {
            let value = value.as_ref().map(|v| scope.operand(v, builder)).transpose()?;
            builder.build_ret(value)?;
        }
    }
    Ok(())
}

/// Parse a JSON program description and render it as LLVM assembly.
pub fn emit_program(json: &str) -> Result<String> {
    let desc: ProgramDesc = serde_json::from_str(json).context("invalid program description")?;
    let module = build_module(&desc)?;
    Ok(module.to_string())
}

/// One-line report of a binary16 pattern widened to both formats.
pub fn describe_half(text: &str) -> Result<String> {
    let h = Float16::from_hex(text)?;
    let wide = h.to_f64();
    Ok(format!(
        "{h}\tfloat {:?}\tdouble {:?}\tllvm {}",
        h.to_f32(),
        wide,
        format_float(wide)
    ))
}
