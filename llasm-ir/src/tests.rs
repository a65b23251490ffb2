//! Unit tests for the IR model

use super::*;
use pretty_assertions::assert_eq;

fn idx(value: i64) -> Value {
    Value::Const(Constant::i32(value))
}

fn ptr_param(name: &str, elem: Type) -> Value {
    Value::Local(Local::named(name, Type::pointer(elem)))
}

#[test]
fn test_gep_struct_then_array() {
    let st = Type::structure(vec![Type::i32(), Type::array(4, Type::i8())]);
    let src = ptr_param("s", st);
    let gep = Instruction::getelementptr(src, vec![idx(0), idx(1), idx(2)]).unwrap();
    assert_eq!(gep.ty(), Type::pointer(Type::i8()));
}

#[test]
fn test_gep_array() {
    let src = ptr_param("a", Type::array(10, Type::i32()));
    let gep = Instruction::getelementptr(src, vec![idx(0), idx(3)]).unwrap();
    assert_eq!(gep.ty(), Type::pointer(Type::i32()));
}

#[test]
fn test_gep_struct_index_must_be_constant() {
    let st = Type::structure(vec![Type::i32(), Type::i64()]);
    let src = ptr_param("s", st);
    let dynamic = Value::Local(Local::named("i", Type::i32()));
    let err = Instruction::getelementptr(src, vec![idx(0), dynamic]).unwrap_err();
    assert!(matches!(err, IrError::StructIndexMustBeConstant { .. }));
    assert_eq!(
        err.to_string(),
        "invalid index i32 %i into structure { i32, i64 }; expected integer constant"
    );
}

#[test]
fn test_gep_cannot_index_through_pointer_field() {
    let st = Type::structure(vec![Type::pointer(Type::array(2, Type::i32()))]);
    let src = ptr_param("s", st);
    let err = Instruction::getelementptr(src, vec![idx(0), idx(0), idx(1)]).unwrap_err();
    assert_eq!(
        err,
        IrError::CannotIndexPointer { ty: "[2 x i32]*".to_string() }
    );
}

#[test]
fn test_gep_requires_pointer_source() {
    let src = Value::Local(Local::named("v", Type::i32()));
    let err = Instruction::getelementptr(src, vec![idx(0)]).unwrap_err();
    assert_eq!(err, IrError::InvalidSourceType { op: "getelementptr", ty: "i32".to_string() });
}

#[test]
fn test_gep_type_not_rederived_after_set_src() {
    let src = ptr_param("a", Type::array(10, Type::i32()));
    let mut gep = Instruction::getelementptr(src, vec![idx(0), idx(3)]).unwrap();
    if let InstKind::GetElementPtr(inner) = gep.kind_mut() {
        inner.set_src(ptr_param("b", Type::i8()));
    }
    assert_eq!(gep.ty(), Type::pointer(Type::i32()));
}

#[test]
fn test_alloca_and_load_types() {
    let alloca = Instruction::alloca(Type::i32(), None);
    assert_eq!(alloca.ty(), Type::pointer(Type::i32()));
    let load = Instruction::load(alloca.result().unwrap()).unwrap();
    assert_eq!(load.ty(), Type::i32());
    let store = Instruction::store(Value::Const(Constant::i32(1)), alloca.result().unwrap()).unwrap();
    assert_eq!(store.ty(), Type::Void);
    assert!(store.result().is_none());
}

#[test]
fn test_load_rejects_non_pointer_before_append() {
    let mut builder = IrBuilder::new();
    builder.create_function("f", FuncType::new(Type::Void, vec![Type::i32()], false));
    builder.create_block("entry").unwrap();
    let arg = builder.param(0).unwrap();
    
    let err = builder.build_load(arg, "v").unwrap_err();
    assert_eq!(err, IrError::InvalidSourceType { op: "load", ty: "i32".to_string() });
    assert_eq!(builder.current_block().unwrap().len(), 0);
}

#[test]
fn test_store_rejects_non_pointer_destination() {
    let dst = Value::Local(Local::named("x", Type::i32()));
    let err = Instruction::store(idx(1), dst).unwrap_err();
    assert!(matches!(err, IrError::InvalidSourceType { op: "store", .. }));
}

#[test]
fn test_assign_ids_block_then_instruction_order() {
    let sig = FuncType::new(Type::i32(), vec![Type::pointer(Type::i32())], false);
    let mut function = Function::new("f", sig);
    function.params()[0].set_name("p");
    let p = function.param(0).unwrap();
    
    let mut b0 = BasicBlock::unnamed();
    let load = Instruction::load(p).unwrap();
    let named = Instruction::alloca(Type::i8(), None);
    named.set_name("x");
    let alloca = Instruction::alloca(Type::i32(), None);
    let (load_v, named_v, alloca_v) = (load.result().unwrap(), named.result().unwrap(), alloca.result().unwrap());
    b0.append_inst(load);
    b0.append_inst(named);
    b0.append_inst(alloca);
    let b0_label = b0.label();
    
    let mut b1 = BasicBlock::new("entry");
    b1.append_inst(Instruction::ret(Some(idx(0))));
    let b1_label = b1.label();
    
    function.set_blocks(vec![b0, b1]).unwrap();
    
    assert_eq!(b0_label.to_string(), "%0");
    assert_eq!(load_v.to_string(), "%1");
    assert_eq!(named_v.to_string(), "%x");
    assert_eq!(alloca_v.to_string(), "%2");
    assert_eq!(b1_label.to_string(), "%entry");
    assert_eq!(function.params()[0].ident(), Ident::Name("p".to_string()));
}

#[test]
fn test_unnamed_params_are_numbered_first() {
    let sig = FuncType::new(Type::Void, vec![Type::i32(), Type::i32()], false);
    let mut function = Function::new("g", sig);
    let mut block = BasicBlock::unnamed();
    block.append_inst(Instruction::ret(None));
    function.set_blocks(vec![block]).unwrap();
    
    assert_eq!(function.param(0).unwrap().to_string(), "%0");
    assert_eq!(function.param(1).unwrap().to_string(), "%1");
    assert_eq!(function.blocks().unwrap()[0].label().to_string(), "%2");
}

#[test]
fn test_append_block_defers_numbering() {
    let mut function = Function::new("h", FuncType::new(Type::Void, vec![], false));
    let mut block = BasicBlock::unnamed();
    let alloca = Instruction::alloca(Type::i32(), None);
    let value = alloca.result().unwrap();
    block.append_inst(alloca);
    function.append_block(block);
    
    assert_eq!(value.to_string(), "<badref>");
    function.assign_ids().unwrap();
    assert_eq!(value.to_string(), "%1");
    
    // A second pass starts again from zero and yields the same numbers.
    function.append_block(BasicBlock::unnamed());
    function.assign_ids().unwrap();
    assert_eq!(value.to_string(), "%1");
    assert_eq!(function.blocks().unwrap()[1].label().to_string(), "%2");
}

#[test]
fn test_duplicate_names_are_reported() {
    let mut function = Function::new("dup", FuncType::new(Type::Void, vec![], false));
    let mut block = BasicBlock::new("x");
    let alloca = Instruction::alloca(Type::i32(), None);
    alloca.set_name("x");
    block.append_inst(alloca);
    let err = function.set_blocks(vec![block]).unwrap_err();
    assert_eq!(
        err,
        IrError::DuplicateLocalName { name: "%x".to_string(), function: "@dup".to_string() }
    );
    // The body stays attached.
    assert_eq!(function.blocks().unwrap().len(), 1);
}

#[test]
fn test_parent_back_references() {
    let mut function = Function::new("p", FuncType::new(Type::Void, vec![], false));
    let mut block = BasicBlock::new("entry");
    block.append_inst(Instruction::ret(None));
    function.set_blocks(vec![block]).unwrap();
    
    let block = &function.blocks().unwrap()[0];
    let parent = block.parent().unwrap();
    assert_eq!(parent.name(), "p");
    assert_eq!(Value::Global(parent), function.value());
    let inst_parent = block.insts()[0].parent().unwrap();
    assert_eq!(Value::Local(inst_parent), block.label());
}

#[test]
fn test_declaration_variadic_marker() {
    let printf = Function::new("printf", FuncType::new(Type::i32(), vec![Type::pointer(Type::i8())], true));
    assert_eq!(printf.to_string(), "declare i32 @printf(i8*, ...)");
    
    let only_varargs = Function::new("va", FuncType::new(Type::Void, vec![], true));
    assert_eq!(only_varargs.to_string(), "declare void @va(...)");
    
    let fixed = Function::new("fixed", FuncType::new(Type::Void, vec![Type::i32(), Type::i64()], false));
    assert_eq!(fixed.to_string(), "declare void @fixed(i32, i64)");
    
    let empty = Function::new("empty", FuncType::new(Type::Void, vec![], false));
    assert_eq!(empty.to_string(), "declare void @empty()");
}

#[test]
fn test_instruction_text() {
    let st = Type::structure(vec![Type::i32(), Type::array(4, Type::i8())]);
    let s = ptr_param("s", st);
    
    let alloca = Instruction::alloca(Type::i32(), Some(Value::Const(Constant::i32(4))));
    alloca.set_name("buf");
    assert_eq!(alloca.to_string(), "%buf = alloca i32, i32 4");
    
    let load = Instruction::load(alloca.result().unwrap()).unwrap();
    load.set_name("v");
    assert_eq!(load.to_string(), "%v = load i32, i32* %buf");
    
    let store = Instruction::store(load.result().unwrap(), alloca.result().unwrap()).unwrap();
    assert_eq!(store.to_string(), "store i32 %v, i32* %buf");
    
    let gep = Instruction::getelementptr(s, vec![idx(0), idx(1), idx(2)]).unwrap();
    gep.set_name("p");
    assert_eq!(
        gep.to_string(),
        "%p = getelementptr { i32, [4 x i8] }, { i32, [4 x i8] }* %s, i32 0, i32 1, i32 2"
    );
    
    assert_eq!(Instruction::ret(None).to_string(), "ret void");
    assert_eq!(Instruction::ret(Some(idx(7))).to_string(), "ret i32 7");
}

#[test]
fn test_quoted_local_names() {
    let alloca = Instruction::alloca(Type::i8(), None);
    alloca.set_name("my var");
    assert_eq!(alloca.to_string(), "%\"my var\" = alloca i8");
}

#[test]
fn test_type_text() {
    let named = NamedType::new("node");
    assert_eq!(Type::Named(named.clone()).to_string(), "%node");
    assert!(!named.is_resolved());
    named.set_def(Type::structure(vec![Type::i32(), Type::pointer(Type::Named(named.clone()))]));
    assert!(named.is_resolved());
    assert_eq!(named.def().unwrap().to_string(), "{ i32, %node* }");
    
    assert_eq!(Type::structure(vec![]).to_string(), "{}");
    assert_eq!(Type::array(3, Type::array(2, Type::i1())).to_string(), "[3 x [2 x i1]]");
    assert_eq!(
        Type::function(Type::i32(), vec![Type::pointer(Type::i8())], true).to_string(),
        "i32 (i8*, ...)"
    );
    assert_eq!(Type::Float(FloatKind::Half).to_string(), "half");
}

#[test]
fn test_render_is_idempotent() {
    let mut builder = IrBuilder::new();
    builder.create_function("main", FuncType::new(Type::i32(), vec![], false));
    builder.create_block("").unwrap();
    let slot = builder.build_alloca(Type::i32(), None, "").unwrap();
    builder.build_store(Value::Const(Constant::i32(42)), slot.clone()).unwrap();
    let v = builder.build_load(slot, "").unwrap();
    builder.build_ret(Some(v)).unwrap();
    let function = builder.finish_function().unwrap().unwrap();
    
    let first = function.to_string();
    let second = function.to_string();
    assert_eq!(first, second);
    assert_eq!(
        first,
        "define i32 @main() {\n\
         0:\n  \
         %1 = alloca i32\n  \
         store i32 42, i32* %1\n  \
         %2 = load i32, i32* %1\n  \
         ret i32 %2\n\
         }"
    );
}

#[test]
fn test_builder_requires_block() {
    let mut builder = IrBuilder::new();
    assert!(matches!(builder.create_block("entry"), Err(IrError::NoInsertionPoint { what: "function" })));
    builder.create_function("f", FuncType::new(Type::Void, vec![], false));
    let err = builder.build_ret(None).unwrap_err();
    assert_eq!(err, IrError::NoInsertionPoint { what: "block" });
    let declaration = builder.finish_function().unwrap().unwrap();
    assert!(declaration.is_declaration());
}
