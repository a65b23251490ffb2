//! Address computation type inference
//! 
//! Walks a getelementptr index list through the pointed-to type to find the
//! element type the resulting pointer addresses. The first index only steps
//! over the source pointer itself (the "extra 0 index"), so it never changes
//! the type; every later index descends one aggregate level.

use log::{trace, warn};
use crate::constant::Constant;
use crate::error::{IrError, IrResult};
use crate::types::{StructType, Type};
use crate::values::Value;

/// Element type addressed by `indices` applied to a pointer to `elem`.
pub fn indexed_type(elem: &Type, indices: &[Value]) -> IrResult<Type> {
    let mut current = elem.clone();
    for (position, index) in indices.iter().enumerate().skip(1) {
        let resolved = match &current {
            Type::Named(named) => named.def().ok_or_else(|| {
                warn!("getelementptr reached unresolved named type {named}");
                IrError::UnresolvedNamedType { name: named.to_string() }
            })?,
            other => other.clone(),
        };
        
        current = match &resolved {
            // A pointer inside an aggregate is not dereferenced by GEP.
            Type::Pointer(_) => return Err(IrError::CannotIndexPointer { ty: resolved.to_string() }),
            Type::Array(arr) => arr.elem().clone(),
            Type::Struct(st) => struct_field(st, &resolved, index)?.clone(),
            _ => return Err(IrError::UnsupportedIndexTarget { ty: resolved.to_string() }),
        };
        trace!("getelementptr index {position}: {resolved} -> {current}");
    }
    Ok(current)
}

fn struct_field<'a>(st: &'a StructType, ty: &Type, index: &Value) -> IrResult<&'a Type> {
    let position = index
        .as_const()
        .and_then(Constant::int_value)
        .ok_or_else(|| IrError::StructIndexMustBeConstant {
            index: index.typed(),
            ty: ty.to_string(),
        })?;
    usize::try_from(position)
        .ok()
        .and_then(|i| st.field(i))
        .ok_or_else(|| IrError::StructIndexOutOfRange {
            index: position,
            len: st.fields().len(),
            ty: ty.to_string(),
        })
}
