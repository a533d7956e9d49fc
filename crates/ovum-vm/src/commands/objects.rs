// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/commands/objects.rs
// SPDX-FileType: SOURCE
// SPDX-License-Identifier: Apache-2.0
// -------------------------------------------------------------------------
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
// -------------------------------------------------------------------------
//! Field access, vtable manipulation, nullables, and type introspection.

use ovum_runtime::{ObjectRef, RuntimeError, Value};

use super::{pop_object, pop_value, push};
use crate::context::ExecutionContext;
use crate::outcome::{ExecOutcome, ExecutionOutcome};

/// `[... obj] → [... value]`
pub(crate) fn get_field(ctx: &mut ExecutionContext<'_>, index: usize) -> ExecOutcome {
    let receiver = pop_object(ctx, "GetField")?;
    let vtables = ctx.vtables;
    let object = ctx.heap.repository().get(receiver, "GetField")?;
    let vtable = vtables.get(object.descriptor.vtable_index as usize)?;
    let value = vtable.field_value(object, index)?;
    push(ctx, value);
    Ok(ExecutionOutcome::Normal)
}

/// `[... value obj] → [...]`
pub(crate) fn set_field(ctx: &mut ExecutionContext<'_>, index: usize) -> ExecOutcome {
    let receiver = pop_object(ctx, "SetField")?;
    let value = pop_value(ctx, "SetField")?;
    let vtables = ctx.vtables;
    let object = ctx.heap.repository_mut().get_mut(receiver, "SetField")?;
    let vtable = vtables.get(object.descriptor.vtable_index as usize)?;
    vtable.set_field_value(object, index, value)?;
    Ok(ExecutionOutcome::Normal)
}

/// Pushes the store index of the named class's vtable.
pub(crate) fn get_vtable(ctx: &mut ExecutionContext<'_>, class: &str) -> ExecOutcome {
    let index = ctx.vtables.index_of(class)?;
    push(ctx, Value::Int(index as i64));
    Ok(ExecutionOutcome::Normal)
}

/// Pops an object, installs the named class's vtable index on its
/// descriptor, and pushes the object back.
pub(crate) fn set_vtable(ctx: &mut ExecutionContext<'_>, class: &str) -> ExecOutcome {
    let receiver = pop_object(ctx, "SetVTable")?;
    let index = ctx.vtables.index_of(class)?;
    let object = ctx.heap.repository_mut().get_mut(receiver, "SetVTable")?;
    object.descriptor.vtable_index = index as u32;
    push(ctx, Value::Object(receiver));
    Ok(ExecutionOutcome::Normal)
}

/// Allocates an empty array instance of the named class.
pub(crate) fn new_array(ctx: &mut ExecutionContext<'_>, class: &str) -> ExecOutcome {
    let reference = ctx.allocate_instance(class)?;
    push(ctx, Value::Object(reference));
    Ok(ExecutionOutcome::Normal)
}

/// Pops a value; pushes whether it is a null reference or a `Nullable`
/// wrapping null.
pub(crate) fn is_null(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let reference = pop_object(ctx, "IsNull")?;
    let result = if reference.is_null() {
        true
    } else {
        match nullable_inner(ctx, reference) {
            Some(inner) => inner.is_null(),
            None => false,
        }
    };
    push(ctx, Value::Bool(result));
    Ok(ExecutionOutcome::Normal)
}

/// `[... nullable default] → [... default or wrapped value]`
pub(crate) fn null_coalesce(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let default = pop_value(ctx, "NullCoalesce")?;
    let reference = pop_object(ctx, "NullCoalesce")?;
    let inner = if reference.is_null() {
        ObjectRef::NULL
    } else {
        require_nullable(ctx, reference, "NullCoalesce")?
    };
    if inner.is_null() {
        push(ctx, default);
    } else {
        push(ctx, Value::Object(inner));
    }
    Ok(ExecutionOutcome::Normal)
}

/// Pops a `Nullable` and pushes the wrapped value; fails on null.
pub(crate) fn unwrap(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let reference = pop_object(ctx, "Unwrap")?;
    let inner = require_nullable(ctx, reference, "Unwrap")?;
    if inner.is_null() {
        return Err(RuntimeError::NullReference { op: "Unwrap".to_string() });
    }
    push(ctx, Value::Object(inner));
    Ok(ExecutionOutcome::Normal)
}

/// Dispatches `method` on the value wrapped by a `Nullable` receiver.
///
/// A null receiver short-circuits to a fresh null `Nullable`; otherwise
/// the result of the dispatch must be an object reference and is
/// re-wrapped as a `Nullable`.
pub(crate) fn safe_call(ctx: &mut ExecutionContext<'_>, method: &str) -> ExecOutcome {
    let receiver = pop_object(ctx, "SafeCall")?;
    let inner = if receiver.is_null() {
        ObjectRef::NULL
    } else {
        require_nullable(ctx, receiver, "SafeCall")?
    };

    if inner.is_null() {
        let null_result = wrap_nullable(ctx, ObjectRef::NULL)?;
        push(ctx, Value::Object(null_result));
        return Ok(ExecutionOutcome::Normal);
    }

    let real_id = ctx.vtable_of(inner, "SafeCall")?.real_method_id(method)?.clone();
    push(ctx, Value::Object(inner));
    let outcome = ctx.call_function_by_id(&real_id)?;
    if outcome != ExecutionOutcome::Normal {
        return Ok(outcome);
    }

    let result = pop_object(ctx, "SafeCall")?;
    let wrapped = wrap_nullable(ctx, result)?;
    push(ctx, Value::Object(wrapped));
    Ok(ExecutionOutcome::Normal)
}

/// Replaces the top value with a `String` naming its type.
pub(crate) fn type_of(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let value = pop_value(ctx, "TypeOf")?;
    let name = match value {
        Value::Object(reference) if !reference.is_null() => ctx.class_name_of(reference),
        Value::Object(_) => "Object".to_string(),
        primitive => primitive.tag_name().to_string(),
    };
    let reference = ctx.alloc_string(name)?;
    push(ctx, Value::Object(reference));
    Ok(ExecutionOutcome::Normal)
}

/// Pops a value and pushes whether it satisfies the named type.
///
/// Primitives compare their tag name exactly; objects use the vtable's
/// is-type relation (own name or any interface).
pub(crate) fn is_type(ctx: &mut ExecutionContext<'_>, name: &str) -> ExecOutcome {
    let value = pop_value(ctx, "IsType")?;
    let result = match value {
        Value::Object(reference) => {
            !reference.is_null() && ctx.vtable_of(reference, "IsType")?.is_type(name)
        }
        primitive => primitive.tag_name() == name,
    };
    push(ctx, Value::Bool(result));
    Ok(ExecutionOutcome::Normal)
}

/// Pushes the instance size of the named type.
///
/// Primitive type names report their value size; class names report the
/// vtable's recorded instance size (descriptor included).
pub(crate) fn size_of(ctx: &mut ExecutionContext<'_>, name: &str) -> ExecOutcome {
    let size = match name {
        "int" | "float" => 8,
        "bool" | "char" | "byte" => 1,
        class => ctx.vtables.get_by_name(class)?.size() as i64,
    };
    push(ctx, Value::Int(size));
    Ok(ExecutionOutcome::Normal)
}

/// Reads the wrapped reference out of a `Nullable` instance, or `None`
/// when the object is of another class.
fn nullable_inner(ctx: &ExecutionContext<'_>, reference: ObjectRef) -> Option<ObjectRef> {
    let object = ctx.heap.repository().get(reference, "Nullable").ok()?;
    let vtable = ctx.vtables.get(object.descriptor.vtable_index as usize).ok()?;
    if vtable.name() != "Nullable" {
        return None;
    }
    match vtable.field_value(object, 0).ok()? {
        Value::Object(inner) => Some(inner),
        _ => None,
    }
}

fn require_nullable(
    ctx: &ExecutionContext<'_>,
    reference: ObjectRef,
    op: &str,
) -> Result<ObjectRef, RuntimeError> {
    nullable_inner(ctx, reference).ok_or_else(|| {
        RuntimeError::type_mismatch(op, "Nullable", ctx.class_name_of(reference))
    })
}

/// Allocates a `Nullable` instance wrapping `inner`.
pub(crate) fn wrap_nullable(
    ctx: &mut ExecutionContext<'_>,
    inner: ObjectRef,
) -> Result<ObjectRef, RuntimeError> {
    let reference = ctx.allocate_instance("Nullable")?;
    if !inner.is_null() {
        let vtables = ctx.vtables;
        let vtable = vtables.get_by_name("Nullable")?;
        let object = ctx.heap.repository_mut().get_mut(reference, "Nullable")?;
        vtable.set_field_value(object, 0, Value::Object(inner))?;
    }
    Ok(reference)
}
