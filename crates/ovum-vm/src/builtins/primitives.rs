// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/builtins/primitives.rs
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
//! Shared method bodies of the boxed value classes.
//!
//! `Int`, `Float`, `Char`, `Byte`, `Bool`, `Pointer`, and `Nullable` all
//! box a single value as field 0 of a raw payload, so one set of handlers
//! serves every one of them through the field machinery. The receiver is
//! always the last argument pushed, so it is popped first.

use ovum_runtime::{ObjectRef, RuntimeError, Value};

use crate::commands::{pop_object, pop_value, push};
use crate::context::ExecutionContext;
use crate::outcome::{ExecOutcome, ExecutionOutcome};

fn boxed_value(
    ctx: &ExecutionContext<'_>,
    reference: ObjectRef,
    op: &str,
) -> Result<Value, RuntimeError> {
    let object = ctx.heap.repository().get(reference, op)?;
    let vtable = ctx.vtables.get(object.descriptor.vtable_index as usize)?;
    vtable.field_value(object, 0)
}

fn store_boxed_value(
    ctx: &mut ExecutionContext<'_>,
    reference: ObjectRef,
    value: Value,
    op: &str,
) -> Result<(), RuntimeError> {
    let vtables = ctx.vtables;
    let object = ctx.heap.repository_mut().get_mut(reference, op)?;
    let vtable = vtables.get(object.descriptor.vtable_index as usize)?;
    vtable.set_field_value(object, 0, value)
}

/// `[... value this] → [... this]`, initializing field 0.
pub(crate) fn constructor(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "constructor")?;
    let value = pop_value(ctx, "constructor")?;
    store_boxed_value(ctx, receiver, value, "constructor")?;
    push(ctx, Value::Object(receiver));
    Ok(ExecutionOutcome::Normal)
}

/// `[... source this] → [... this]`, copying field 0.
pub(crate) fn copy_constructor(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "copy constructor")?;
    let source = pop_object(ctx, "copy constructor")?;
    let value = boxed_value(ctx, source, "copy constructor")?;
    store_boxed_value(ctx, receiver, value, "copy constructor")?;
    push(ctx, Value::Object(receiver));
    Ok(ExecutionOutcome::Normal)
}

/// Trivial destructor: the payload needs no teardown beyond release.
pub(crate) fn drop_receiver(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let _ = pop_object(ctx, "destructor")?;
    Ok(ExecutionOutcome::Normal)
}

/// `[... other this] → [... bool]`
pub(crate) fn equals(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "Equals")?;
    let other = pop_object(ctx, "Equals")?;
    let left = boxed_value(ctx, receiver, "Equals")?;
    let right = boxed_value(ctx, other, "Equals")?;
    push(ctx, Value::Bool(left == right));
    Ok(ExecutionOutcome::Normal)
}

/// `[... other this] → [... bool]`, whether `this < other`.
pub(crate) fn is_less(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "IsLess")?;
    let other = pop_object(ctx, "IsLess")?;
    let left = boxed_value(ctx, receiver, "IsLess")?;
    let right = boxed_value(ctx, other, "IsLess")?;
    let result = value_less(left, right).ok_or_else(|| {
        RuntimeError::type_mismatch("IsLess", left.tag_name(), right.tag_name())
    })?;
    push(ctx, Value::Bool(result));
    Ok(ExecutionOutcome::Normal)
}

/// `[... this] → [... String]`
pub(crate) fn to_string(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "ToString")?;
    let value = boxed_value(ctx, receiver, "ToString")?;
    let reference = ctx.alloc_string(value.to_string())?;
    push(ctx, Value::Object(reference));
    Ok(ExecutionOutcome::Normal)
}

/// `[... this] → [... int]`
pub(crate) fn get_hash(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "GetHash")?;
    let value = boxed_value(ctx, receiver, "GetHash")?;
    push(ctx, Value::Int(value.fingerprint() as i64));
    Ok(ExecutionOutcome::Normal)
}

fn value_less(left: Value, right: Value) -> Option<bool> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a < b),
        (Value::Float(a), Value::Float(b)) => Some(a < b),
        (Value::Bool(a), Value::Bool(b)) => Some(!a && b),
        (Value::Char(a), Value::Char(b)) | (Value::Byte(a), Value::Byte(b)) => Some(a < b),
        (Value::Object(a), Value::Object(b)) => Some(a.to_bits() < b.to_bits()),
        _ => None,
    }
}
