// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/builtins/strings.rs
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
//! Method bodies of the `String` class.

use std::hash::{Hash, Hasher};

use ovum_runtime::{ObjectBody, ObjectRef, RuntimeError, Value};
use rustc_hash::FxHasher;

use crate::commands::{pop_object, push};
use crate::context::ExecutionContext;
use crate::outcome::{ExecOutcome, ExecutionOutcome};

fn text_of(
    ctx: &ExecutionContext<'_>,
    reference: ObjectRef,
    op: &str,
) -> Result<String, RuntimeError> {
    ctx.string_value(reference, op)
}

/// `_String_String`: `[... source this] → [... this]`
pub(crate) fn copy_constructor(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "String constructor")?;
    let source = pop_object(ctx, "String constructor")?;
    let text = text_of(ctx, source, "String constructor")?;
    let object = ctx.heap.repository_mut().get_mut(receiver, "String constructor")?;
    object.body = ObjectBody::Str(text);
    push(ctx, Value::Object(receiver));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn equals(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "String Equals")?;
    let other = pop_object(ctx, "String Equals")?;
    let left = text_of(ctx, receiver, "String Equals")?;
    let right = text_of(ctx, other, "String Equals")?;
    push(ctx, Value::Bool(left == right));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn is_less(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "String IsLess")?;
    let other = pop_object(ctx, "String IsLess")?;
    let left = text_of(ctx, receiver, "String IsLess")?;
    let right = text_of(ctx, other, "String IsLess")?;
    push(ctx, Value::Bool(left < right));
    Ok(ExecutionOutcome::Normal)
}

/// A string converts to itself.
pub(crate) fn to_string(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "String ToString")?;
    push(ctx, Value::Object(receiver));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn get_hash(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "String GetHash")?;
    let text = text_of(ctx, receiver, "String GetHash")?;
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    push(ctx, Value::Int(hasher.finish() as i64));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn length(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "String Length")?;
    let text = text_of(ctx, receiver, "String Length")?;
    push(ctx, Value::Int(text.len() as i64));
    Ok(ExecutionOutcome::Normal)
}

/// Pushes a fresh `ByteArray` holding the string's UTF-8 bytes.
pub(crate) fn to_utf8_bytes(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "String ToUtf8Bytes")?;
    let text = text_of(ctx, receiver, "String ToUtf8Bytes")?;
    let array = ctx.register_instance("ByteArray", ObjectBody::Bytes(text.into_bytes()))?;
    push(ctx, Value::Object(array));
    Ok(ExecutionOutcome::Normal)
}
