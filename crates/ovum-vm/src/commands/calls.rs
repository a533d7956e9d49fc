// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/commands/calls.rs
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
//! Call opcodes and control-flow outcomes.

use ovum_runtime::{RuntimeError, Value};

use super::{pop_int, pop_object, push};
use crate::context::ExecutionContext;
use crate::outcome::{ExecOutcome, ExecutionOutcome};

/// Resolves `function_id` and runs it; the function's own prologue takes
/// its arguments from the stack.
pub(crate) fn call(ctx: &mut ExecutionContext<'_>, function_id: &str) -> ExecOutcome {
    ctx.call_function_by_id(function_id)
}

/// Pops a store index and runs the function registered there.
pub(crate) fn call_indirect(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let index = pop_int(ctx, "CallIndirect")?;
    let index = usize::try_from(index)
        .map_err(|_| RuntimeError::FunctionIndexOutOfRange { index: usize::MAX })?;
    ctx.call_function_by_index(index)
}

/// Pops the receiver, resolves `method` through its vtable, pushes the
/// receiver back as the last argument, and runs the real function.
pub(crate) fn call_virtual(ctx: &mut ExecutionContext<'_>, method: &str) -> ExecOutcome {
    let receiver = pop_object(ctx, "CallVirtual")?;
    let real_id = ctx.vtable_of(receiver, "CallVirtual")?.real_method_id(method)?.clone();
    push(ctx, Value::Object(receiver));
    ctx.call_function_by_id(&real_id)
}

/// Allocates an instance of the constructor's class, pushes it on top of
/// the constructor arguments, and runs the constructor function.
///
/// The class name is the first segment of the constructor id, e.g.
/// `_StringArray_int_String` constructs a `StringArray`.
pub(crate) fn call_constructor(ctx: &mut ExecutionContext<'_>, constructor_id: &str) -> ExecOutcome {
    let class = constructor_class(constructor_id).ok_or_else(|| {
        RuntimeError::other(format!("CallConstructor: malformed constructor id '{constructor_id}'"))
    })?;
    let instance = ctx.allocate_instance(class)?;
    push(ctx, Value::Object(instance));
    ctx.call_function_by_id(constructor_id)
}

pub(crate) fn return_outcome(_ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    Ok(ExecutionOutcome::Return)
}

pub(crate) fn break_outcome(_ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    Ok(ExecutionOutcome::Break)
}

pub(crate) fn continue_outcome(_ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    Ok(ExecutionOutcome::Continue)
}

fn constructor_class(constructor_id: &str) -> Option<&str> {
    let rest = constructor_id.strip_prefix('_')?;
    let class = rest.split('_').next()?;
    if class.is_empty() { None } else { Some(class) }
}

#[cfg(test)]
mod tests {
    use super::constructor_class;

    #[test]
    fn constructor_ids_name_their_class_first() {
        assert_eq!(constructor_class("_StringArray_int_String"), Some("StringArray"));
        assert_eq!(constructor_class("_Int_int"), Some("Int"));
        assert_eq!(constructor_class("_File"), Some("File"));
        assert_eq!(constructor_class("Int_int"), None);
        assert_eq!(constructor_class("_"), None);
    }
}
