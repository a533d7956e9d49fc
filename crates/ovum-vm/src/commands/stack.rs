// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/commands/stack.rs
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
//! Stack manipulation and locals/statics opcodes.

use ovum_runtime::{RuntimeError, Value};

use super::{pop_value, push};
use crate::context::ExecutionContext;
use crate::outcome::{ExecOutcome, ExecutionOutcome};

const LOCAL_DEFAULT: Value = Value::Int(0);

pub(crate) fn push_null(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let nullable = super::objects::wrap_nullable(ctx, ovum_runtime::ObjectRef::NULL)?;
    push(ctx, Value::Object(nullable));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn pop(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let _ = pop_value(ctx, "Pop")?;
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn dup(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let top = ctx.memory.machine_stack.top("Dup")?;
    push(ctx, top);
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn swap(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let first = pop_value(ctx, "Swap")?;
    let second = pop_value(ctx, "Swap")?;
    push(ctx, first);
    push(ctx, second);
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn rotate(ctx: &mut ExecutionContext<'_>, n: i64) -> ExecOutcome {
    let count = usize::try_from(n)
        .map_err(|_| RuntimeError::other(format!("Rotate: invalid rotation count {n}")))?;
    ctx.memory.machine_stack.rotate(count)?;
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn load_local(ctx: &mut ExecutionContext<'_>, index: usize) -> ExecOutcome {
    let Some(frame) = ctx.memory.stack_frames.top() else {
        return Err(RuntimeError::NoActiveFrame { op: "LoadLocal".to_string() });
    };
    let value = frame.local_variables.get(index).copied().ok_or_else(|| {
        RuntimeError::IndexOutOfRange {
            op: "LoadLocal".to_string(),
            index: index as i64,
            len: frame.local_variables.len(),
        }
    })?;
    push(ctx, value);
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn set_local(ctx: &mut ExecutionContext<'_>, index: usize) -> ExecOutcome {
    let value = pop_value(ctx, "SetLocal")?;
    let Some(frame) = ctx.memory.stack_frames.top_mut() else {
        return Err(RuntimeError::NoActiveFrame { op: "SetLocal".to_string() });
    };
    if index >= frame.local_variables.len() {
        frame.local_variables.resize(index + 1, LOCAL_DEFAULT);
    }
    frame.local_variables[index] = value;
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn load_static(ctx: &mut ExecutionContext<'_>, index: usize) -> ExecOutcome {
    let value = ctx.memory.global_variables.get(index).copied().ok_or_else(|| {
        RuntimeError::IndexOutOfRange {
            op: "LoadStatic".to_string(),
            index: index as i64,
            len: ctx.memory.global_variables.len(),
        }
    })?;
    push(ctx, value);
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn set_static(ctx: &mut ExecutionContext<'_>, index: usize) -> ExecOutcome {
    let value = pop_value(ctx, "SetStatic")?;
    if index >= ctx.memory.global_variables.len() {
        ctx.memory.global_variables.resize(index + 1, LOCAL_DEFAULT);
    }
    ctx.memory.global_variables[index] = value;
    Ok(ExecutionOutcome::Normal)
}
