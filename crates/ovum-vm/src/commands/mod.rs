// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/commands/mod.rs
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
//! The opcode library.
//!
//! Each opcode is a free function over the execution context with the
//! stack effect its name documents; [`factory`] maps opcode names (plus
//! their bytecode immediates) to [`crate::exec::Command`] nodes. Binary
//! operators take their right operand from the top of the stack.

pub mod arith;
pub mod calls;
pub mod convert;
pub mod factory;
pub mod io;
pub mod objects;
pub mod stack;
pub mod strings;
pub mod system;

pub use factory::{ArgKind, CommandArg, CommandError, classify, create_command};

use ovum_runtime::{ObjectRef, RuntimeError, Value};

use crate::context::ExecutionContext;

pub(crate) fn pop_value(
    ctx: &mut ExecutionContext<'_>,
    op: &str,
) -> Result<Value, RuntimeError> {
    ctx.memory.machine_stack.pop(op)
}

pub(crate) fn pop_int(ctx: &mut ExecutionContext<'_>, op: &str) -> Result<i64, RuntimeError> {
    match ctx.memory.machine_stack.pop(op)? {
        Value::Int(v) => Ok(v),
        other => Err(RuntimeError::type_mismatch(op, "int", other.tag_name())),
    }
}

pub(crate) fn pop_float(ctx: &mut ExecutionContext<'_>, op: &str) -> Result<f64, RuntimeError> {
    match ctx.memory.machine_stack.pop(op)? {
        Value::Float(v) => Ok(v),
        other => Err(RuntimeError::type_mismatch(op, "float", other.tag_name())),
    }
}

pub(crate) fn pop_bool(ctx: &mut ExecutionContext<'_>, op: &str) -> Result<bool, RuntimeError> {
    match ctx.memory.machine_stack.pop(op)? {
        Value::Bool(v) => Ok(v),
        other => Err(RuntimeError::type_mismatch(op, "bool", other.tag_name())),
    }
}

pub(crate) fn pop_char(ctx: &mut ExecutionContext<'_>, op: &str) -> Result<u8, RuntimeError> {
    match ctx.memory.machine_stack.pop(op)? {
        Value::Char(v) => Ok(v),
        other => Err(RuntimeError::type_mismatch(op, "char", other.tag_name())),
    }
}

pub(crate) fn pop_byte(ctx: &mut ExecutionContext<'_>, op: &str) -> Result<u8, RuntimeError> {
    match ctx.memory.machine_stack.pop(op)? {
        Value::Byte(v) => Ok(v),
        other => Err(RuntimeError::type_mismatch(op, "byte", other.tag_name())),
    }
}

/// Pops an object reference; the null reference is allowed.
pub(crate) fn pop_object(
    ctx: &mut ExecutionContext<'_>,
    op: &str,
) -> Result<ObjectRef, RuntimeError> {
    match ctx.memory.machine_stack.pop(op)? {
        Value::Object(reference) => Ok(reference),
        other => Err(RuntimeError::type_mismatch(op, "Object", other.tag_name())),
    }
}

/// Pops a `String` instance and reads its text.
pub(crate) fn pop_string(
    ctx: &mut ExecutionContext<'_>,
    op: &str,
) -> Result<String, RuntimeError> {
    let reference = pop_object(ctx, op)?;
    ctx.string_value(reference, op)
}

pub(crate) fn push(ctx: &mut ExecutionContext<'_>, value: Value) {
    ctx.memory.machine_stack.push(value);
}
