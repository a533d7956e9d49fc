// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/commands/convert.rs
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
//! Conversion opcodes between value tags and to/from `String`.

use ovum_runtime::{RuntimeError, Value};

use super::{pop_bool, pop_byte, pop_char, pop_float, pop_int, pop_string, push};
use crate::context::ExecutionContext;
use crate::outcome::{ExecOutcome, ExecutionOutcome};

pub(crate) fn int_to_float(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let value = pop_int(ctx, "IntToFloat")?;
    push(ctx, Value::Float(value as f64));
    Ok(ExecutionOutcome::Normal)
}

/// Truncating conversion.
pub(crate) fn float_to_int(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let value = pop_float(ctx, "FloatToInt")?;
    push(ctx, Value::Int(value as i64));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn byte_to_int(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let value = pop_byte(ctx, "ByteToInt")?;
    push(ctx, Value::Int(i64::from(value)));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn char_to_byte(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let value = pop_char(ctx, "CharToByte")?;
    push(ctx, Value::Byte(value));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn byte_to_char(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let value = pop_byte(ctx, "ByteToChar")?;
    push(ctx, Value::Char(value));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn bool_to_byte(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let value = pop_bool(ctx, "BoolToByte")?;
    push(ctx, Value::Byte(u8::from(value)));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn string_to_int(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let text = pop_string(ctx, "StringToInt")?;
    let value = text.trim().parse::<i64>().map_err(|error| {
        RuntimeError::other(format!("StringToInt: cannot parse '{text}': {error}"))
    })?;
    push(ctx, Value::Int(value));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn string_to_float(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let text = pop_string(ctx, "StringToFloat")?;
    let value = text.trim().parse::<f64>().map_err(|error| {
        RuntimeError::other(format!("StringToFloat: cannot parse '{text}': {error}"))
    })?;
    push(ctx, Value::Float(value));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn int_to_string(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let value = pop_int(ctx, "IntToString")?;
    let reference = ctx.alloc_string(value.to_string())?;
    push(ctx, Value::Object(reference));
    Ok(ExecutionOutcome::Normal)
}

/// Formatting follows the host default for `f64`.
pub(crate) fn float_to_string(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let value = pop_float(ctx, "FloatToString")?;
    let reference = ctx.alloc_string(value.to_string())?;
    push(ctx, Value::Object(reference));
    Ok(ExecutionOutcome::Normal)
}
