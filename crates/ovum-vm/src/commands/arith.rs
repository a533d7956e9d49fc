// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/commands/arith.rs
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
//! Arithmetic, bitwise, logical, and comparison opcodes.
//!
//! Binary operators pop the right operand first (it is on top), then the
//! left: `[... a b] → [... a ∘ b]`. Integers use two's-complement
//! wrapping semantics, bytes wrap modulo 256, floats follow IEEE-754.

use ovum_runtime::{RuntimeError, Value};

use super::{pop_bool, pop_byte, pop_float, pop_int, push};
use crate::context::ExecutionContext;
use crate::outcome::{ExecOutcome, ExecutionOutcome};

fn int_binary(
    ctx: &mut ExecutionContext<'_>,
    op: &'static str,
    apply: impl FnOnce(i64, i64) -> Result<i64, RuntimeError>,
) -> ExecOutcome {
    let right = pop_int(ctx, op)?;
    let left = pop_int(ctx, op)?;
    push(ctx, Value::Int(apply(left, right)?));
    Ok(ExecutionOutcome::Normal)
}

fn int_unary(
    ctx: &mut ExecutionContext<'_>,
    op: &'static str,
    apply: impl FnOnce(i64) -> i64,
) -> ExecOutcome {
    let value = pop_int(ctx, op)?;
    push(ctx, Value::Int(apply(value)));
    Ok(ExecutionOutcome::Normal)
}

fn int_compare(
    ctx: &mut ExecutionContext<'_>,
    op: &'static str,
    apply: impl FnOnce(i64, i64) -> bool,
) -> ExecOutcome {
    let right = pop_int(ctx, op)?;
    let left = pop_int(ctx, op)?;
    push(ctx, Value::Bool(apply(left, right)));
    Ok(ExecutionOutcome::Normal)
}

fn float_binary(
    ctx: &mut ExecutionContext<'_>,
    op: &'static str,
    apply: impl FnOnce(f64, f64) -> Result<f64, RuntimeError>,
) -> ExecOutcome {
    let right = pop_float(ctx, op)?;
    let left = pop_float(ctx, op)?;
    push(ctx, Value::Float(apply(left, right)?));
    Ok(ExecutionOutcome::Normal)
}

fn float_unary(
    ctx: &mut ExecutionContext<'_>,
    op: &'static str,
    apply: impl FnOnce(f64) -> f64,
) -> ExecOutcome {
    let value = pop_float(ctx, op)?;
    push(ctx, Value::Float(apply(value)));
    Ok(ExecutionOutcome::Normal)
}

fn float_compare(
    ctx: &mut ExecutionContext<'_>,
    op: &'static str,
    apply: impl FnOnce(f64, f64) -> bool,
) -> ExecOutcome {
    let right = pop_float(ctx, op)?;
    let left = pop_float(ctx, op)?;
    push(ctx, Value::Bool(apply(left, right)));
    Ok(ExecutionOutcome::Normal)
}

fn byte_binary(
    ctx: &mut ExecutionContext<'_>,
    op: &'static str,
    apply: impl FnOnce(u8, u8) -> Result<u8, RuntimeError>,
) -> ExecOutcome {
    let right = pop_byte(ctx, op)?;
    let left = pop_byte(ctx, op)?;
    push(ctx, Value::Byte(apply(left, right)?));
    Ok(ExecutionOutcome::Normal)
}

fn byte_unary(
    ctx: &mut ExecutionContext<'_>,
    op: &'static str,
    apply: impl FnOnce(u8) -> u8,
) -> ExecOutcome {
    let value = pop_byte(ctx, op)?;
    push(ctx, Value::Byte(apply(value)));
    Ok(ExecutionOutcome::Normal)
}

fn byte_compare(
    ctx: &mut ExecutionContext<'_>,
    op: &'static str,
    apply: impl FnOnce(u8, u8) -> bool,
) -> ExecOutcome {
    let right = pop_byte(ctx, op)?;
    let left = pop_byte(ctx, op)?;
    push(ctx, Value::Bool(apply(left, right)));
    Ok(ExecutionOutcome::Normal)
}

fn bool_binary(
    ctx: &mut ExecutionContext<'_>,
    op: &'static str,
    apply: impl FnOnce(bool, bool) -> bool,
) -> ExecOutcome {
    let right = pop_bool(ctx, op)?;
    let left = pop_bool(ctx, op)?;
    push(ctx, Value::Bool(apply(left, right)));
    Ok(ExecutionOutcome::Normal)
}

// --- Int arithmetic ---

pub(crate) fn int_add(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_binary(ctx, "IntAdd", |a, b| Ok(a.wrapping_add(b)))
}

pub(crate) fn int_subtract(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_binary(ctx, "IntSubtract", |a, b| Ok(a.wrapping_sub(b)))
}

pub(crate) fn int_multiply(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_binary(ctx, "IntMultiply", |a, b| Ok(a.wrapping_mul(b)))
}

pub(crate) fn int_divide(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_binary(ctx, "IntDivide", |a, b| {
        if b == 0 {
            Err(RuntimeError::DivisionByZero { op: "IntDivide" })
        } else {
            Ok(a.wrapping_div(b))
        }
    })
}

pub(crate) fn int_modulo(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_binary(ctx, "IntModulo", |a, b| {
        if b == 0 {
            Err(RuntimeError::DivisionByZero { op: "IntModulo" })
        } else {
            Ok(a.wrapping_rem(b))
        }
    })
}

pub(crate) fn int_negate(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_unary(ctx, "IntNegate", i64::wrapping_neg)
}

pub(crate) fn int_increment(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_unary(ctx, "IntIncrement", |v| v.wrapping_add(1))
}

pub(crate) fn int_decrement(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_unary(ctx, "IntDecrement", |v| v.wrapping_sub(1))
}

// --- Float arithmetic ---

pub(crate) fn float_add(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    float_binary(ctx, "FloatAdd", |a, b| Ok(a + b))
}

pub(crate) fn float_subtract(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    float_binary(ctx, "FloatSubtract", |a, b| Ok(a - b))
}

pub(crate) fn float_multiply(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    float_binary(ctx, "FloatMultiply", |a, b| Ok(a * b))
}

pub(crate) fn float_divide(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    float_binary(ctx, "FloatDivide", |a, b| {
        if b == 0.0 {
            Err(RuntimeError::DivisionByZero { op: "FloatDivide" })
        } else {
            Ok(a / b)
        }
    })
}

pub(crate) fn float_negate(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    float_unary(ctx, "FloatNegate", |v| -v)
}

pub(crate) fn float_increment(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    float_unary(ctx, "FloatIncrement", |v| v + 1.0)
}

pub(crate) fn float_decrement(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    float_unary(ctx, "FloatDecrement", |v| v - 1.0)
}

pub(crate) fn float_sqrt(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let value = pop_float(ctx, "FloatSqrt")?;
    if value < 0.0 {
        return Err(RuntimeError::NegativeSqrt);
    }
    push(ctx, Value::Float(value.sqrt()));
    Ok(ExecutionOutcome::Normal)
}

// --- Byte arithmetic (wraps modulo 256) ---

pub(crate) fn byte_add(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_binary(ctx, "ByteAdd", |a, b| Ok(a.wrapping_add(b)))
}

pub(crate) fn byte_subtract(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_binary(ctx, "ByteSubtract", |a, b| Ok(a.wrapping_sub(b)))
}

pub(crate) fn byte_multiply(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_binary(ctx, "ByteMultiply", |a, b| Ok(a.wrapping_mul(b)))
}

pub(crate) fn byte_divide(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_binary(ctx, "ByteDivide", |a, b| {
        if b == 0 {
            Err(RuntimeError::DivisionByZero { op: "ByteDivide" })
        } else {
            Ok(a / b)
        }
    })
}

pub(crate) fn byte_modulo(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_binary(ctx, "ByteModulo", |a, b| {
        if b == 0 {
            Err(RuntimeError::DivisionByZero { op: "ByteModulo" })
        } else {
            Ok(a % b)
        }
    })
}

pub(crate) fn byte_negate(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_unary(ctx, "ByteNegate", u8::wrapping_neg)
}

pub(crate) fn byte_increment(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_unary(ctx, "ByteIncrement", |v| v.wrapping_add(1))
}

pub(crate) fn byte_decrement(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_unary(ctx, "ByteDecrement", |v| v.wrapping_sub(1))
}

// --- Boolean logic ---

pub(crate) fn bool_and(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    bool_binary(ctx, "BoolAnd", |a, b| a && b)
}

pub(crate) fn bool_or(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    bool_binary(ctx, "BoolOr", |a, b| a || b)
}

pub(crate) fn bool_xor(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    bool_binary(ctx, "BoolXor", |a, b| a != b)
}

pub(crate) fn bool_not(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let value = pop_bool(ctx, "BoolNot")?;
    push(ctx, Value::Bool(!value));
    Ok(ExecutionOutcome::Normal)
}

// --- Bitwise and shifts ---

pub(crate) fn int_and(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_binary(ctx, "IntAnd", |a, b| Ok(a & b))
}

pub(crate) fn int_or(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_binary(ctx, "IntOr", |a, b| Ok(a | b))
}

pub(crate) fn int_xor(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_binary(ctx, "IntXor", |a, b| Ok(a ^ b))
}

pub(crate) fn int_not(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_unary(ctx, "IntNot", |v| !v)
}

pub(crate) fn int_left_shift(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_binary(ctx, "IntLeftShift", |a, b| Ok(a.wrapping_shl(b as u32)))
}

pub(crate) fn int_right_shift(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_binary(ctx, "IntRightShift", |a, b| Ok(a.wrapping_shr(b as u32)))
}

pub(crate) fn byte_and(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_binary(ctx, "ByteAnd", |a, b| Ok(a & b))
}

pub(crate) fn byte_or(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_binary(ctx, "ByteOr", |a, b| Ok(a | b))
}

pub(crate) fn byte_xor(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_binary(ctx, "ByteXor", |a, b| Ok(a ^ b))
}

pub(crate) fn byte_not(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_unary(ctx, "ByteNot", |v| !v)
}

pub(crate) fn byte_left_shift(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_binary(ctx, "ByteLeftShift", |a, b| Ok(a.wrapping_shl(u32::from(b))))
}

pub(crate) fn byte_right_shift(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_binary(ctx, "ByteRightShift", |a, b| Ok(a.wrapping_shr(u32::from(b))))
}

// --- Comparisons ---

pub(crate) fn int_equal(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_compare(ctx, "IntEqual", |a, b| a == b)
}

pub(crate) fn int_not_equal(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_compare(ctx, "IntNotEqual", |a, b| a != b)
}

pub(crate) fn int_less_than(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_compare(ctx, "IntLessThan", |a, b| a < b)
}

pub(crate) fn int_less_equal(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_compare(ctx, "IntLessEqual", |a, b| a <= b)
}

pub(crate) fn int_greater_than(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_compare(ctx, "IntGreaterThan", |a, b| a > b)
}

pub(crate) fn int_greater_equal(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    int_compare(ctx, "IntGreaterEqual", |a, b| a >= b)
}

pub(crate) fn float_equal(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    float_compare(ctx, "FloatEqual", |a, b| a == b)
}

pub(crate) fn float_not_equal(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    float_compare(ctx, "FloatNotEqual", |a, b| a != b)
}

pub(crate) fn float_less_than(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    float_compare(ctx, "FloatLessThan", |a, b| a < b)
}

pub(crate) fn float_less_equal(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    float_compare(ctx, "FloatLessEqual", |a, b| a <= b)
}

pub(crate) fn float_greater_than(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    float_compare(ctx, "FloatGreaterThan", |a, b| a > b)
}

pub(crate) fn float_greater_equal(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    float_compare(ctx, "FloatGreaterEqual", |a, b| a >= b)
}

pub(crate) fn byte_equal(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_compare(ctx, "ByteEqual", |a, b| a == b)
}

pub(crate) fn byte_not_equal(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_compare(ctx, "ByteNotEqual", |a, b| a != b)
}

pub(crate) fn byte_less_than(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_compare(ctx, "ByteLessThan", |a, b| a < b)
}

pub(crate) fn byte_less_equal(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_compare(ctx, "ByteLessEqual", |a, b| a <= b)
}

pub(crate) fn byte_greater_than(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_compare(ctx, "ByteGreaterThan", |a, b| a > b)
}

pub(crate) fn byte_greater_equal(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    byte_compare(ctx, "ByteGreaterEqual", |a, b| a >= b)
}
