// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/commands/factory.rs
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
//! The opcode classification table and command construction.
//!
//! The parser consults [`classify`] to know how many tokens one command
//! consumes, then hands the opcode name and its immediate to
//! [`create_command`]. The classification is part of the bytecode
//! language.

use ovum_runtime::Value;
use thiserror::Error;

use super::{arith, calls, convert, io, objects, stack, strings, system};
use crate::context::ExecutionContext;
use crate::exec::Command;
use crate::outcome::{ExecOutcome, ExecutionOutcome};

/// Kind of bytecode immediate an opcode consumes after its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgKind {
    /// No immediate.
    None,
    /// One string literal.
    Str,
    /// One integer literal.
    Int,
    /// One float literal.
    Float,
    /// One boolean literal.
    Bool,
    /// One identifier.
    Ident,
}

/// The immediate handed to [`create_command`].
#[derive(Clone, Debug, PartialEq)]
pub enum CommandArg {
    /// No immediate.
    None,
    /// A string literal (already unescaped).
    Str(String),
    /// An integer literal.
    Int(i64),
    /// A float literal.
    Float(f64),
    /// A boolean literal.
    Bool(bool),
    /// An identifier (function id, class name, method id, or type name).
    Ident(String),
}

/// Failure to construct a command from its name and immediate.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The name is not in the opcode set.
    #[error("unknown or unimplemented command: {0}")]
    Unknown(String),
    /// The immediate did not fit the opcode's classification.
    #[error("command {0} was given a mismatched argument")]
    BadArgument(String),
}

/// Classifies an opcode name by the immediate it consumes.
///
/// Unknown names classify as [`ArgKind::None`]; [`create_command`]
/// rejects them.
#[must_use]
pub fn classify(name: &str) -> ArgKind {
    match name {
        "PushString" | "PushChar" => ArgKind::Str,
        "PushInt" | "PushByte" | "Rotate" | "LoadLocal" | "SetLocal" | "LoadStatic"
        | "SetStatic" | "GetField" | "SetField" | "Exit" => ArgKind::Int,
        "PushFloat" => ArgKind::Float,
        "PushBool" => ArgKind::Bool,
        "NewArray" | "Call" | "CallVirtual" | "CallConstructor" | "GetVTable" | "SetVTable"
        | "SafeCall" | "IsType" | "SizeOf" => ArgKind::Ident,
        _ => ArgKind::None,
    }
}

fn command(
    name: &'static str,
    run: impl Fn(&mut ExecutionContext<'_>) -> ExecOutcome + 'static,
) -> Command {
    Command::new(name, Box::new(run))
}

fn indexed(
    name: &'static str,
    value: i64,
    build: impl FnOnce(usize) -> Command,
) -> Result<Command, CommandError> {
    usize::try_from(value).map(build).map_err(|_| CommandError::BadArgument(name.to_string()))
}

/// Builds the [`Command`] node for an opcode name and its immediate.
#[expect(clippy::too_many_lines, reason = "one arm per opcode in the instruction set")]
pub fn create_command(name: &str, arg: CommandArg) -> Result<Command, CommandError> {
    let cmd = match (name, arg) {
        // Stack
        ("PushInt", CommandArg::Int(v)) => command("PushInt", move |ctx| {
            super::push(ctx, Value::Int(v));
            Ok(ExecutionOutcome::Normal)
        }),
        ("PushFloat", CommandArg::Float(v)) => command("PushFloat", move |ctx| {
            super::push(ctx, Value::Float(v));
            Ok(ExecutionOutcome::Normal)
        }),
        ("PushBool", CommandArg::Bool(v)) => command("PushBool", move |ctx| {
            super::push(ctx, Value::Bool(v));
            Ok(ExecutionOutcome::Normal)
        }),
        ("PushChar", CommandArg::Str(text)) => {
            let Some(&byte) = text.as_bytes().first() else {
                return Err(CommandError::BadArgument("PushChar".to_string()));
            };
            command("PushChar", move |ctx| {
                super::push(ctx, Value::Char(byte));
                Ok(ExecutionOutcome::Normal)
            })
        }
        ("PushByte", CommandArg::Int(v)) => {
            let byte =
                u8::try_from(v).map_err(|_| CommandError::BadArgument("PushByte".to_string()))?;
            command("PushByte", move |ctx| {
                super::push(ctx, Value::Byte(byte));
                Ok(ExecutionOutcome::Normal)
            })
        }
        ("PushString", CommandArg::Str(text)) => command("PushString", move |ctx| {
            let reference = ctx.alloc_string(text.clone())?;
            super::push(ctx, Value::Object(reference));
            Ok(ExecutionOutcome::Normal)
        }),
        ("PushNull", CommandArg::None) => command("PushNull", stack::push_null),
        ("Pop", CommandArg::None) => command("Pop", stack::pop),
        ("Dup", CommandArg::None) => command("Dup", stack::dup),
        ("Swap", CommandArg::None) => command("Swap", stack::swap),
        ("Rotate", CommandArg::Int(v)) => command("Rotate", move |ctx| stack::rotate(ctx, v)),

        // Locals and statics
        ("LoadLocal", CommandArg::Int(v)) => indexed("LoadLocal", v, |index| {
            command("LoadLocal", move |ctx| stack::load_local(ctx, index))
        })?,
        ("SetLocal", CommandArg::Int(v)) => indexed("SetLocal", v, |index| {
            command("SetLocal", move |ctx| stack::set_local(ctx, index))
        })?,
        ("LoadStatic", CommandArg::Int(v)) => indexed("LoadStatic", v, |index| {
            command("LoadStatic", move |ctx| stack::load_static(ctx, index))
        })?,
        ("SetStatic", CommandArg::Int(v)) => indexed("SetStatic", v, |index| {
            command("SetStatic", move |ctx| stack::set_static(ctx, index))
        })?,

        // Int arithmetic
        ("IntAdd", CommandArg::None) => command("IntAdd", arith::int_add),
        ("IntSubtract", CommandArg::None) => command("IntSubtract", arith::int_subtract),
        ("IntMultiply", CommandArg::None) => command("IntMultiply", arith::int_multiply),
        ("IntDivide", CommandArg::None) => command("IntDivide", arith::int_divide),
        ("IntModulo", CommandArg::None) => command("IntModulo", arith::int_modulo),
        ("IntNegate", CommandArg::None) => command("IntNegate", arith::int_negate),
        ("IntIncrement", CommandArg::None) => command("IntIncrement", arith::int_increment),
        ("IntDecrement", CommandArg::None) => command("IntDecrement", arith::int_decrement),

        // Float arithmetic
        ("FloatAdd", CommandArg::None) => command("FloatAdd", arith::float_add),
        ("FloatSubtract", CommandArg::None) => command("FloatSubtract", arith::float_subtract),
        ("FloatMultiply", CommandArg::None) => command("FloatMultiply", arith::float_multiply),
        ("FloatDivide", CommandArg::None) => command("FloatDivide", arith::float_divide),
        ("FloatNegate", CommandArg::None) => command("FloatNegate", arith::float_negate),
        ("FloatIncrement", CommandArg::None) => command("FloatIncrement", arith::float_increment),
        ("FloatDecrement", CommandArg::None) => command("FloatDecrement", arith::float_decrement),
        ("FloatSqrt", CommandArg::None) => command("FloatSqrt", arith::float_sqrt),

        // Byte arithmetic
        ("ByteAdd", CommandArg::None) => command("ByteAdd", arith::byte_add),
        ("ByteSubtract", CommandArg::None) => command("ByteSubtract", arith::byte_subtract),
        ("ByteMultiply", CommandArg::None) => command("ByteMultiply", arith::byte_multiply),
        ("ByteDivide", CommandArg::None) => command("ByteDivide", arith::byte_divide),
        ("ByteModulo", CommandArg::None) => command("ByteModulo", arith::byte_modulo),
        ("ByteNegate", CommandArg::None) => command("ByteNegate", arith::byte_negate),
        ("ByteIncrement", CommandArg::None) => command("ByteIncrement", arith::byte_increment),
        ("ByteDecrement", CommandArg::None) => command("ByteDecrement", arith::byte_decrement),

        // Boolean logic
        ("BoolAnd", CommandArg::None) => command("BoolAnd", arith::bool_and),
        ("BoolOr", CommandArg::None) => command("BoolOr", arith::bool_or),
        ("BoolNot", CommandArg::None) => command("BoolNot", arith::bool_not),
        ("BoolXor", CommandArg::None) => command("BoolXor", arith::bool_xor),

        // Bitwise and shifts
        ("IntAnd", CommandArg::None) => command("IntAnd", arith::int_and),
        ("IntOr", CommandArg::None) => command("IntOr", arith::int_or),
        ("IntXor", CommandArg::None) => command("IntXor", arith::int_xor),
        ("IntNot", CommandArg::None) => command("IntNot", arith::int_not),
        ("IntLeftShift", CommandArg::None) => command("IntLeftShift", arith::int_left_shift),
        ("IntRightShift", CommandArg::None) => command("IntRightShift", arith::int_right_shift),
        ("ByteAnd", CommandArg::None) => command("ByteAnd", arith::byte_and),
        ("ByteOr", CommandArg::None) => command("ByteOr", arith::byte_or),
        ("ByteXor", CommandArg::None) => command("ByteXor", arith::byte_xor),
        ("ByteNot", CommandArg::None) => command("ByteNot", arith::byte_not),
        ("ByteLeftShift", CommandArg::None) => command("ByteLeftShift", arith::byte_left_shift),
        ("ByteRightShift", CommandArg::None) => {
            command("ByteRightShift", arith::byte_right_shift)
        }

        // Comparisons
        ("IntEqual", CommandArg::None) => command("IntEqual", arith::int_equal),
        ("IntNotEqual", CommandArg::None) => command("IntNotEqual", arith::int_not_equal),
        ("IntLessThan", CommandArg::None) => command("IntLessThan", arith::int_less_than),
        ("IntLessEqual", CommandArg::None) => command("IntLessEqual", arith::int_less_equal),
        ("IntGreaterThan", CommandArg::None) => {
            command("IntGreaterThan", arith::int_greater_than)
        }
        ("IntGreaterEqual", CommandArg::None) => {
            command("IntGreaterEqual", arith::int_greater_equal)
        }
        ("FloatEqual", CommandArg::None) => command("FloatEqual", arith::float_equal),
        ("FloatNotEqual", CommandArg::None) => command("FloatNotEqual", arith::float_not_equal),
        ("FloatLessThan", CommandArg::None) => command("FloatLessThan", arith::float_less_than),
        ("FloatLessEqual", CommandArg::None) => {
            command("FloatLessEqual", arith::float_less_equal)
        }
        ("FloatGreaterThan", CommandArg::None) => {
            command("FloatGreaterThan", arith::float_greater_than)
        }
        ("FloatGreaterEqual", CommandArg::None) => {
            command("FloatGreaterEqual", arith::float_greater_equal)
        }
        ("ByteEqual", CommandArg::None) => command("ByteEqual", arith::byte_equal),
        ("ByteNotEqual", CommandArg::None) => command("ByteNotEqual", arith::byte_not_equal),
        ("ByteLessThan", CommandArg::None) => command("ByteLessThan", arith::byte_less_than),
        ("ByteLessEqual", CommandArg::None) => command("ByteLessEqual", arith::byte_less_equal),
        ("ByteGreaterThan", CommandArg::None) => {
            command("ByteGreaterThan", arith::byte_greater_than)
        }
        ("ByteGreaterEqual", CommandArg::None) => {
            command("ByteGreaterEqual", arith::byte_greater_equal)
        }

        // Conversions
        ("IntToFloat", CommandArg::None) => command("IntToFloat", convert::int_to_float),
        ("FloatToInt", CommandArg::None) => command("FloatToInt", convert::float_to_int),
        ("ByteToInt", CommandArg::None) => command("ByteToInt", convert::byte_to_int),
        ("CharToByte", CommandArg::None) => command("CharToByte", convert::char_to_byte),
        ("ByteToChar", CommandArg::None) => command("ByteToChar", convert::byte_to_char),
        ("BoolToByte", CommandArg::None) => command("BoolToByte", convert::bool_to_byte),
        ("StringToInt", CommandArg::None) => command("StringToInt", convert::string_to_int),
        ("StringToFloat", CommandArg::None) => command("StringToFloat", convert::string_to_float),
        ("IntToString", CommandArg::None) => command("IntToString", convert::int_to_string),
        ("FloatToString", CommandArg::None) => command("FloatToString", convert::float_to_string),

        // Strings
        ("StringConcat", CommandArg::None) => command("StringConcat", strings::string_concat),
        ("StringLength", CommandArg::None) => command("StringLength", strings::string_length),
        ("StringSubstring", CommandArg::None) => {
            command("StringSubstring", strings::string_substring)
        }
        ("StringCompare", CommandArg::None) => command("StringCompare", strings::string_compare),

        // Calls and control flow
        ("Call", CommandArg::Ident(id)) => command("Call", move |ctx| calls::call(ctx, &id)),
        ("CallIndirect", CommandArg::None) => command("CallIndirect", calls::call_indirect),
        ("CallVirtual", CommandArg::Ident(method)) => {
            command("CallVirtual", move |ctx| calls::call_virtual(ctx, &method))
        }
        ("CallConstructor", CommandArg::Ident(id)) => {
            command("CallConstructor", move |ctx| calls::call_constructor(ctx, &id))
        }
        ("Return", CommandArg::None) => command("Return", calls::return_outcome),
        ("Break", CommandArg::None) => command("Break", calls::break_outcome),
        ("Continue", CommandArg::None) => command("Continue", calls::continue_outcome),

        // Fields and vtables
        ("GetField", CommandArg::Int(v)) => indexed("GetField", v, |index| {
            command("GetField", move |ctx| objects::get_field(ctx, index))
        })?,
        ("SetField", CommandArg::Int(v)) => indexed("SetField", v, |index| {
            command("SetField", move |ctx| objects::set_field(ctx, index))
        })?,
        ("GetVTable", CommandArg::Ident(class)) => {
            command("GetVTable", move |ctx| objects::get_vtable(ctx, &class))
        }
        ("SetVTable", CommandArg::Ident(class)) => {
            command("SetVTable", move |ctx| objects::set_vtable(ctx, &class))
        }

        // Nullable
        ("IsNull", CommandArg::None) => command("IsNull", objects::is_null),
        ("NullCoalesce", CommandArg::None) => command("NullCoalesce", objects::null_coalesce),
        ("Unwrap", CommandArg::None) => command("Unwrap", objects::unwrap),
        ("SafeCall", CommandArg::Ident(method)) => {
            command("SafeCall", move |ctx| objects::safe_call(ctx, &method))
        }

        // Arrays
        ("NewArray", CommandArg::Ident(class)) => {
            command("NewArray", move |ctx| objects::new_array(ctx, &class))
        }

        // Standard streams
        ("Print", CommandArg::None) => command("Print", io::print),
        ("PrintLine", CommandArg::None) => command("PrintLine", io::print_line),
        ("ReadLine", CommandArg::None) => command("ReadLine", io::read_line),
        ("ReadChar", CommandArg::None) => command("ReadChar", io::read_char),
        ("ReadInt", CommandArg::None) => command("ReadInt", io::read_int),
        ("ReadFloat", CommandArg::None) => command("ReadFloat", io::read_float),

        // Filesystem
        ("FileExists", CommandArg::None) => command("FileExists", io::file_exists),
        ("DirectoryExists", CommandArg::None) => {
            command("DirectoryExists", io::directory_exists)
        }
        ("CreateDirectory", CommandArg::None) => {
            command("CreateDirectory", io::create_directory)
        }
        ("DeleteFile", CommandArg::None) => command("DeleteFile", io::delete_file),
        ("DeleteDirectory", CommandArg::None) => {
            command("DeleteDirectory", io::delete_directory)
        }
        ("MoveFile", CommandArg::None) => command("MoveFile", io::move_file),
        ("CopyFile", CommandArg::None) => command("CopyFile", io::copy_file),
        ("ListDirectory", CommandArg::None) => command("ListDirectory", io::list_directory),
        ("GetCurrentDirectory", CommandArg::None) => {
            command("GetCurrentDirectory", io::get_current_directory)
        }
        ("ChangeDirectory", CommandArg::None) => {
            command("ChangeDirectory", io::change_directory)
        }

        // Time and sleep
        ("UnixTime", CommandArg::None) => command("UnixTime", system::unix_time),
        ("UnixTimeMs", CommandArg::None) => command("UnixTimeMs", system::unix_time_ms),
        ("UnixTimeNs", CommandArg::None) => command("UnixTimeNs", system::unix_time_ns),
        ("NanoTime", CommandArg::None) => command("NanoTime", system::nano_time),
        ("SleepMs", CommandArg::None) => command("SleepMs", system::sleep_ms),
        ("SleepNs", CommandArg::None) => command("SleepNs", system::sleep_ns),

        // Randomness
        ("Random", CommandArg::None) => command("Random", system::random),
        ("RandomRange", CommandArg::None) => command("RandomRange", system::random_range),
        ("RandomFloat", CommandArg::None) => command("RandomFloat", system::random_float),
        ("RandomFloatRange", CommandArg::None) => {
            command("RandomFloatRange", system::random_float_range)
        }
        ("SeedRandom", CommandArg::None) => command("SeedRandom", system::seed_random),

        // Environment and system information
        ("GetOsName", CommandArg::None) => command("GetOsName", system::get_os_name),
        ("GetOsVersion", CommandArg::None) => command("GetOsVersion", system::get_os_version),
        ("GetArchitecture", CommandArg::None) => {
            command("GetArchitecture", system::get_architecture)
        }
        ("GetUserName", CommandArg::None) => command("GetUserName", system::get_user_name),
        ("GetHomeDirectory", CommandArg::None) => {
            command("GetHomeDirectory", system::get_home_directory)
        }
        ("GetProcessId", CommandArg::None) => command("GetProcessId", system::get_process_id),
        ("GetEnvironmentVariable", CommandArg::None) => {
            command("GetEnvironmentVariable", system::get_environment_variable)
        }
        ("SetEnvironmentVariable", CommandArg::None) => {
            command("SetEnvironmentVariable", system::set_environment_variable)
        }
        ("GetProcessorCount", CommandArg::None) => {
            command("GetProcessorCount", system::get_processor_count)
        }
        ("GetMemoryUsage", CommandArg::None) => {
            command("GetMemoryUsage", system::get_memory_usage)
        }
        ("GetPeakMemoryUsage", CommandArg::None) => {
            command("GetPeakMemoryUsage", system::get_peak_memory_usage)
        }
        ("ForceGarbageCollection", CommandArg::None) => {
            command("ForceGarbageCollection", system::force_garbage_collection)
        }
        ("Exit", CommandArg::Int(code)) => command("Exit", move |ctx| system::exit(ctx, code)),

        // Introspection
        ("TypeOf", CommandArg::None) => command("TypeOf", objects::type_of),
        ("IsType", CommandArg::Ident(type_name)) => {
            command("IsType", move |ctx| objects::is_type(ctx, &type_name))
        }
        ("SizeOf", CommandArg::Ident(type_name)) => {
            command("SizeOf", move |ctx| objects::size_of(ctx, &type_name))
        }

        (unknown, CommandArg::None) => return Err(CommandError::Unknown(unknown.to_string())),
        (mismatched, _) => return Err(CommandError::BadArgument(mismatched.to_string())),
    };
    Ok(cmd)
}
