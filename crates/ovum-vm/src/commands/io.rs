// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/commands/io.rs
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
//! Standard-stream and filesystem opcodes.

use std::io::{BufRead, Read, Write};

use ovum_runtime::{ObjectBody, ObjectRef, RuntimeError, Value};

use super::{pop_string, push};
use crate::context::ExecutionContext;
use crate::outcome::{ExecOutcome, ExecutionOutcome};

fn read_host_line(ctx: &mut ExecutionContext<'_>, op: &str) -> Result<String, RuntimeError> {
    let mut line = String::new();
    let read = ctx.io.input.read_line(&mut line).map_err(|error| RuntimeError::io(op, error))?;
    if read == 0 {
        return Err(RuntimeError::io(op, "end of input"));
    }
    if line.ends_with('\n') {
        let _ = line.pop();
        if line.ends_with('\r') {
            let _ = line.pop();
        }
    }
    Ok(line)
}

/// Pops a `String` and writes its text to the ordinary output stream.
pub(crate) fn print(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let text = pop_string(ctx, "Print")?;
    ctx.io.output.write_all(text.as_bytes()).map_err(|error| RuntimeError::io("Print", error))?;
    ctx.io.output.flush().map_err(|error| RuntimeError::io("Print", error))?;
    Ok(ExecutionOutcome::Normal)
}

/// Like `Print`, with a trailing newline.
pub(crate) fn print_line(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let text = pop_string(ctx, "PrintLine")?;
    writeln!(ctx.io.output, "{text}").map_err(|error| RuntimeError::io("PrintLine", error))?;
    ctx.io.output.flush().map_err(|error| RuntimeError::io("PrintLine", error))?;
    Ok(ExecutionOutcome::Normal)
}

/// Reads one line from the input stream and pushes it as a `String`.
pub(crate) fn read_line(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let line = read_host_line(ctx, "ReadLine")?;
    let reference = ctx.alloc_string(line)?;
    push(ctx, Value::Object(reference));
    Ok(ExecutionOutcome::Normal)
}

/// Reads one byte from the input stream and pushes it as a `char`.
pub(crate) fn read_char(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let mut byte = [0u8; 1];
    ctx.io
        .input
        .read_exact(&mut byte)
        .map_err(|error| RuntimeError::io("ReadChar", error))?;
    push(ctx, Value::Char(byte[0]));
    Ok(ExecutionOutcome::Normal)
}

/// Reads one line and parses it as an `int`.
pub(crate) fn read_int(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let line = read_host_line(ctx, "ReadInt")?;
    let value = line.trim().parse::<i64>().map_err(|error| {
        RuntimeError::other(format!("ReadInt: cannot parse '{line}': {error}"))
    })?;
    push(ctx, Value::Int(value));
    Ok(ExecutionOutcome::Normal)
}

/// Reads one line and parses it as a `float`.
pub(crate) fn read_float(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let line = read_host_line(ctx, "ReadFloat")?;
    let value = line.trim().parse::<f64>().map_err(|error| {
        RuntimeError::other(format!("ReadFloat: cannot parse '{line}': {error}"))
    })?;
    push(ctx, Value::Float(value));
    Ok(ExecutionOutcome::Normal)
}

// --- Filesystem probes and mutations ---

pub(crate) fn file_exists(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let path = pop_string(ctx, "FileExists")?;
    let exists = std::path::Path::new(&path).is_file();
    push(ctx, Value::Bool(exists));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn directory_exists(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let path = pop_string(ctx, "DirectoryExists")?;
    let exists = std::path::Path::new(&path).is_dir();
    push(ctx, Value::Bool(exists));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn create_directory(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let path = pop_string(ctx, "CreateDirectory")?;
    std::fs::create_dir_all(&path).map_err(|error| RuntimeError::io("CreateDirectory", error))?;
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn delete_file(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let path = pop_string(ctx, "DeleteFile")?;
    std::fs::remove_file(&path).map_err(|error| RuntimeError::io("DeleteFile", error))?;
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn delete_directory(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let path = pop_string(ctx, "DeleteDirectory")?;
    std::fs::remove_dir_all(&path).map_err(|error| RuntimeError::io("DeleteDirectory", error))?;
    Ok(ExecutionOutcome::Normal)
}

/// `[... src dest] → [...]`
pub(crate) fn move_file(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let destination = pop_string(ctx, "MoveFile")?;
    let source = pop_string(ctx, "MoveFile")?;
    std::fs::rename(&source, &destination)
        .map_err(|error| RuntimeError::io("MoveFile", error))?;
    Ok(ExecutionOutcome::Normal)
}

/// `[... src dest] → [...]`
pub(crate) fn copy_file(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let destination = pop_string(ctx, "CopyFile")?;
    let source = pop_string(ctx, "CopyFile")?;
    let _ = std::fs::copy(&source, &destination)
        .map_err(|error| RuntimeError::io("CopyFile", error))?;
    Ok(ExecutionOutcome::Normal)
}

/// Pops a directory path and pushes a `StringArray` of entry names.
pub(crate) fn list_directory(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let path = pop_string(ctx, "ListDirectory")?;
    let entries = std::fs::read_dir(&path).map_err(|error| RuntimeError::io("ListDirectory", error))?;

    // Freshly allocated names stay on the operand stack so a collection
    // triggered by a later allocation cannot reclaim them.
    let mut count = 0usize;
    for entry in entries {
        let entry = entry.map_err(|error| RuntimeError::io("ListDirectory", error))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let reference = ctx.alloc_string(name)?;
        push(ctx, Value::Object(reference));
        count += 1;
    }

    let mut names: Vec<ObjectRef> = Vec::with_capacity(count);
    for _ in 0..count {
        names.push(super::pop_object(ctx, "ListDirectory")?);
    }
    names.reverse();

    let array = ctx.register_instance("StringArray", ObjectBody::Refs(names))?;
    push(ctx, Value::Object(array));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn get_current_directory(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let path = std::env::current_dir()
        .map_err(|error| RuntimeError::io("GetCurrentDirectory", error))?;
    let reference = ctx.alloc_string(path.to_string_lossy().into_owned())?;
    push(ctx, Value::Object(reference));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn change_directory(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let path = pop_string(ctx, "ChangeDirectory")?;
    std::env::set_current_dir(&path)
        .map_err(|error| RuntimeError::io("ChangeDirectory", error))?;
    Ok(ExecutionOutcome::Normal)
}
