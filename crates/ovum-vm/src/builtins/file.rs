// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/builtins/file.rs
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
//! Method bodies of the `File` class.
//!
//! Modes follow the familiar POSIX set: `r`, `w`, `a`, `r+`, `w+`, `a+`.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};

use ovum_runtime::{ObjectBody, ObjectRef, RuntimeError, Value};

use crate::commands::{pop_int, pop_object, pop_string, push};
use crate::context::ExecutionContext;
use crate::outcome::{ExecOutcome, ExecutionOutcome};

fn handle_mut<'ctx>(
    ctx: &'ctx mut ExecutionContext<'_>,
    reference: ObjectRef,
    op: &str,
) -> Result<&'ctx mut Option<File>, RuntimeError> {
    let object = ctx.heap.repository_mut().get_mut(reference, op)?;
    match &mut object.body {
        ObjectBody::File(handle) => Ok(handle),
        _ => Err(RuntimeError::type_mismatch(op, "File", "non-file payload")),
    }
}

fn open_file_mut<'ctx>(
    ctx: &'ctx mut ExecutionContext<'_>,
    reference: ObjectRef,
    op: &str,
) -> Result<&'ctx mut File, RuntimeError> {
    handle_mut(ctx, reference, op)?
        .as_mut()
        .ok_or_else(|| RuntimeError::io(op, "file is not open"))
}

fn open_options(mode: &str, op: &str) -> Result<OpenOptions, RuntimeError> {
    let mut options = OpenOptions::new();
    match mode {
        "r" => {
            let _ = options.read(true);
        }
        "w" => {
            let _ = options.write(true).create(true).truncate(true);
        }
        "a" => {
            let _ = options.append(true).create(true);
        }
        "r+" => {
            let _ = options.read(true).write(true);
        }
        "w+" => {
            let _ = options.read(true).write(true).create(true).truncate(true);
        }
        "a+" => {
            let _ = options.read(true).append(true).create(true);
        }
        other => {
            return Err(RuntimeError::io(op, format!("unsupported mode '{other}'")));
        }
    }
    Ok(options)
}

/// `_File`: the default constructor leaves the file closed.
pub(crate) fn constructor(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "File constructor")?;
    push(ctx, Value::Object(receiver));
    Ok(ExecutionOutcome::Normal)
}

/// The destructor closes an open handle by dropping it.
pub(crate) fn destructor(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "File destructor")?;
    let _ = handle_mut(ctx, receiver, "File destructor")?.take();
    Ok(ExecutionOutcome::Normal)
}

/// `[... path mode this] → [...]`; an already open handle is reopened.
pub(crate) fn open(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "File Open")?;
    let mode = pop_string(ctx, "File Open")?;
    let path = pop_string(ctx, "File Open")?;

    let file = open_options(&mode, "File Open")?
        .open(&path)
        .map_err(|error| RuntimeError::io("File Open", format!("{path}: {error}")))?;
    *handle_mut(ctx, receiver, "File Open")? = Some(file);
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn close(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "File Close")?;
    let _ = handle_mut(ctx, receiver, "File Close")?.take();
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn is_open(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "File IsOpen")?;
    let open = handle_mut(ctx, receiver, "File IsOpen")?.is_some();
    push(ctx, Value::Bool(open));
    Ok(ExecutionOutcome::Normal)
}

/// `[... n this] → [... ByteArray]`, reading up to `n` bytes.
pub(crate) fn read(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "File Read")?;
    let count = pop_int(ctx, "File Read")?;
    let count = usize::try_from(count)
        .map_err(|_| RuntimeError::io("File Read", format!("negative byte count {count}")))?;

    let mut buffer = vec![0u8; count];
    let mut total = 0usize;
    {
        let file = open_file_mut(ctx, receiver, "File Read")?;
        while total < count {
            let read = file
                .read(&mut buffer[total..])
                .map_err(|error| RuntimeError::io("File Read", error))?;
            if read == 0 {
                break;
            }
            total += read;
        }
    }
    buffer.truncate(total);

    let array = ctx.register_instance("ByteArray", ObjectBody::Bytes(buffer))?;
    push(ctx, Value::Object(array));
    Ok(ExecutionOutcome::Normal)
}

/// `[... ByteArray this] → [...]`
pub(crate) fn write(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "File Write")?;
    let source = pop_object(ctx, "File Write")?;
    let bytes = match &ctx.heap.repository().get(source, "File Write")?.body {
        ObjectBody::Bytes(bytes) => bytes.clone(),
        _ => {
            return Err(RuntimeError::type_mismatch(
                "File Write",
                "ByteArray",
                ctx.class_name_of(source),
            ));
        }
    };
    let file = open_file_mut(ctx, receiver, "File Write")?;
    file.write_all(&bytes).map_err(|error| RuntimeError::io("File Write", error))?;
    Ok(ExecutionOutcome::Normal)
}

/// Reads up to the next newline (consumed, not returned) or end of file.
pub(crate) fn read_line(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "File ReadLine")?;
    let mut line = Vec::new();
    {
        let file = open_file_mut(ctx, receiver, "File ReadLine")?;
        let mut byte = [0u8; 1];
        loop {
            match file.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    if byte[0] == b'\n' {
                        break;
                    }
                    line.push(byte[0]);
                }
                Err(error) => return Err(RuntimeError::io("File ReadLine", error)),
            }
        }
    }
    if line.last() == Some(&b'\r') {
        let _ = line.pop();
    }
    let text = String::from_utf8_lossy(&line).into_owned();
    let reference = ctx.alloc_string(text)?;
    push(ctx, Value::Object(reference));
    Ok(ExecutionOutcome::Normal)
}

/// `[... String this] → [...]`, writing the text plus a newline.
pub(crate) fn write_line(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "File WriteLine")?;
    let source = pop_object(ctx, "File WriteLine")?;
    let text = ctx.string_value(source, "File WriteLine")?;
    let file = open_file_mut(ctx, receiver, "File WriteLine")?;
    writeln!(file, "{text}").map_err(|error| RuntimeError::io("File WriteLine", error))?;
    Ok(ExecutionOutcome::Normal)
}

/// `[... offset this] → [...]`, seeking from the start.
pub(crate) fn seek(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "File Seek")?;
    let offset = pop_int(ctx, "File Seek")?;
    let offset = u64::try_from(offset)
        .map_err(|_| RuntimeError::io("File Seek", format!("negative offset {offset}")))?;
    let file = open_file_mut(ctx, receiver, "File Seek")?;
    let _ = file
        .seek(SeekFrom::Start(offset))
        .map_err(|error| RuntimeError::io("File Seek", error))?;
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn tell(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "File Tell")?;
    let file = open_file_mut(ctx, receiver, "File Tell")?;
    let position =
        file.stream_position().map_err(|error| RuntimeError::io("File Tell", error))?;
    push(ctx, Value::Int(position as i64));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn eof(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "File Eof")?;
    let file = open_file_mut(ctx, receiver, "File Eof")?;
    let position = file.stream_position().map_err(|error| RuntimeError::io("File Eof", error))?;
    let len = file
        .metadata()
        .map_err(|error| RuntimeError::io("File Eof", error))?
        .len();
    push(ctx, Value::Bool(position >= len));
    Ok(ExecutionOutcome::Normal)
}
