// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/commands/strings.rs
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
//! String opcodes over `String` instances.

use ovum_runtime::{RuntimeError, Value};

use super::{pop_int, pop_string, push};
use crate::context::ExecutionContext;
use crate::outcome::{ExecOutcome, ExecutionOutcome};

/// `[... a b] → [... a+b]`
pub(crate) fn string_concat(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let right = pop_string(ctx, "StringConcat")?;
    let left = pop_string(ctx, "StringConcat")?;
    let mut combined = left;
    combined.push_str(&right);
    let reference = ctx.alloc_string(combined)?;
    push(ctx, Value::Object(reference));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn string_length(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let text = pop_string(ctx, "StringLength")?;
    push(ctx, Value::Int(text.len() as i64));
    Ok(ExecutionOutcome::Normal)
}

/// `[... s start len] → [... substring]`
pub(crate) fn string_substring(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let length = pop_int(ctx, "StringSubstring")?;
    let start = pop_int(ctx, "StringSubstring")?;
    let text = pop_string(ctx, "StringSubstring")?;

    let start_index = usize::try_from(start).map_err(|_| RuntimeError::IndexOutOfRange {
        op: "StringSubstring".to_string(),
        index: start,
        len: text.len(),
    })?;
    let take = usize::try_from(length).map_err(|_| RuntimeError::IndexOutOfRange {
        op: "StringSubstring".to_string(),
        index: length,
        len: text.len(),
    })?;
    if start_index + take > text.len() {
        return Err(RuntimeError::IndexOutOfRange {
            op: "StringSubstring".to_string(),
            index: start,
            len: text.len(),
        });
    }

    let slice = text.as_bytes()[start_index..start_index + take].to_vec();
    let substring = String::from_utf8_lossy(&slice).into_owned();
    let reference = ctx.alloc_string(substring)?;
    push(ctx, Value::Object(reference));
    Ok(ExecutionOutcome::Normal)
}

/// Lexicographic comparison; pushes -1, 0, or 1.
pub(crate) fn string_compare(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let right = pop_string(ctx, "StringCompare")?;
    let left = pop_string(ctx, "StringCompare")?;
    let ordering = match left.cmp(&right) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    };
    push(ctx, Value::Int(ordering));
    Ok(ExecutionOutcome::Normal)
}
