// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-runtime/src/memory.rs
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
//! The mutable register file of a running program.

use crate::stack::{FrameStack, OperandStack};
use crate::value::Value;

/// Globals, operand stack, and call-frame stack of one program run.
///
/// All of it is owned by the single execution context and mutated only by
/// the currently executing opcode; the collector observes it quiescent.
#[derive(Debug, Default)]
pub struct RuntimeMemory {
    /// Process-wide static slots (`LoadStatic`/`SetStatic`).
    pub global_variables: Vec<Value>,
    /// The machine operand stack.
    pub machine_stack: OperandStack,
    /// The call-frame stack.
    pub stack_frames: FrameStack,
}

impl RuntimeMemory {
    /// Creates empty runtime memory.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            global_variables: Vec::new(),
            machine_stack: OperandStack::new(),
            stack_frames: FrameStack::new(),
        }
    }
}
