// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/executor.rs
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
//! The program executor: wires the machine together, runs the static
//! initializer, and invokes the entry function.

use std::time::Instant;

use log::{debug, info};
use ovum_runtime::{
    MemoryManager, ObjectBody, ObjectRef, RuntimeError, RuntimeMemory, StackFrame, Value,
    VirtualTableStore,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::context::{ExecutionContext, VmIo};
use crate::exec::Block;
use crate::function::FunctionStore;

/// Id of the program entry function.
///
/// Arity 1; its sole argument is the `StringArray` built from the CLI
/// trailing arguments, and it must return an `int`.
pub const MAIN_FUNCTION_ID: &str = "_Global_Main_StringArray";

/// Owns the full machine state of one program run.
#[derive(Debug)]
pub struct Executor {
    memory: RuntimeMemory,
    heap: MemoryManager,
    vtables: VirtualTableStore,
    functions: FunctionStore,
    io: VmIo,
    rng: StdRng,
    start_time: Instant,
}

impl Executor {
    /// Builds an executor over populated stores.
    ///
    /// The stores must already contain the built-in catalog (and whatever
    /// the parser added); `gc_threshold` is the live-object count that
    /// triggers collection.
    #[must_use]
    pub fn new(
        vtables: VirtualTableStore,
        functions: FunctionStore,
        io: VmIo,
        gc_threshold: usize,
    ) -> Self {
        Self {
            memory: RuntimeMemory::new(),
            heap: MemoryManager::new(gc_threshold),
            vtables,
            functions,
            io,
            rng: StdRng::from_entropy(),
            start_time: Instant::now(),
        }
    }

    /// Borrows the full execution context.
    pub fn context(&mut self) -> ExecutionContext<'_> {
        ExecutionContext {
            memory: &mut self.memory,
            heap: &mut self.heap,
            vtables: &self.vtables,
            functions: &self.functions,
            io: &mut self.io,
            rng: &mut self.rng,
            start_time: self.start_time,
        }
    }

    /// The machine memory (for embedding and tests).
    #[must_use]
    pub const fn memory(&self) -> &RuntimeMemory {
        &self.memory
    }

    /// The memory manager (for embedding and tests).
    #[must_use]
    pub const fn heap(&self) -> &MemoryManager {
        &self.heap
    }

    /// The function store.
    #[must_use]
    pub const fn functions(&self) -> &FunctionStore {
        &self.functions
    }

    /// Runs a whole program: the static initializer once, then the entry
    /// function against an argument array built from `args`.
    ///
    /// Returns the entry function's integer result, or the code of an
    /// `Exit` opcode. Every remaining object is destroyed before this
    /// returns, whatever the outcome.
    pub fn run_program(
        &mut self,
        init_static: &Block,
        args: &[String],
    ) -> Result<i64, RuntimeError> {
        let result = self.run_to_completion(init_static, args);
        self.context().clear_all_objects();
        match result {
            Err(RuntimeError::Exit(code)) => Ok(code),
            other => other,
        }
    }

    fn run_to_completion(
        &mut self,
        init_static: &Block,
        args: &[String],
    ) -> Result<i64, RuntimeError> {
        let mut ctx = self.context();

        debug!("running init-static ({} statements)", init_static.len());
        ctx.memory.stack_frames.push(StackFrame::new("init-static"));
        let init_result = init_static.execute(&mut ctx);
        let _ = ctx.memory.stack_frames.pop();
        let _ = init_result?;

        let arguments = build_argument_array(&mut ctx, args)?;
        ctx.memory.machine_stack.push(Value::Object(arguments));

        info!("invoking {MAIN_FUNCTION_ID} with {} argument(s)", args.len());
        let _ = ctx.call_function_by_id(MAIN_FUNCTION_ID)?;

        match ctx.memory.machine_stack.pop("RunProgram")? {
            Value::Int(code) => Ok(code),
            other => Err(RuntimeError::type_mismatch(
                "RunProgram: entry function result",
                "int",
                other.tag_name(),
            )),
        }
    }
}

/// Builds the `StringArray` the entry function receives.
fn build_argument_array(
    ctx: &mut ExecutionContext<'_>,
    args: &[String],
) -> Result<ObjectRef, RuntimeError> {
    // Each fresh string is pinned on the operand stack so a collection
    // triggered by a later allocation cannot reclaim it.
    for arg in args {
        let reference = ctx.alloc_string(arg.clone())?;
        ctx.memory.machine_stack.push(Value::Object(reference));
    }

    let mut elements = Vec::with_capacity(args.len());
    for _ in 0..args.len() {
        match ctx.memory.machine_stack.pop("argument array")? {
            Value::Object(reference) => elements.push(reference),
            other => {
                return Err(RuntimeError::type_mismatch(
                    "argument array",
                    "String",
                    other.tag_name(),
                ));
            }
        }
    }
    elements.reverse();

    ctx.register_instance("StringArray", ObjectBody::Refs(elements))
}
