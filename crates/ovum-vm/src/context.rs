// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/context.rs
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
//! The execution context threaded through every node of the execution
//! tree, plus the heap services that need the full machine state.

use std::cell::RefCell;
use std::fmt;
use std::io::{BufRead, BufReader, Write};
use std::rc::Rc;
use std::time::Instant;

use log::warn;
use ovum_runtime::{
    HeapObject, MemoryManager, ObjectBody, ObjectRef, RuntimeError, RuntimeMemory, StackFrame,
    Value, VirtualTableStore, collect_unmarked, mark_live,
};
use rand::rngs::StdRng;

use crate::builtins::ids;
use crate::function::FunctionStore;
use crate::outcome::ExecutionOutcome;

/// The caller-supplied standard streams the I/O opcodes bind to.
pub struct VmIo {
    /// Guest standard input.
    pub input: Box<dyn BufRead>,
    /// Guest ordinary output.
    pub output: Box<dyn Write>,
    /// Diagnostics output.
    pub error: Box<dyn Write>,
}

impl VmIo {
    /// Binds the guest streams to the host process streams.
    #[must_use]
    pub fn stdio() -> Self {
        Self {
            input: Box::new(BufReader::new(std::io::stdin())),
            output: Box::new(std::io::stdout()),
            error: Box::new(std::io::stderr()),
        }
    }

    /// Builds streams over in-memory buffers, for embedding and tests.
    ///
    /// The returned capture handle exposes whatever the program wrote.
    #[must_use]
    pub fn capture(input: &str) -> (Self, IoCapture) {
        let output = Rc::new(RefCell::new(Vec::new()));
        let error = Rc::new(RefCell::new(Vec::new()));
        let io = Self {
            input: Box::new(std::io::Cursor::new(input.to_string().into_bytes())),
            output: Box::new(SharedSink(Rc::clone(&output))),
            error: Box::new(SharedSink(Rc::clone(&error))),
        };
        (io, IoCapture { output, error })
    }
}

impl fmt::Debug for VmIo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VmIo").finish_non_exhaustive()
    }
}

/// Read-back handle for [`VmIo::capture`].
#[derive(Debug, Clone)]
pub struct IoCapture {
    output: Rc<RefCell<Vec<u8>>>,
    error: Rc<RefCell<Vec<u8>>>,
}

impl IoCapture {
    /// Everything written to the ordinary output stream so far.
    #[must_use]
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.output.borrow()).into_owned()
    }

    /// Everything written to the diagnostics stream so far.
    #[must_use]
    pub fn error(&self) -> String {
        String::from_utf8_lossy(&self.error.borrow()).into_owned()
    }
}

struct SharedSink(Rc<RefCell<Vec<u8>>>);

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Everything an executing node can touch: the machine state, the heap,
/// the two stores, the guest streams, and the seeded random source.
///
/// The stores are shared borrows because functions re-enter the store
/// during execution; their counters use interior mutability instead.
pub struct ExecutionContext<'run> {
    /// Globals, operand stack, call frames.
    pub memory: &'run mut RuntimeMemory,
    /// Object repository, allocation, and collection trigger.
    pub heap: &'run mut MemoryManager,
    /// Installed virtual tables.
    pub vtables: &'run VirtualTableStore,
    /// Registered functions.
    pub functions: &'run FunctionStore,
    /// Guest standard streams.
    pub io: &'run mut VmIo,
    /// Guest-visible random source (`Random*`, `SeedRandom`).
    pub rng: &'run mut StdRng,
    /// Monotonic reference point for `NanoTime`.
    pub start_time: Instant,
}

impl fmt::Debug for ExecutionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext").finish_non_exhaustive()
    }
}

impl ExecutionContext<'_> {
    /// Looks up a function by id and executes it.
    pub fn call_function_by_id(&mut self, id: &str) -> Result<ExecutionOutcome, RuntimeError> {
        let functions = self.functions;
        let function = functions.get_by_id(id)?;
        function.execute(self)
    }

    /// Looks up a function by store index and executes it.
    pub fn call_function_by_index(
        &mut self,
        index: usize,
    ) -> Result<ExecutionOutcome, RuntimeError> {
        let functions = self.functions;
        let function = functions.get(index)?;
        function.execute(self)
    }

    /// Allocates one instance of the named class with its empty payload.
    ///
    /// Runs the collector afterwards if the allocation crossed the
    /// threshold; the fresh object is kept alive through that collection.
    pub fn allocate_instance(&mut self, class: &str) -> Result<ObjectRef, RuntimeError> {
        let index = self.vtables.index_of(class)?;
        self.allocate_at(index)
    }

    /// Allocates one instance of the class at `vtable_index`.
    pub fn allocate_at(&mut self, vtable_index: usize) -> Result<ObjectRef, RuntimeError> {
        let vtable = self.vtables.get(vtable_index)?;
        let reference = self.heap.allocate(vtable, vtable_index as u32)?;
        self.collect_after_allocation(reference)?;
        Ok(reference)
    }

    /// Registers an instance of the named class with a prepared payload.
    pub fn register_instance(
        &mut self,
        class: &str,
        body: ObjectBody,
    ) -> Result<ObjectRef, RuntimeError> {
        let index = self.vtables.index_of(class)?;
        let reference = self.heap.register(HeapObject::new(index as u32, body));
        self.collect_after_allocation(reference)?;
        Ok(reference)
    }

    /// Allocates a `String` instance holding `text`.
    pub fn alloc_string(&mut self, text: impl Into<String>) -> Result<ObjectRef, RuntimeError> {
        self.register_instance("String", ObjectBody::Str(text.into()))
    }

    /// Reads the text of a `String` instance.
    pub fn string_value(&self, reference: ObjectRef, op: &str) -> Result<String, RuntimeError> {
        match &self.heap.repository().get(reference, op)?.body {
            ObjectBody::Str(text) => Ok(text.clone()),
            _ => Err(RuntimeError::type_mismatch(op, "String", self.class_name_of(reference))),
        }
    }

    /// Class name of a live object, or a placeholder for diagnostics.
    #[must_use]
    pub fn class_name_of(&self, reference: ObjectRef) -> String {
        self.heap
            .repository()
            .get(reference, "class_name_of")
            .ok()
            .and_then(|object| self.vtables.get(object.descriptor.vtable_index as usize).ok())
            .map_or_else(|| "<unknown type>".to_string(), |vtable| vtable.name().to_string())
    }

    /// The vtable of a live object.
    pub fn vtable_of(
        &self,
        reference: ObjectRef,
        op: &str,
    ) -> Result<&ovum_runtime::VirtualTable, RuntimeError> {
        let object = self.heap.repository().get(reference, op)?;
        self.vtables.get(object.descriptor.vtable_index as usize)
    }

    /// Runs one full mark-and-sweep collection.
    ///
    /// A collection already in progress makes this a no-op: user
    /// destructors may allocate, and the sweep must not recurse.
    pub fn run_collection(&mut self) -> Result<(), RuntimeError> {
        if !self.heap.begin_collection() {
            return Ok(());
        }
        mark_live(self.memory, self.heap.repository_mut(), self.vtables);
        let dead = collect_unmarked(self.heap.repository_mut());
        for reference in dead {
            if let Err(error) = self.destroy_object(reference) {
                // The sweep keeps going; the memory is still released.
                warn!("destructor failed during sweep: {error}");
            }
        }
        self.heap.end_collection();
        Ok(())
    }

    /// Destroys one object: destructor, deregistration, release.
    ///
    /// The destructor runs with the object on the operand stack inside a
    /// synthetic frame. The repository entry is removed even when the
    /// destructor fails; the failure is then propagated.
    pub fn destroy_object(&mut self, reference: ObjectRef) -> Result<(), RuntimeError> {
        let vtable_index = self
            .heap
            .repository()
            .get(reference, "DeallocateObject")?
            .descriptor
            .vtable_index;
        let vtable = self.vtables.get(vtable_index as usize)?;
        let destructor_id = vtable.real_method_id(ids::DESTRUCTOR)?.clone();

        self.memory.machine_stack.push(Value::Object(reference));
        self.memory.stack_frames.push(StackFrame::new("object teardown"));
        let destructor_result = self.call_function_by_id(&destructor_id);
        let _ = self.memory.stack_frames.pop();

        let release_result = self.heap.release(reference);
        let _ = destructor_result?;
        let _ = release_result?;
        Ok(())
    }

    /// Destroys every live object (end-of-run teardown).
    ///
    /// Destructor failures are logged and do not stop the teardown.
    pub fn clear_all_objects(&mut self) {
        for reference in self.heap.repository().handles() {
            if !self.heap.repository().contains(reference) {
                // Already torn down by an earlier destructor in this pass.
                continue;
            }
            if let Err(error) = self.destroy_object(reference) {
                warn!("destructor failed during teardown: {error}");
            }
        }
    }

    fn collect_after_allocation(&mut self, fresh: ObjectRef) -> Result<(), RuntimeError> {
        if !self.heap.needs_collection() {
            return Ok(());
        }
        // The fresh object is not yet reachable from any root; pin it on
        // the operand stack for the duration of the collection.
        self.memory.machine_stack.push(Value::Object(fresh));
        let result = self.run_collection();
        let _ = self.memory.machine_stack.pop("collect_after_allocation");
        result
    }
}
