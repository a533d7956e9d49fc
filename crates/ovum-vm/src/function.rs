// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/function.rs
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
//! Executable functions, their wrappers, and the function store.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};

use log::trace;
use ovum_runtime::{FunctionId, RuntimeError, StackFrame, Value};
use rustc_hash::FxHashMap;

use crate::builtins::ids;
use crate::context::ExecutionContext;
use crate::exec::{Block, CommandFn};
use crate::jit::JitExecutor;
use crate::outcome::{ExecOutcome, ExecutionOutcome};

/// A bytecode function: id, arity, body, and aggregate counters.
///
/// The prologue pops `arity` operands into a fresh frame's locals in stack
/// order (the first value popped becomes local 0), the epilogue folds the
/// frame's action count into `total_action_count` and maps a `Return`
/// outcome to `Normal` at the boundary. The frame is popped on both the
/// success and the error path.
pub struct Function {
    id: FunctionId,
    arity: usize,
    body: Block,
    execution_count: Cell<u64>,
    total_action_count: Cell<u64>,
}

impl Function {
    /// Creates a function from its id, arity, and body.
    #[must_use]
    pub fn new(id: impl Into<FunctionId>, arity: usize, body: Block) -> Self {
        Self {
            id: id.into(),
            arity,
            body,
            execution_count: Cell::new(0),
            total_action_count: Cell::new(0),
        }
    }

    /// The function id.
    #[must_use]
    pub fn id(&self) -> &FunctionId {
        &self.id
    }

    /// Number of operands the prologue pops.
    #[must_use]
    pub const fn arity(&self) -> usize {
        self.arity
    }

    /// Completed executions.
    #[must_use]
    pub fn execution_count(&self) -> u64 {
        self.execution_count.get()
    }

    /// Leaf commands executed across all completed invocations.
    #[must_use]
    pub fn total_action_count(&self) -> u64 {
        self.total_action_count.get()
    }

    /// Invokes the function.
    pub fn execute(&self, ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
        let depth = ctx.memory.machine_stack.len();
        if depth < self.arity {
            return Err(RuntimeError::InsufficientArguments {
                id: self.id.clone(),
                expected: self.arity,
                got: depth,
            });
        }

        let mut locals = Vec::with_capacity(self.arity);
        for _ in 0..self.arity {
            locals.push(ctx.memory.machine_stack.pop(&self.id)?);
        }
        ctx.memory.stack_frames.push(StackFrame::with_locals(self.id.clone(), locals));

        let result = self.body.execute(ctx);
        match result {
            Ok(outcome) => {
                let frame = ctx.memory.stack_frames.pop().unwrap_or_default();
                self.total_action_count.set(self.total_action_count.get() + frame.action_count);
                self.execution_count.set(self.execution_count.get() + 1);
                if outcome == ExecutionOutcome::Return {
                    Ok(ExecutionOutcome::Normal)
                } else {
                    Ok(outcome)
                }
            }
            Err(error) => {
                let _ = ctx.memory.stack_frames.pop();
                Err(error)
            }
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("id", &self.id)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// A built-in function backed by host code.
///
/// The handler pops its own arguments from the operand stack (receiver
/// first, then the remaining arguments right to left). A frame is still
/// pushed around the call so the action accounting and the GC root set
/// behave exactly like for bytecode functions.
pub struct NativeFunction {
    id: FunctionId,
    arity: usize,
    run: CommandFn,
    execution_count: Cell<u64>,
    total_action_count: Cell<u64>,
}

impl NativeFunction {
    /// Wraps a host handler as a store-registered function.
    #[must_use]
    pub fn new(id: impl Into<FunctionId>, arity: usize, run: CommandFn) -> Self {
        Self {
            id: id.into(),
            arity,
            run,
            execution_count: Cell::new(0),
            total_action_count: Cell::new(0),
        }
    }

    /// Invokes the handler inside its own frame.
    pub fn execute(&self, ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
        let depth = ctx.memory.machine_stack.len();
        if depth < self.arity {
            return Err(RuntimeError::InsufficientArguments {
                id: self.id.clone(),
                expected: self.arity,
                got: depth,
            });
        }

        ctx.memory.stack_frames.push(StackFrame::new(self.id.clone()));
        if let Some(frame) = ctx.memory.stack_frames.top_mut() {
            frame.action_count += 1;
        }
        let result = (self.run)(ctx);
        match result {
            Ok(outcome) => {
                let frame = ctx.memory.stack_frames.pop().unwrap_or_default();
                self.total_action_count.set(self.total_action_count.get() + frame.action_count);
                self.execution_count.set(self.execution_count.get() + 1);
                if outcome == ExecutionOutcome::Return {
                    Ok(ExecutionOutcome::Normal)
                } else {
                    Ok(outcome)
                }
            }
            Err(error) => {
                let _ = ctx.memory.stack_frames.pop();
                Err(error)
            }
        }
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("id", &self.id)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Memoization key of one [`PureFunction`] invocation.
///
/// Hashing uses the per-argument fingerprints; equality compares the
/// argument values themselves, so fingerprint collisions stay correct.
#[derive(Clone, Debug)]
pub struct CacheKey {
    values: Vec<Value>,
    fingerprints: Vec<u64>,
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len() && self.values == other.values
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        const HASH_MULTIPLIER: u64 = 0x9e37_79b9;
        const HASH_SHIFT: u32 = 6;
        let mut seed: u64 = 0;
        for &fingerprint in &self.fingerprints {
            seed ^= fingerprint
                .wrapping_add(HASH_MULTIPLIER)
                .wrapping_add(seed << HASH_SHIFT)
                .wrapping_add(seed >> HASH_SHIFT);
        }
        state.write_u64(seed);
    }
}

/// A memoizing wrapper around a function with pure semantics.
///
/// Arguments are type-checked against the declared names, fingerprinted
/// (object arguments contribute their virtual `_GetHash_<C>` result), and
/// the single result value is cached per fingerprint. The cache grows
/// monotonically, never evicts, and is private to this wrapper instance.
pub struct PureFunction {
    inner: Box<StoredFunction>,
    argument_type_names: Vec<String>,
    cache: RefCell<FxHashMap<CacheKey, Value>>,
}

impl PureFunction {
    /// Wraps `inner`, declaring one argument type name per arity slot.
    pub fn new(
        inner: StoredFunction,
        argument_type_names: Vec<String>,
    ) -> Result<Self, RuntimeError> {
        if argument_type_names.len() != inner.arity() {
            return Err(RuntimeError::other(format!(
                "PureFunction {}: {} argument type names for arity {}",
                inner.id(),
                argument_type_names.len(),
                inner.arity()
            )));
        }
        Ok(Self { inner: Box::new(inner), argument_type_names, cache: RefCell::new(FxHashMap::default()) })
    }

    /// The wrapped function.
    #[must_use]
    pub fn inner(&self) -> &StoredFunction {
        &self.inner
    }

    /// Number of memoized results.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Invokes the wrapper.
    pub fn execute(&self, ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
        let arity = self.inner.arity();
        let depth = ctx.memory.machine_stack.len();
        if depth < arity {
            return Err(RuntimeError::InsufficientArguments {
                id: self.inner.id().clone(),
                expected: arity,
                got: depth,
            });
        }

        let mut arguments = Vec::with_capacity(arity);
        for _ in 0..arity {
            arguments.push(ctx.memory.machine_stack.pop(self.inner.id())?);
        }
        arguments.reverse();

        let key = self.cache_key(&arguments, ctx)?;
        if let Some(&cached) = self.cache.borrow().get(&key) {
            trace!("pure function {} served from cache", self.inner.id());
            ctx.memory.machine_stack.push(cached);
            return Ok(ExecutionOutcome::Normal);
        }

        for &argument in &arguments {
            ctx.memory.machine_stack.push(argument);
        }
        let outcome = self.inner.execute(ctx)?;
        if outcome != ExecutionOutcome::Normal {
            return Ok(outcome);
        }

        let result = ctx
            .memory
            .machine_stack
            .pop(&format!("PureFunction {}", self.inner.id()))?;
        let _ = self.cache.borrow_mut().insert(key, result);
        ctx.memory.machine_stack.push(result);
        Ok(ExecutionOutcome::Normal)
    }

    fn cache_key(
        &self,
        arguments: &[Value],
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<CacheKey, RuntimeError> {
        let mut fingerprints = Vec::with_capacity(arguments.len());
        for (index, (argument, expected)) in
            arguments.iter().zip(&self.argument_type_names).enumerate()
        {
            let fingerprint = match argument {
                Value::Object(reference) => {
                    let (matches, actual) = {
                        let vtable = ctx.vtable_of(*reference, "PureFunction")?;
                        (vtable.is_type(expected), vtable.name().to_string())
                    };
                    if !matches {
                        return Err(self.argument_mismatch(index, expected, &actual));
                    }
                    self.object_fingerprint(*reference, ctx)?
                }
                primitive => {
                    if primitive.tag_name() != expected {
                        return Err(self.argument_mismatch(index, expected, primitive.tag_name()));
                    }
                    primitive.fingerprint()
                }
            };
            fingerprints.push(fingerprint);
        }
        Ok(CacheKey { values: arguments.to_vec(), fingerprints })
    }

    /// Fingerprint of an object argument: its virtual `_GetHash_<C>`
    /// result, which must be an `int`.
    fn object_fingerprint(
        &self,
        reference: ovum_runtime::ObjectRef,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<u64, RuntimeError> {
        let hash_id = ctx.vtable_of(reference, "PureFunction")?.real_method_id(ids::GET_HASH)?.clone();
        ctx.memory.machine_stack.push(Value::Object(reference));
        let outcome = ctx.call_function_by_id(&hash_id)?;
        if outcome != ExecutionOutcome::Normal {
            return Err(RuntimeError::other(format!(
                "PureFunction {}: hash function did not complete normally",
                self.inner.id()
            )));
        }
        match ctx.memory.machine_stack.pop("PureFunction hash")? {
            Value::Int(hash) => Ok(hash as u64),
            other => Err(RuntimeError::type_mismatch(
                format!("PureFunction {} hash", self.inner.id()),
                "int",
                other.tag_name(),
            )),
        }
    }

    fn argument_mismatch(&self, index: usize, expected: &str, actual: &str) -> RuntimeError {
        RuntimeError::other(format!(
            "PureFunction {}: type mismatch for argument {index} (expected {expected}, got {actual})",
            self.inner.id()
        ))
    }
}

impl fmt::Debug for PureFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PureFunction")
            .field("id", self.inner.id())
            .field("argument_type_names", &self.argument_type_names)
            .finish_non_exhaustive()
    }
}

/// A JIT-delegating wrapper.
///
/// Once the inner function's total action count passes the boundary, the
/// opaque executor is asked to compile; if it does, the compiled code runs
/// against the operand stack and the interpreter is skipped. Every
/// failure falls back to interpretation.
pub struct JitFunction {
    inner: Box<StoredFunction>,
    executor: Box<dyn JitExecutor>,
    action_boundary: u64,
}

impl JitFunction {
    /// Wraps `inner` with a JIT executor and a trigger boundary.
    #[must_use]
    pub fn new(executor: Box<dyn JitExecutor>, inner: StoredFunction, action_boundary: u64) -> Self {
        Self { inner: Box::new(inner), executor, action_boundary }
    }

    /// The wrapped function.
    #[must_use]
    pub fn inner(&self) -> &StoredFunction {
        &self.inner
    }

    /// Invokes the wrapper.
    pub fn execute(&self, ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
        if self.inner.total_action_count() > self.action_boundary
            && self.executor.try_compile()
            && self.executor.run(&mut ctx.memory.machine_stack).is_ok()
        {
            return Ok(ExecutionOutcome::Normal);
        }
        self.inner.execute(ctx)
    }
}

impl fmt::Debug for JitFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JitFunction")
            .field("id", self.inner.id())
            .field("action_boundary", &self.action_boundary)
            .finish_non_exhaustive()
    }
}

/// Any function the store can hold.
///
/// Wrappers compose pure-outermost, then jit, then the plain function;
/// all of them expose the innermost id, arity, and counters.
#[derive(Debug)]
pub enum StoredFunction {
    /// A bytecode function.
    Plain(Function),
    /// A built-in backed by host code.
    Native(NativeFunction),
    /// A memoizing wrapper.
    Pure(PureFunction),
    /// A JIT-delegating wrapper.
    Jit(JitFunction),
}

impl StoredFunction {
    /// The (innermost) function id.
    #[must_use]
    pub fn id(&self) -> &FunctionId {
        match self {
            Self::Plain(function) => function.id(),
            Self::Native(native) => &native.id,
            Self::Pure(pure) => pure.inner.id(),
            Self::Jit(jit) => jit.inner.id(),
        }
    }

    /// The (innermost) arity.
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            Self::Plain(function) => function.arity(),
            Self::Native(native) => native.arity,
            Self::Pure(pure) => pure.inner.arity(),
            Self::Jit(jit) => jit.inner.arity(),
        }
    }

    /// The innermost total action count.
    #[must_use]
    pub fn total_action_count(&self) -> u64 {
        match self {
            Self::Plain(function) => function.total_action_count(),
            Self::Native(native) => native.total_action_count.get(),
            Self::Pure(pure) => pure.inner.total_action_count(),
            Self::Jit(jit) => jit.inner.total_action_count(),
        }
    }

    /// The innermost execution count.
    #[must_use]
    pub fn execution_count(&self) -> u64 {
        match self {
            Self::Plain(function) => function.execution_count(),
            Self::Native(native) => native.execution_count.get(),
            Self::Pure(pure) => pure.inner.execution_count(),
            Self::Jit(jit) => jit.inner.execution_count(),
        }
    }

    /// Invokes the function or wrapper.
    pub fn execute(&self, ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
        match self {
            Self::Plain(function) => function.execute(ctx),
            Self::Native(native) => native.execute(ctx),
            Self::Pure(pure) => pure.execute(ctx),
            Self::Jit(jit) => jit.execute(ctx),
        }
    }
}

/// Append-only, index-stable store of executable functions.
#[derive(Debug, Default)]
pub struct FunctionStore {
    functions: Vec<StoredFunction>,
    index_by_id: FxHashMap<FunctionId, usize>,
}

impl FunctionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function, failing on a duplicate id.
    pub fn add(&mut self, function: StoredFunction) -> Result<usize, RuntimeError> {
        let id = function.id().clone();
        if self.index_by_id.contains_key(&id) {
            return Err(RuntimeError::DuplicateFunction { id });
        }
        let index = self.functions.len();
        let _ = self.index_by_id.insert(id, index);
        self.functions.push(function);
        Ok(index)
    }

    /// Bounds-checked lookup by index.
    pub fn get(&self, index: usize) -> Result<&StoredFunction, RuntimeError> {
        self.functions.get(index).ok_or(RuntimeError::FunctionIndexOutOfRange { index })
    }

    /// Lookup by id.
    pub fn get_by_id(&self, id: &str) -> Result<&StoredFunction, RuntimeError> {
        self.index_of(id).map(|index| &self.functions[index])
    }

    /// Index of the function with the given id.
    pub fn index_of(&self, id: &str) -> Result<usize, RuntimeError> {
        self.index_by_id
            .get(id)
            .copied()
            .ok_or_else(|| RuntimeError::UnknownFunction { id: id.to_string() })
    }

    /// Number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
