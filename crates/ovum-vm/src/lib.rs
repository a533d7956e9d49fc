// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/lib.rs
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
//! Ovum VM Execution Engine
//!
//! This crate interprets the execution tree the bytecode parser builds:
//! blocks, conditionals, loops, leaf commands, and functions with their
//! memoizing and JIT-delegating wrappers. It also carries the full opcode
//! library, the built-in class catalog, the abstract JIT interface, and
//! the program executor that wires everything together.

pub mod builtins;
pub mod commands;
pub mod context;
pub mod exec;
pub mod executor;
pub mod function;
pub mod jit;
pub mod outcome;

pub use builtins::{register_builtin_functions, register_builtin_vtables};
pub use context::{ExecutionContext, IoCapture, VmIo};
pub use exec::{Block, Command, ConditionalExecution, Executable, IfMultibranch, WhileExecution};
pub use executor::{Executor, MAIN_FUNCTION_ID};
pub use function::{
    Function, FunctionStore, JitFunction, NativeFunction, PureFunction, StoredFunction,
};
pub use jit::{JitExecutor, JitExecutorFactory, NullJitExecutor, NullJitExecutorFactory};
pub use outcome::{ExecOutcome, ExecutionOutcome};

/// Version of the Ovum execution engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
