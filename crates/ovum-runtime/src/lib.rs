// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-runtime/src/lib.rs
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
//! Ovum VM Runtime Model
//!
//! This crate provides the runtime data model of the Ovum virtual machine:
//! the tagged [`Value`] type, the operand stack and call-frame stack, the
//! managed object model (descriptor plus body), virtual tables and their
//! store, the object repository with its memory manager, and the
//! mark-and-sweep garbage collector.

pub mod errors;
pub mod gc;
pub mod heap;
pub mod memory;
pub mod object;
pub mod stack;
pub mod value;
pub mod vtable;

pub use errors::RuntimeError;
pub use gc::{collect_unmarked, mark_live};
pub use heap::{DEFAULT_GC_THRESHOLD, MemoryManager, ObjectRepository};
pub use memory::RuntimeMemory;
pub use object::{DESCRIPTOR_SIZE, HeapObject, ObjectBody, ObjectDescriptor, ObjectRef};
pub use stack::{FrameStack, OperandStack, StackFrame};
pub use value::Value;
pub use vtable::{
    FieldInfo, FieldKind, FunctionId, ObjectLayout, ScannerKind, VirtualTable, VirtualTableStore,
};

/// Version of the Ovum runtime
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
