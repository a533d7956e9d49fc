// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-runtime/src/errors.rs
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
//! Error handling for the Ovum runtime.

use thiserror::Error;

/// Runtime error type for the Ovum VM.
///
/// Every opcode and runtime service reports failures through this enum.
/// Errors unwind through the execution tree without being caught; frame
/// cleanup still happens on the way out.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The operand stack held fewer values than the operation required.
    #[error("{op}: not enough arguments on the stack")]
    StackUnderflow {
        /// Name of the failing operation
        op: String,
    },
    /// The value on top of the operand stack had the wrong tag.
    #[error("{op}: expected {expected} on the stack, found {found}")]
    TypeMismatch {
        /// Name of the failing operation
        op: String,
        /// Expected value tag or class name
        expected: String,
        /// Tag or class name actually found
        found: String,
    },
    /// A leaf command executed with no frame on the call-frame stack.
    #[error("{op}: the frame stack is empty")]
    NoActiveFrame {
        /// Name of the failing operation
        op: String,
    },
    /// A function was invoked with fewer operands than its arity.
    #[error("function {id}: insufficient arguments on stack (expected {expected}, got {got})")]
    InsufficientArguments {
        /// Function id
        id: String,
        /// Declared arity
        expected: usize,
        /// Operand stack depth at call time
        got: usize,
    },
    /// Virtual table lookup by name failed.
    #[error("virtual table not found by name: {name}")]
    UnknownVirtualTable {
        /// Requested class name
        name: String,
    },
    /// Virtual table lookup by index failed.
    #[error("virtual table index out of range: {index}")]
    VirtualTableIndexOutOfRange {
        /// Requested index
        index: usize,
    },
    /// A virtual table with the same name was already installed.
    #[error("virtual table with the same name already exists: {name}")]
    DuplicateVirtualTable {
        /// Clashing class name
        name: String,
    },
    /// Function lookup by id failed.
    #[error("function not found by id: {id}")]
    UnknownFunction {
        /// Requested function id
        id: String,
    },
    /// Function lookup by index failed.
    #[error("function index out of range: {index}")]
    FunctionIndexOutOfRange {
        /// Requested index
        index: usize,
    },
    /// A function with the same id was already registered.
    #[error("function with the same id already exists: {id}")]
    DuplicateFunction {
        /// Clashing function id
        id: String,
    },
    /// A vtable did not declare the requested field index.
    #[error("vtable of class {class} does not contain field number {index}")]
    FieldIndexOutOfRange {
        /// Class name
        class: String,
        /// Requested field index
        index: usize,
    },
    /// A vtable had no mapping for the requested virtual method.
    #[error("vtable of class {class} does not contain function: {id}")]
    UnknownVirtualMethod {
        /// Class name
        class: String,
        /// Requested virtual method id
        id: String,
    },
    /// An object handle did not name a live object.
    #[error("{op}: object is not in the repository")]
    UnknownObject {
        /// Name of the failing operation
        op: String,
    },
    /// A null object reference was dereferenced.
    #[error("{op}: null object reference")]
    NullReference {
        /// Name of the failing operation
        op: String,
    },
    /// Integer or byte division/modulo by zero, or float division by zero.
    #[error("{op}: division by zero")]
    DivisionByZero {
        /// Name of the failing operation
        op: &'static str,
    },
    /// Square root of a negative float.
    #[error("FloatSqrt: negative argument")]
    NegativeSqrt,
    /// A container index was out of range after negative-index adjustment.
    #[error("{op}: index {index} out of range (length {len})")]
    IndexOutOfRange {
        /// Name of the failing operation
        op: String,
        /// Index as requested (before adjustment)
        index: i64,
        /// Container length
        len: usize,
    },
    /// Failure from an underlying file, stream, or environment call.
    #[error("{op}: {message}")]
    Io {
        /// Name of the failing operation
        op: String,
        /// Host error description
        message: String,
    },
    /// The host could not satisfy an allocation request.
    #[error("allocation failed: {message}")]
    Allocation {
        /// Failure description
        message: String,
    },
    /// The program requested process termination with the given code.
    ///
    /// Unwinds like an error so frame cleanup runs; the executor maps it
    /// to the process exit code instead of reporting a failure.
    #[error("program exited with code {0}")]
    Exit(i64),
    /// Any other runtime failure.
    #[error("{0}")]
    Other(String),
}

impl RuntimeError {
    /// Creates a stack-underflow error for the named operation.
    pub fn underflow(op: impl Into<String>) -> Self {
        Self::StackUnderflow { op: op.into() }
    }

    /// Creates a type-mismatch error for the named operation.
    pub fn type_mismatch(
        op: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch { op: op.into(), expected: expected.into(), found: found.into() }
    }

    /// Creates an I/O error for the named operation.
    pub fn io(op: impl Into<String>, message: impl ToString) -> Self {
        Self::Io { op: op.into(), message: message.to_string() }
    }

    /// Creates a generic runtime error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
