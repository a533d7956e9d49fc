// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-runtime/src/object.rs
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
//! The managed object model: descriptor, handle, and object body.

use std::fs::File;

/// Size in bytes of the descriptor that leads every heap object.
///
/// Declared field offsets in a `vartable` directive include these bytes.
pub const DESCRIPTOR_SIZE: usize = 8;

/// Bit 0 of the badge; set during the mark phase, cleared by sweep.
pub const MARK_BIT: u32 = 1;

/// The first eight bytes of every heap object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectDescriptor {
    /// Index of the object's class in the virtual-table store.
    pub vtable_index: u32,
    /// Reserved bits; bit 0 is the GC mark.
    pub badge: u32,
}

impl ObjectDescriptor {
    /// Creates a descriptor for the given vtable index with a clear badge.
    #[must_use]
    pub const fn new(vtable_index: u32) -> Self {
        Self { vtable_index, badge: 0 }
    }

    /// Returns whether the GC mark bit is set.
    #[must_use]
    pub const fn is_marked(&self) -> bool {
        self.badge & MARK_BIT != 0
    }

    /// Sets the GC mark bit (idempotent).
    pub const fn mark(&mut self) {
        self.badge |= MARK_BIT;
    }

    /// Clears the GC mark bit.
    pub const fn unmark(&mut self) {
        self.badge &= !MARK_BIT;
    }
}

/// Opaque handle to a heap object.
///
/// Handles are never reused within a run and stay valid for the object's
/// whole lifetime; the heap does not relocate. The all-zero handle is the
/// null reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectRef(u64);

impl ObjectRef {
    /// The null object reference.
    pub const NULL: Self = Self(0);

    /// Reconstructs a handle from its raw bits (as stored in a field slot).
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw bits of the handle.
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Returns whether this is the null reference.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// The payload of a heap object, selected by its class's layout family.
#[derive(Debug)]
pub enum ObjectBody {
    /// Raw field storage for user classes and the boxed primitives.
    ///
    /// Field values live at the byte offsets the vtable declares (minus the
    /// descriptor), little-endian; object-reference fields hold the 64-bit
    /// handle bits.
    Raw(Vec<u8>),
    /// `String` payload.
    Str(String),
    /// `File` payload; `None` while the file is closed.
    File(Option<File>),
    /// `IntArray` payload.
    Ints(Vec<i64>),
    /// `FloatArray` payload.
    Floats(Vec<f64>),
    /// `CharArray` payload.
    Chars(Vec<u8>),
    /// `ByteArray` payload.
    Bytes(Vec<u8>),
    /// `BoolArray` payload.
    Bools(Vec<bool>),
    /// `ObjectArray`/`StringArray`/`PointerArray` payload.
    Refs(Vec<ObjectRef>),
}

impl ObjectBody {
    /// Approximate payload size in bytes, used for heap accounting.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        match self {
            Self::Raw(bytes) | Self::Chars(bytes) | Self::Bytes(bytes) => bytes.len(),
            Self::Str(s) => s.len(),
            Self::File(_) => 0,
            Self::Ints(v) => v.len() * size_of::<i64>(),
            Self::Floats(v) => v.len() * size_of::<f64>(),
            Self::Bools(v) => v.len(),
            Self::Refs(v) => v.len() * size_of::<u64>(),
        }
    }
}

/// A live heap object: descriptor plus payload.
#[derive(Debug)]
pub struct HeapObject {
    /// Class index and GC badge.
    pub descriptor: ObjectDescriptor,
    /// Class-family payload.
    pub body: ObjectBody,
}

impl HeapObject {
    /// Creates an object of the given class index with the given payload.
    #[must_use]
    pub const fn new(vtable_index: u32, body: ObjectBody) -> Self {
        Self { descriptor: ObjectDescriptor::new(vtable_index), body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_bit_round_trips() {
        let mut descriptor = ObjectDescriptor::new(3);
        assert!(!descriptor.is_marked());
        descriptor.mark();
        assert!(descriptor.is_marked());
        descriptor.mark();
        assert!(descriptor.is_marked());
        descriptor.unmark();
        assert!(!descriptor.is_marked());
        assert_eq!(descriptor.vtable_index, 3);
    }

    #[test]
    fn null_reference_is_zero_bits() {
        assert!(ObjectRef::NULL.is_null());
        assert_eq!(ObjectRef::from_bits(0), ObjectRef::NULL);
        assert!(!ObjectRef::from_bits(1).is_null());
    }
}
