// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-runtime/src/heap.rs
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
//! The object repository and the memory manager that owns it.

use rustc_hash::FxHashMap;

use crate::errors::RuntimeError;
use crate::object::{DESCRIPTOR_SIZE, HeapObject, ObjectBody, ObjectRef};
use crate::vtable::VirtualTable;

/// Registry of live heap objects, keyed by stable handle.
///
/// An object is present for the entire window from successful allocation
/// until successful destruction; handles are never reused within a run.
#[derive(Debug, Default)]
pub struct ObjectRepository {
    objects: FxHashMap<ObjectRef, HeapObject>,
}

impl ObjectRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly allocated object.
    pub fn add(&mut self, reference: ObjectRef, object: HeapObject) {
        let _ = self.objects.insert(reference, object);
    }

    /// Removes an object, returning its final state.
    pub fn remove(&mut self, reference: ObjectRef) -> Result<HeapObject, RuntimeError> {
        self.objects
            .remove(&reference)
            .ok_or(RuntimeError::UnknownObject { op: "ObjectRepository::remove".to_string() })
    }

    /// Looks up a live object.
    pub fn get(&self, reference: ObjectRef, op: &str) -> Result<&HeapObject, RuntimeError> {
        if reference.is_null() {
            return Err(RuntimeError::NullReference { op: op.to_string() });
        }
        self.objects
            .get(&reference)
            .ok_or_else(|| RuntimeError::UnknownObject { op: op.to_string() })
    }

    /// Looks up a live object mutably.
    pub fn get_mut(
        &mut self,
        reference: ObjectRef,
        op: &str,
    ) -> Result<&mut HeapObject, RuntimeError> {
        if reference.is_null() {
            return Err(RuntimeError::NullReference { op: op.to_string() });
        }
        self.objects
            .get_mut(&reference)
            .ok_or_else(|| RuntimeError::UnknownObject { op: op.to_string() })
    }

    /// Whether the handle names a live object.
    #[must_use]
    pub fn contains(&self, reference: ObjectRef) -> bool {
        self.objects.contains_key(&reference)
    }

    /// Number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no objects are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterates all live objects.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectRef, &HeapObject)> {
        self.objects.iter().map(|(reference, object)| (*reference, object))
    }

    /// Iterates all live objects mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ObjectRef, &mut HeapObject)> {
        self.objects.iter_mut().map(|(reference, object)| (*reference, object))
    }

    /// Snapshot of every live handle.
    #[must_use]
    pub fn handles(&self) -> Vec<ObjectRef> {
        self.objects.keys().copied().collect()
    }
}

/// Default live-object count that triggers a collection.
pub const DEFAULT_GC_THRESHOLD: usize = 4096;

/// Owner of the object repository: allocation, byte accounting, and the
/// collection trigger.
///
/// Allocation itself never runs the collector; the execution context runs
/// it when [`MemoryManager::needs_collection`] reports the threshold was
/// crossed, because destructors need the full machine state.
#[derive(Debug)]
pub struct MemoryManager {
    repository: ObjectRepository,
    next_handle: u64,
    gc_threshold: usize,
    bytes_in_use: usize,
    peak_bytes: usize,
    collecting: bool,
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_GC_THRESHOLD)
    }
}

impl MemoryManager {
    /// Creates a manager that collects once more than `gc_threshold`
    /// objects are live.
    #[must_use]
    pub fn new(gc_threshold: usize) -> Self {
        Self {
            repository: ObjectRepository::new(),
            next_handle: 1,
            gc_threshold,
            bytes_in_use: 0,
            peak_bytes: 0,
            collecting: false,
        }
    }

    /// The live-object registry.
    #[must_use]
    pub const fn repository(&self) -> &ObjectRepository {
        &self.repository
    }

    /// The live-object registry, mutable.
    pub const fn repository_mut(&mut self) -> &mut ObjectRepository {
        &mut self.repository
    }

    /// Allocates one instance of `vtable`'s class and registers it.
    ///
    /// The payload is the layout family's empty body; constructors fill it
    /// in afterwards.
    pub fn allocate(
        &mut self,
        vtable: &VirtualTable,
        vtable_index: u32,
    ) -> Result<ObjectRef, RuntimeError> {
        let body = vtable.layout().empty_body(vtable.size())?;
        Ok(self.register(HeapObject::new(vtable_index, body)))
    }

    /// Registers a fully formed object and returns its handle.
    pub fn register(&mut self, object: HeapObject) -> ObjectRef {
        let reference = ObjectRef::from_bits(self.next_handle);
        self.next_handle += 1;
        self.account_add(&object.body);
        self.repository.add(reference, object);
        reference
    }

    /// Removes an object from the registry and releases its accounting.
    pub fn release(&mut self, reference: ObjectRef) -> Result<HeapObject, RuntimeError> {
        let object = self.repository.remove(reference)?;
        self.bytes_in_use = self.bytes_in_use.saturating_sub(object_footprint(&object.body));
        Ok(object)
    }

    /// Whether the live count is past the collection threshold.
    ///
    /// Always false while a collection is already running; the sweep may
    /// allocate through user destructors and must not recurse.
    #[must_use]
    pub fn needs_collection(&self) -> bool {
        !self.collecting && self.repository.len() > self.gc_threshold
    }

    /// Marks a collection as in progress; returns false if one already is.
    pub fn begin_collection(&mut self) -> bool {
        if self.collecting {
            return false;
        }
        self.collecting = true;
        true
    }

    /// Marks the running collection as finished.
    pub const fn end_collection(&mut self) {
        self.collecting = false;
    }

    /// Approximate managed bytes currently in use.
    #[must_use]
    pub const fn bytes_in_use(&self) -> usize {
        self.bytes_in_use
    }

    /// High-water mark of managed bytes.
    #[must_use]
    pub const fn peak_bytes(&self) -> usize {
        self.peak_bytes
    }

    /// The configured collection threshold.
    #[must_use]
    pub const fn gc_threshold(&self) -> usize {
        self.gc_threshold
    }

    fn account_add(&mut self, body: &ObjectBody) {
        self.bytes_in_use += object_footprint(body);
        if self.bytes_in_use > self.peak_bytes {
            self.peak_bytes = self.bytes_in_use;
        }
    }
}

fn object_footprint(body: &ObjectBody) -> usize {
    DESCRIPTOR_SIZE + body.byte_size()
}
