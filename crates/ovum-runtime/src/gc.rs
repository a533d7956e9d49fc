//! Mark phase of the mark-and-sweep collector.
//!
//! The sweep lives with the executor because destroying an object runs its
//! destructor through the function store; this module only computes
//! reachability over the quiescent machine state.

use std::collections::VecDeque;

use log::debug;

use crate::heap::ObjectRepository;
use crate::memory::RuntimeMemory;
use crate::object::ObjectRef;
use crate::value::Value;
use crate::vtable::{ScannerKind, VirtualTableStore};

/// Marks every object reachable from the root set.
///
/// Roots are all object references in the globals, on the operand stack,
/// and in every frame's locals. Referents are discovered through each
/// class's reference-scanner kind. Mark bits are set idempotently; nothing
/// is cleared up front.
pub fn mark_live(
    memory: &RuntimeMemory,
    repository: &mut ObjectRepository,
    vtables: &VirtualTableStore,
) {
    let mut worklist: VecDeque<ObjectRef> = VecDeque::new();
    collect_roots(memory, &mut worklist);
    debug!("gc mark: {} roots, {} live objects", worklist.len(), repository.len());

    while let Some(reference) = worklist.pop_front() {
        if reference.is_null() {
            continue;
        }
        let Ok(object) = repository.get(reference, "gc mark") else {
            // A stale handle in a payload is not a live object.
            continue;
        };
        if object.descriptor.is_marked() {
            continue;
        }

        let scanner = match vtables.get(object.descriptor.vtable_index as usize) {
            Ok(vtable) => vtable.scanner(),
            Err(_) => ScannerKind::Empty,
        };
        match scanner {
            ScannerKind::Empty => {}
            ScannerKind::Fields => {
                if let Ok(vtable) = vtables.get(object.descriptor.vtable_index as usize) {
                    vtable.scan_fields(object, |referent| worklist.push_back(referent));
                }
            }
            ScannerKind::Array => {
                if let crate::object::ObjectBody::Refs(elements) = &object.body {
                    for &referent in elements {
                        if !referent.is_null() {
                            worklist.push_back(referent);
                        }
                    }
                }
            }
        }

        if let Ok(object) = repository.get_mut(reference, "gc mark") {
            object.descriptor.mark();
        }
    }
}

/// Gathers the unmarked handles and clears every mark bit.
///
/// Call after [`mark_live`]; the returned handles are exactly the garbage
/// the sweep must destroy.
pub fn collect_unmarked(repository: &mut ObjectRepository) -> Vec<ObjectRef> {
    let mut dead = Vec::new();
    for (reference, object) in repository.iter_mut() {
        if object.descriptor.is_marked() {
            object.descriptor.unmark();
        } else {
            dead.push(reference);
        }
    }
    debug!("gc sweep: {} of {} objects unreachable", dead.len(), repository.len());
    dead
}

fn collect_roots(memory: &RuntimeMemory, worklist: &mut VecDeque<ObjectRef>) {
    let mut add = |value: &Value| {
        if let Value::Object(reference) = value
            && !reference.is_null()
        {
            worklist.push_back(*reference);
        }
    };

    for value in &memory.global_variables {
        add(value);
    }
    for value in memory.machine_stack.iter() {
        add(value);
    }
    for frame in memory.stack_frames.iter() {
        for value in &frame.local_variables {
            add(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::MemoryManager;
    use crate::object::{DESCRIPTOR_SIZE, ObjectRef};
    use crate::stack::StackFrame;
    use crate::value::Value;
    use crate::vtable::{FieldKind, ObjectLayout, VirtualTable, VirtualTableStore};

    fn stores_with_pair_class() -> (VirtualTableStore, MemoryManager) {
        let mut vtables = VirtualTableStore::new();
        let mut pair = VirtualTable::new("Pair", DESCRIPTOR_SIZE + 16);
        let _ = pair.add_field(FieldKind::Object, DESCRIPTOR_SIZE);
        let _ = pair.add_field(FieldKind::Object, DESCRIPTOR_SIZE + 8);
        vtables.add(pair).unwrap();

        let mut simple =
            VirtualTable::builtin("Simple", DESCRIPTOR_SIZE + 8, ObjectLayout::Raw, ScannerKind::Empty);
        let _ = simple.add_field(FieldKind::Int, DESCRIPTOR_SIZE);
        vtables.add(simple).unwrap();

        (vtables, MemoryManager::new(64))
    }

    fn set_ref(
        vtables: &VirtualTableStore,
        manager: &mut MemoryManager,
        holder: ObjectRef,
        field: usize,
        target: ObjectRef,
    ) {
        let vtable = vtables.get_by_name("Pair").unwrap();
        let object = manager.repository_mut().get_mut(holder, "test").unwrap();
        vtable.set_field_value(object, field, Value::Object(target)).unwrap();
    }

    fn mark_then_dead(
        memory: &RuntimeMemory,
        manager: &mut MemoryManager,
        vtables: &VirtualTableStore,
    ) -> Vec<ObjectRef> {
        mark_live(memory, manager.repository_mut(), vtables);
        collect_unmarked(manager.repository_mut())
    }

    #[test]
    fn unrooted_object_is_unmarked() {
        let (vtables, mut manager) = stores_with_pair_class();
        let memory = RuntimeMemory::new();
        let simple = vtables.get_by_name("Simple").unwrap();
        let orphan = manager.allocate(simple, 1).unwrap();

        let dead = mark_then_dead(&memory, &mut manager, &vtables);
        assert_eq!(dead, vec![orphan]);
    }

    #[test]
    fn roots_in_globals_stack_and_frames_survive() {
        let (vtables, mut manager) = stores_with_pair_class();
        let simple = vtables.get_by_name("Simple").unwrap();
        let in_global = manager.allocate(simple, 1).unwrap();
        let on_stack = manager.allocate(simple, 1).unwrap();
        let in_frame = manager.allocate(simple, 1).unwrap();

        let mut memory = RuntimeMemory::new();
        memory.global_variables.push(Value::Object(in_global));
        memory.machine_stack.push(Value::Object(on_stack));
        memory.stack_frames.push(StackFrame::with_locals("f", vec![Value::Object(in_frame)]));

        let dead = mark_then_dead(&memory, &mut manager, &vtables);
        assert!(dead.is_empty());
    }

    #[test]
    fn reachability_is_transitive_through_fields() {
        let (vtables, mut manager) = stores_with_pair_class();
        let pair = vtables.get_by_name("Pair").unwrap();
        let simple = vtables.get_by_name("Simple").unwrap();
        let root = manager.allocate(pair, 0).unwrap();
        let child = manager.allocate(simple, 1).unwrap();
        set_ref(&vtables, &mut manager, root, 0, child);

        let mut memory = RuntimeMemory::new();
        memory.global_variables.push(Value::Object(root));

        let dead = mark_then_dead(&memory, &mut manager, &vtables);
        assert!(dead.is_empty());
    }

    #[test]
    fn an_unreachable_cycle_is_garbage() {
        let (vtables, mut manager) = stores_with_pair_class();
        let pair = vtables.get_by_name("Pair").unwrap();
        let first = manager.allocate(pair, 0).unwrap();
        let second = manager.allocate(pair, 0).unwrap();
        set_ref(&vtables, &mut manager, first, 0, second);
        set_ref(&vtables, &mut manager, second, 0, first);

        let memory = RuntimeMemory::new();
        let mut dead = mark_then_dead(&memory, &mut manager, &vtables);
        dead.sort();
        let mut expected = vec![first, second];
        expected.sort();
        assert_eq!(dead, expected);
    }

    #[test]
    fn marks_are_cleared_after_collect_unmarked() {
        let (vtables, mut manager) = stores_with_pair_class();
        let simple = vtables.get_by_name("Simple").unwrap();
        let rooted = manager.allocate(simple, 1).unwrap();

        let mut memory = RuntimeMemory::new();
        memory.global_variables.push(Value::Object(rooted));

        let _ = mark_then_dead(&memory, &mut manager, &vtables);
        let object = manager.repository().get(rooted, "test").unwrap();
        assert!(!object.descriptor.is_marked());
    }
}
