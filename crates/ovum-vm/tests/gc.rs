//! Collector tests over the full machine: destructor runs, cycle
//! reclamation, and allocation-triggered sweeps.

mod common;

use common::{Machine, cmd, ident_cmd, int_cmd, str_cmd};
use ovum_runtime::{DESCRIPTOR_SIZE, FieldKind, StackFrame, Value, VirtualTable};
use ovum_vm::commands::CommandArg;
use ovum_vm::{Block, Executable, Function, StoredFunction};
use ovum_vm::commands::create_command;

/// Installs a user class with one traced reference field and a counting
/// destructor, plus a zero-arg constructor function.
fn machine_with_ref_class() -> Machine {
    Machine::with_program(|functions, vtables| {
        let mut with_ref = VirtualTable::new("WithRef", DESCRIPTOR_SIZE + 8);
        let _ = with_ref.add_field(FieldKind::Object, DESCRIPTOR_SIZE);
        with_ref.add_method("_destructor_<M>", "_WithRef_destructor_<M>");
        vtables.add(with_ref).unwrap();

        // The destructor counts its runs through a static slot.
        let mut destructor_body = Block::new();
        for (name, arg) in [
            ("Pop", CommandArg::None),
            ("LoadStatic", CommandArg::Int(0)),
            ("IntIncrement", CommandArg::None),
            ("SetStatic", CommandArg::Int(0)),
        ] {
            destructor_body
                .push(Executable::Command(create_command(name, arg).expect("known opcode")));
        }
        let destructor = Function::new("_WithRef_destructor_<M>", 0, destructor_body);
        functions.add(StoredFunction::Plain(destructor)).unwrap();
    })
}

fn destructor_runs(machine: &Machine) -> i64 {
    match machine.executor.memory().global_variables.first() {
        Some(Value::Int(count)) => *count,
        _ => 0,
    }
}

#[test]
fn unreachable_objects_are_destroyed_exactly_once() {
    let mut machine = machine_with_ref_class();
    machine.run(&[int_cmd("PushInt", 0), int_cmd("SetStatic", 0)]).unwrap();

    machine
        .run(&[ident_cmd("NewArray", "WithRef"), cmd("Pop"), cmd("ForceGarbageCollection")])
        .unwrap();

    assert_eq!(machine.live_objects(), 0);
    assert_eq!(destructor_runs(&machine), 1);

    machine.run(&[cmd("ForceGarbageCollection")]).unwrap();
    assert_eq!(destructor_runs(&machine), 1);
}

#[test]
fn rooted_objects_survive_collection() {
    let mut machine = machine_with_ref_class();
    machine
        .run(&[
            int_cmd("PushInt", 0),
            int_cmd("SetStatic", 0),
            ident_cmd("NewArray", "WithRef"),
            int_cmd("SetStatic", 1),
            cmd("ForceGarbageCollection"),
        ])
        .unwrap();

    assert_eq!(machine.live_objects(), 1);
    assert_eq!(destructor_runs(&machine), 0);
}

#[test]
fn an_unreachable_cycle_is_reclaimed() {
    let mut machine = machine_with_ref_class();
    machine.run(&[int_cmd("PushInt", 0), int_cmd("SetStatic", 0)]).unwrap();

    machine
        .run(&[
            // a = new WithRef(); b = new WithRef()
            ident_cmd("NewArray", "WithRef"),
            int_cmd("SetLocal", 0),
            ident_cmd("NewArray", "WithRef"),
            int_cmd("SetLocal", 1),
            // a.field = b
            int_cmd("LoadLocal", 1),
            int_cmd("LoadLocal", 0),
            int_cmd("SetField", 0),
            // b.field = a
            int_cmd("LoadLocal", 0),
            int_cmd("LoadLocal", 1),
            int_cmd("SetField", 0),
        ])
        .unwrap();

    // The frame holding the locals is gone; the cycle has no roots.
    assert_eq!(machine.live_objects(), 2);
    machine.run(&[cmd("ForceGarbageCollection")]).unwrap();

    assert_eq!(machine.live_objects(), 0);
    assert_eq!(destructor_runs(&machine), 2);
}

#[test]
fn objects_reachable_through_a_chain_survive() {
    let mut machine = machine_with_ref_class();
    machine
        .run(&[
            int_cmd("PushInt", 0),
            int_cmd("SetStatic", 0),
            ident_cmd("NewArray", "WithRef"),
            int_cmd("SetLocal", 0),
            // root.field = child
            ident_cmd("NewArray", "WithRef"),
            int_cmd("LoadLocal", 0),
            int_cmd("SetField", 0),
            // keep the root in a static, drop the child local
            int_cmd("LoadLocal", 0),
            int_cmd("SetStatic", 1),
            cmd("ForceGarbageCollection"),
        ])
        .unwrap();

    assert_eq!(machine.live_objects(), 2);
    assert_eq!(destructor_runs(&machine), 0);
}

#[test]
fn crossing_the_threshold_triggers_a_collection() {
    let mut machine = Machine::with_gc_threshold(4);
    let mut ctx = machine.executor.context();
    ctx.memory.stack_frames.push(StackFrame::new("test"));

    for _ in 0..6 {
        let command = create_command("PushNull", CommandArg::None).expect("known opcode");
        command.execute(&mut ctx).unwrap();
        let _ = ctx.memory.machine_stack.pop("t").unwrap();
    }
    let _ = ctx.memory.stack_frames.pop();

    // Unrooted nullables are swept as soon as the live count passes four.
    assert!(machine.live_objects() <= 5);
}

#[test]
fn reference_arrays_keep_their_elements_alive() {
    let mut machine = Machine::new();
    machine
        .run(&[
            // arr = new ObjectArray(1, boxed 5)
            int_cmd("PushInt", 1),
            int_cmd("PushInt", 5),
            ident_cmd("CallConstructor", "_Int_int"),
            ident_cmd("CallConstructor", "_ObjectArray_int_Object"),
            int_cmd("SetStatic", 0),
            cmd("ForceGarbageCollection"),
        ])
        .unwrap();

    // The array and the boxed element both survive through the static.
    assert_eq!(machine.live_objects(), 2);

    machine
        .run(&[
            int_cmd("PushInt", 0),
            int_cmd("LoadStatic", 0),
            ident_cmd("CallVirtual", "_GetAt_<C>_int"),
            int_cmd("GetField", 0),
        ])
        .unwrap();
    assert_eq!(machine.pop_int(), 5);
}

#[test]
fn strings_are_reclaimed_when_dropped() {
    let mut machine = Machine::new();
    machine
        .run(&[
            str_cmd("PushString", "transient"),
            cmd("Pop"),
            cmd("ForceGarbageCollection"),
        ])
        .unwrap();
    assert_eq!(machine.live_objects(), 0);
}
