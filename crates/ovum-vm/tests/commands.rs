//! Opcode contract tests: stack effects, arithmetic domains, conversions,
//! and introspection.

mod common;

use common::{Machine, bool_cmd, cmd, float_cmd, ident_cmd, int_cmd, str_cmd};
use ovum_runtime::{RuntimeError, Value};

#[test]
fn push_pop_dup_swap() {
    let mut machine = Machine::new();
    machine
        .run(&[int_cmd("PushInt", 10), cmd("Dup")])
        .unwrap();
    assert_eq!(machine.pop_int(), 10);
    assert_eq!(machine.pop_int(), 10);

    machine
        .run(&[int_cmd("PushInt", 1), int_cmd("PushInt", 2), cmd("Swap")])
        .unwrap();
    assert_eq!(machine.pop_int(), 1);
    assert_eq!(machine.pop_int(), 2);

    machine.run(&[int_cmd("PushInt", 7), cmd("Pop")]).unwrap();
    assert_eq!(machine.stack_depth(), 0);
}

#[test]
fn swap_twice_is_identity() {
    let mut machine = Machine::new();
    machine
        .run(&[int_cmd("PushInt", 1), int_cmd("PushInt", 2), cmd("Swap"), cmd("Swap")])
        .unwrap();
    assert_eq!(machine.pop_int(), 2);
    assert_eq!(machine.pop_int(), 1);
}

#[test]
fn rotate_boundaries() {
    let mut machine = Machine::new();
    machine
        .run(&[
            int_cmd("PushInt", 1),
            int_cmd("PushInt", 2),
            int_cmd("PushInt", 3),
            int_cmd("Rotate", 3),
        ])
        .unwrap();
    assert_eq!(machine.pop_int(), 2);
    assert_eq!(machine.pop_int(), 1);
    assert_eq!(machine.pop_int(), 3);

    assert!(machine.run(&[int_cmd("PushInt", 1), int_cmd("Rotate", 0)]).is_err());

    let mut machine = Machine::new();
    assert!(machine.run(&[int_cmd("PushInt", 1), int_cmd("Rotate", 2)]).is_err());

    let mut machine = Machine::new();
    machine.run(&[int_cmd("PushInt", 5), int_cmd("Rotate", 1)]).unwrap();
    assert_eq!(machine.pop_int(), 5);
}

#[test]
fn int_arithmetic_follows_operand_order() {
    let mut machine = Machine::new();
    machine
        .run(&[int_cmd("PushInt", 5), int_cmd("PushInt", 7), cmd("IntAdd")])
        .unwrap();
    assert_eq!(machine.pop_int(), 12);

    machine
        .run(&[int_cmd("PushInt", 10), int_cmd("PushInt", 3), cmd("IntSubtract")])
        .unwrap();
    assert_eq!(machine.pop_int(), 7);

    machine
        .run(&[int_cmd("PushInt", 10), int_cmd("PushInt", 3), cmd("IntModulo")])
        .unwrap();
    assert_eq!(machine.pop_int(), 1);

    machine
        .run(&[int_cmd("PushInt", 10), int_cmd("PushInt", 3), cmd("IntDivide")])
        .unwrap();
    assert_eq!(machine.pop_int(), 3);
}

#[test]
fn division_by_zero_fails_cleanly() {
    let mut machine = Machine::new();
    let error = machine
        .run(&[int_cmd("PushInt", 1), int_cmd("PushInt", 0), cmd("IntDivide")])
        .unwrap_err();
    assert!(matches!(error, RuntimeError::DivisionByZero { .. }));

    let error = machine
        .run(&[float_cmd("PushFloat", 1.0), float_cmd("PushFloat", 0.0), cmd("FloatDivide")])
        .unwrap_err();
    assert!(matches!(error, RuntimeError::DivisionByZero { .. }));

    let error = machine
        .run(&[float_cmd("PushFloat", -4.0), cmd("FloatSqrt")])
        .unwrap_err();
    assert!(matches!(error, RuntimeError::NegativeSqrt));
}

#[test]
fn byte_arithmetic_wraps_modulo_256() {
    let mut machine = Machine::new();
    machine
        .run(&[int_cmd("PushByte", 250), int_cmd("PushByte", 10), cmd("ByteAdd")])
        .unwrap();
    assert_eq!(machine.pop(), Value::Byte(4));

    machine.run(&[int_cmd("PushByte", 0), cmd("ByteDecrement")]).unwrap();
    assert_eq!(machine.pop(), Value::Byte(255));
}

#[test]
fn comparisons_use_left_operand_below_right() {
    let mut machine = Machine::new();
    machine
        .run(&[int_cmd("PushInt", 1), int_cmd("PushInt", 10), cmd("IntLessEqual")])
        .unwrap();
    assert!(machine.pop_bool());

    machine
        .run(&[int_cmd("PushInt", 11), int_cmd("PushInt", 10), cmd("IntLessEqual")])
        .unwrap();
    assert!(!machine.pop_bool());

    machine
        .run(&[float_cmd("PushFloat", 2.5), float_cmd("PushFloat", 2.0), cmd("FloatGreaterThan")])
        .unwrap();
    assert!(machine.pop_bool());
}

#[test]
fn bool_and_bitwise_logic() {
    let mut machine = Machine::new();
    machine
        .run(&[bool_cmd("PushBool", true), bool_cmd("PushBool", false), cmd("BoolXor")])
        .unwrap();
    assert!(machine.pop_bool());

    machine
        .run(&[int_cmd("PushInt", 0b1100), int_cmd("PushInt", 0b1010), cmd("IntAnd")])
        .unwrap();
    assert_eq!(machine.pop_int(), 0b1000);

    machine
        .run(&[int_cmd("PushInt", 1), int_cmd("PushInt", 4), cmd("IntLeftShift")])
        .unwrap();
    assert_eq!(machine.pop_int(), 16);
}

#[test]
fn conversion_round_trips() {
    let mut machine = Machine::new();
    machine
        .run(&[int_cmd("PushInt", -42), cmd("IntToString"), cmd("StringToInt")])
        .unwrap();
    assert_eq!(machine.pop_int(), -42);

    machine
        .run(&[int_cmd("PushInt", 1234), cmd("IntToFloat"), cmd("FloatToInt")])
        .unwrap();
    assert_eq!(machine.pop_int(), 1234);

    machine
        .run(&[str_cmd("PushChar", "Z"), cmd("CharToByte"), cmd("ByteToChar")])
        .unwrap();
    assert_eq!(machine.pop(), Value::Char(b'Z'));

    machine
        .run(&[float_cmd("PushFloat", 2.75), cmd("FloatToInt")])
        .unwrap();
    assert_eq!(machine.pop_int(), 2);
}

#[test]
fn string_operations() {
    let mut machine = Machine::new();
    machine
        .run(&[str_cmd("PushString", "foo"), str_cmd("PushString", "bar"), cmd("StringConcat")])
        .unwrap();
    assert_eq!(machine.pop_string(), "foobar");

    machine.run(&[str_cmd("PushString", "hello"), cmd("StringLength")]).unwrap();
    assert_eq!(machine.pop_int(), 5);

    machine
        .run(&[
            str_cmd("PushString", "substring"),
            int_cmd("PushInt", 3),
            int_cmd("PushInt", 6),
            cmd("StringSubstring"),
        ])
        .unwrap();
    assert_eq!(machine.pop_string(), "string");

    machine
        .run(&[str_cmd("PushString", "apple"), str_cmd("PushString", "banana"), cmd("StringCompare")])
        .unwrap();
    assert_eq!(machine.pop_int(), -1);
}

#[test]
fn locals_and_statics_grow_on_set() {
    let mut machine = Machine::new();
    machine
        .run(&[
            int_cmd("PushInt", 31),
            int_cmd("SetLocal", 3),
            int_cmd("LoadLocal", 3),
        ])
        .unwrap();
    assert_eq!(machine.pop_int(), 31);

    machine
        .run(&[int_cmd("PushInt", 9), int_cmd("SetStatic", 2), int_cmd("LoadStatic", 2)])
        .unwrap();
    assert_eq!(machine.pop_int(), 9);

    let error = machine.run(&[int_cmd("LoadLocal", 0)]).unwrap_err();
    assert!(matches!(error, RuntimeError::IndexOutOfRange { .. }));
}

#[test]
fn underflow_and_type_mismatch_are_clean_errors() {
    let mut machine = Machine::new();
    let error = machine.run(&[cmd("IntAdd")]).unwrap_err();
    assert!(matches!(error, RuntimeError::StackUnderflow { .. }));

    let error = machine
        .run(&[bool_cmd("PushBool", true), int_cmd("PushInt", 2), cmd("IntAdd")])
        .unwrap_err();
    assert!(matches!(error, RuntimeError::TypeMismatch { .. }));
}

#[test]
fn print_line_writes_to_the_output_stream() {
    let mut machine = Machine::new();
    machine
        .run(&[
            int_cmd("PushInt", 5),
            int_cmd("PushInt", 7),
            cmd("IntAdd"),
            cmd("IntToString"),
            cmd("PrintLine"),
        ])
        .unwrap();
    assert_eq!(machine.capture.output(), "12\n");
}

#[test]
fn read_opcodes_consume_the_input_stream() {
    let mut machine = Machine::with_input("first line\n42\n2.5\nx");
    machine.run(&[cmd("ReadLine")]).unwrap();
    assert_eq!(machine.pop_string(), "first line");

    machine.run(&[cmd("ReadInt")]).unwrap();
    assert_eq!(machine.pop_int(), 42);

    machine.run(&[cmd("ReadFloat")]).unwrap();
    assert!((machine.pop_float() - 2.5).abs() < f64::EPSILON);

    machine.run(&[cmd("ReadChar")]).unwrap();
    assert_eq!(machine.pop(), Value::Char(b'x'));
}

#[test]
fn type_introspection() {
    let mut machine = Machine::new();
    machine.run(&[int_cmd("PushInt", 1), cmd("TypeOf")]).unwrap();
    assert_eq!(machine.pop_string(), "int");

    machine.run(&[str_cmd("PushString", "s"), cmd("TypeOf")]).unwrap();
    assert_eq!(machine.pop_string(), "String");

    machine.run(&[int_cmd("PushInt", 1), ident_cmd("IsType", "int")]).unwrap();
    assert!(machine.pop_bool());

    machine.run(&[int_cmd("PushInt", 1), ident_cmd("IsType", "float")]).unwrap();
    assert!(!machine.pop_bool());

    machine
        .run(&[str_cmd("PushString", "s"), ident_cmd("IsType", "IComparable")])
        .unwrap();
    assert!(machine.pop_bool());

    machine.run(&[ident_cmd("SizeOf", "int")]).unwrap();
    assert_eq!(machine.pop_int(), 8);

    machine.run(&[ident_cmd("SizeOf", "Int")]).unwrap();
    assert_eq!(machine.pop_int(), 16);
}

#[test]
fn nullable_opcodes() {
    let mut machine = Machine::new();
    machine.run(&[cmd("PushNull"), cmd("IsNull")]).unwrap();
    assert!(machine.pop_bool());

    let error = machine.run(&[cmd("PushNull"), cmd("Unwrap")]).unwrap_err();
    assert!(matches!(error, RuntimeError::NullReference { .. }));

    machine
        .run(&[cmd("PushNull"), int_cmd("PushInt", 9), cmd("NullCoalesce")])
        .unwrap();
    assert_eq!(machine.pop_int(), 9);
}

#[test]
fn exit_unwinds_with_its_code() {
    let mut machine = Machine::new();
    let error = machine.run(&[int_cmd("Exit", 3)]).unwrap_err();
    assert!(matches!(error, RuntimeError::Exit(3)));
    assert!(machine.executor.memory().stack_frames.is_empty());
}

#[test]
fn get_vtable_and_set_vtable_rewrite_the_descriptor() {
    let mut machine = Machine::new();
    machine
        .run(&[
            str_cmd("PushString", "text"),
            ident_cmd("SetVTable", "String"),
            cmd("TypeOf"),
        ])
        .unwrap();
    assert_eq!(machine.pop_string(), "String");

    machine.run(&[ident_cmd("GetVTable", "Int")]).unwrap();
    assert_eq!(machine.pop_int(), 0);
}
