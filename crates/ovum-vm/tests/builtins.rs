//! Built-in class tests: constructors, virtual dispatch, and the array
//! method catalog.

mod common;

use common::{Machine, cmd, ident_cmd, int_cmd, str_cmd};
use ovum_runtime::{RuntimeError, Value};

#[test]
fn int_boxing_and_to_string() {
    let mut machine = Machine::new();
    machine
        .run(&[
            int_cmd("PushInt", 42),
            ident_cmd("CallConstructor", "_Int_int"),
            ident_cmd("CallVirtual", "_ToString_<C>"),
        ])
        .unwrap();
    assert_eq!(machine.pop_string(), "42");
}

#[test]
fn boxed_equality_and_ordering() {
    let mut machine = Machine::new();
    machine
        .run(&[
            int_cmd("PushInt", 3),
            ident_cmd("CallConstructor", "_Int_int"),
            int_cmd("PushInt", 3),
            ident_cmd("CallConstructor", "_Int_int"),
            ident_cmd("CallVirtual", "_Equals_<C>_IComparable"),
        ])
        .unwrap();
    assert!(machine.pop_bool());

    machine
        .run(&[
            int_cmd("PushInt", 9),
            ident_cmd("CallConstructor", "_Int_int"),
            int_cmd("PushInt", 2),
            ident_cmd("CallConstructor", "_Int_int"),
            ident_cmd("CallVirtual", "_IsLess_<C>_IComparable"),
        ])
        .unwrap();
    // receiver 2 < argument 9
    assert!(machine.pop_bool());
}

#[test]
fn get_field_reads_the_boxed_payload() {
    let mut machine = Machine::new();
    machine
        .run(&[
            int_cmd("PushInt", 77),
            ident_cmd("CallConstructor", "_Int_int"),
            int_cmd("GetField", 0),
        ])
        .unwrap();
    assert_eq!(machine.pop_int(), 77);
}

#[test]
fn virtual_dispatch_on_a_missing_method_fails() {
    let mut machine = Machine::new();
    let error = machine
        .run(&[
            int_cmd("PushInt", 1),
            ident_cmd("CallConstructor", "_Int_int"),
            ident_cmd("CallVirtual", "_Open_<M>_String_String"),
        ])
        .unwrap_err();
    assert!(matches!(error, RuntimeError::UnknownVirtualMethod { .. }));
}

#[test]
fn int_array_construction_and_element_ops() {
    let mut machine = Machine::new();
    machine
        .run(&[
            // new IntArray(3, 0)
            int_cmd("PushInt", 3),
            int_cmd("PushInt", 0),
            ident_cmd("CallConstructor", "_IntArray_int_int"),
            // arr.SetAt(1, 25)
            cmd("Dup"),
            int_cmd("PushInt", 1),
            int_cmd("PushInt", 25),
            int_cmd("Rotate", 3),
            int_cmd("Rotate", 3),
            ident_cmd("CallVirtual", "_SetAt_<M>_int_int"),
            // arr.GetAt(-2)
            int_cmd("PushInt", -2),
            cmd("Swap"),
            ident_cmd("CallVirtual", "_GetAt_<C>_int"),
        ])
        .unwrap();
    assert_eq!(machine.pop_int(), 25);
}

#[test]
fn array_add_length_and_remove() {
    let mut machine = Machine::new();
    machine
        .run(&[
            int_cmd("PushInt", 0),
            int_cmd("PushInt", 0),
            ident_cmd("CallConstructor", "_IntArray_int_int"),
            // arr.Add(11)
            cmd("Dup"),
            int_cmd("PushInt", 11),
            cmd("Swap"),
            ident_cmd("CallVirtual", "_Add_<M>_int"),
            // arr.Add(22)
            cmd("Dup"),
            int_cmd("PushInt", 22),
            cmd("Swap"),
            ident_cmd("CallVirtual", "_Add_<M>_int"),
            // arr.RemoveAt(0)
            cmd("Dup"),
            int_cmd("PushInt", 0),
            cmd("Swap"),
            ident_cmd("CallVirtual", "_RemoveAt_<M>_int"),
            // arr.Length()
            ident_cmd("CallVirtual", "_Length_<C>"),
        ])
        .unwrap();
    assert_eq!(machine.pop_int(), 1);
}

#[test]
fn out_of_range_array_access_fails_after_adjustment() {
    let mut machine = Machine::new();
    let error = machine
        .run(&[
            int_cmd("PushInt", 2),
            int_cmd("PushInt", 0),
            ident_cmd("CallConstructor", "_IntArray_int_int"),
            int_cmd("PushInt", -3),
            cmd("Swap"),
            ident_cmd("CallVirtual", "_GetAt_<C>_int"),
        ])
        .unwrap_err();
    assert!(matches!(error, RuntimeError::IndexOutOfRange { .. }));
}

#[test]
fn string_array_holds_object_references() {
    let mut machine = Machine::new();
    machine
        .run(&[
            // new StringArray(1, "seed")
            int_cmd("PushInt", 1),
            str_cmd("PushString", "seed"),
            ident_cmd("CallConstructor", "_StringArray_int_String"),
            // arr.GetAt(0)
            int_cmd("PushInt", 0),
            cmd("Swap"),
            ident_cmd("CallVirtual", "_GetAt_<C>_int"),
        ])
        .unwrap();
    assert_eq!(machine.pop_string(), "seed");
}

#[test]
fn byte_array_view_of_an_int_array() {
    let mut machine = Machine::new();
    machine
        .run(&[
            // new IntArray(1, 258): one element, bytes 02 01 00 ...
            int_cmd("PushInt", 1),
            int_cmd("PushInt", 258),
            ident_cmd("CallConstructor", "_IntArray_int_int"),
            ident_cmd("CallConstructor", "_ByteArray_IntArray"),
            cmd("Dup"),
            ident_cmd("CallVirtual", "_Length_<C>"),
        ])
        .unwrap();
    assert_eq!(machine.pop_int(), 8);

    machine
        .run(&[int_cmd("PushInt", 0), cmd("Swap"), ident_cmd("CallVirtual", "_GetAt_<C>_int")])
        .unwrap();
    assert_eq!(machine.pop(), Value::Byte(2));
}

#[test]
fn string_to_utf8_bytes_round_trip() {
    let mut machine = Machine::new();
    machine
        .run(&[
            str_cmd("PushString", "ok"),
            ident_cmd("CallVirtual", "_ToUtf8Bytes_<C>"),
            cmd("Dup"),
            ident_cmd("CallVirtual", "_Length_<C>"),
        ])
        .unwrap();
    assert_eq!(machine.pop_int(), 2);

    machine
        .run(&[int_cmd("PushInt", 0), cmd("Swap"), ident_cmd("CallVirtual", "_GetAt_<C>_int")])
        .unwrap();
    assert_eq!(machine.pop(), Value::Byte(b'o'));
}

#[test]
fn file_class_round_trips_through_the_filesystem() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("out.txt");
    let path_text = path.to_string_lossy().into_owned();

    let mut machine = Machine::new();
    machine
        .run(&[
            // file = new File(); file.Open(path, "w")
            ident_cmd("CallConstructor", "_File"),
            cmd("Dup"),
            str_cmd("PushString", &path_text),
            str_cmd("PushString", "w"),
            int_cmd("Rotate", 3),
            int_cmd("Rotate", 3),
            ident_cmd("CallVirtual", "_Open_<M>_String_String"),
            // file.WriteLine("hello")
            cmd("Dup"),
            str_cmd("PushString", "hello"),
            cmd("Swap"),
            ident_cmd("CallVirtual", "_WriteLine_<M>_String"),
            // file.Close()
            ident_cmd("CallVirtual", "_Close_<M>"),
        ])
        .unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");

    machine
        .run(&[
            ident_cmd("CallConstructor", "_File"),
            cmd("Dup"),
            str_cmd("PushString", &path_text),
            str_cmd("PushString", "r"),
            int_cmd("Rotate", 3),
            int_cmd("Rotate", 3),
            ident_cmd("CallVirtual", "_Open_<M>_String_String"),
            ident_cmd("CallVirtual", "_ReadLine_<M>"),
        ])
        .unwrap();
    assert_eq!(machine.pop_string(), "hello");
}

#[test]
fn filesystem_probes() {
    let directory = tempfile::tempdir().unwrap();
    let dir_text = directory.path().to_string_lossy().into_owned();
    let missing = directory.path().join("missing").to_string_lossy().into_owned();

    let mut machine = Machine::new();
    machine.run(&[str_cmd("PushString", &dir_text), cmd("DirectoryExists")]).unwrap();
    assert!(machine.pop_bool());

    machine.run(&[str_cmd("PushString", &missing), cmd("FileExists")]).unwrap();
    assert!(!machine.pop_bool());
}
