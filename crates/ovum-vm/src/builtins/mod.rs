// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/builtins/mod.rs
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
//! Registration of the built-in class catalog.
//!
//! The reserved classes and their method ids must be installed before any
//! user program runs; user vtables and functions append after them, so
//! built-in store indices are stable.

pub mod ids;

mod arrays;
mod file;
mod primitives;
mod strings;

use ovum_runtime::{
    DESCRIPTOR_SIZE, FieldKind, ObjectLayout, RuntimeError, ScannerKind, VirtualTable,
    VirtualTableStore,
};

use self::arrays::{
    ArrayKind, BoolElems, ByteElems, CharElems, FloatElems, IntElems, RefElems,
};
use crate::context::ExecutionContext;
use crate::function::{FunctionStore, NativeFunction, StoredFunction};
use crate::outcome::ExecOutcome;

// Host payloads are opaque to bytecode; these sizes only feed `SizeOf`.
const HOST_STRING_SIZE: usize = 24;
const HOST_VEC_SIZE: usize = 24;
const HOST_FILE_SIZE: usize = 16;

const COMPARABLE_INTERFACES: [&str; 2] = ["IComparable", "IHashable"];

struct ArrayClass {
    class: &'static str,
    /// Element type name as it appears in method ids (`int`, `Object`, …).
    elem: &'static str,
}

const ARRAY_CLASSES: [ArrayClass; 8] = [
    ArrayClass { class: "IntArray", elem: "int" },
    ArrayClass { class: "FloatArray", elem: "float" },
    ArrayClass { class: "CharArray", elem: "char" },
    ArrayClass { class: "ByteArray", elem: "byte" },
    ArrayClass { class: "BoolArray", elem: "bool" },
    ArrayClass { class: "ObjectArray", elem: "Object" },
    ArrayClass { class: "StringArray", elem: "String" },
    ArrayClass { class: "PointerArray", elem: "Pointer" },
];

fn real_id(class: &str, virtual_id: &str) -> String {
    format!("_{class}{virtual_id}")
}

fn add_common_methods(table: &mut VirtualTable, class: &str) {
    table.add_method(ids::DESTRUCTOR, real_id(class, ids::DESTRUCTOR));
    table.add_method(ids::EQUALS, real_id(class, ids::EQUALS));
    table.add_method(ids::IS_LESS, real_id(class, ids::IS_LESS));
    table.add_method(ids::GET_HASH, real_id(class, ids::GET_HASH));
}

fn primitive_vtable(class: &str, kind: FieldKind) -> VirtualTable {
    let mut table = VirtualTable::builtin(
        class,
        DESCRIPTOR_SIZE + kind.width(),
        ObjectLayout::Raw,
        ScannerKind::Empty,
    );
    let _ = table.add_field(kind, DESCRIPTOR_SIZE);
    add_common_methods(&mut table, class);
    table.add_method(ids::TO_STRING, real_id(class, ids::TO_STRING));
    for interface in COMPARABLE_INTERFACES {
        table.add_interface(interface);
    }
    table.add_interface("IStringConvertible");
    table
}

fn array_vtable(entry: &ArrayClass, layout: ObjectLayout, scanner: ScannerKind) -> VirtualTable {
    let mut table =
        VirtualTable::builtin(entry.class, DESCRIPTOR_SIZE + HOST_VEC_SIZE, layout, scanner);
    add_common_methods(&mut table, entry.class);
    for interface in COMPARABLE_INTERFACES {
        table.add_interface(interface);
    }

    let elem = entry.elem;
    let element_methods = [
        format!("_Add_<M>_{elem}"),
        format!("_InsertAt_<M>_int_{elem}"),
        format!("_SetAt_<M>_int_{elem}"),
        "_GetAt_<C>_int".to_string(),
        "_RemoveAt_<M>_int".to_string(),
        "_Reserve_<M>_int".to_string(),
        "_Capacity_<C>".to_string(),
        "_Clear_<M>".to_string(),
        "_ShrinkToFit_<M>".to_string(),
        ids::LENGTH.to_string(),
    ];
    for virtual_id in element_methods {
        table.add_method(virtual_id.clone(), real_id(entry.class, &virtual_id));
    }
    table
}

/// Installs the reserved built-in virtual tables.
pub fn register_builtin_vtables(store: &mut VirtualTableStore) -> Result<(), RuntimeError> {
    let _ = store.add(primitive_vtable("Int", FieldKind::Int))?;
    let _ = store.add(primitive_vtable("Float", FieldKind::Float))?;
    let _ = store.add(primitive_vtable("Char", FieldKind::Char))?;
    let _ = store.add(primitive_vtable("Byte", FieldKind::Byte))?;
    let _ = store.add(primitive_vtable("Bool", FieldKind::Bool))?;

    // Nullable carries one traced reference and only a destructor.
    {
        let mut table = VirtualTable::builtin(
            "Nullable",
            DESCRIPTOR_SIZE + FieldKind::Object.width(),
            ObjectLayout::Raw,
            ScannerKind::Fields,
        );
        let _ = table.add_field(FieldKind::Object, DESCRIPTOR_SIZE);
        table.add_method(ids::DESTRUCTOR, real_id("Nullable", ids::DESTRUCTOR));
        let _ = store.add(table)?;
    }

    {
        let mut table = VirtualTable::builtin(
            "String",
            DESCRIPTOR_SIZE + HOST_STRING_SIZE,
            ObjectLayout::Str,
            ScannerKind::Empty,
        );
        add_common_methods(&mut table, "String");
        table.add_method(ids::TO_STRING, real_id("String", ids::TO_STRING));
        table.add_method(ids::LENGTH, real_id("String", ids::LENGTH));
        table.add_method(ids::TO_UTF8_BYTES, real_id("String", ids::TO_UTF8_BYTES));
        for interface in COMPARABLE_INTERFACES {
            table.add_interface(interface);
        }
        table.add_interface("IStringConvertible");
        let _ = store.add(table)?;
    }

    // Files cannot be meaningfully compared or hashed.
    {
        let mut table = VirtualTable::builtin(
            "File",
            DESCRIPTOR_SIZE + HOST_FILE_SIZE,
            ObjectLayout::File,
            ScannerKind::Empty,
        );
        table.add_method(ids::DESTRUCTOR, real_id("File", ids::DESTRUCTOR));
        for virtual_id in [
            ids::FILE_OPEN,
            ids::FILE_CLOSE,
            ids::FILE_IS_OPEN,
            ids::FILE_READ,
            ids::FILE_WRITE,
            ids::FILE_READ_LINE,
            ids::FILE_WRITE_LINE,
            ids::FILE_SEEK,
            ids::FILE_TELL,
            ids::FILE_EOF,
        ] {
            table.add_method(virtual_id, real_id("File", virtual_id));
        }
        let _ = store.add(table)?;
    }

    let fundamental_layouts = [
        ObjectLayout::IntVec,
        ObjectLayout::FloatVec,
        ObjectLayout::CharVec,
        ObjectLayout::ByteVec,
        ObjectLayout::BoolVec,
    ];
    for (entry, layout) in ARRAY_CLASSES.iter().take(5).zip(fundamental_layouts) {
        let _ = store.add(array_vtable(entry, layout, ScannerKind::Empty))?;
    }
    for entry in ARRAY_CLASSES.iter().skip(5) {
        let _ = store.add(array_vtable(entry, ObjectLayout::RefVec, ScannerKind::Array))?;
    }

    // Pointer boxes a reference the collector traces.
    {
        let mut table = VirtualTable::builtin(
            "Pointer",
            DESCRIPTOR_SIZE + FieldKind::Object.width(),
            ObjectLayout::Raw,
            ScannerKind::Fields,
        );
        let _ = table.add_field(FieldKind::Object, DESCRIPTOR_SIZE);
        add_common_methods(&mut table, "Pointer");
        for interface in COMPARABLE_INTERFACES {
            table.add_interface(interface);
        }
        let _ = store.add(table)?;
    }

    Ok(())
}

fn native(
    store: &mut FunctionStore,
    id: impl Into<String>,
    arity: usize,
    run: impl Fn(&mut ExecutionContext<'_>) -> ExecOutcome + 'static,
) -> Result<(), RuntimeError> {
    let _ = store.add(StoredFunction::Native(NativeFunction::new(id, arity, Box::new(run))))?;
    Ok(())
}

fn register_primitive_functions(
    store: &mut FunctionStore,
    class: &str,
    value_ctor_suffix: &str,
) -> Result<(), RuntimeError> {
    native(store, format!("_{class}_{value_ctor_suffix}"), 2, primitives::constructor)?;
    native(store, format!("_{class}_{class}"), 2, primitives::copy_constructor)?;
    native(store, real_id(class, ids::DESTRUCTOR), 1, primitives::drop_receiver)?;
    native(store, real_id(class, ids::EQUALS), 2, primitives::equals)?;
    native(store, real_id(class, ids::IS_LESS), 2, primitives::is_less)?;
    native(store, real_id(class, ids::GET_HASH), 1, primitives::get_hash)?;
    Ok(())
}

fn register_array_functions<K: ArrayKind + 'static>(
    store: &mut FunctionStore,
    entry: &ArrayClass,
) -> Result<(), RuntimeError> {
    let class = entry.class;
    let elem = entry.elem;
    native(store, format!("_{class}_int_{elem}"), 3, arrays::constructor::<K>)?;
    native(store, format!("_{class}_{class}"), 2, arrays::copy_constructor::<K>)?;
    native(store, real_id(class, ids::DESTRUCTOR), 1, primitives::drop_receiver)?;
    native(store, real_id(class, ids::EQUALS), 2, arrays::equals::<K>)?;
    native(store, real_id(class, ids::IS_LESS), 2, arrays::is_less::<K>)?;
    native(store, real_id(class, ids::GET_HASH), 1, arrays::get_hash::<K>)?;
    native(store, real_id(class, ids::LENGTH), 1, arrays::length::<K>)?;
    native(store, format!("_{class}_Clear_<M>"), 1, arrays::clear::<K>)?;
    native(store, format!("_{class}_ShrinkToFit_<M>"), 1, arrays::shrink_to_fit::<K>)?;
    native(store, format!("_{class}_Reserve_<M>_int"), 2, arrays::reserve::<K>)?;
    native(store, format!("_{class}_Capacity_<C>"), 1, arrays::capacity::<K>)?;
    native(store, format!("_{class}_Add_<M>_{elem}"), 2, arrays::add::<K>)?;
    native(store, format!("_{class}_RemoveAt_<M>_int"), 2, arrays::remove_at::<K>)?;
    native(store, format!("_{class}_InsertAt_<M>_int_{elem}"), 3, arrays::insert_at::<K>)?;
    native(store, format!("_{class}_SetAt_<M>_int_{elem}"), 3, arrays::set_at::<K>)?;
    native(store, format!("_{class}_GetAt_<C>_int"), 2, arrays::get_at::<K>)?;
    Ok(())
}

/// Registers every built-in function the built-in vtables dispatch to.
pub fn register_builtin_functions(store: &mut FunctionStore) -> Result<(), RuntimeError> {
    register_primitive_functions(store, "Int", "int")?;
    register_primitive_functions(store, "Float", "float")?;
    register_primitive_functions(store, "Char", "char")?;
    register_primitive_functions(store, "Byte", "byte")?;
    register_primitive_functions(store, "Bool", "bool")?;
    register_primitive_functions(store, "Pointer", "pointer")?;

    // Primitives are string-convertible; Pointer is not.
    for class in ["Int", "Float", "Char", "Byte", "Bool"] {
        native(store, real_id(class, ids::TO_STRING), 1, primitives::to_string)?;
    }

    native(store, "_Nullable_Object", 2, primitives::constructor)?;
    native(store, real_id("Nullable", ids::DESTRUCTOR), 1, primitives::drop_receiver)?;

    native(store, "_String_String", 2, strings::copy_constructor)?;
    native(store, real_id("String", ids::DESTRUCTOR), 1, primitives::drop_receiver)?;
    native(store, real_id("String", ids::EQUALS), 2, strings::equals)?;
    native(store, real_id("String", ids::IS_LESS), 2, strings::is_less)?;
    native(store, real_id("String", ids::TO_STRING), 1, strings::to_string)?;
    native(store, real_id("String", ids::GET_HASH), 1, strings::get_hash)?;
    native(store, real_id("String", ids::LENGTH), 1, strings::length)?;
    native(store, real_id("String", ids::TO_UTF8_BYTES), 1, strings::to_utf8_bytes)?;

    native(store, "_File", 1, file::constructor)?;
    native(store, real_id("File", ids::DESTRUCTOR), 1, file::destructor)?;
    native(store, real_id("File", ids::FILE_OPEN), 3, file::open)?;
    native(store, real_id("File", ids::FILE_CLOSE), 1, file::close)?;
    native(store, real_id("File", ids::FILE_IS_OPEN), 1, file::is_open)?;
    native(store, real_id("File", ids::FILE_READ), 2, file::read)?;
    native(store, real_id("File", ids::FILE_WRITE), 2, file::write)?;
    native(store, real_id("File", ids::FILE_READ_LINE), 1, file::read_line)?;
    native(store, real_id("File", ids::FILE_WRITE_LINE), 2, file::write_line)?;
    native(store, real_id("File", ids::FILE_SEEK), 2, file::seek)?;
    native(store, real_id("File", ids::FILE_TELL), 1, file::tell)?;
    native(store, real_id("File", ids::FILE_EOF), 1, file::eof)?;

    register_array_functions::<IntElems>(store, &ARRAY_CLASSES[0])?;
    register_array_functions::<FloatElems>(store, &ARRAY_CLASSES[1])?;
    register_array_functions::<CharElems>(store, &ARRAY_CLASSES[2])?;
    register_array_functions::<ByteElems>(store, &ARRAY_CLASSES[3])?;
    register_array_functions::<BoolElems>(store, &ARRAY_CLASSES[4])?;
    register_array_functions::<RefElems>(store, &ARRAY_CLASSES[5])?;
    register_array_functions::<RefElems>(store, &ARRAY_CLASSES[6])?;
    register_array_functions::<RefElems>(store, &ARRAY_CLASSES[7])?;

    // ByteArray view constructors alias the raw bytes of other arrays.
    native(store, "_ByteArray_IntArray", 2, arrays::bytes_from_int_array)?;
    native(store, "_ByteArray_FloatArray", 2, arrays::bytes_from_float_array)?;
    native(store, "_ByteArray_CharArray", 2, arrays::bytes_from_char_array)?;
    native(store, "_ByteArray_BoolArray", 2, arrays::bytes_from_bool_array)?;

    Ok(())
}
