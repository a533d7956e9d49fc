// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/builtins/arrays.rs
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
//! Method bodies of the array classes.
//!
//! One generic implementation per operation, instantiated for every
//! element family through [`ArrayKind`]. Negative indices count from the
//! end; out-of-range after adjustment fails.

use std::hash::{Hash, Hasher};

use ovum_runtime::{ObjectBody, ObjectRef, RuntimeError, Value};
use rustc_hash::FxHasher;

use crate::commands::{pop_int, pop_object, pop_value, push};
use crate::context::ExecutionContext;
use crate::outcome::{ExecOutcome, ExecutionOutcome};

/// One array element family: payload variant and element conversions.
pub(crate) trait ArrayKind {
    /// Element type of the payload vector.
    type Elem: Copy + PartialEq + PartialOrd;

    /// Borrows the payload vector of a matching body.
    fn vec_ref(body: &ObjectBody) -> Option<&Vec<Self::Elem>>;

    /// Borrows the payload vector mutably.
    fn vec_mut(body: &mut ObjectBody) -> Option<&mut Vec<Self::Elem>>;

    /// Converts a stack value into an element.
    fn elem_from_value(value: Value) -> Option<Self::Elem>;

    /// Converts an element back into a stack value.
    fn elem_to_value(elem: Self::Elem) -> Value;

    /// Feeds one element into the hash state.
    fn hash_elem(elem: &Self::Elem, hasher: &mut FxHasher);
}

macro_rules! array_kind {
    ($name:ident, $variant:ident, $elem:ty, $value:ident, $hash:expr) => {
        pub(crate) struct $name;

        impl ArrayKind for $name {
            type Elem = $elem;

            fn vec_ref(body: &ObjectBody) -> Option<&Vec<Self::Elem>> {
                match body {
                    ObjectBody::$variant(vec) => Some(vec),
                    _ => None,
                }
            }

            fn vec_mut(body: &mut ObjectBody) -> Option<&mut Vec<Self::Elem>> {
                match body {
                    ObjectBody::$variant(vec) => Some(vec),
                    _ => None,
                }
            }

            fn elem_from_value(value: Value) -> Option<Self::Elem> {
                match value {
                    Value::$value(elem) => Some(elem),
                    _ => None,
                }
            }

            fn elem_to_value(elem: Self::Elem) -> Value {
                Value::$value(elem)
            }

            fn hash_elem(elem: &Self::Elem, hasher: &mut FxHasher) {
                let hash: fn(&Self::Elem, &mut FxHasher) = $hash;
                hash(elem, hasher);
            }
        }
    };
}

array_kind!(IntElems, Ints, i64, Int, |elem, hasher| elem.hash(hasher));
array_kind!(FloatElems, Floats, f64, Float, |elem, hasher| elem.to_bits().hash(hasher));
array_kind!(CharElems, Chars, u8, Char, |elem, hasher| elem.hash(hasher));
array_kind!(ByteElems, Bytes, u8, Byte, |elem, hasher| elem.hash(hasher));
array_kind!(BoolElems, Bools, bool, Bool, |elem, hasher| elem.hash(hasher));
array_kind!(RefElems, Refs, ObjectRef, Object, |elem, hasher| elem.to_bits().hash(hasher));

fn elements<'ctx, K: ArrayKind>(
    ctx: &'ctx ExecutionContext<'_>,
    reference: ObjectRef,
    op: &str,
) -> Result<&'ctx Vec<K::Elem>, RuntimeError> {
    let object = ctx.heap.repository().get(reference, op)?;
    K::vec_ref(&object.body).ok_or_else(|| {
        RuntimeError::type_mismatch(op, "array", ctx.class_name_of(reference))
    })
}

fn elements_mut<'ctx, K: ArrayKind>(
    ctx: &'ctx mut ExecutionContext<'_>,
    reference: ObjectRef,
    op: &str,
) -> Result<&'ctx mut Vec<K::Elem>, RuntimeError> {
    let object = ctx.heap.repository_mut().get_mut(reference, op)?;
    K::vec_mut(&mut object.body)
        .ok_or_else(|| RuntimeError::type_mismatch(op, "array", "non-array payload"))
}

/// Adjusts a possibly negative index against `len`.
///
/// `allow_end` admits `index == len` (insertion point past the last
/// element).
fn adjust_index(
    index: i64,
    len: usize,
    op: &str,
    allow_end: bool,
) -> Result<usize, RuntimeError> {
    let adjusted = if index < 0 { index + len as i64 } else { index };
    let out_of_range =
        || RuntimeError::IndexOutOfRange { op: op.to_string(), index, len };
    let adjusted = usize::try_from(adjusted).map_err(|_| out_of_range())?;
    let limit = if allow_end { len + 1 } else { len };
    if adjusted >= limit {
        return Err(out_of_range());
    }
    Ok(adjusted)
}

fn pop_elem<K: ArrayKind>(
    ctx: &mut ExecutionContext<'_>,
    op: &str,
) -> Result<K::Elem, RuntimeError> {
    let value = pop_value(ctx, op)?;
    K::elem_from_value(value)
        .ok_or_else(|| RuntimeError::type_mismatch(op, "array element", value.tag_name()))
}

/// `_<C>Array_int_<elem>`: `[... size default this] → [... this]`
pub(crate) fn constructor<K: ArrayKind>(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "array constructor")?;
    let default = pop_elem::<K>(ctx, "array constructor")?;
    let size = pop_int(ctx, "array constructor")?;
    let size = usize::try_from(size).map_err(|_| {
        RuntimeError::other(format!("array constructor: negative size {size}"))
    })?;
    *elements_mut::<K>(ctx, receiver, "array constructor")? = vec![default; size];
    push(ctx, Value::Object(receiver));
    Ok(ExecutionOutcome::Normal)
}

/// `_<C>Array_<C>Array`: `[... source this] → [... this]`
pub(crate) fn copy_constructor<K: ArrayKind>(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "array copy constructor")?;
    let source = pop_object(ctx, "array copy constructor")?;
    let copied = elements::<K>(ctx, source, "array copy constructor")?.clone();
    *elements_mut::<K>(ctx, receiver, "array copy constructor")? = copied;
    push(ctx, Value::Object(receiver));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn equals<K: ArrayKind>(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "array Equals")?;
    let other = pop_object(ctx, "array Equals")?;
    let result = elements::<K>(ctx, receiver, "array Equals")?
        == elements::<K>(ctx, other, "array Equals")?;
    push(ctx, Value::Bool(result));
    Ok(ExecutionOutcome::Normal)
}

/// Lexicographic ordering over the element sequences.
pub(crate) fn is_less<K: ArrayKind>(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "array IsLess")?;
    let other = pop_object(ctx, "array IsLess")?;
    let result = elements::<K>(ctx, receiver, "array IsLess")?
        < elements::<K>(ctx, other, "array IsLess")?;
    push(ctx, Value::Bool(result));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn length<K: ArrayKind>(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "array Length")?;
    let len = elements::<K>(ctx, receiver, "array Length")?.len();
    push(ctx, Value::Int(len as i64));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn get_hash<K: ArrayKind>(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "array GetHash")?;
    let mut hasher = FxHasher::default();
    for elem in elements::<K>(ctx, receiver, "array GetHash")? {
        K::hash_elem(elem, &mut hasher);
    }
    push(ctx, Value::Int(hasher.finish() as i64));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn clear<K: ArrayKind>(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "array Clear")?;
    elements_mut::<K>(ctx, receiver, "array Clear")?.clear();
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn shrink_to_fit<K: ArrayKind>(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "array ShrinkToFit")?;
    elements_mut::<K>(ctx, receiver, "array ShrinkToFit")?.shrink_to_fit();
    Ok(ExecutionOutcome::Normal)
}

/// `[... n this] → [...]`
pub(crate) fn reserve<K: ArrayKind>(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "array Reserve")?;
    let additional = pop_int(ctx, "array Reserve")?;
    let additional = usize::try_from(additional).map_err(|_| {
        RuntimeError::other(format!("array Reserve: negative capacity {additional}"))
    })?;
    elements_mut::<K>(ctx, receiver, "array Reserve")?.reserve(additional);
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn capacity<K: ArrayKind>(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "array Capacity")?;
    let capacity = elements::<K>(ctx, receiver, "array Capacity")?.capacity();
    push(ctx, Value::Int(capacity as i64));
    Ok(ExecutionOutcome::Normal)
}

/// `[... value this] → [...]`, appending the value.
pub(crate) fn add<K: ArrayKind>(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "array Add")?;
    let elem = pop_elem::<K>(ctx, "array Add")?;
    elements_mut::<K>(ctx, receiver, "array Add")?.push(elem);
    Ok(ExecutionOutcome::Normal)
}

/// `[... index this] → [... value]`
pub(crate) fn get_at<K: ArrayKind>(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "array GetAt")?;
    let index = pop_int(ctx, "array GetAt")?;
    let elems = elements::<K>(ctx, receiver, "array GetAt")?;
    let at = adjust_index(index, elems.len(), "array GetAt", false)?;
    let value = K::elem_to_value(elems[at]);
    push(ctx, value);
    Ok(ExecutionOutcome::Normal)
}

/// `[... index value this] → [...]`
pub(crate) fn set_at<K: ArrayKind>(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "array SetAt")?;
    let elem = pop_elem::<K>(ctx, "array SetAt")?;
    let index = pop_int(ctx, "array SetAt")?;
    let elems = elements_mut::<K>(ctx, receiver, "array SetAt")?;
    let at = adjust_index(index, elems.len(), "array SetAt", false)?;
    elems[at] = elem;
    Ok(ExecutionOutcome::Normal)
}

/// `[... index value this] → [...]`
pub(crate) fn insert_at<K: ArrayKind>(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "array InsertAt")?;
    let elem = pop_elem::<K>(ctx, "array InsertAt")?;
    let index = pop_int(ctx, "array InsertAt")?;
    let elems = elements_mut::<K>(ctx, receiver, "array InsertAt")?;
    let at = adjust_index(index, elems.len(), "array InsertAt", true)?;
    elems.insert(at, elem);
    Ok(ExecutionOutcome::Normal)
}

/// `[... index this] → [...]`
pub(crate) fn remove_at<K: ArrayKind>(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let receiver = pop_object(ctx, "array RemoveAt")?;
    let index = pop_int(ctx, "array RemoveAt")?;
    let elems = elements_mut::<K>(ctx, receiver, "array RemoveAt")?;
    let at = adjust_index(index, elems.len(), "array RemoveAt", false)?;
    let _ = elems.remove(at);
    Ok(ExecutionOutcome::Normal)
}

// --- ByteArray view constructors ---

/// Shared shape of `_ByteArray_<SrcArray>`: `[... source this] → [... this]`
fn view_constructor(
    ctx: &mut ExecutionContext<'_>,
    op: &str,
    convert: impl FnOnce(&ObjectBody) -> Option<Vec<u8>>,
) -> ExecOutcome {
    let receiver = pop_object(ctx, op)?;
    let source = pop_object(ctx, op)?;
    let bytes = {
        let object = ctx.heap.repository().get(source, op)?;
        convert(&object.body)
            .ok_or_else(|| RuntimeError::type_mismatch(op, "source array", ctx.class_name_of(source)))?
    };
    *elements_mut::<ByteElems>(ctx, receiver, op)? = bytes;
    push(ctx, Value::Object(receiver));
    Ok(ExecutionOutcome::Normal)
}

/// Copies the little-endian bytes of an `IntArray`.
pub(crate) fn bytes_from_int_array(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    view_constructor(ctx, "ByteArray from IntArray", |body| match body {
        ObjectBody::Ints(elems) => {
            Some(elems.iter().flat_map(|elem| elem.to_le_bytes()).collect())
        }
        _ => None,
    })
}

/// Copies the little-endian bytes of a `FloatArray`.
pub(crate) fn bytes_from_float_array(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    view_constructor(ctx, "ByteArray from FloatArray", |body| match body {
        ObjectBody::Floats(elems) => {
            Some(elems.iter().flat_map(|elem| elem.to_le_bytes()).collect())
        }
        _ => None,
    })
}

/// Copies the bytes of a `CharArray`.
pub(crate) fn bytes_from_char_array(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    view_constructor(ctx, "ByteArray from CharArray", |body| match body {
        ObjectBody::Chars(elems) => Some(elems.clone()),
        _ => None,
    })
}

/// Copies a `BoolArray` as one byte per element.
pub(crate) fn bytes_from_bool_array(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    view_constructor(ctx, "ByteArray from BoolArray", |body| match body {
        ObjectBody::Bools(elems) => Some(elems.iter().map(|&elem| u8::from(elem)).collect()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::adjust_index;

    #[test]
    fn negative_indices_count_from_the_end() {
        assert_eq!(adjust_index(-1, 4, "t", false).unwrap(), 3);
        assert_eq!(adjust_index(-4, 4, "t", false).unwrap(), 0);
        assert!(adjust_index(-5, 4, "t", false).is_err());
    }

    #[test]
    fn insertion_may_target_one_past_the_end() {
        assert_eq!(adjust_index(4, 4, "t", true).unwrap(), 4);
        assert!(adjust_index(4, 4, "t", false).is_err());
        assert!(adjust_index(5, 4, "t", true).is_err());
    }
}
