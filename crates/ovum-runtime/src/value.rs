// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-runtime/src/value.rs
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
//! The tagged value type of the Ovum runtime.

use std::fmt;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::object::ObjectRef;

/// A value on the operand stack, in a local slot, or in a static slot.
///
/// Exactly six alternatives; values are copyable and the object-reference
/// alternative participates in garbage collection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit IEEE-754 float.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Unsigned 8-bit unit of text data.
    Char(u8),
    /// Unsigned 8-bit byte.
    Byte(u8),
    /// Opaque reference to a heap object.
    Object(ObjectRef),
}

impl Value {
    /// Returns the primitive tag name, or `"Object"` for references.
    ///
    /// Object references resolve their class name through the vtable store,
    /// not here.
    #[must_use]
    pub const fn tag_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Char(_) => "char",
            Self::Byte(_) => "byte",
            Self::Object(_) => "Object",
        }
    }

    /// Returns the object reference if this value carries one.
    #[must_use]
    pub const fn as_object(&self) -> Option<ObjectRef> {
        match self {
            Self::Object(reference) => Some(*reference),
            _ => None,
        }
    }

    /// Hashes the value for memoization fingerprints.
    ///
    /// Only meaningful for primitives; object references contribute their
    /// virtual `_GetHash_<C>` result instead, which the caller computes.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        match self {
            Self::Int(v) => v.hash(&mut hasher),
            Self::Float(v) => v.to_bits().hash(&mut hasher),
            Self::Bool(v) => v.hash(&mut hasher),
            Self::Char(v) | Self::Byte(v) => v.hash(&mut hasher),
            Self::Object(reference) => reference.to_bits().hash(&mut hasher),
        }
        hasher.finish()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{}", *v as char),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Object(reference) if reference.is_null() => write!(f, "<null>"),
            Self::Object(reference) => write!(f, "<object {}>", reference.to_bits()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_names_match_the_bytecode_type_names() {
        assert_eq!(Value::Int(1).tag_name(), "int");
        assert_eq!(Value::Float(1.0).tag_name(), "float");
        assert_eq!(Value::Bool(true).tag_name(), "bool");
        assert_eq!(Value::Char(b'a').tag_name(), "char");
        assert_eq!(Value::Byte(7).tag_name(), "byte");
        assert_eq!(Value::Object(ObjectRef::NULL).tag_name(), "Object");
    }

    #[test]
    fn equal_primitives_share_a_fingerprint() {
        assert_eq!(Value::Int(42).fingerprint(), Value::Int(42).fingerprint());
        assert_ne!(Value::Int(42).fingerprint(), Value::Int(43).fingerprint());
        assert_eq!(Value::Float(1.5).fingerprint(), Value::Float(1.5).fingerprint());
    }

    #[test]
    fn char_and_byte_values_are_distinct_tags() {
        assert_ne!(Value::Char(7), Value::Byte(7));
    }
}
