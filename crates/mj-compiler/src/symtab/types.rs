// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Type descriptors.
//!
//! Descriptors live in an arena and are compared by identity, except for
//! arrays, which compare structurally. Every `T[]` in the source allocates a
//! fresh array descriptor.

use super::ObjId;

/// Handle to a type descriptor in [`Types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

impl TypeId {
    /// The type of erroneous or missing values, and of void methods.
    pub const NONE: TypeId = TypeId(0);
    /// `int`
    pub const INT: TypeId = TypeId(1);
    /// `char`
    pub const CHAR: TypeId = TypeId(2);
    /// The type of `null`, a class without fields.
    pub const NULL: TypeId = TypeId(3);
}

/// A type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Struct {
    /// No type
    None,
    /// `int`
    Int,
    /// `char`
    Char,
    /// Array of an element type
    Array {
        /// Element type
        elem: TypeId,
    },
    /// Class with fields in declaration order
    Class {
        /// Field entries
        fields: Vec<ObjId>,
    },
}

/// Arena of type descriptors.
#[derive(Debug, Clone)]
pub struct Types {
    structs: Vec<Struct>,
}

impl Default for Types {
    fn default() -> Self {
        Self::new()
    }
}

impl Types {
    /// Creates an arena holding the predefined types.
    pub fn new() -> Self {
        Self {
            structs: vec![
                Struct::None,
                Struct::Int,
                Struct::Char,
                Struct::Class { fields: Vec::new() },
            ],
        }
    }

    fn alloc(&mut self, s: Struct) -> TypeId {
        let id = TypeId(self.structs.len() as u32);
        self.structs.push(s);
        id
    }

    /// Allocates a fresh array type.
    pub fn array_of(&mut self, elem: TypeId) -> TypeId {
        self.alloc(Struct::Array { elem })
    }

    /// Allocates a fresh class type without fields.
    pub fn new_class(&mut self) -> TypeId {
        self.alloc(Struct::Class { fields: Vec::new() })
    }

    /// The descriptor behind an id.
    pub fn get(&self, id: TypeId) -> &Struct {
        &self.structs[id.0 as usize]
    }

    /// Attaches the field list to a class type. Other types are left alone.
    pub fn set_fields(&mut self, id: TypeId, new_fields: Vec<ObjId>) {
        if id == TypeId::NULL {
            return;
        }
        if let Struct::Class { fields } = &mut self.structs[id.0 as usize] {
            *fields = new_fields;
        }
    }

    /// Field entries of a class type; empty for anything else.
    pub fn fields(&self, id: TypeId) -> &[ObjId] {
        match self.get(id) {
            Struct::Class { fields } => fields,
            _ => &[],
        }
    }

    /// Element type of an array type; `NONE` for anything else.
    pub fn elem_type(&self, id: TypeId) -> TypeId {
        match self.get(id) {
            Struct::Array { elem } => *elem,
            _ => TypeId::NONE,
        }
    }

    /// Returns true for class types, `null` included.
    pub fn is_class(&self, id: TypeId) -> bool {
        matches!(self.get(id), Struct::Class { .. })
    }

    /// Returns true for array types.
    pub fn is_array(&self, id: TypeId) -> bool {
        matches!(self.get(id), Struct::Array { .. })
    }

    /// Classes and arrays are reference types.
    pub fn is_ref_type(&self, id: TypeId) -> bool {
        self.is_class(id) || self.is_array(id)
    }

    /// Arrays are equal when their element types are; everything else only
    /// equals itself.
    pub fn equals(&self, a: TypeId, b: TypeId) -> bool {
        match (self.get(a), self.get(b)) {
            (Struct::Array { elem: x }, Struct::Array { elem: y }) => self.equals(*x, *y),
            _ => a == b,
        }
    }

    /// Whether two operand types may be compared with each other.
    pub fn compatible_with(&self, a: TypeId, b: TypeId) -> bool {
        self.equals(a, b)
            || (a == TypeId::NULL && self.is_ref_type(b))
            || (b == TypeId::NULL && self.is_ref_type(a))
    }

    /// Whether a value of type `src` may be stored into `dest`.
    ///
    /// Any array may be passed where `none[]` is expected; that is the
    /// parameter type of the builtin `len`.
    pub fn assignable_to(&self, src: TypeId, dest: TypeId) -> bool {
        self.equals(src, dest)
            || (src == TypeId::NULL && self.is_ref_type(dest))
            || (self.is_array(src) && self.is_array(dest) && self.elem_type(dest) == TypeId::NONE)
    }
}
