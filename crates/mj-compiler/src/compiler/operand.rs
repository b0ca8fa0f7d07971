// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operands: where a value lives while an expression is being compiled.

use super::{CompOp, LabelId};
use crate::diagnostics::ErrorKind;
use crate::symtab::{ObjId, ObjKind, PROGRAM_LEVEL, Tab, TypeId};

/// Location or shape of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// Compile-time constant
    Con {
        /// The value
        val: i32,
    },
    /// Local slot of the current frame
    Local {
        /// Slot index
        adr: usize,
    },
    /// Global data slot
    Static {
        /// Slot index
        adr: usize,
    },
    /// Already on the expression stack
    Stack,
    /// Field of the object reference on the stack
    Fld {
        /// Field index
        adr: usize,
    },
    /// Array element; array reference and index are on the stack
    Elem,
    /// A method, not yet called
    Meth {
        /// The method entry
        obj: ObjId,
    },
}

/// Outcome of a comparison, held as pending jumps instead of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cond {
    /// Relation that makes the condition true
    pub op: CompOp,
    /// Target when the condition holds
    pub t_label: LabelId,
    /// Target when it does not
    pub f_label: LabelId,
}

/// An operand together with its static type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    /// Where the value is
    pub kind: OperandKind,
    /// Its type
    pub ty: TypeId,
}

impl Operand {
    /// A constant of the given type.
    pub fn con(val: i32, ty: TypeId) -> Self {
        Self {
            kind: OperandKind::Con { val },
            ty,
        }
    }

    /// A value already on the stack.
    pub fn stack(ty: TypeId) -> Self {
        Self {
            kind: OperandKind::Stack,
            ty,
        }
    }

    /// The operand a name denotes.
    ///
    /// The `$none` sentinel becomes a typeless stack value so that code
    /// following a failed lookup emits nothing for it.
    pub fn from_obj(tab: &Tab, id: ObjId) -> Result<Self, ErrorKind> {
        if id == ObjId::NONE {
            return Ok(Self::stack(TypeId::NONE));
        }

        let obj = tab.obj(id);
        let kind = match &obj.kind {
            ObjKind::Con { val } => OperandKind::Con { val: *val },
            ObjKind::Var { adr, level } if *level == PROGRAM_LEVEL => {
                OperandKind::Static { adr: *adr }
            }
            ObjKind::Var { adr, .. } => OperandKind::Local { adr: *adr },
            ObjKind::Meth(_) => OperandKind::Meth { obj: id },
            ObjKind::Type | ObjKind::Prog { .. } => return Err(ErrorKind::NoOperand),
        };
        Ok(Self { kind, ty: obj.ty })
    }

    /// Locals, statics, fields and array elements can be stored into.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self.kind,
            OperandKind::Local { .. }
                | OperandKind::Static { .. }
                | OperandKind::Fld { .. }
                | OperandKind::Elem
        )
    }

    /// The constant value, if this is a constant.
    pub fn const_value(&self) -> Option<i32> {
        match self.kind {
            OperandKind::Con { val } => Some(val),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symtab::DeclKind;

    #[test]
    fn test_levels_select_static_or_local() {
        let mut tab = Tab::new();
        tab.open_scope();
        let global = tab.insert(DeclKind::Var, "g", TypeId::INT).unwrap();
        tab.open_scope();
        tab.insert(DeclKind::Var, "p", TypeId::INT).unwrap();
        let local = tab.insert(DeclKind::Var, "l", TypeId::CHAR).unwrap();

        let g = Operand::from_obj(&tab, global).unwrap();
        assert_eq!(g.kind, OperandKind::Static { adr: 0 });

        let l = Operand::from_obj(&tab, local).unwrap();
        assert_eq!(l.kind, OperandKind::Local { adr: 1 });
        assert_eq!(l.ty, TypeId::CHAR);
    }

    #[test]
    fn test_type_names_are_not_operands() {
        let tab = Tab::new();
        let int = tab.find("int").unwrap();
        assert_eq!(Operand::from_obj(&tab, int), Err(ErrorKind::NoOperand));
    }

    #[test]
    fn test_constants_and_methods() {
        let mut tab = Tab::new();
        tab.open_scope();
        let k = tab.insert(DeclKind::Con, "k", TypeId::INT).unwrap();
        if let Some(obj) = tab.obj_mut(k) {
            obj.kind = ObjKind::Con { val: 7 };
        }
        assert_eq!(Operand::from_obj(&tab, k).unwrap().const_value(), Some(7));

        let ord = tab.find("ord").unwrap();
        let op = Operand::from_obj(&tab, ord).unwrap();
        assert_eq!(op.kind, OperandKind::Meth { obj: ord });
        assert!(!op.is_assignable());
    }

    #[test]
    fn test_sentinel_operand() {
        let tab = Tab::new();
        let op = Operand::from_obj(&tab, ObjId::NONE).unwrap();
        assert_eq!(op, Operand::stack(TypeId::NONE));
    }
}
