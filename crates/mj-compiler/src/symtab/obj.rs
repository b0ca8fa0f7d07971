// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Symbol entries.

use super::TypeId;

/// Handle to a symbol entry in the table's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId(pub(crate) u32);

impl ObjId {
    /// The `$none` variable handed out whenever a lookup or declaration
    /// fails.
    pub const NONE: ObjId = ObjId(0);
}

/// Method metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodInfo {
    /// Code address of the `enter` instruction
    pub adr: usize,
    /// Number of parameters
    pub n_pars: usize,
    /// Whether the last parameter collects variable arguments
    pub has_var_arg: bool,
    /// Parameters followed by local variables
    pub locals: Vec<ObjId>,
}

impl MethodInfo {
    /// Number of parameters that take exactly one argument each.
    pub fn fixed_pars(&self) -> usize {
        self.n_pars.saturating_sub(usize::from(self.has_var_arg))
    }

    /// The parameter entries.
    pub fn params(&self) -> &[ObjId] {
        &self.locals[..self.n_pars.min(self.locals.len())]
    }
}

/// What a name denotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjKind {
    /// Named constant
    Con {
        /// Literal value
        val: i32,
    },
    /// Variable, parameter or field
    Var {
        /// Slot index within its scope
        adr: usize,
        /// Nesting level of the declaring scope
        level: u32,
    },
    /// Type name
    Type,
    /// Method
    Meth(MethodInfo),
    /// The program itself
    Prog {
        /// Program-level declarations
        locals: Vec<ObjId>,
    },
}

/// Declaration category passed to `Tab::insert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// `final` constant
    Con,
    /// Variable, parameter or field
    Var,
    /// Type name
    Type,
    /// Method
    Meth,
    /// Program
    Prog,
}

/// A symbol entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Obj {
    /// Declared name
    pub name: String,
    /// Declared type
    pub ty: TypeId,
    /// Kind-specific data
    pub kind: ObjKind,
}

impl Obj {
    /// Method metadata, if this is a method.
    pub fn method(&self) -> Option<&MethodInfo> {
        match &self.kind {
            ObjKind::Meth(info) => Some(info),
            _ => None,
        }
    }

    /// Mutable method metadata, if this is a method.
    pub fn method_mut(&mut self) -> Option<&mut MethodInfo> {
        match &mut self.kind {
            ObjKind::Meth(info) => Some(info),
            _ => None,
        }
    }

    /// Returns true if this entry names a type.
    pub fn is_type(&self) -> bool {
        matches!(self.kind, ObjKind::Type)
    }

    /// Slot address of a variable entry.
    pub fn adr(&self) -> usize {
        match &self.kind {
            ObjKind::Var { adr, .. } => *adr,
            ObjKind::Meth(info) => info.adr,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_pars_excludes_vararg_slot() {
        let info = MethodInfo {
            n_pars: 3,
            has_var_arg: true,
            ..Default::default()
        };
        assert_eq!(info.fixed_pars(), 2);
    }

    #[test]
    fn test_params_are_leading_locals() {
        let info = MethodInfo {
            n_pars: 1,
            locals: vec![ObjId(4), ObjId(5)],
            ..Default::default()
        };
        assert_eq!(info.params(), &[ObjId(4)]);
    }
}
