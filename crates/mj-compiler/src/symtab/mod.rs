// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The symbol table.
//!
//! Entries and type descriptors live in arenas owned by [`Tab`] and are
//! addressed by [`ObjId`] and [`TypeId`]. Scopes form a stack; each scope
//! remembers the index of its enclosing scope, and lookups walk that chain
//! outward until the universe.
//!
//! Levels: the universe is level 0, program declarations are level 1
//! (static data), and class members and method locals are level 2.

mod obj;
mod scope;
mod types;

pub use obj::{DeclKind, MethodInfo, Obj, ObjId, ObjKind};
pub use scope::Scope;
pub use types::{Struct, TypeId, Types};

use crate::diagnostics::ErrorKind;

/// Level of program-scope declarations.
pub const PROGRAM_LEVEL: u32 = 1;

/// Predeclared methods compiled without a call instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `char chr(int i)`
    Chr,
    /// `int ord(char ch)`
    Ord,
    /// `int len(none[] arr)`
    Len,
}

/// Scoped symbol table.
#[derive(Debug)]
pub struct Tab {
    objs: Vec<Obj>,
    types: Types,
    scopes: Vec<Scope>,
    builtins: [ObjId; 3],
}

impl Default for Tab {
    fn default() -> Self {
        Self::new()
    }
}

impl Tab {
    /// Creates a table whose only scope is the universe.
    pub fn new() -> Self {
        let mut tab = Self {
            objs: vec![Obj {
                name: "$none".to_string(),
                ty: TypeId::NONE,
                kind: ObjKind::Var { adr: 0, level: 0 },
            }],
            types: Types::new(),
            scopes: vec![Scope::new(None)],
            builtins: [ObjId::NONE; 3],
        };

        tab.bind("int", TypeId::INT, ObjKind::Type);
        tab.bind("char", TypeId::CHAR, ObjKind::Type);
        tab.bind("null", TypeId::NULL, ObjKind::Con { val: 0 });

        let none_array = tab.types.array_of(TypeId::NONE);
        let chr = tab.bind_builtin("chr", TypeId::CHAR, "i", TypeId::INT);
        let ord = tab.bind_builtin("ord", TypeId::INT, "ch", TypeId::CHAR);
        let len = tab.bind_builtin("len", TypeId::INT, "arr", none_array);
        tab.builtins = [chr, ord, len];
        tab
    }

    fn alloc(&mut self, obj: Obj) -> ObjId {
        let id = ObjId(self.objs.len() as u32);
        self.objs.push(obj);
        id
    }

    fn top(&self) -> &Scope {
        &self.scopes[self.scopes.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Scope {
        let i = self.scopes.len() - 1;
        &mut self.scopes[i]
    }

    /// Binds without the duplicate check.
    fn bind(&mut self, name: &str, ty: TypeId, kind: ObjKind) -> ObjId {
        let is_var = matches!(kind, ObjKind::Var { .. });
        let id = self.alloc(Obj {
            name: name.to_string(),
            ty,
            kind,
        });
        self.top_mut().insert(name, id, is_var);
        id
    }

    fn bind_builtin(&mut self, name: &str, ty: TypeId, par: &str, par_ty: TypeId) -> ObjId {
        let level = self.level();
        let param = self.alloc(Obj {
            name: par.to_string(),
            ty: par_ty,
            kind: ObjKind::Var { adr: 0, level },
        });
        let info = MethodInfo {
            adr: 0,
            n_pars: 1,
            has_var_arg: false,
            locals: vec![param],
        };
        self.bind(name, ty, ObjKind::Meth(info))
    }

    /// Nesting level of the innermost scope.
    pub fn level(&self) -> u32 {
        (self.scopes.len() - 1) as u32
    }

    /// Opens a scope nested in the current one.
    pub fn open_scope(&mut self) {
        let outer = self.scopes.len() - 1;
        self.scopes.push(Scope::new(Some(outer)));
        tracing::trace!(level = self.level(), "open scope");
    }

    /// Closes the innermost scope and hands back its bindings. The universe
    /// is never closed.
    pub fn close_scope(&mut self) -> Vec<ObjId> {
        if self.scopes.len() == 1 {
            return Vec::new();
        }
        let level = self.level();
        let locals = self.scopes.pop().map(Scope::into_locals).unwrap_or_default();
        tracing::trace!(level, bindings = locals.len(), "close scope");
        locals
    }

    /// The innermost scope.
    pub fn current_scope(&self) -> &Scope {
        self.top()
    }

    /// Declares `name` in the innermost scope.
    ///
    /// Variables get the next free slot of the scope and the current level.
    /// Fails with [`ErrorKind::DeclName`] if the scope already binds the
    /// name.
    pub fn insert(&mut self, kind: DeclKind, name: &str, ty: TypeId) -> Result<ObjId, ErrorKind> {
        if self.top().find_local(name).is_some() {
            return Err(ErrorKind::DeclName);
        }

        let kind = match kind {
            DeclKind::Con => ObjKind::Con { val: 0 },
            DeclKind::Var => ObjKind::Var {
                adr: self.top().n_vars(),
                level: self.level(),
            },
            DeclKind::Type => ObjKind::Type,
            DeclKind::Meth => ObjKind::Meth(MethodInfo::default()),
            DeclKind::Prog => ObjKind::Prog { locals: Vec::new() },
        };
        let id = self.bind(name, ty, kind);
        tracing::trace!(name, level = self.level(), "declared");
        Ok(id)
    }

    /// Searches the scope chain from the innermost scope outward.
    pub fn lookup(&self, name: &str) -> Option<ObjId> {
        let mut index = Some(self.scopes.len() - 1);
        while let Some(i) = index {
            let scope = &self.scopes[i];
            if let Some(id) = scope.find_local(name) {
                return Some(id);
            }
            index = scope.outer;
        }
        None
    }

    /// Like [`Tab::lookup`], failing with [`ErrorKind::NotFound`].
    pub fn find(&self, name: &str) -> Result<ObjId, ErrorKind> {
        self.lookup(name).ok_or(ErrorKind::NotFound)
    }

    /// Searches the fields of a class type.
    pub fn find_field(&self, name: &str, ty: TypeId) -> Result<ObjId, ErrorKind> {
        self.types
            .fields(ty)
            .iter()
            .copied()
            .find(|id| self.obj(*id).name == name)
            .ok_or(ErrorKind::NoField)
    }

    /// The entry behind an id.
    pub fn obj(&self, id: ObjId) -> &Obj {
        &self.objs[id.0 as usize]
    }

    /// Mutable access to an entry. The `$none` sentinel is never handed
    /// out, so failed declarations cannot corrupt it.
    pub fn obj_mut(&mut self, id: ObjId) -> Option<&mut Obj> {
        if id == ObjId::NONE {
            return None;
        }
        self.objs.get_mut(id.0 as usize)
    }

    /// The type arena.
    pub fn types(&self) -> &Types {
        &self.types
    }

    /// Mutable access to the type arena.
    pub fn types_mut(&mut self) -> &mut Types {
        &mut self.types
    }

    /// Identifies the predeclared methods.
    pub fn builtin(&self, id: ObjId) -> Option<Builtin> {
        match self.builtins.iter().position(|b| *b == id)? {
            0 => Some(Builtin::Chr),
            1 => Some(Builtin::Ord),
            _ => Some(Builtin::Len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universe() {
        let tab = Tab::new();
        assert_eq!(tab.level(), 0);

        let int = tab.find("int").unwrap();
        assert!(tab.obj(int).is_type());
        assert_eq!(tab.obj(int).ty, TypeId::INT);

        let null = tab.find("null").unwrap();
        assert_eq!(tab.obj(null).ty, TypeId::NULL);

        for name in ["chr", "ord", "len"] {
            let id = tab.find(name).unwrap();
            let info = tab.obj(id).method().unwrap();
            assert_eq!(info.n_pars, 1);
            assert!(tab.builtin(id).is_some());
        }
    }

    #[test]
    fn test_duplicate_in_same_scope() {
        let mut tab = Tab::new();
        tab.open_scope();
        tab.insert(DeclKind::Var, "x", TypeId::INT).unwrap();
        assert_eq!(
            tab.insert(DeclKind::Con, "x", TypeId::INT),
            Err(ErrorKind::DeclName)
        );
    }

    #[test]
    fn test_shadowing_in_inner_scope() {
        let mut tab = Tab::new();
        tab.open_scope();
        let outer = tab.insert(DeclKind::Var, "x", TypeId::INT).unwrap();
        tab.open_scope();
        let inner = tab.insert(DeclKind::Var, "x", TypeId::CHAR).unwrap();

        assert_eq!(tab.find("x"), Ok(inner));
        tab.close_scope();
        assert_eq!(tab.find("x"), Ok(outer));
    }

    #[test]
    fn test_universe_names_can_be_shadowed() {
        let mut tab = Tab::new();
        tab.open_scope();
        assert!(tab.insert(DeclKind::Var, "len", TypeId::INT).is_ok());
    }

    #[test]
    fn test_var_slots_and_levels() {
        let mut tab = Tab::new();
        tab.open_scope();
        let a = tab.insert(DeclKind::Var, "a", TypeId::INT).unwrap();
        tab.insert(DeclKind::Con, "k", TypeId::INT).unwrap();
        let b = tab.insert(DeclKind::Var, "b", TypeId::INT).unwrap();

        assert_eq!(tab.obj(a).kind, ObjKind::Var { adr: 0, level: 1 });
        assert_eq!(tab.obj(b).kind, ObjKind::Var { adr: 1, level: 1 });
        assert_eq!(tab.current_scope().n_vars(), 2);
        assert_eq!(tab.current_scope().locals().len(), 3);
    }

    #[test]
    fn test_close_scope_returns_bindings_in_order() {
        let mut tab = Tab::new();
        tab.open_scope();
        let a = tab.insert(DeclKind::Var, "a", TypeId::INT).unwrap();
        let b = tab.insert(DeclKind::Var, "b", TypeId::INT).unwrap();
        assert_eq!(tab.close_scope(), vec![a, b]);
        assert_eq!(tab.find("a"), Err(ErrorKind::NotFound));
    }

    #[test]
    fn test_universe_is_never_closed() {
        let mut tab = Tab::new();
        assert!(tab.close_scope().is_empty());
        assert!(tab.lookup("int").is_some());
    }

    #[test]
    fn test_find_field() {
        let mut tab = Tab::new();
        tab.open_scope();
        let class = tab.types_mut().new_class();
        tab.open_scope();
        let f = tab.insert(DeclKind::Var, "f", TypeId::INT).unwrap();
        let fields = tab.close_scope();
        tab.types_mut().set_fields(class, fields);

        assert_eq!(tab.find_field("f", class), Ok(f));
        assert_eq!(tab.find_field("g", class), Err(ErrorKind::NoField));
        assert_eq!(tab.find("f"), Err(ErrorKind::NotFound));
    }

    #[test]
    fn test_sentinel_is_read_only() {
        let mut tab = Tab::new();
        assert!(tab.obj_mut(ObjId::NONE).is_none());
        assert_eq!(tab.obj(ObjId::NONE).ty, TypeId::NONE);
    }
}
