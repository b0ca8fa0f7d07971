// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A single lexical scope.

use rustc_hash::FxHashMap;

use super::ObjId;

/// Name-unique bindings of one scope, in insertion order.
#[derive(Debug, Default)]
pub struct Scope {
    /// Index of the enclosing scope in the table's stack
    pub outer: Option<usize>,
    names: FxHashMap<String, ObjId>,
    locals: Vec<ObjId>,
    n_vars: usize,
}

impl Scope {
    /// Creates an empty scope nested in `outer`.
    pub fn new(outer: Option<usize>) -> Self {
        Self {
            outer,
            ..Default::default()
        }
    }

    /// Looks a name up in this scope only.
    pub fn find_local(&self, name: &str) -> Option<ObjId> {
        self.names.get(name).copied()
    }

    /// Binds a name. The caller has checked it is not yet bound here.
    pub fn insert(&mut self, name: &str, id: ObjId, is_var: bool) {
        self.names.insert(name.to_string(), id);
        self.locals.push(id);
        if is_var {
            self.n_vars += 1;
        }
    }

    /// Number of variables bound so far; also the next free slot.
    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    /// Bindings in declaration order.
    pub fn locals(&self) -> &[ObjId] {
        &self.locals
    }

    /// Consumes the scope, yielding its bindings in declaration order.
    pub fn into_locals(self) -> Vec<ObjId> {
        self.locals
    }
}
