// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Declarations: the program, constants, variables, classes and methods.

use super::Parser;
use crate::compiler::OpCode;
use crate::diagnostics::ErrorKind;
use crate::error::Result;
use crate::lexer::TokenKind;
use crate::symtab::{DeclKind, Obj, ObjId, ObjKind, PROGRAM_LEVEL, TypeId};

impl Parser<'_> {
    /// `"program" ident { ConstDecl | VarDecl | ClassDecl } "{" { MethodDecl } "}"`
    pub(super) fn parse_program(&mut self) -> Result<()> {
        self.expect(TokenKind::Program);
        let name = self.ident();
        let program = self.declare(DeclKind::Prog, &name, TypeId::NONE);
        self.tab.open_scope();

        loop {
            match self.current.kind {
                TokenKind::Final => self.parse_const_decl(),
                TokenKind::Class => self.parse_class_decl(),
                TokenKind::Ident => self.parse_var_decl(),
                TokenKind::LeftBrace | TokenKind::Eof => break,
                _ => self.recover_decl(),
            }
        }
        if self.tab.current_scope().locals().len() > self.options.max_globals {
            self.error(ErrorKind::TooManyGlobals);
        }

        self.expect(TokenKind::LeftBrace);
        loop {
            match self.current.kind {
                TokenKind::Ident | TokenKind::Void => self.parse_method_decl()?,
                TokenKind::RightBrace | TokenKind::Eof => break,
                _ => self.recover_method_decl(),
            }
        }
        if self.code.main_pc.is_none() {
            let entry = self.options.entry_point.clone();
            self.error_with(ErrorKind::MethNotFound, entry);
        }
        self.expect(TokenKind::RightBrace);

        let locals = self.tab.close_scope();
        if let Some(obj) = self.tab.obj_mut(program) {
            obj.kind = ObjKind::Prog { locals };
        }
        Ok(())
    }

    /// `"final" Type ident "=" ( number | charConst ) ";"`
    fn parse_const_decl(&mut self) {
        self.advance();
        let ty = self.parse_type();
        let name = self.ident();
        let id = self.declare(DeclKind::Con, &name, ty);
        self.expect(TokenKind::Assign);

        let literal = match self.current.kind {
            TokenKind::Number => Some(TypeId::INT),
            TokenKind::CharConst => Some(TypeId::CHAR),
            _ => None,
        };
        match literal {
            Some(literal_ty) => {
                if literal_ty != ty {
                    self.error(ErrorKind::ConstType);
                }
                self.advance();
                let val = self.previous.value();
                if let Some(obj) = self.tab.obj_mut(id) {
                    obj.kind = ObjKind::Con { val };
                }
            }
            None => self.error(ErrorKind::ConstDecl),
        }
        self.expect(TokenKind::Semicolon);
    }

    /// `Type ident { "," ident } ";"`
    pub(super) fn parse_var_decl(&mut self) {
        let ty = self.parse_type();
        loop {
            let name = self.ident();
            let id = self.declare(DeclKind::Var, &name, ty);
            if id != ObjId::NONE && self.tab.level() == PROGRAM_LEVEL {
                self.code.data_size += 1;
            }
            if !self.check(TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        self.expect(TokenKind::Semicolon);
    }

    /// `"class" ident "{" { VarDecl } "}"`
    fn parse_class_decl(&mut self) {
        self.advance();
        let name = self.ident();
        let class = self.tab.types_mut().new_class();
        self.declare(DeclKind::Type, &name, class);

        self.expect(TokenKind::LeftBrace);
        self.tab.open_scope();
        while self.check(TokenKind::Ident) {
            self.parse_var_decl();
        }
        if self.tab.current_scope().n_vars() > self.options.max_fields {
            self.error(ErrorKind::TooManyFields);
        }
        let fields = self.tab.close_scope();
        self.tab.types_mut().set_fields(class, fields);
        self.expect(TokenKind::RightBrace);
    }

    /// `( Type | "void" ) ident "(" [ FormPars ] ")" { VarDecl } Block`
    fn parse_method_decl(&mut self) -> Result<()> {
        let ty = if self.check(TokenKind::Void) {
            self.advance();
            TypeId::NONE
        } else {
            self.parse_type()
        };
        let name = self.ident();
        let meth = self.declare(DeclKind::Meth, &name, ty);
        self.return_type = ty;
        self.tab.open_scope();

        self.expect(TokenKind::LeftParen);
        let has_var_arg = self.check(TokenKind::Ident) && self.parse_form_pars();
        self.expect(TokenKind::RightParen);

        // published before the body so recursive calls can be checked
        let n_pars = self.tab.current_scope().n_vars();
        let params = self.tab.current_scope().locals().to_vec();
        if let Some(info) = self.tab.obj_mut(meth).and_then(Obj::method_mut) {
            info.n_pars = n_pars;
            info.has_var_arg = has_var_arg;
            info.locals = params;
        }

        let is_entry = meth != ObjId::NONE && name == self.options.entry_point;
        if is_entry {
            if n_pars > 0 {
                self.error(ErrorKind::MainWithParams);
            }
            if ty != TypeId::NONE {
                self.error(ErrorKind::MainNotVoid);
            }
        }

        while self.check(TokenKind::Ident) {
            self.parse_var_decl();
        }
        let n_vars = self.tab.current_scope().n_vars();
        if n_vars > self.options.max_locals {
            self.error(ErrorKind::TooManyLocals);
        }

        let adr = self.code.pc();
        if let Some(info) = self.tab.obj_mut(meth).and_then(Obj::method_mut) {
            info.adr = adr;
        }
        if is_entry {
            self.code.main_pc = Some(adr);
        }
        tracing::debug!(method = %name, adr, n_pars, n_vars, "method");
        self.code.enter(n_pars, n_vars);

        self.parse_block(None)?;

        if ty == TypeId::NONE {
            self.code.emit(OpCode::Exit);
            self.code.emit(OpCode::Return);
        } else {
            // falling off the end of a value method
            self.code.emit(OpCode::Trap);
            self.code.put(1);
        }

        let locals = self.tab.close_scope();
        if let Some(info) = self.tab.obj_mut(meth).and_then(Obj::method_mut) {
            info.locals = locals;
        }
        self.return_type = TypeId::NONE;
        Ok(())
    }

    /// `Type ident { "," Type ident } [ "..." ]`
    ///
    /// Returns true if the parameter list ends in `...`, in which case the
    /// last parameter becomes an array of its declared type.
    fn parse_form_pars(&mut self) -> bool {
        loop {
            let ty = self.parse_type();
            let name = self.ident();
            let id = self.declare(DeclKind::Var, &name, ty);

            if self.check(TokenKind::PPPeriod) {
                self.advance();
                let array = self.tab.types_mut().array_of(ty);
                if let Some(obj) = self.tab.obj_mut(id) {
                    obj.ty = array;
                }
                return true;
            }
            if !self.check(TokenKind::Comma) {
                return false;
            }
            self.advance();
        }
    }

    /// `ident [ "[" "]" ]`
    fn parse_type(&mut self) -> TypeId {
        let name = self.ident();
        let id = self.find(&name);
        let obj = self.tab.obj(id);
        let mut ty = obj.ty;
        if !obj.is_type() {
            if id != ObjId::NONE {
                self.error(ErrorKind::NoType);
            }
            ty = TypeId::NONE;
        }

        if self.check(TokenKind::LeftBracket) {
            self.advance();
            self.expect(TokenKind::RightBracket);
            ty = self.tab.types_mut().array_of(ty);
        }
        ty
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CompilerOptions;
    use crate::diagnostics::{Diagnostic, ErrorKind};
    use crate::parser::Parser;
    use mj_macros::{assert_clean, assert_reports};

    struct Outcome {
        diagnostics: Vec<Diagnostic>,
        data_size: usize,
        main_pc: Option<usize>,
    }

    fn compile(source: &str) -> Outcome {
        compile_with(source, &CompilerOptions::default())
    }

    fn compile_with(source: &str, options: &CompilerOptions) -> Outcome {
        let (object, diagnostics) = Parser::new(source, options).parse().unwrap();
        Outcome {
            diagnostics,
            data_size: object.data_size,
            main_pc: object.main_pc,
        }
    }

    #[test]
    fn test_globals_count_towards_data_size() {
        let c = compile(
            "program P final int k = 3; int a, b; class C { int f; } C c;
             { void main() int l; { } }",
        );
        assert_clean!(c);
        assert_eq!(c.data_size, 3);
        assert_eq!(c.main_pc, Some(0));
    }

    #[test]
    fn test_const_type_mismatch() {
        let c = compile("program P final int k = 'a'; { void main() { } }");
        assert_reports!(c, ErrorKind::ConstType);
    }

    #[test]
    fn test_const_without_literal() {
        let c = compile("program P final int k = k; { void main() { } }");
        assert_reports!(c, ErrorKind::ConstDecl);
    }

    #[test]
    fn test_duplicate_global() {
        let c = compile("program P int x; char x; { void main() { } }");
        assert_reports!(c, ErrorKind::DeclName);
    }

    #[test]
    fn test_main_with_params() {
        let c = compile("program P { void main(int a) { } }");
        assert_reports!(c, ErrorKind::MainWithParams);
        assert_eq!(c.main_pc, Some(0));
    }

    #[test]
    fn test_main_not_void() {
        let c = compile("program P { int main() { return 0; } }");
        assert_reports!(c, ErrorKind::MainNotVoid);
    }

    #[test]
    fn test_missing_main() {
        let c = compile("program P { void helper() { } }");
        assert_reports!(c, ErrorKind::MethNotFound);
        assert_eq!(c.diagnostics[0].message(), "method main not found");
        assert_eq!(c.main_pc, None);
    }

    #[test]
    fn test_custom_entry_point() {
        let options = CompilerOptions {
            entry_point: "start".to_string(),
            ..Default::default()
        };
        let c = compile_with("program P { void helper() { } void start() { } }", &options);
        assert_clean!(c);
        assert_eq!(c.main_pc, Some(5));
    }

    #[test]
    fn test_too_many_locals() {
        let options = CompilerOptions {
            max_locals: 2,
            ..Default::default()
        };
        let c = compile_with("program P { void main() int a, b, c; { } }", &options);
        assert_reports!(c, ErrorKind::TooManyLocals);
    }

    #[test]
    fn test_too_many_fields() {
        let options = CompilerOptions {
            max_fields: 1,
            ..Default::default()
        };
        let c = compile_with("program P class C { int a; int b; } { void main() { } }", &options);
        assert_reports!(c, ErrorKind::TooManyFields);
    }

    #[test]
    fn test_too_many_globals() {
        let options = CompilerOptions {
            max_globals: 1,
            ..Default::default()
        };
        let c = compile_with("program P int a, b; { void main() { } }", &options);
        assert_reports!(c, ErrorKind::TooManyGlobals);
    }

    #[test]
    fn test_locals_at_limit() {
        let options = CompilerOptions {
            max_locals: 3,
            ..Default::default()
        };
        let c = compile_with("program P { void f(int p) int a, b; { } void main() { } }", &options);
        assert_clean!(c);
    }

    #[test]
    fn test_fields_at_limit() {
        let options = CompilerOptions {
            max_fields: 2,
            ..Default::default()
        };
        let c = compile_with("program P class C { int a; char b; } { void main() { } }", &options);
        assert_clean!(c);
    }

    #[test]
    fn test_globals_at_limit() {
        // constants and classes count as program-level declarations
        let options = CompilerOptions {
            max_globals: 4,
            ..Default::default()
        };
        let c = compile_with(
            "program P final int k = 1; class C { } int a, b; { void main() { } }",
            &options,
        );
        assert_clean!(c);
        assert_eq!(c.data_size, 2);
    }

    #[test]
    fn test_unknown_type() {
        let c = compile("program P T x; { void main() { } }");
        assert_reports!(c, ErrorKind::NotFound);
        assert_eq!(c.diagnostics[0].message(), "T not found");
    }

    #[test]
    fn test_non_type_used_as_type() {
        let c = compile("program P int a; a b; { void main() { } }");
        assert_reports!(c, ErrorKind::NoType);
    }

    #[test]
    fn test_invalid_declaration_recovers() {
        let c = compile("program P int a; 42 + ; int b; { void main() { b = a; } }");
        assert_eq!(c.diagnostics.len(), 1);
        assert_reports!(c, ErrorKind::InvalidDecl);
    }

    #[test]
    fn test_invalid_method_start_recovers() {
        let c = compile("program P { 5 void main() { } }");
        assert_reports!(c, ErrorKind::MethDecl);
        assert_eq!(c.diagnostics.len(), 1);
        assert!(c.main_pc.is_some());
    }
}
