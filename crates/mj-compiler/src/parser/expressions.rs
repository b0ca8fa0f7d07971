// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Designators, expressions, method calls and conditions.

use super::Parser;
use super::recovery::FIRST_EXPR;
use crate::compiler::{CompOp, Cond, LabelId, OpCode, Operand, OperandKind};
use crate::diagnostics::ErrorKind;
use crate::error::Result;
use crate::lexer::TokenKind;
use crate::symtab::{Builtin, MethodInfo, ObjId, TypeId};

impl Parser<'_> {
    // ========================================================================
    // Designators
    // ========================================================================

    /// `ident { "." ident | "[" Expr "]" }`
    ///
    /// Every step but the last loads its base, so the result is the
    /// location of the final field or element.
    pub(super) fn parse_designator(&mut self) -> Result<Operand> {
        let name = self.ident();
        let id = self.find(&name);
        let mut x = match Operand::from_obj(&self.tab, id) {
            Ok(x) => x,
            Err(err) => {
                self.error(err);
                Operand::stack(TypeId::NONE)
            }
        };

        loop {
            match self.current.kind {
                TokenKind::Period => {
                    self.advance();
                    if !self.tab.types().is_class(x.ty) {
                        self.error(ErrorKind::NoClass);
                        let _ = self.ident();
                        x = Operand::stack(TypeId::NONE);
                        continue;
                    }
                    self.load(&mut x);
                    let field = self.ident();
                    let fid = self.find_field(&field, x.ty);
                    x = if fid == ObjId::NONE {
                        Operand::stack(TypeId::NONE)
                    } else {
                        let obj = self.tab.obj(fid);
                        Operand {
                            kind: OperandKind::Fld { adr: obj.adr() },
                            ty: obj.ty,
                        }
                    };
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let is_array = self.tab.types().is_array(x.ty);
                    if is_array {
                        self.load(&mut x);
                    } else {
                        self.error(ErrorKind::NoArray);
                    }

                    let mut index = self.parse_expr()?;
                    if index.ty != TypeId::INT {
                        self.error(ErrorKind::ArrayIndex);
                    }
                    self.load(&mut index);
                    self.expect(TokenKind::RightBracket);

                    x = if is_array {
                        Operand {
                            kind: OperandKind::Elem,
                            ty: self.tab.types().elem_type(x.ty),
                        }
                    } else {
                        Operand::stack(TypeId::NONE)
                    };
                }
                _ => return Ok(x),
            }
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// `[ "-" ] Term { Addop Term }`
    pub(super) fn parse_expr(&mut self) -> Result<Operand> {
        let negate = self.check(TokenKind::Minus);
        if negate {
            self.advance();
        }

        let mut x = self.parse_term()?;
        if negate {
            if x.ty != TypeId::INT {
                self.error(ErrorKind::NoIntOp);
            } else if let Some(val) = x.const_value() {
                x = Operand::con(val.wrapping_neg(), TypeId::INT);
            } else {
                self.load(&mut x);
                self.code.emit(OpCode::Neg);
            }
        }

        while matches!(self.current.kind, TokenKind::Plus | TokenKind::Minus) {
            let op = self.parse_addop();
            self.load(&mut x);
            let mut y = self.parse_term()?;
            self.load(&mut y);
            if x.ty != TypeId::INT || y.ty != TypeId::INT {
                self.error(ErrorKind::NoIntOp);
            }
            self.code.emit(op);
            x = Operand::stack(TypeId::INT);
        }
        Ok(x)
    }

    /// `Factor { Mulop Factor }`
    fn parse_term(&mut self) -> Result<Operand> {
        let mut x = self.parse_factor()?;
        while matches!(
            self.current.kind,
            TokenKind::Times | TokenKind::Slash | TokenKind::Rem
        ) {
            let op = self.parse_mulop();
            self.load(&mut x);
            let mut y = self.parse_factor()?;
            self.load(&mut y);
            if x.ty != TypeId::INT || y.ty != TypeId::INT {
                self.error(ErrorKind::NoIntOp);
            }
            self.code.emit(op);
            x = Operand::stack(TypeId::INT);
        }
        Ok(x)
    }

    fn parse_addop(&mut self) -> OpCode {
        let op = match self.current.kind {
            TokenKind::Plus => OpCode::Add,
            TokenKind::Minus => OpCode::Sub,
            _ => {
                self.error(ErrorKind::AddOp);
                return OpCode::Nop;
            }
        };
        self.advance();
        op
    }

    fn parse_mulop(&mut self) -> OpCode {
        let op = match self.current.kind {
            TokenKind::Times => OpCode::Mul,
            TokenKind::Slash => OpCode::Div,
            TokenKind::Rem => OpCode::Rem,
            _ => {
                self.error(ErrorKind::MulOp);
                return OpCode::Nop;
            }
        };
        self.advance();
        op
    }

    /// The arithmetic operator of a compound assignment, `None` for `=`.
    pub(super) fn parse_assignop(&mut self) -> Option<OpCode> {
        let op = match self.current.kind {
            TokenKind::Assign => None,
            TokenKind::PlusAssign => Some(OpCode::Add),
            TokenKind::MinusAssign => Some(OpCode::Sub),
            TokenKind::TimesAssign => Some(OpCode::Mul),
            TokenKind::SlashAssign => Some(OpCode::Div),
            TokenKind::RemAssign => Some(OpCode::Rem),
            _ => {
                self.error(ErrorKind::AssignOp);
                return None;
            }
        };
        self.advance();
        op
    }

    /// ```text
    /// Designator [ ActPars ] | number | charConst
    ///   | "new" ident [ "[" Expr "]" ] | "(" Expr ")"
    /// ```
    fn parse_factor(&mut self) -> Result<Operand> {
        match self.current.kind {
            TokenKind::Ident => {
                let x = self.parse_designator()?;
                if !self.check(TokenKind::LeftParen) {
                    return Ok(x);
                }
                if matches!(x.kind, OperandKind::Meth { .. }) && x.ty == TypeId::NONE {
                    self.error(ErrorKind::InvalidCall);
                }
                self.parse_act_pars(x)
            }
            TokenKind::Number => {
                self.advance();
                Ok(Operand::con(self.previous.value(), TypeId::INT))
            }
            TokenKind::CharConst => {
                self.advance();
                Ok(Operand::con(self.previous.value(), TypeId::CHAR))
            }
            TokenKind::New => self.parse_new(),
            TokenKind::LeftParen => {
                self.advance();
                let x = self.parse_expr()?;
                self.expect(TokenKind::RightParen);
                Ok(x)
            }
            _ => {
                self.error(ErrorKind::InvalidFact);
                Ok(Operand::stack(TypeId::NONE))
            }
        }
    }

    /// `"new" ident [ "[" Expr "]" ]`
    fn parse_new(&mut self) -> Result<Operand> {
        self.advance();
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
            let mut size = self.parse_expr()?;
            if size.ty != TypeId::INT {
                self.error(ErrorKind::ArraySize);
            }
            self.load(&mut size);
            self.expect(TokenKind::RightBracket);

            self.code.create_array(None, ty);
            let array = self.tab.types_mut().array_of(ty);
            return Ok(Operand::stack(array));
        }

        if self.tab.types().is_class(ty) {
            let n_fields = self.tab.types().fields(ty).len();
            self.code.new_object(n_fields);
        } else if ty != TypeId::NONE {
            self.error(ErrorKind::NoClassType);
        }
        Ok(Operand::stack(ty))
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// `"(" [ Expr { "," Expr } ] [ VarArgs ] ")"`
    ///
    /// Checks the arguments against the callee and emits the call. The
    /// result is the method's return value on the stack.
    pub(super) fn parse_act_pars(&mut self, x: Operand) -> Result<Operand> {
        let callee = match x.kind {
            OperandKind::Meth { obj } => self.tab.obj(obj).method().cloned().map(|m| (obj, m)),
            _ => None,
        };
        if callee.is_none() {
            self.error(ErrorKind::NoMeth);
        }
        self.expect(TokenKind::LeftParen);

        let info = callee.as_ref().map(|(_, info)| info);
        let param_types: Vec<TypeId> = info
            .map(|info| info.params().iter().map(|p| self.tab.obj(*p).ty).collect())
            .unwrap_or_default();
        let fixed = info.map_or(0, MethodInfo::fixed_pars);
        let vararg_elem = info
            .filter(|info| info.has_var_arg)
            .and_then(|_| param_types.last())
            .map(|ty| self.tab.types().elem_type(*ty));

        let mut count = 0;
        if FIRST_EXPR.contains(self.current.kind) {
            loop {
                let mut arg = self.parse_expr()?;
                let expected = param_types.get(count).filter(|_| count < fixed);
                if expected.is_some_and(|ty| !self.assignable(&arg, *ty)) {
                    self.error(ErrorKind::ParamType);
                }
                self.load(&mut arg);
                count += 1;
                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }
        if callee.is_some() {
            if count < fixed {
                self.error(ErrorKind::LessActualParams);
            } else if count > fixed {
                self.error(ErrorKind::MoreActualParams);
            }
        }

        if self.check(TokenKind::Hash) {
            if callee.is_some() && vararg_elem.is_none() {
                self.error(ErrorKind::InvalidVarargCall);
            }
            self.parse_var_args(vararg_elem)?;
        } else if let Some(elem) = vararg_elem {
            self.code.create_array(Some(0), elem);
        }
        self.expect(TokenKind::RightParen);

        let Some((obj, info)) = callee else {
            return Ok(Operand::stack(TypeId::NONE));
        };
        match self.tab.builtin(obj) {
            Some(Builtin::Len) => self.code.emit(OpCode::ArrayLength),
            Some(Builtin::Chr | Builtin::Ord) => {}
            None => self.code.call(info.adr)?,
        }
        Ok(Operand::stack(x.ty))
    }

    /// `"#" number [ Expr { "," Expr } ]`
    ///
    /// With an element type, packs the arguments into a fresh array; without
    /// one the arguments are only checked for syntax.
    fn parse_var_args(&mut self, elem: Option<TypeId>) -> Result<()> {
        self.advance();
        let announced = if self.check(TokenKind::Number) {
            self.advance();
            usize::try_from(self.previous.value()).unwrap_or(0)
        } else {
            self.expect(TokenKind::Number);
            0
        };
        if let Some(elem) = elem {
            self.code.create_array(Some(announced as i32), elem);
        }

        let mut count = 0;
        if FIRST_EXPR.contains(self.current.kind) {
            loop {
                if elem.is_some() {
                    self.code.emit(OpCode::Dup);
                    self.code.load_const(count as i32);
                }
                let mut arg = self.parse_expr()?;
                if let Some(elem) = elem {
                    if !self.assignable(&arg, elem) {
                        self.error(ErrorKind::ParamType);
                    }
                    self.load(&mut arg);
                    self.code.store_in_array(elem);
                }
                count += 1;
                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }

        if elem.is_some() {
            if count < announced {
                self.error(ErrorKind::LessActualVarargs);
            } else if count > announced {
                self.error(ErrorKind::MoreActualVarargs);
            }
        }
        Ok(())
    }

    // ========================================================================
    // Conditions
    // ========================================================================

    /// `CondTerm { "||" CondTerm }`
    ///
    /// All terms share one true label. A term that fails falls through to
    /// the next one; only the last term's false label is left for the
    /// caller to define.
    pub(super) fn parse_condition(&mut self) -> Result<Cond> {
        let t_label = self.code.new_label();
        let mut x = self.parse_cond_term(t_label)?;
        while self.check(TokenKind::Or) {
            self.advance();
            self.code.t_jump(&x)?;
            self.code.define_label(x.f_label)?;
            x = self.parse_cond_term(t_label)?;
        }
        Ok(x)
    }

    /// `CondFact { "&&" CondFact }`
    fn parse_cond_term(&mut self, t_label: LabelId) -> Result<Cond> {
        let f_label = self.code.new_label();
        let mut x = self.parse_cond_fact(t_label, f_label)?;
        while self.check(TokenKind::And) {
            self.advance();
            self.code.f_jump(&x)?;
            x = self.parse_cond_fact(t_label, f_label)?;
        }
        Ok(x)
    }

    /// `Expr Relop Expr`
    fn parse_cond_fact(&mut self, t_label: LabelId, f_label: LabelId) -> Result<Cond> {
        let mut x = self.parse_expr()?;
        self.load(&mut x);
        let op = self.parse_relop();
        let mut y = self.parse_expr()?;
        self.load(&mut y);

        let compatible = self.tab.types().compatible_with(x.ty, y.ty);
        let is_ref = self.tab.types().is_ref_type(x.ty);
        if !compatible {
            self.error(ErrorKind::IncompTypes);
        } else if is_ref && !matches!(op, Some(CompOp::Eq | CompOp::Ne)) {
            self.error(ErrorKind::EqCheck);
        }

        Ok(Cond {
            op: op.unwrap_or(CompOp::Eq),
            t_label,
            f_label,
        })
    }

    fn parse_relop(&mut self) -> Option<CompOp> {
        let op = match self.current.kind {
            TokenKind::Eql => CompOp::Eq,
            TokenKind::Neq => CompOp::Ne,
            TokenKind::Lss => CompOp::Lt,
            TokenKind::Leq => CompOp::Le,
            TokenKind::Gtr => CompOp::Gt,
            TokenKind::Geq => CompOp::Ge,
            _ => {
                self.error(ErrorKind::RelOp);
                return None;
            }
        };
        self.advance();
        Some(op)
    }
}

#[cfg(test)]
mod tests {
    use crate::compiler::{OpCode, decode};
    use crate::config::CompilerOptions;
    use crate::diagnostics::{Diagnostic, ErrorKind};
    use crate::parser::Parser;
    use mj_macros::{assert_clean, assert_reports};

    struct Outcome {
        code: Vec<u8>,
        diagnostics: Vec<Diagnostic>,
    }

    fn compile(source: &str) -> Outcome {
        let options = CompilerOptions::default();
        let (object, diagnostics) = Parser::new(source, &options).parse().unwrap();
        Outcome {
            code: object.code,
            diagnostics,
        }
    }

    fn opcodes(code: &[u8]) -> Vec<OpCode> {
        decode(code)
            .unwrap()
            .into_iter()
            .map(|instr| instr.opcode)
            .collect()
    }

    /// `void main()` with locals `int i; char c; int[] a;` wrapped around
    /// `body`, after the given global declarations and methods.
    fn program(globals: &str, methods: &str, body: &str) -> Outcome {
        compile(&format!(
            "program P {globals} {{ {methods} void main() int i; char c; int[] a; {{ {body} }} }}"
        ))
    }

    #[test]
    fn test_unary_minus_folds_constants() {
        let c = program("", "", "i = -5;");
        assert_clean!(c);
        assert_eq!(&c.code[3..9], &[22, 255, 255, 255, 251, 7]);
    }

    #[test]
    fn test_unary_minus_on_variable_negates() {
        let c = program("", "", "i = -i + 1;");
        assert_clean!(c);
        assert_eq!(
            opcodes(&c.code[3..]),
            vec![
                OpCode::Load0,
                OpCode::Neg,
                OpCode::Const1,
                OpCode::Add,
                OpCode::Store0,
                OpCode::Exit,
                OpCode::Return,
            ]
        );
    }

    #[test]
    fn test_arithmetic_needs_ints() {
        let c = program("", "", "i = c * 2;");
        assert_reports!(c, ErrorKind::NoIntOp);
    }

    #[test]
    fn test_index_and_field_checks() {
        let c = program("", "", "i = i[0];");
        assert_reports!(c, ErrorKind::NoArray);

        let c = program("", "", "i = a['x'];");
        assert_reports!(c, ErrorKind::ArrayIndex);

        let c = program("", "", "i = i.f;");
        assert_reports!(c, ErrorKind::NoClass);

        let c = program("class C { int f; } C o;", "", "i = o.g;");
        assert_reports!(c, ErrorKind::NoField);
    }

    #[test]
    fn test_new_array_and_object() {
        let c = program("class C { int f; char g; }", "", "a = new int[i]; c = new C;");
        assert_reports!(c, ErrorKind::IncompTypes);

        let c = program("class C { int f; char g; } C o;", "", "a = new int[3]; o = new C;");
        assert_clean!(c);
        assert_eq!(
            opcodes(&c.code[3..]),
            vec![
                OpCode::Const3,
                OpCode::NewArray,
                OpCode::Store2,
                OpCode::New,
                OpCode::PutStatic,
                OpCode::Exit,
                OpCode::Return,
            ]
        );
    }

    #[test]
    fn test_new_errors() {
        let c = program("", "", "a = new int['x'];");
        assert_reports!(c, ErrorKind::ArraySize);

        let c = program("", "", "i = new int;");
        assert_reports!(c, ErrorKind::NoClassType);

        let c = program("", "", "a = new i[2];");
        assert_reports!(c, ErrorKind::NoType);
    }

    #[test]
    fn test_builtins_compile_inline() {
        let c = program("", "", "i = len(a); c = chr(65); i = ord(c);");
        assert_clean!(c);
        assert_eq!(
            opcodes(&c.code[3..]),
            vec![
                OpCode::Load2,
                OpCode::ArrayLength,
                OpCode::Store0,
                OpCode::Const,
                OpCode::Store1,
                OpCode::Load1,
                OpCode::Store0,
                OpCode::Exit,
                OpCode::Return,
            ]
        );
    }

    #[test]
    fn test_call_checks() {
        let c = program("", "int f(int x, char y) { return x; }", "i = f(1);");
        assert_reports!(c, ErrorKind::LessActualParams);

        let c = program("", "int f(int x) { return x; }", "i = f(1, 2);");
        assert_reports!(c, ErrorKind::MoreActualParams);

        let c = program("", "int f(int x) { return x; }", "i = f(a);");
        assert_reports!(c, ErrorKind::ParamType);

        let c = program("", "void f() { }", "i = f();");
        assert_reports!(c, ErrorKind::InvalidCall);

        let c = program("", "", "i = i(1);");
        assert_reports!(c, ErrorKind::NoMeth);
    }

    #[test]
    fn test_recursive_call_checks_parameters() {
        let c = compile("program P { int f(int n) { return f(n - 1); } void main() { } }");
        assert_clean!(c);
        // enter, load_0, const_1, sub, call back to 0
        assert_eq!(&c.code[..9], &[51, 1, 1, 2, 16, 24, 49, 255, 247]);
    }

    #[test]
    fn test_varargs_are_packed() {
        let c = program("", "void f(int x, int ys...) { }", "f(1 # 2 i, 7);");
        assert_clean!(c);
        let main = &c.code[5..];
        assert_eq!(
            opcodes(main),
            vec![
                OpCode::Enter,
                OpCode::Const1,
                OpCode::Const2,
                OpCode::NewArray,
                OpCode::Dup,
                OpCode::Const0,
                OpCode::Load0,
                OpCode::AStore,
                OpCode::Dup,
                OpCode::Const1,
                OpCode::Const,
                OpCode::AStore,
                OpCode::Call,
                OpCode::Exit,
                OpCode::Return,
            ]
        );
    }

    #[test]
    fn test_omitted_vararg_marker_packs_empty_array() {
        let c = program("", "void f(char cs...) { }", "f();");
        assert_clean!(c);
        let main = &c.code[5..];
        assert_eq!(
            opcodes(main),
            vec![
                OpCode::Enter,
                OpCode::Const0,
                OpCode::NewArray,
                OpCode::Call,
                OpCode::Exit,
                OpCode::Return,
            ]
        );
        // char elements
        assert_eq!(main[5], 0);
    }

    #[test]
    fn test_vararg_count_mismatch() {
        let c = program("", "void f(int xs...) { }", "f(# 2 1);");
        assert_reports!(c, ErrorKind::LessActualVarargs);

        let c = program("", "void f(int xs...) { }", "f(# 1 1, 2);");
        assert_reports!(c, ErrorKind::MoreActualVarargs);
    }

    #[test]
    fn test_vararg_marker_on_fixed_method() {
        let c = program("", "void f(int x) { }", "f(1 # 1 2);");
        assert_reports!(c, ErrorKind::InvalidVarargCall);
    }

    #[test]
    fn test_condition_checks() {
        let c = program("class A { int f; } class B { int f; } A x; B y;", "", "if (x == y) ;");
        assert_reports!(c, ErrorKind::IncompTypes);

        let c = program("class A { int f; } A x;", "", "if (x < null) ;");
        assert_reports!(c, ErrorKind::EqCheck);

        let c = program("class A { int f; } A x;", "", "if (x != null) ;");
        assert_clean!(c);

        let c = program("", "", "if (i) ;");
        assert_reports!(c, ErrorKind::RelOp);
    }

    #[test]
    fn test_short_circuit_condition() {
        let c = program("", "", "if (i < 1 || i > 5 && i != 9) i = 0;");
        assert_clean!(c);
        let body = &c.code[3..c.code.len() - 2];
        let listing = decode(body).unwrap();
        let ops: Vec<_> = listing.iter().map(|instr| instr.opcode).collect();
        assert_eq!(
            ops,
            vec![
                OpCode::Load0,
                OpCode::Const1,
                OpCode::Jlt,
                OpCode::Load0,
                OpCode::Const5,
                OpCode::Jle,
                OpCode::Load0,
                OpCode::Const,
                OpCode::Jeq,
                OpCode::Const0,
                OpCode::Store0,
            ]
        );
        // `||` jumps into the then-branch, both false exits skip it
        let then = listing[9].offset;
        let end = body.len();
        assert_eq!(listing[2].target(), Some(then));
        assert_eq!(listing[5].target(), Some(end));
        assert_eq!(listing[8].target(), Some(end));
    }
}
