// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Blocks and statements.
//!
//! `break` targets are threaded through as an optional label: `None`
//! outside of loops, the exit label of the innermost `while` inside one.

use super::Parser;
use super::recovery::{ASSIGN_OPS, FIRST_EXPR};
use crate::compiler::{LabelId, OpCode, OperandKind};
use crate::diagnostics::ErrorKind;
use crate::error::Result;
use crate::lexer::TokenKind;
use crate::symtab::TypeId;

impl Parser<'_> {
    /// `"{" { Statement } "}"`
    pub(super) fn parse_block(&mut self, exit: Option<LabelId>) -> Result<()> {
        self.expect(TokenKind::LeftBrace);
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            self.parse_statement(exit)?;
        }
        self.expect(TokenKind::RightBrace);
        Ok(())
    }

    fn parse_statement(&mut self, exit: Option<LabelId>) -> Result<()> {
        match self.current.kind {
            TokenKind::Ident => self.parse_designator_statement()?,
            TokenKind::If => self.parse_if(exit)?,
            TokenKind::While => self.parse_while()?,
            TokenKind::Break => {
                self.advance();
                match exit {
                    Some(label) => self.code.jump(label)?,
                    None => self.error(ErrorKind::NoLoop),
                }
                self.expect(TokenKind::Semicolon);
            }
            TokenKind::Return => self.parse_return()?,
            TokenKind::Read => self.parse_read()?,
            TokenKind::Print => self.parse_print()?,
            TokenKind::LeftBrace => self.parse_block(exit)?,
            TokenKind::Semicolon => self.advance(),
            _ => self.recover_stat(),
        }
        Ok(())
    }

    /// `Designator ( Assignop Expr | ActPars | "++" | "--" ) ";"`
    fn parse_designator_statement(&mut self) -> Result<()> {
        let x = self.parse_designator()?;

        match self.current.kind {
            kind if ASSIGN_OPS.contains(kind) => {
                let op = self.parse_assignop();
                if op.is_some() {
                    if !x.is_assignable() {
                        self.error(ErrorKind::NoVar);
                    } else if let Err(err) = self.code.load_for_compound(&x) {
                        self.error(err);
                    }
                }

                let mut y = self.parse_expr()?;
                if op.is_some() && (x.ty != TypeId::INT || y.ty != TypeId::INT) {
                    self.error(ErrorKind::NoIntOp);
                }
                if self.assignable(&y, x.ty) {
                    if let Err(err) = self.code.assign(&x, &mut y, op) {
                        self.error(err);
                    }
                } else {
                    self.error(ErrorKind::IncompTypes);
                }
            }
            TokenKind::LeftParen => {
                let result = self.parse_act_pars(x)?;
                if result.ty != TypeId::NONE {
                    self.code.emit(OpCode::Pop);
                }
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let delta = if self.check(TokenKind::PlusPlus) { 1 } else { -1 };
                self.advance();
                if x.ty != TypeId::INT {
                    self.error(ErrorKind::NoInt);
                } else if let OperandKind::Local { adr } = x.kind {
                    self.code.inc_local(adr, delta);
                } else if let Err(err) = self.code.inc_field_or_elem(&x, delta) {
                    self.error(err);
                }
            }
            _ => self.error(ErrorKind::DesignFollow),
        }

        self.expect(TokenKind::Semicolon);
        Ok(())
    }

    /// `"if" "(" Condition ")" Statement [ "else" Statement ]`
    fn parse_if(&mut self, exit: Option<LabelId>) -> Result<()> {
        self.advance();
        self.expect(TokenKind::LeftParen);
        let cond = self.parse_condition()?;
        self.expect(TokenKind::RightParen);

        self.code.f_jump(&cond)?;
        self.code.define_label(cond.t_label)?;
        self.parse_statement(exit)?;

        if self.check(TokenKind::Else) {
            self.advance();
            let end = self.code.new_label();
            self.code.jump(end)?;
            self.code.define_label(cond.f_label)?;
            self.parse_statement(exit)?;
            self.code.define_label(end)?;
        } else {
            self.code.define_label(cond.f_label)?;
        }
        Ok(())
    }

    /// `"while" "(" Condition ")" Statement`
    fn parse_while(&mut self) -> Result<()> {
        self.advance();
        let top = self.code.new_label();
        self.code.define_label(top)?;

        self.expect(TokenKind::LeftParen);
        let cond = self.parse_condition()?;
        self.expect(TokenKind::RightParen);

        self.code.f_jump(&cond)?;
        self.code.define_label(cond.t_label)?;

        let exit = self.code.new_label();
        self.parse_statement(Some(exit))?;
        self.code.jump(top)?;

        self.code.define_label(cond.f_label)?;
        self.code.define_label(exit)?;
        Ok(())
    }

    /// `"return" [ Expr ] ";"`
    fn parse_return(&mut self) -> Result<()> {
        self.advance();
        if FIRST_EXPR.contains(self.current.kind) {
            let mut x = self.parse_expr()?;
            if self.return_type == TypeId::NONE {
                self.error(ErrorKind::ReturnVoid);
            } else {
                let matches = self.assignable(&x, self.return_type);
                self.load(&mut x);
                if !matches {
                    self.error(ErrorKind::ReturnType);
                }
            }
        } else if self.return_type != TypeId::NONE {
            self.error(ErrorKind::ReturnNoVal);
        }

        self.code.emit(OpCode::Exit);
        self.code.emit(OpCode::Return);
        self.expect(TokenKind::Semicolon);
        Ok(())
    }

    /// `"read" "(" Designator ")" ";"`
    fn parse_read(&mut self) -> Result<()> {
        self.advance();
        self.expect(TokenKind::LeftParen);
        let x = self.parse_designator()?;

        let read = match x.ty {
            TypeId::INT => Some(OpCode::Read),
            TypeId::CHAR => Some(OpCode::BRead),
            _ => None,
        };
        match read {
            Some(op) => {
                self.code.emit(op);
                if let Err(err) = self.code.store(&x) {
                    self.error(err);
                }
            }
            None => self.error(ErrorKind::ReadValue),
        }

        self.expect(TokenKind::RightParen);
        self.expect(TokenKind::Semicolon);
        Ok(())
    }

    /// `"print" "(" Expr [ "," number ] ")" ";"`
    fn parse_print(&mut self) -> Result<()> {
        self.advance();
        self.expect(TokenKind::LeftParen);
        let mut x = self.parse_expr()?;

        let print = match x.ty {
            TypeId::INT => Some(OpCode::Print),
            TypeId::CHAR => Some(OpCode::BPrint),
            _ => None,
        };
        if print.is_none() {
            self.error(ErrorKind::PrintValue);
        }
        self.load(&mut x);

        let mut width = self.options.default_print_width;
        if self.check(TokenKind::Comma) {
            self.advance();
            if self.check(TokenKind::Number) {
                self.advance();
                width = self.previous.value();
            } else {
                self.expect(TokenKind::Number);
            }
        }
        self.code.load_const(width);
        if let Some(op) = print {
            self.code.emit(op);
        }

        self.expect(TokenKind::RightParen);
        self.expect(TokenKind::Semicolon);
        Ok(())
    }
}
