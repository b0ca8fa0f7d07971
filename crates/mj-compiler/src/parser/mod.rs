// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single-pass parsing, checking and code generation.
//!
//! The parser is a recursive-descent parser with one token of lookahead.
//! There is no syntax tree: every production checks types and emits code
//! as it goes, threading [`Operand`]s between productions.
//!
//! ## Structure
//!
//! - `declarations.rs` - program, constants, variables, classes, methods
//! - `statements.rs` - blocks and statements
//! - `expressions.rs` - designators, expressions, calls and conditions
//! - `recovery.rs` - token sets and error recovery
//!
//! Mistakes in the source are reported as diagnostics and parsing goes on.
//! The `Result` returned by the productions only carries internal errors.

mod declarations;
mod expressions;
mod recovery;
mod statements;

use crate::compiler::{Code, ObjectCode, Operand, OperandKind};
use crate::config::CompilerOptions;
use crate::diagnostics::{Diagnostic, Diagnostics, ErrorKind};
use crate::error::Result;
use crate::lexer::{Scanner, Token, TokenKind};
use crate::symtab::{DeclKind, ObjId, Tab, TypeId};

/// A compilation session.
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    /// Lookahead token
    current: Token,
    /// Most recently consumed token
    previous: Token,
    diagnostics: Diagnostics,
    tab: Tab,
    code: Code,
    options: &'a CompilerOptions,
    /// Tokens scanned since the last reported error
    err_dist: u32,
    /// Return type of the method being compiled
    return_type: TypeId,
}

impl<'a> Parser<'a> {
    /// Creates a parser for the given source code.
    pub fn new(source: &'a str, options: &'a CompilerOptions) -> Self {
        Self {
            scanner: Scanner::new(source),
            current: Token::new(TokenKind::None, 1, 1),
            previous: Token::new(TokenKind::None, 1, 1),
            diagnostics: Diagnostics::new(),
            tab: Tab::new(),
            code: Code::new(),
            options,
            err_dist: options.min_error_distance,
            return_type: TypeId::NONE,
        }
    }

    /// Compiles a whole program.
    pub fn parse(mut self) -> Result<(ObjectCode, Vec<Diagnostic>)> {
        self.advance();
        self.parse_program()?;
        self.expect(TokenKind::Eof);

        let object = self.code.finish()?;
        Ok((object, self.diagnostics.into_vec()))
    }

    // ========================================================================
    // Token handling
    // ========================================================================

    fn advance(&mut self) {
        let next = self.scanner.next_token();
        self.previous = std::mem::replace(&mut self.current, next);
        self.diagnostics.extend(self.scanner.take_errors());
        self.err_dist += 1;
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Consumes a token of the given kind, or reports it as expected.
    fn expect(&mut self, kind: TokenKind) {
        if self.check(kind) {
            self.advance();
        } else {
            self.error_with(ErrorKind::TokenExpected, kind.label());
        }
    }

    /// Consumes an identifier and returns its spelling, or reports it as
    /// expected and returns an empty name.
    fn ident(&mut self) -> String {
        if self.check(TokenKind::Ident) {
            self.advance();
            self.previous.text().to_string()
        } else {
            self.error_with(ErrorKind::TokenExpected, TokenKind::Ident.label());
            String::new()
        }
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Reports at the lookahead token, unless the previous report was less
    /// than `min_error_distance` tokens ago.
    fn report(&mut self, kind: ErrorKind, params: Vec<String>) {
        if self.err_dist >= self.options.min_error_distance {
            let diagnostic = Diagnostic::new(self.current.line, self.current.col, kind, params);
            self.diagnostics.report(diagnostic);
        }
        self.err_dist = 0;
    }

    fn error(&mut self, kind: ErrorKind) {
        self.report(kind, Vec::new());
    }

    fn error_with(&mut self, kind: ErrorKind, param: impl Into<String>) {
        self.report(kind, vec![param.into()]);
    }

    // ========================================================================
    // Symbol table and emission helpers
    // ========================================================================

    /// Declares a name, reporting duplicates. Nameless declarations left
    /// behind by syntax errors are skipped.
    fn declare(&mut self, kind: DeclKind, name: &str, ty: TypeId) -> ObjId {
        if name.is_empty() {
            return ObjId::NONE;
        }
        match self.tab.insert(kind, name, ty) {
            Ok(id) => id,
            Err(err) => {
                self.error_with(err, name);
                ObjId::NONE
            }
        }
    }

    fn find(&mut self, name: &str) -> ObjId {
        if name.is_empty() {
            return ObjId::NONE;
        }
        match self.tab.find(name) {
            Ok(id) => id,
            Err(err) => {
                self.error_with(err, name);
                ObjId::NONE
            }
        }
    }

    fn find_field(&mut self, name: &str, ty: TypeId) -> ObjId {
        match self.tab.find_field(name, ty) {
            Ok(id) => id,
            Err(err) => {
                self.error_with(err, name);
                ObjId::NONE
            }
        }
    }

    fn load(&mut self, x: &mut Operand) {
        if let Err(err) = self.code.load(x) {
            self.error(err);
        }
    }

    /// Assignment compatibility, including literal widening: an `int` or
    /// `char` constant fits an `int` or `char` destination, as long as an
    /// `int` stays within the `char` range when it targets a `char`.
    fn assignable(&self, src: &Operand, dest: TypeId) -> bool {
        if self.tab.types().assignable_to(src.ty, dest) {
            return true;
        }
        let OperandKind::Con { val } = src.kind else {
            return false;
        };
        let primitive = |ty: TypeId| ty == TypeId::INT || ty == TypeId::CHAR;
        if !primitive(src.ty) {
            return false;
        }
        dest == TypeId::INT || (dest == TypeId::CHAR && (0..=0xFFFF).contains(&val))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostics(source: &str) -> Vec<ErrorKind> {
        let options = CompilerOptions::default();
        let (_, diagnostics) = Parser::new(source, &options).parse().unwrap();
        diagnostics.into_iter().map(|d| d.kind).collect()
    }

    #[test]
    fn test_minimal_program() {
        assert!(diagnostics("program P { void main() { } }").is_empty());
    }

    #[test]
    fn test_error_distance_suppresses_cascades() {
        // the missing `;` and the undeclared `y` are two tokens apart
        let kinds = diagnostics("program P { void main() int x { y = 1; } }");
        assert_eq!(kinds, vec![ErrorKind::TokenExpected]);
    }

    #[test]
    fn test_errors_far_apart_are_all_kept() {
        let kinds = diagnostics(
            "program P { void main() int x; { x = 'a' * 2; x = 1; x = 1; x = 'b' * 3; } }",
        );
        assert_eq!(kinds, vec![ErrorKind::NoIntOp, ErrorKind::NoIntOp]);
    }

    #[test]
    fn test_lexical_errors_are_merged_in_order() {
        let kinds = diagnostics("program P $ { void main() { } }");
        assert_eq!(kinds[0], ErrorKind::InvalidChar);
    }

    #[test]
    fn test_literal_widening() {
        let options = CompilerOptions::default();
        let parser = Parser::new("", &options);

        assert!(parser.assignable(&Operand::con(65, TypeId::INT), TypeId::CHAR));
        assert!(parser.assignable(&Operand::con('a' as i32, TypeId::CHAR), TypeId::INT));
        assert!(!parser.assignable(&Operand::con(0x10000, TypeId::INT), TypeId::CHAR));
        assert!(!parser.assignable(&Operand::con(-1, TypeId::INT), TypeId::CHAR));
        assert!(!parser.assignable(&Operand::stack(TypeId::CHAR), TypeId::INT));
    }
}
