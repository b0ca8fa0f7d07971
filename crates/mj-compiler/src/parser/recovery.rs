// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Token sets and panic-mode error recovery.
//!
//! Each recovery reports one diagnostic, skips to a token of its anchor set
//! and resets the error distance so that follow-up errors at the resume
//! point stay quiet.

use super::Parser;
use crate::diagnostics::ErrorKind;
use crate::lexer::{TokenKind, TokenSet};

/// Tokens that can start an expression.
pub(super) const FIRST_EXPR: TokenSet = TokenSet::of(&[
    TokenKind::Minus,
    TokenKind::Ident,
    TokenKind::Number,
    TokenKind::CharConst,
    TokenKind::New,
    TokenKind::LeftParen,
]);

/// Assignment operators.
pub(super) const ASSIGN_OPS: TokenSet = TokenSet::of(&[
    TokenKind::Assign,
    TokenKind::PlusAssign,
    TokenKind::MinusAssign,
    TokenKind::TimesAssign,
    TokenKind::SlashAssign,
    TokenKind::RemAssign,
]);

const SYNC_DECL: TokenSet = TokenSet::of(&[
    TokenKind::Final,
    TokenKind::Class,
    TokenKind::LeftBrace,
    TokenKind::Eof,
]);

const SYNC_METHOD_DECL: TokenSet = TokenSet::of(&[
    TokenKind::Ident,
    TokenKind::Void,
    TokenKind::RightBrace,
    TokenKind::Eof,
]);

const SYNC_STATEMENT: TokenSet = TokenSet::of(&[
    TokenKind::If,
    TokenKind::While,
    TokenKind::Break,
    TokenKind::Return,
    TokenKind::Read,
    TokenKind::Print,
    TokenKind::Semicolon,
    TokenKind::RightBrace,
    TokenKind::Eof,
]);

impl Parser<'_> {
    /// Skips to the next global declaration: `final`, `class`, the start of
    /// the method section, a type name, or just past a `;`.
    pub(super) fn recover_decl(&mut self) {
        self.error(ErrorKind::InvalidDecl);
        loop {
            self.advance();
            if SYNC_DECL.contains(self.current.kind)
                || self.previous.kind == TokenKind::Semicolon
                || self.at_type_name()
            {
                break;
            }
        }
        self.err_dist = 0;
    }

    /// Skips to the next method declaration.
    pub(super) fn recover_method_decl(&mut self) {
        self.error(ErrorKind::MethDecl);
        loop {
            self.advance();
            if SYNC_METHOD_DECL.contains(self.current.kind) {
                break;
            }
        }
        self.err_dist = 0;
    }

    /// Skips to the next statement keyword or block end; a `;` anchor is
    /// consumed.
    pub(super) fn recover_stat(&mut self) {
        self.error(ErrorKind::InvalidStat);
        loop {
            self.advance();
            if SYNC_STATEMENT.contains(self.current.kind) {
                break;
            }
        }
        if self.current.kind == TokenKind::Semicolon {
            self.advance();
        }
        self.err_dist = 0;
    }

    fn at_type_name(&self) -> bool {
        self.current.kind == TokenKind::Ident
            && self
                .tab
                .lookup(self.current.text())
                .is_some_and(|id| self.tab.obj(id).is_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_sets_end_at_eof() {
        assert!(SYNC_DECL.contains(TokenKind::Eof));
        assert!(SYNC_METHOD_DECL.contains(TokenKind::Eof));
        assert!(SYNC_STATEMENT.contains(TokenKind::Eof));
    }

    #[test]
    fn test_first_sets() {
        assert!(FIRST_EXPR.contains(TokenKind::Minus));
        assert!(!FIRST_EXPR.contains(TokenKind::Plus));
        assert!(ASSIGN_OPS.contains(TokenKind::RemAssign));
        assert!(!ASSIGN_OPS.contains(TokenKind::Eql));
    }
}
