// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The scanner that produces tokens from source text.

use std::iter::Peekable;
use std::str::Chars;

use super::token::{Token, TokenKind, keyword};
use crate::diagnostics::{Diagnostic, ErrorKind};

/// A scanner that tokenizes MicroJava source code.
///
/// Lexical errors never stop the scanner. They are collected and handed to
/// the caller through [`Scanner::take_errors`].
pub struct Scanner<'a> {
    chars: Peekable<Chars<'a>>,
    /// Position of the next unread character
    line: u32,
    col: u32,
    errors: Vec<Diagnostic>,
    finished: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            col: 1,
            errors: Vec::new(),
            finished: false,
        }
    }

    /// Returns the next token from the source. Once the input is exhausted
    /// every call returns an `Eof` token.
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();

            let (line, col) = (self.line, self.col);
            let Some(ch) = self.advance() else {
                return Token::new(TokenKind::Eof, line, col);
            };

            let kind = match ch {
                'a'..='z' | 'A'..='Z' => return self.scan_name(ch, line, col),
                '0'..='9' => return self.scan_number(ch, line, col),
                '\'' => return self.scan_char_const(line, col),

                '/' if self.peek() == Some('*') => {
                    self.advance();
                    self.skip_comment(line, col);
                    continue;
                }

                // Single-character tokens
                ';' => TokenKind::Semicolon,
                ',' => TokenKind::Comma,
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                '[' => TokenKind::LeftBracket,
                ']' => TokenKind::RightBracket,
                '{' => TokenKind::LeftBrace,
                '}' => TokenKind::RightBrace,
                '#' => TokenKind::Hash,

                // Multi-character tokens
                '+' => self.scan_plus(),
                '-' => self.scan_minus(),
                '*' => self.either('=', TokenKind::TimesAssign, TokenKind::Times),
                '/' => self.either('=', TokenKind::SlashAssign, TokenKind::Slash),
                '%' => self.either('=', TokenKind::RemAssign, TokenKind::Rem),
                '=' => self.either('=', TokenKind::Eql, TokenKind::Assign),
                '>' => self.either('=', TokenKind::Geq, TokenKind::Gtr),
                '<' => self.either('=', TokenKind::Leq, TokenKind::Lss),
                '!' => self.paired('=', TokenKind::Neq, ch, line, col),
                '&' => self.paired('&', TokenKind::And, ch, line, col),
                '|' => self.paired('|', TokenKind::Or, ch, line, col),
                '.' => self.scan_dot(),

                _ => {
                    self.error(line, col, ErrorKind::InvalidChar, vec![ch.to_string()]);
                    TokenKind::None
                }
            };

            return Token::new(kind, line, col);
        }
    }

    /// Drains the lexical diagnostics collected so far.
    pub fn take_errors(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.errors)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn error(&mut self, line: u32, col: u32, kind: ErrorKind, params: Vec<String>) {
        self.errors.push(Diagnostic::new(line, col, kind, params));
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Skips a comment whose opening `/*` was consumed. Comments nest.
    fn skip_comment(&mut self, line: u32, col: u32) {
        let mut depth = 1usize;
        while depth > 0 {
            match self.advance() {
                Some('/') if self.peek() == Some('*') => {
                    self.advance();
                    depth += 1;
                }
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    depth -= 1;
                }
                Some(_) => {}
                None => {
                    self.error(line, col, ErrorKind::EofInComment, Vec::new());
                    return;
                }
            }
        }
    }

    fn scan_name(&mut self, first: char, line: u32, col: u32) -> Token {
        let mut text = String::from(first);
        while let Some(ch) = self.peek() {
            if !(ch.is_ascii_alphanumeric() || ch == '_') {
                break;
            }
            text.push(ch);
            self.advance();
        }

        let kind = keyword(&text).unwrap_or(TokenKind::Ident);
        let mut token = Token::new(kind, line, col);
        token.text = Some(text);
        token
    }

    fn scan_number(&mut self, first: char, line: u32, col: u32) -> Token {
        let mut text = String::from(first);
        while let Some(ch) = self.peek().filter(char::is_ascii_digit) {
            text.push(ch);
            self.advance();
        }

        let value = match text.parse::<i32>() {
            Ok(value) => value,
            Err(_) => {
                self.error(line, col, ErrorKind::BigNum, vec![text]);
                0
            }
        };

        let mut token = Token::new(TokenKind::Number, line, col);
        token.value = Some(value);
        token
    }

    /// Scans a character constant whose opening quote was consumed.
    fn scan_char_const(&mut self, line: u32, col: u32) -> Token {
        let mut token = Token::new(TokenKind::CharConst, line, col);

        let ch = match self.peek() {
            Some('\'') => {
                self.advance();
                self.error(line, col, ErrorKind::EmptyCharConst, Vec::new());
                return token;
            }
            Some('\n' | '\r') => {
                self.error(line, col, ErrorKind::IllegalLineEnd, Vec::new());
                return token;
            }
            None => {
                self.error(line, col, ErrorKind::EofInChar, Vec::new());
                return token;
            }
            Some('\\') => {
                self.advance();
                match self.advance() {
                    Some('n') => '\n',
                    Some('r') => '\r',
                    Some('\'') => '\'',
                    Some('\\') => '\\',
                    Some(other) => {
                        self.error(
                            line,
                            col,
                            ErrorKind::UndefinedEscape,
                            vec![other.to_string()],
                        );
                        '\0'
                    }
                    None => {
                        self.error(line, col, ErrorKind::EofInChar, Vec::new());
                        return token;
                    }
                }
            }
            Some(ch) => {
                self.advance();
                ch
            }
        };

        if self.peek() == Some('\'') {
            self.advance();
            token.value = Some(ch as i32);
        } else {
            self.error(line, col, ErrorKind::MissingQuote, Vec::new());
        }
        token
    }

    fn scan_plus(&mut self) -> TokenKind {
        match self.peek() {
            Some('+') => {
                self.advance();
                TokenKind::PlusPlus
            }
            Some('=') => {
                self.advance();
                TokenKind::PlusAssign
            }
            _ => TokenKind::Plus,
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        match self.peek() {
            Some('-') => {
                self.advance();
                TokenKind::MinusMinus
            }
            Some('=') => {
                self.advance();
                TokenKind::MinusAssign
            }
            _ => TokenKind::Minus,
        }
    }

    fn scan_dot(&mut self) -> TokenKind {
        if self.peek() != Some('.') {
            return TokenKind::Period;
        }
        self.advance();
        if self.peek() == Some('.') {
            self.advance();
            TokenKind::PPPeriod
        } else {
            TokenKind::PPeriod
        }
    }

    /// `long` if the next character is `next`, otherwise `short`.
    fn either(&mut self, next: char, long: TokenKind, short: TokenKind) -> TokenKind {
        if self.peek() == Some(next) {
            self.advance();
            long
        } else {
            short
        }
    }

    /// Two-character operators whose first character is not a token by itself.
    fn paired(
        &mut self,
        next: char,
        kind: TokenKind,
        first: char,
        line: u32,
        col: u32,
    ) -> TokenKind {
        if self.peek() == Some(next) {
            self.advance();
            kind
        } else {
            self.error(line, col, ErrorKind::InvalidChar, vec![first.to_string()]);
            TokenKind::None
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
            return None;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::new(source).map(|t| t.kind).collect()
    }

    fn errors(source: &str) -> Vec<ErrorKind> {
        let mut scanner = Scanner::new(source);
        scanner.by_ref().for_each(drop);
        scanner.take_errors().into_iter().map(|d| d.kind).collect()
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("+ += ++ - -= -- * *= / /= % %= = == != > >= < <= && ||"),
            vec![
                TokenKind::Plus,
                TokenKind::PlusAssign,
                TokenKind::PlusPlus,
                TokenKind::Minus,
                TokenKind::MinusAssign,
                TokenKind::MinusMinus,
                TokenKind::Times,
                TokenKind::TimesAssign,
                TokenKind::Slash,
                TokenKind::SlashAssign,
                TokenKind::Rem,
                TokenKind::RemAssign,
                TokenKind::Assign,
                TokenKind::Eql,
                TokenKind::Neq,
                TokenKind::Gtr,
                TokenKind::Geq,
                TokenKind::Lss,
                TokenKind::Leq,
                TokenKind::And,
                TokenKind::Or,
            ]
        );
    }

    #[test]
    fn test_punctuation_and_dots() {
        assert_eq!(
            kinds("; , . .. ... ( ) [ ] { } #"),
            vec![
                TokenKind::Semicolon,
                TokenKind::Comma,
                TokenKind::Period,
                TokenKind::PPeriod,
                TokenKind::PPPeriod,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Hash,
            ]
        );
    }

    #[test]
    fn test_identifiers_and_keywords() {
        let tokens: Vec<_> = Scanner::new("program while_1 x9 Final").collect();
        assert_eq!(tokens[0].kind, TokenKind::Program);
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[1].text(), "while_1");
        assert_eq!(tokens[2].text(), "x9");
        assert_eq!(tokens[3].kind, TokenKind::Ident);
    }

    #[test]
    fn test_underscore_cannot_start_name() {
        assert_eq!(errors("_a"), vec![ErrorKind::InvalidChar]);
        assert_eq!(kinds("_a"), vec![TokenKind::None, TokenKind::Ident]);
    }

    #[test]
    fn test_numbers() {
        let tokens: Vec<_> = Scanner::new("0 42 2147483647").collect();
        let values: Vec<_> = tokens.iter().map(Token::value).collect();
        assert_eq!(values, vec![0, 42, i32::MAX]);
    }

    #[test]
    fn test_number_overflow() {
        let mut scanner = Scanner::new("2147483648");
        let token = scanner.next_token();
        assert_eq!(token.kind, TokenKind::Number);
        assert_eq!(token.value, Some(0));

        let errors = scanner.take_errors();
        assert_eq!(errors[0].kind, ErrorKind::BigNum);
        assert_eq!(errors[0].params, vec!["2147483648".to_string()]);
    }

    #[test]
    fn test_char_constants() {
        let tokens: Vec<_> = Scanner::new(r"'a' '\n' '\r' '\'' '\\'").collect();
        let values: Vec<_> = tokens.iter().map(Token::value).collect();
        assert_eq!(values, vec!['a' as i32, 10, 13, '\'' as i32, '\\' as i32]);
    }

    #[test]
    fn test_char_constant_errors() {
        assert_eq!(errors("''"), vec![ErrorKind::EmptyCharConst]);
        assert_eq!(errors(r"'\t'"), vec![ErrorKind::UndefinedEscape]);
        assert_eq!(errors("'"), vec![ErrorKind::EofInChar]);
        // the stray quote after `b` opens a second constant
        assert_eq!(
            errors("'ab'"),
            vec![ErrorKind::MissingQuote, ErrorKind::EofInChar]
        );
        assert_eq!(
            errors("'\n'"),
            vec![ErrorKind::IllegalLineEnd, ErrorKind::EofInChar]
        );
    }

    #[test]
    fn test_nested_comments() {
        assert_eq!(
            kinds("a /* outer /* inner */ still comment */ b"),
            vec![TokenKind::Ident, TokenKind::Ident]
        );
        assert!(errors("/* a /* b */ c */").is_empty());
    }

    #[test]
    fn test_unterminated_comment() {
        assert_eq!(errors("x /* /* */"), vec![ErrorKind::EofInComment]);
    }

    #[test]
    fn test_lone_operator_characters_are_invalid() {
        assert_eq!(
            errors("! & | $"),
            vec![
                ErrorKind::InvalidChar,
                ErrorKind::InvalidChar,
                ErrorKind::InvalidChar,
                ErrorKind::InvalidChar,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens: Vec<_> = Scanner::new("program P\n  {\n}").collect();
        let positions: Vec<_> = tokens.iter().map(|t| (t.line, t.col)).collect();
        assert_eq!(positions, vec![(1, 1), (1, 9), (2, 3), (3, 1)]);
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut scanner = Scanner::new("x");
        assert_eq!(scanner.next_token().kind, TokenKind::Ident);
        assert_eq!(scanner.next_token().kind, TokenKind::Eof);
        assert_eq!(scanner.next_token().kind, TokenKind::Eof);
    }
}
