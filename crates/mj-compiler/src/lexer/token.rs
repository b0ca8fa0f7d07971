// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Token definitions for the MicroJava lexer.

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// Line of the first character (1-based)
    pub line: u32,
    /// Column of the first character (1-based)
    pub col: u32,
    /// Spelling of identifiers and keywords
    pub text: Option<String>,
    /// Value of number and character literals
    pub value: Option<i32>,
}

impl Token {
    /// Creates a new token without payload.
    pub fn new(kind: TokenKind, line: u32, col: u32) -> Self {
        Self {
            kind,
            line,
            col,
            text: None,
            value: None,
        }
    }

    /// The identifier spelling, or the empty string.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// The literal value, or 0.
    pub fn value(&self) -> i32 {
        self.value.unwrap_or(0)
    }
}

/// The terminals of MicroJava.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    /// Unrecognised input
    None,
    /// Identifier
    Ident,
    /// Integer literal
    Number,
    /// Character literal
    CharConst,

    /// +
    Plus,
    /// -
    Minus,
    /// *
    Times,
    /// /
    Slash,
    /// %
    Rem,
    /// ==
    Eql,
    /// !=
    Neq,
    /// <
    Lss,
    /// <=
    Leq,
    /// >
    Gtr,
    /// >=
    Geq,
    /// &&
    And,
    /// ||
    Or,
    /// =
    Assign,
    /// +=
    PlusAssign,
    /// -=
    MinusAssign,
    /// *=
    TimesAssign,
    /// /=
    SlashAssign,
    /// %=
    RemAssign,
    /// ++
    PlusPlus,
    /// --
    MinusMinus,
    /// ;
    Semicolon,
    /// ,
    Comma,
    /// .
    Period,
    /// ..
    PPeriod,
    /// ...
    PPPeriod,
    /// (
    LeftParen,
    /// )
    RightParen,
    /// [
    LeftBracket,
    /// ]
    RightBracket,
    /// {
    LeftBrace,
    /// }
    RightBrace,
    /// #
    Hash,

    // Keywords
    /// `break`
    Break,
    /// `class`
    Class,
    /// `else`
    Else,
    /// `final`
    Final,
    /// `if`
    If,
    /// `new`
    New,
    /// `print`
    Print,
    /// `program`
    Program,
    /// `read`
    Read,
    /// `return`
    Return,
    /// `void`
    Void,
    /// `while`
    While,

    /// End of input
    Eof,
}

impl TokenKind {
    /// The name used when this token is reported as expected.
    pub fn label(&self) -> &'static str {
        match self {
            TokenKind::None => "none",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::CharConst => "character constant",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Times => "*",
            TokenKind::Slash => "/",
            TokenKind::Rem => "%",
            TokenKind::Eql => "==",
            TokenKind::Neq => "!=",
            TokenKind::Lss => "<",
            TokenKind::Leq => "<=",
            TokenKind::Gtr => ">",
            TokenKind::Geq => ">=",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::Assign => "=",
            TokenKind::PlusAssign => "+=",
            TokenKind::MinusAssign => "-=",
            TokenKind::TimesAssign => "*=",
            TokenKind::SlashAssign => "/=",
            TokenKind::RemAssign => "%=",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Period => ".",
            TokenKind::PPeriod => "..",
            TokenKind::PPPeriod => "...",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Hash => "#",
            TokenKind::Break => "break",
            TokenKind::Class => "class",
            TokenKind::Else => "else",
            TokenKind::Final => "final",
            TokenKind::If => "if",
            TokenKind::New => "new",
            TokenKind::Print => "print",
            TokenKind::Program => "program",
            TokenKind::Read => "read",
            TokenKind::Return => "return",
            TokenKind::Void => "void",
            TokenKind::While => "while",
            TokenKind::Eof => "end of file",
        }
    }

    /// Returns true if this token is a keyword.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Break
                | TokenKind::Class
                | TokenKind::Else
                | TokenKind::Final
                | TokenKind::If
                | TokenKind::New
                | TokenKind::Print
                | TokenKind::Program
                | TokenKind::Read
                | TokenKind::Return
                | TokenKind::Void
                | TokenKind::While
        )
    }
}

mj_macros::keywords! {
    /// Maps a reserved word to its token kind.
    pub fn keyword -> TokenKind {
        "break" => TokenKind::Break,
        "class" => TokenKind::Class,
        "else" => TokenKind::Else,
        "final" => TokenKind::Final,
        "if" => TokenKind::If,
        "new" => TokenKind::New,
        "print" => TokenKind::Print,
        "program" => TokenKind::Program,
        "read" => TokenKind::Read,
        "return" => TokenKind::Return,
        "void" => TokenKind::Void,
        "while" => TokenKind::While,
    }
}

/// A set of token kinds, used for FIRST sets and recovery anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenSet(u64);

impl TokenSet {
    /// Builds a set from a list of kinds.
    pub const fn of(kinds: &[TokenKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            bits |= 1u64 << kinds[i] as u8;
            i += 1;
        }
        Self(bits)
    }

    /// Returns true if `kind` is in the set.
    pub const fn contains(&self, kind: TokenKind) -> bool {
        self.0 & (1u64 << kind as u8) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_table() {
        assert_eq!(keyword("program"), Some(TokenKind::Program));
        assert_eq!(keyword("final"), Some(TokenKind::Final));
        assert_eq!(keyword("int"), None);
        assert_eq!(keyword("Program"), None);
    }

    #[test]
    fn test_every_keyword_kind_is_reachable() {
        let words = [
            "break", "class", "else", "final", "if", "new", "print", "program", "read", "return",
            "void", "while",
        ];
        for word in words {
            let kind = keyword(word).unwrap();
            assert!(kind.is_keyword());
            assert_eq!(kind.label(), word);
        }
    }

    #[test]
    fn test_token_set_membership() {
        const SET: TokenSet = TokenSet::of(&[TokenKind::Ident, TokenKind::Eof]);
        assert!(SET.contains(TokenKind::Ident));
        assert!(SET.contains(TokenKind::Eof));
        assert!(!SET.contains(TokenKind::Number));
        assert!(!TokenSet::default().contains(TokenKind::None));
    }

    #[test]
    fn test_token_payload_accessors() {
        let mut token = Token::new(TokenKind::Ident, 1, 5);
        assert_eq!(token.text(), "");
        token.text = Some("foo".into());
        assert_eq!(token.text(), "foo");
        assert_eq!(token.value(), 0);
    }
}
