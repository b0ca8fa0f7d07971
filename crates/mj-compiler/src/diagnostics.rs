// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The diagnostic channel.
//!
//! Every defect found in the compiled program becomes a [`Diagnostic`]:
//! a source position, a kind from the closed [`ErrorKind`] catalogue and
//! the strings substituted into the kind's message template. The channel
//! only grows; nothing is ever retracted.

use std::fmt;

/// The closed catalogue of reportable defects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Lexical
    /// `''`
    EmptyCharConst,
    /// `'\x'` with an unknown escape
    UndefinedEscape,
    /// Character constant not closed by `'`
    MissingQuote,
    /// Character outside the token alphabet
    InvalidChar,
    /// Integer literal does not fit 32 bits
    BigNum,
    /// End of input inside a comment
    EofInComment,
    /// End of input inside a character constant
    EofInChar,
    /// Line break inside a character constant
    IllegalLineEnd,

    // Syntactic
    /// A specific token was expected
    TokenExpected,
    /// Invalid additive operator
    AddOp,
    /// Invalid assignment operator
    AssignOp,
    /// Constant declaration without a literal
    ConstDecl,
    /// Designator not followed by an assignment, call, `++` or `--`
    DesignFollow,
    /// Invalid start of a global declaration
    InvalidDecl,
    /// Invalid start of a factor
    InvalidFact,
    /// Invalid start of a method declaration
    MethDecl,
    /// Invalid multiplicative operator
    MulOp,
    /// Invalid relational operator
    RelOp,
    /// Invalid start of a statement
    InvalidStat,

    // Declarations
    /// Name declared twice in one scope
    DeclName,
    /// Name not declared
    NotFound,
    /// Field not declared in the class
    NoField,
    /// Program has no entry point
    MethNotFound,
    /// Too many program-level declarations
    TooManyGlobals,
    /// Too many fields in a class
    TooManyFields,
    /// Too many parameters and locals in a method
    TooManyLocals,

    // Types
    /// Array index is not an int
    ArrayIndex,
    /// Array size is not an int
    ArraySize,
    /// Constant literal does not match the declared type
    ConstType,
    /// Reference types compared with an ordering operator
    EqCheck,
    /// Incompatible types
    IncompTypes,
    /// Void method used as a value
    InvalidCall,
    /// Fewer arguments than parameters
    LessActualParams,
    /// More arguments than parameters
    MoreActualParams,
    /// Entry point declared with a return type
    MainNotVoid,
    /// Entry point declared with parameters
    MainWithParams,
    /// Indexed value is not an array
    NoArray,
    /// Dereferenced value is not a class instance
    NoClass,
    /// `new` applied to a non-class type without `[...]`
    NoClassType,
    /// Integer designator required
    NoInt,
    /// Integer operand(s) required
    NoIntOp,
    /// Called designator is not a method
    NoMeth,
    /// Name does not denote an operand
    NoOperand,
    /// Name does not denote a type
    NoType,
    /// Operand does not produce a value
    NoVal,
    /// Assignment target is not a variable
    NoVar,
    /// Argument not assignable to its parameter
    ParamType,
    /// `print` of a non-int/char value
    PrintValue,
    /// `read` into a non-int/char designator
    ReadValue,
    /// `return` without value in a value method
    ReturnNoVal,
    /// `return` value not assignable to the method type
    ReturnType,
    /// `return` value in a void method
    ReturnVoid,

    // Control flow
    /// `break` outside a loop
    NoLoop,
    /// Fewer variable arguments than announced
    LessActualVarargs,
    /// More variable arguments than announced
    MoreActualVarargs,
    /// `#` used on a method without a variadic parameter
    InvalidVarargCall,
}

impl ErrorKind {
    /// The message template; `{0}`, `{1}` are replaced by parameters.
    pub fn template(&self) -> &'static str {
        match self {
            ErrorKind::EmptyCharConst => "empty character constant",
            ErrorKind::UndefinedEscape => "undefined escape character sequence '\\{0}'",
            ErrorKind::MissingQuote => "missing ' at end of character constant",
            ErrorKind::InvalidChar => "invalid character {0}",
            ErrorKind::BigNum => "{0} too big for integer constant",
            ErrorKind::EofInComment => "unexpected end of file in comment",
            ErrorKind::EofInChar => "unexpected end of file in character constant",
            ErrorKind::IllegalLineEnd => "illegal line end in character constant",

            ErrorKind::TokenExpected => "{0} expected",
            ErrorKind::AddOp => "additive operator (+ or -) expected",
            ErrorKind::AssignOp => "assignment operator expected",
            ErrorKind::ConstDecl => "number or character constant expected",
            ErrorKind::DesignFollow => "assignment, method call, ++ or -- expected",
            ErrorKind::InvalidDecl => "invalid declaration",
            ErrorKind::InvalidFact => {
                "invalid start of factor: identifier, number, character constant, new or ( expected"
            }
            ErrorKind::MethDecl => "invalid start of method: type name or void expected",
            ErrorKind::MulOp => "multiplicative operator (*, /, %) expected",
            ErrorKind::RelOp => "relational operator expected",
            ErrorKind::InvalidStat => "invalid start of statement",

            ErrorKind::DeclName => "{0} already declared",
            ErrorKind::NotFound => "{0} not found",
            ErrorKind::NoField => "{0} is not a field",
            ErrorKind::MethNotFound => "method {0} not found",
            ErrorKind::TooManyGlobals => "too many global variables",
            ErrorKind::TooManyFields => "too many fields",
            ErrorKind::TooManyLocals => "too many local variables",

            ErrorKind::ArrayIndex => "array index must be an integer",
            ErrorKind::ArraySize => "array size must be an integer",
            ErrorKind::ConstType => "value does not match constant type",
            ErrorKind::EqCheck => "only (un)equality checks are allowed for reference types",
            ErrorKind::IncompTypes => "incompatible types",
            ErrorKind::InvalidCall => "void method cannot be used in an expression",
            ErrorKind::LessActualParams => "less actual than formal parameters",
            ErrorKind::MoreActualParams => "more actual than formal parameters",
            ErrorKind::MainNotVoid => "method main must be void",
            ErrorKind::MainWithParams => "main method must not have any parameters",
            ErrorKind::NoArray => "indexed object is not an array",
            ErrorKind::NoClass => "dereferenced object is not a class",
            ErrorKind::NoClassType => "class type expected",
            ErrorKind::NoInt => "integer variable expected",
            ErrorKind::NoIntOp => "operand(s) must be of type int",
            ErrorKind::NoMeth => "called object is not a method",
            ErrorKind::NoOperand => "cannot be used as an operand",
            ErrorKind::NoType => "type expected",
            ErrorKind::NoVal => "value expected",
            ErrorKind::NoVar => "variable expected",
            ErrorKind::ParamType => "parameter type mismatch",
            ErrorKind::PrintValue => "can only print int or char values",
            ErrorKind::ReadValue => "can only read int or char values",
            ErrorKind::ReturnNoVal => "return expression required in non-void method",
            ErrorKind::ReturnType => "return type must match method type",
            ErrorKind::ReturnVoid => "no return expression allowed in void method",

            ErrorKind::NoLoop => "break is not within a loop",
            ErrorKind::LessActualVarargs => "less actual than announced variable arguments",
            ErrorKind::MoreActualVarargs => "more actual than announced variable arguments",
            ErrorKind::InvalidVarargCall => "method has no variable arguments",
        }
    }

    /// Render the template with the given parameters.
    pub fn format(&self, params: &[String]) -> String {
        let mut text = self.template().to_string();
        for (i, param) in params.iter().enumerate() {
            text = text.replace(&format!("{{{}}}", i), param);
        }
        text
    }
}

/// A single reported defect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Source line (1-based)
    pub line: u32,
    /// Source column (1-based)
    pub col: u32,
    /// What went wrong
    pub kind: ErrorKind,
    /// Values substituted into the message template
    pub params: Vec<String>,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    pub fn new(line: u32, col: u32, kind: ErrorKind, params: Vec<String>) -> Self {
        Self {
            line,
            col,
            kind,
            params,
        }
    }

    /// The rendered message text without position.
    pub fn message(&self) -> String {
        self.kind.format(&self.params)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-- line {} col {}: {}", self.line, self.col, self.message())
    }
}

/// Append-only, order-preserving sink of diagnostics.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::trace!(%diagnostic, "reported");
        self.entries.push(diagnostic);
    }

    /// Records every diagnostic of the iterator, in order.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.report(diagnostic);
        }
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded diagnostics in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Consumes the sink.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_substitutes_parameters() {
        let text = ErrorKind::TokenExpected.format(&["\";\"".to_string()]);
        assert_eq!(text, "\";\" expected");
    }

    #[test]
    fn test_format_without_placeholders() {
        assert_eq!(ErrorKind::NoLoop.format(&[]), "break is not within a loop");
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::new(3, 7, ErrorKind::NotFound, vec!["foo".to_string()]);
        assert_eq!(d.to_string(), "-- line 3 col 7: foo not found");
    }

    #[test]
    fn test_sink_preserves_order() {
        let mut sink = Diagnostics::new();
        sink.report(Diagnostic::new(2, 1, ErrorKind::NoVar, vec![]));
        sink.extend(vec![
            Diagnostic::new(1, 1, ErrorKind::InvalidChar, vec!["$".into()]),
            Diagnostic::new(5, 1, ErrorKind::NoLoop, vec![]),
        ]);

        let kinds: Vec<_> = sink.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![ErrorKind::NoVar, ErrorKind::InvalidChar, ErrorKind::NoLoop]
        );
        assert_eq!(sink.len(), 3);
    }
}
