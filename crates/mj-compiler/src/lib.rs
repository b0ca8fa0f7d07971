// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # mj-compiler
//!
//! A single-pass compiler for MicroJava, a small Java-like teaching
//! language, producing bytecode for a stack-based virtual machine.
//!
//! ## Overview
//!
//! The compiler reads source text once. Scanning, parsing, type checking
//! and code generation are fused: there is no syntax tree, and every
//! grammar production emits its code as soon as it is recognized.
//!
//! - [`lexer`]: tokens and the scanner
//! - [`symtab`]: scoped symbol table and type descriptors
//! - [`compiler`]: opcodes, operands, labels and the code buffer
//! - [`parser`]: the recursive-descent driver tying it all together
//! - [`diagnostics`]: the catalogue of user-facing error messages
//!
//! ## Quick Start
//!
//! ```
//! let compilation = mj_compiler::compile(
//!     "program Hello { void main() { print('h'); print('i'); } }",
//! )?;
//! assert!(!compilation.has_errors());
//! assert_eq!(compilation.object.main_pc, Some(0));
//! # Ok::<(), mj_compiler::Error>(())
//! ```
//!
//! Mistakes in the program never abort compilation; they are collected as
//! [`Diagnostic`]s next to the object code. An `Err` means the compiler
//! itself broke an internal invariant.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod symtab;

pub use compiler::ObjectCode;
pub use config::CompilerOptions;
pub use diagnostics::{Diagnostic, ErrorKind};
pub use error::{Error, Result};

use parser::Parser;

/// Result of compiling one program.
#[derive(Debug, Clone)]
pub struct Compilation {
    /// The generated program image
    pub object: ObjectCode,
    /// Diagnostics in the order they were reported
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    /// Returns true if any diagnostic was reported.
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Compiles a program with the default options.
pub fn compile(source: &str) -> Result<Compilation> {
    compile_with_options(source, &CompilerOptions::default())
}

/// Compiles a program.
///
/// Object code is produced even when diagnostics were reported.
///
/// # Errors
///
/// Fails only on internal errors such as a jump left unpatched.
pub fn compile_with_options(source: &str, options: &CompilerOptions) -> Result<Compilation> {
    let (object, diagnostics) = Parser::new(source, options).parse()?;
    tracing::debug!(
        code_size = object.code.len(),
        data_size = object.data_size,
        errors = diagnostics.len(),
        "compiled"
    );
    Ok(Compilation {
        object,
        diagnostics,
    })
}
