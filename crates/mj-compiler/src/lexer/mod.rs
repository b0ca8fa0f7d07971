// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lexical analysis for MicroJava source code.
//!
//! ## Structure
//!
//! - `scanner.rs` - `Scanner`, which produces tokens on demand
//! - `token.rs` - `Token`, `TokenKind`, the keyword table and `TokenSet`
//!
//! ## Usage
//!
//! ```rust
//! use mj_compiler::lexer::{Scanner, TokenKind};
//!
//! let mut scanner = Scanner::new("program P { }");
//!
//! loop {
//!     let token = scanner.next_token();
//!     if token.kind == TokenKind::Eof {
//!         break;
//!     }
//!     println!("{:?}", token.kind);
//! }
//! ```

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{Token, TokenKind, TokenSet, keyword};
