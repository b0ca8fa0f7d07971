// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Declarative macros for the MicroJava compiler.
//!
//! This crate provides the table-building macros used by `mj-compiler`
//! together with a handful of test assertions.
//!
//! # Macros Overview
//!
//! ## Tables
//! - [`opcodes!`] - Define a byte-coded instruction set with operand layouts
//! - [`keywords!`] - Define a keyword lookup function
//!
//! ## Testing
//! - [`assert_matches!`] - Assert that a value matches a pattern
//! - [`assert_ok!`] - Assert that a Result is Ok and extract the value
//! - [`assert_reports!`] - Assert that a compilation reported a diagnostic
//! - [`assert_clean!`] - Assert that a compilation reported nothing
//!
//! # Examples
//!
//! ```
//! use mj_macros::*;
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! enum Kind { If, While, Ident }
//!
//! keywords! {
//!     pub fn keyword -> Kind {
//!         "if" => Kind::If,
//!         "while" => Kind::While,
//!     }
//! }
//!
//! assert_eq!(keyword("while"), Some(Kind::While));
//! assert_eq!(keyword("whilst"), None);
//! ```

#![warn(missing_docs)]

pub mod tables;
pub mod testing;
