// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the compiler itself.
//!
//! Mistakes in the compiled program never end up here: they are reported
//! through [`crate::diagnostics`] and compilation carries on. An [`Error`]
//! means the compiler broke one of its own invariants, or that the
//! surrounding I/O or configuration failed.

use thiserror::Error;

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the compiler.
#[derive(Error, Debug)]
pub enum Error {
    /// A label was resolved a second time
    #[error("label defined twice (first at {first}, again at {second})")]
    LabelDefinedTwice {
        /// Address of the first definition
        first: usize,
        /// Address of the second definition
        second: usize,
    },

    /// Jumps are still waiting for a label that was never defined
    #[error("{0} jump(s) left unpatched")]
    UnpatchedJumps(usize),

    /// A patch position lies outside the emitted code
    #[error("patch position {pos} out of bounds (code size {len})")]
    PatchOutOfBounds {
        /// Position of the first byte to overwrite
        pos: usize,
        /// Code size at the time of the patch
        len: usize,
    },

    /// A jump or call distance does not fit the 2-byte operand
    #[error("jump distance {delta} at {pos} does not fit in 16 bits")]
    JumpOutOfRange {
        /// Position of the operand
        pos: usize,
        /// The distance that was to be encoded
        delta: i64,
    },

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
