// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bytecode generation for the MicroJava virtual machine.
//!
//! # Module Structure
//!
//! - `opcode`: the instruction set and relational operators
//! - `operand`: where a value lives while it is being compiled
//! - `label`: jump targets with backpatching
//! - `code`: the code buffer and emission helpers
//! - `decoder`: bytecode listings
//! - `object_file`: the finished program image

mod code;
mod decoder;
mod label;
mod object_file;
mod opcode;
mod operand;

pub use code::Code;
pub use decoder::{DecodeError, Instruction, decode, disassemble};
pub use label::{Label, LabelId, Labels};
pub use object_file::{MAGIC, ObjectCode};
pub use opcode::{CompOp, OpCode};
pub use operand::{Cond, Operand, OperandKind};
