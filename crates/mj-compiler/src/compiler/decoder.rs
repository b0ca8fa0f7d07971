// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Turns a code buffer back into instructions.
//!
//! Used for listings and for inspecting generated code in tests.

use std::fmt;

use thiserror::Error;

use super::OpCode;

/// A malformed code buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Byte that is not an opcode
    #[error("unknown opcode {byte} at {offset}")]
    UnknownOpcode {
        /// Position of the byte
        offset: usize,
        /// The byte
        byte: u8,
    },

    /// Operand bytes missing at the end of the buffer
    #[error("truncated {opcode} at {offset}")]
    Truncated {
        /// Position of the opcode
        offset: usize,
        /// The incomplete instruction
        opcode: OpCode,
    },
}

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Address of the opcode byte
    pub offset: usize,
    /// The opcode
    pub opcode: OpCode,
    /// Operand values in encoding order
    pub operands: Vec<i32>,
}

impl Instruction {
    /// Absolute destination of a jump or call.
    pub fn target(&self) -> Option<usize> {
        if !(self.opcode.is_jump() || self.opcode == OpCode::Call) {
            return None;
        }
        let delta = *self.operands.first()? as isize;
        usize::try_from(self.offset as isize + 3 + delta).ok()
    }

    /// Encoded length in bytes.
    pub fn size(&self) -> usize {
        self.opcode.size()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5}: {}", self.offset, self.opcode)?;
        for operand in &self.operands {
            write!(f, " {}", operand)?;
        }
        if let Some(target) = self.target() {
            write!(f, " (-> {})", target)?;
        }
        Ok(())
    }
}

/// Decodes a whole code buffer.
pub fn decode(code: &[u8]) -> Result<Vec<Instruction>, DecodeError> {
    let mut instructions = Vec::new();
    let mut pos = 0;

    while pos < code.len() {
        let offset = pos;
        let opcode = OpCode::try_from(code[pos]).map_err(|byte| DecodeError::UnknownOpcode {
            offset,
            byte,
        })?;
        pos += 1;

        let mut operands = Vec::with_capacity(opcode.operand_widths().len());
        for (i, &width) in opcode.operand_widths().iter().enumerate() {
            let bytes = code
                .get(pos..pos + width)
                .ok_or(DecodeError::Truncated { offset, opcode })?;
            operands.push(operand_value(opcode, i, bytes));
            pos += width;
        }

        instructions.push(Instruction {
            offset,
            opcode,
            operands,
        });
    }

    Ok(instructions)
}

/// Renders a listing, one instruction per line.
pub fn disassemble(code: &[u8]) -> Result<String, DecodeError> {
    let mut out = String::new();
    for instruction in decode(code)? {
        out.push_str(&instruction.to_string());
        out.push('\n');
    }
    Ok(out)
}

fn operand_value(opcode: OpCode, index: usize, bytes: &[u8]) -> i32 {
    match bytes {
        // the increment of `inc` is signed
        [b] if opcode == OpCode::Inc && index == 1 => *b as i8 as i32,
        [b] => *b as i32,
        [hi, lo] if opcode.is_jump() || opcode == OpCode::Call => {
            i16::from_be_bytes([*hi, *lo]) as i32
        }
        [hi, lo] => u16::from_be_bytes([*hi, *lo]) as i32,
        [a, b, c, d] => i32::from_be_bytes([*a, *b, *c, *d]),
        _ => 0,
    }
}
