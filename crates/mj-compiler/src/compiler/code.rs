// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The code buffer and emission helpers.
//!
//! Jump and call operands are 2-byte signed offsets relative to the first
//! byte after the operand. A jump whose operand sits at `pos` and targets
//! `adr` stores `adr - (pos + 2)`, which must fit in an `i16`.

use super::label::{Label, LabelId, Labels};
use super::object_file::ObjectCode;
use super::operand::{Cond, Operand, OperandKind};
use super::OpCode;
use crate::diagnostics::ErrorKind;
use crate::error::{Error, Result};
use crate::symtab::TypeId;

/// Outcome of an emission step that can hit a semantic error.
type Checked = std::result::Result<(), ErrorKind>;

/// Growing bytecode buffer plus program metadata.
#[derive(Debug, Default)]
pub struct Code {
    buf: Vec<u8>,
    /// Address of the entry point, once its body starts
    pub main_pc: Option<usize>,
    /// Number of global data words
    pub data_size: usize,
    labels: Labels,
}

impl Code {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Address of the next byte to be emitted.
    pub fn pc(&self) -> usize {
        self.buf.len()
    }

    /// The bytes emitted so far.
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    // ========================================================================
    // Raw emission
    // ========================================================================

    /// Appends one byte.
    pub fn put(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Appends an opcode.
    pub fn emit(&mut self, op: OpCode) {
        self.put(op as u8);
    }

    /// Appends the low 16 bits of `value`, big-endian.
    pub fn put2(&mut self, value: i32) {
        self.buf.extend_from_slice(&(value as u16).to_be_bytes());
    }

    /// Appends `value` as 4 bytes, big-endian.
    pub fn put4(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Overwrites 2 bytes at `pos`.
    pub fn put2_at(&mut self, pos: usize, value: i32) -> Result<()> {
        self.patch(pos, &(value as u16).to_be_bytes())
    }

    /// Overwrites 4 bytes at `pos`.
    pub fn put4_at(&mut self, pos: usize, value: i32) -> Result<()> {
        self.patch(pos, &value.to_be_bytes())
    }

    fn patch(&mut self, pos: usize, bytes: &[u8]) -> Result<()> {
        let len = self.buf.len();
        let slot = self
            .buf
            .get_mut(pos..pos + bytes.len())
            .ok_or(Error::PatchOutOfBounds { pos, len })?;
        slot.copy_from_slice(bytes);
        Ok(())
    }

    // ========================================================================
    // Operands
    // ========================================================================

    /// Pushes a constant, using the short forms where they exist.
    pub fn load_const(&mut self, value: i32) {
        match value {
            -1 => self.emit(OpCode::ConstM1),
            0 => self.emit(OpCode::Const0),
            1 => self.emit(OpCode::Const1),
            2 => self.emit(OpCode::Const2),
            3 => self.emit(OpCode::Const3),
            4 => self.emit(OpCode::Const4),
            5 => self.emit(OpCode::Const5),
            _ => {
                self.emit(OpCode::Const);
                self.put4(value);
            }
        }
    }

    /// Brings an operand onto the expression stack. Afterwards the operand
    /// is a stack operand, so loading it again emits nothing.
    pub fn load(&mut self, x: &mut Operand) -> Checked {
        let loaded = match x.kind {
            OperandKind::Con { val } => {
                self.load_const(val);
                Ok(())
            }
            OperandKind::Local { adr } => {
                match adr {
                    0 => self.emit(OpCode::Load0),
                    1 => self.emit(OpCode::Load1),
                    2 => self.emit(OpCode::Load2),
                    3 => self.emit(OpCode::Load3),
                    _ => {
                        self.emit(OpCode::Load);
                        self.put2(adr as i32);
                    }
                }
                Ok(())
            }
            OperandKind::Static { adr } => {
                self.emit(OpCode::GetStatic);
                self.put2(adr as i32);
                Ok(())
            }
            OperandKind::Stack => Ok(()),
            OperandKind::Fld { adr } => {
                self.emit(OpCode::GetField);
                self.put2(adr as i32);
                Ok(())
            }
            OperandKind::Elem => {
                self.emit(element_load(x.ty));
                Ok(())
            }
            OperandKind::Meth { .. } => Err(ErrorKind::NoVal),
        };
        x.kind = OperandKind::Stack;
        loaded
    }

    /// Pops the stack top into the location `x` denotes.
    pub fn store(&mut self, x: &Operand) -> Checked {
        match x.kind {
            OperandKind::Local { adr } => match adr {
                0 => self.emit(OpCode::Store0),
                1 => self.emit(OpCode::Store1),
                2 => self.emit(OpCode::Store2),
                3 => self.emit(OpCode::Store3),
                _ => {
                    self.emit(OpCode::Store);
                    self.put2(adr as i32);
                }
            },
            OperandKind::Static { adr } => {
                self.emit(OpCode::PutStatic);
                self.put2(adr as i32);
            }
            OperandKind::Fld { adr } => {
                self.emit(OpCode::PutField);
                self.put2(adr as i32);
            }
            OperandKind::Elem => self.emit(element_store(x.ty)),
            _ => return Err(ErrorKind::NoVar),
        }
        Ok(())
    }

    /// Loads `y`, combines it with the value below it when `op` is given,
    /// and stores the result into `x`.
    pub fn assign(&mut self, x: &Operand, y: &mut Operand, op: Option<OpCode>) -> Checked {
        self.load(y)?;
        if let Some(op) = op {
            self.emit(op);
        }
        self.store(x)
    }

    /// Pushes the current value of `x` for a compound assignment, keeping
    /// whatever `store` needs afterwards on the stack below it.
    pub fn load_for_compound(&mut self, x: &Operand) -> Checked {
        match x.kind {
            OperandKind::Local { .. } | OperandKind::Static { .. } => {
                let mut value = *x;
                self.load(&mut value)
            }
            OperandKind::Fld { adr } => {
                self.emit(OpCode::Dup);
                self.emit(OpCode::GetField);
                self.put2(adr as i32);
                Ok(())
            }
            OperandKind::Elem => {
                self.emit(OpCode::Dup2);
                self.emit(element_load(x.ty));
                Ok(())
            }
            _ => Err(ErrorKind::NoVar),
        }
    }

    /// `inc slot delta`
    pub fn inc_local(&mut self, adr: usize, delta: i32) {
        self.emit(OpCode::Inc);
        self.put(adr as u8);
        self.put(delta as i8 as u8);
    }

    /// Adds `delta` to a global, a field or an array element.
    pub fn inc_field_or_elem(&mut self, x: &Operand, delta: i32) -> Checked {
        match x.kind {
            OperandKind::Static { .. } => {}
            OperandKind::Fld { .. } => self.emit(OpCode::Dup),
            OperandKind::Elem => self.emit(OpCode::Dup2),
            _ => return Err(ErrorKind::NoVar),
        }
        let mut value = *x;
        self.load(&mut value)?;
        self.load_const(delta);
        self.emit(OpCode::Add);
        self.store(x)
    }

    // ========================================================================
    // Objects and arrays
    // ========================================================================

    /// `new size`
    pub fn new_object(&mut self, n_fields: usize) {
        self.emit(OpCode::New);
        self.put2(n_fields as i32);
    }

    /// Allocates an array. With `count`, the length is pushed first;
    /// otherwise it must already be on the stack.
    pub fn create_array(&mut self, count: Option<i32>, elem: TypeId) {
        if let Some(count) = count {
            self.load_const(count);
        }
        self.emit(OpCode::NewArray);
        self.put(if elem == TypeId::CHAR { 0 } else { 1 });
    }

    /// Stores into an array element of the given type.
    pub fn store_in_array(&mut self, elem: TypeId) {
        self.emit(element_store(elem));
    }

    // ========================================================================
    // Methods
    // ========================================================================

    /// `enter n_pars frame_size`
    pub fn enter(&mut self, n_pars: usize, frame_size: usize) {
        self.emit(OpCode::Enter);
        self.put(n_pars as u8);
        self.put(frame_size as u8);
    }

    /// Calls the method starting at `adr`.
    pub fn call(&mut self, adr: usize) -> Result<()> {
        self.emit(OpCode::Call);
        let pos = self.pc();
        self.put2(relative(adr, pos)?);
        Ok(())
    }

    // ========================================================================
    // Labels and jumps
    // ========================================================================

    /// Allocates a fresh pending label.
    pub fn new_label(&mut self) -> LabelId {
        self.labels.create()
    }

    /// State of a label.
    pub fn label(&self, id: LabelId) -> &Label {
        self.labels.get(id)
    }

    /// Writes the 2-byte operand of a jump to `id`.
    pub fn put_jump_target(&mut self, id: LabelId) -> Result<()> {
        let pos = self.pc();
        match self.labels.get_mut(id) {
            Label::Resolved(adr) => {
                let delta = relative(*adr, pos)?;
                self.put2(delta);
            }
            Label::Pending(fixups) => {
                fixups.push(pos);
                self.put2(0);
            }
        }
        Ok(())
    }

    /// Resolves a label at the current address and patches every jump
    /// already emitted to it.
    pub fn define_label(&mut self, id: LabelId) -> Result<()> {
        let pc = self.pc();
        let fixups = match self.labels.get_mut(id) {
            Label::Resolved(first) => {
                return Err(Error::LabelDefinedTwice {
                    first: *first,
                    second: pc,
                });
            }
            Label::Pending(fixups) => std::mem::take(fixups),
        };

        for &pos in &fixups {
            self.put2_at(pos, relative(pc, pos)?)?;
        }
        *self.labels.get_mut(id) = Label::Resolved(pc);
        tracing::trace!(pc, patched = fixups.len(), "label defined");
        Ok(())
    }

    /// `jmp label`
    pub fn jump(&mut self, id: LabelId) -> Result<()> {
        self.emit(OpCode::Jmp);
        self.put_jump_target(id)
    }

    /// Jumps to the false label unless the condition holds.
    pub fn f_jump(&mut self, x: &Cond) -> Result<()> {
        self.emit(x.op.inverse().jump());
        self.put_jump_target(x.f_label)
    }

    /// Jumps to the true label if the condition holds.
    pub fn t_jump(&mut self, x: &Cond) -> Result<()> {
        self.emit(x.op.jump());
        self.put_jump_target(x.t_label)
    }

    /// Completes the image. Fails if any jump still waits for its label.
    pub fn finish(self) -> Result<ObjectCode> {
        let unpatched = self.labels.unpatched();
        if unpatched > 0 {
            return Err(Error::UnpatchedJumps(unpatched));
        }
        Ok(ObjectCode {
            code: self.buf,
            data_size: self.data_size,
            main_pc: self.main_pc,
        })
    }
}

/// Distance from the end of the operand at `operand_pos` to `target`.
fn relative(target: usize, operand_pos: usize) -> Result<i32> {
    let delta = target as i64 - (operand_pos as i64 + 2);
    i16::try_from(delta)
        .map(i32::from)
        .map_err(|_| Error::JumpOutOfRange {
            pos: operand_pos,
            delta,
        })
}

fn element_load(elem: TypeId) -> OpCode {
    if elem == TypeId::CHAR {
        OpCode::BALoad
    } else {
        OpCode::ALoad
    }
}

fn element_store(elem: TypeId) -> OpCode {
    if elem == TypeId::CHAR {
        OpCode::BAStore
    } else {
        OpCode::AStore
    }
}
