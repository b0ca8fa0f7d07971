// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The MicroJava instruction set.

mj_macros::opcodes! {
    /// Operation codes of the MicroJava virtual machine.
    pub enum OpCode {
        // Locals and statics
        /// Push local slot (2-byte slot)
        Load = 1 ("load") [2],
        /// Push local slot 0
        Load0 = 2 ("load_0") [],
        /// Push local slot 1
        Load1 = 3 ("load_1") [],
        /// Push local slot 2
        Load2 = 4 ("load_2") [],
        /// Push local slot 3
        Load3 = 5 ("load_3") [],
        /// Pop into local slot (2-byte slot)
        Store = 6 ("store") [2],
        /// Pop into local slot 0
        Store0 = 7 ("store_0") [],
        /// Pop into local slot 1
        Store1 = 8 ("store_1") [],
        /// Pop into local slot 2
        Store2 = 9 ("store_2") [],
        /// Pop into local slot 3
        Store3 = 10 ("store_3") [],
        /// Push global
        GetStatic = 11 ("getstatic") [2],
        /// Pop into global
        PutStatic = 12 ("putstatic") [2],
        /// Replace object reference by field value
        GetField = 13 ("getfield") [2],
        /// Pop value and object reference, store field
        PutField = 14 ("putfield") [2],

        // Constants
        /// Push 0
        Const0 = 15 ("const_0") [],
        /// Push 1
        Const1 = 16 ("const_1") [],
        /// Push 2
        Const2 = 17 ("const_2") [],
        /// Push 3
        Const3 = 18 ("const_3") [],
        /// Push 4
        Const4 = 19 ("const_4") [],
        /// Push 5
        Const5 = 20 ("const_5") [],
        /// Push -1
        ConstM1 = 21 ("const_m1") [],
        /// Push a 4-byte constant
        Const = 22 ("const") [4],

        // Arithmetic
        /// Pop two values, push their sum
        Add = 23 ("add") [],
        /// Pop two values, push their difference
        Sub = 24 ("sub") [],
        /// Pop two values, push their product
        Mul = 25 ("mul") [],
        /// Pop two values, push their quotient
        Div = 26 ("div") [],
        /// Pop two values, push the remainder
        Rem = 27 ("rem") [],
        /// Negate the stack top
        Neg = 28 ("neg") [],
        /// Shift left
        Shl = 29 ("shl") [],
        /// Arithmetic shift right
        Shr = 30 ("shr") [],
        /// Add a signed byte to a local slot
        Inc = 31 ("inc") [1, 1],

        // Objects and arrays
        /// Allocate an object with the given number of words
        New = 32 ("new") [2],
        /// Allocate an array: 0 = char elements, 1 = word elements
        NewArray = 33 ("newarray") [1],
        /// Push a word array element
        ALoad = 34 ("aload") [],
        /// Store a word array element
        AStore = 35 ("astore") [],
        /// Push a char array element
        BALoad = 36 ("baload") [],
        /// Store a char array element
        BAStore = 37 ("bastore") [],
        /// Replace an array reference by its length
        ArrayLength = 38 ("arraylength") [],

        // Stack
        /// Discard the stack top
        Pop = 39 ("pop") [],
        /// Duplicate the stack top
        Dup = 40 ("dup") [],
        /// Duplicate the top two values
        Dup2 = 41 ("dup2") [],

        // Jumps, relative to the end of the instruction
        /// Unconditional jump
        Jmp = 42 ("jmp") [2],
        /// Jump if equal
        Jeq = 43 ("jeq") [2],
        /// Jump if not equal
        Jne = 44 ("jne") [2],
        /// Jump if less
        Jlt = 45 ("jlt") [2],
        /// Jump if less or equal
        Jle = 46 ("jle") [2],
        /// Jump if greater
        Jgt = 47 ("jgt") [2],
        /// Jump if greater or equal
        Jge = 48 ("jge") [2],

        // Methods
        /// Call, relative to the end of the instruction
        Call = 49 ("call") [2],
        /// Return to the caller
        Return = 50 ("return") [],
        /// Build a frame: parameter count, frame size
        Enter = 51 ("enter") [1, 1],
        /// Tear down the frame
        Exit = 52 ("exit") [],

        // I/O
        /// Read an int
        Read = 53 ("read") [],
        /// Print an int with a field width
        Print = 54 ("print") [],
        /// Read a char
        BRead = 55 ("bread") [],
        /// Print a char with a field width
        BPrint = 56 ("bprint") [],

        /// Abort with an error code
        Trap = 57 ("trap") [1],
        /// Do nothing
        Nop = 58 ("nop") [],
    }
}

impl OpCode {
    /// Returns true for `jmp` and the conditional jumps.
    pub fn is_jump(&self) -> bool {
        (*self as u8) >= (OpCode::Jmp as u8) && (*self as u8) <= (OpCode::Jge as u8)
    }
}

/// Relational operators, in the order of the conditional jump opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompOp {
    /// The operator that holds exactly when `self` does not.
    pub fn inverse(self) -> Self {
        match self {
            CompOp::Eq => CompOp::Ne,
            CompOp::Ne => CompOp::Eq,
            CompOp::Lt => CompOp::Ge,
            CompOp::Le => CompOp::Gt,
            CompOp::Gt => CompOp::Le,
            CompOp::Ge => CompOp::Lt,
        }
    }

    /// The conditional jump taken when the comparison holds.
    pub fn jump(self) -> OpCode {
        match self {
            CompOp::Eq => OpCode::Jeq,
            CompOp::Ne => OpCode::Jne,
            CompOp::Lt => OpCode::Jlt,
            CompOp::Le => OpCode::Jle,
            CompOp::Gt => OpCode::Jgt,
            CompOp::Ge => OpCode::Jge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_values() {
        assert_eq!(OpCode::Load as u8, 1);
        assert_eq!(OpCode::Const as u8, 22);
        assert_eq!(OpCode::Jmp as u8, 42);
        assert_eq!(OpCode::Nop as u8, 58);
        assert_eq!(OpCode::all().len(), 58);
    }

    #[test]
    fn test_operand_sizes() {
        assert_eq!(OpCode::Load0.size(), 1);
        assert_eq!(OpCode::Const.size(), 5);
        assert_eq!(OpCode::Inc.size(), 3);
        assert_eq!(OpCode::Enter.size(), 3);
        assert_eq!(OpCode::Jge.size(), 3);
    }

    #[test]
    fn test_inverse_is_involution() {
        for op in [CompOp::Eq, CompOp::Ne, CompOp::Lt, CompOp::Le, CompOp::Gt, CompOp::Ge] {
            assert_eq!(op.inverse().inverse(), op);
            assert_ne!(op.inverse(), op);
        }
    }

    #[test]
    fn test_jump_opcodes() {
        assert_eq!(CompOp::Eq.jump(), OpCode::Jeq);
        assert_eq!(CompOp::Ge.jump(), OpCode::Jge);
        assert!(CompOp::Lt.jump().is_jump());
        assert!(OpCode::Jmp.is_jump());
        assert!(!OpCode::Call.is_jump());
    }

    #[test]
    fn test_unknown_byte() {
        assert_eq!(OpCode::try_from(0u8), Err(0));
        assert_eq!(OpCode::try_from(59u8), Err(59));
        assert_eq!(OpCode::try_from(49u8), Ok(OpCode::Call));
    }
}
