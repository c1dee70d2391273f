//! Opcode definitions for the stackvm instruction set.

use std::fmt;
use std::str::FromStr;

use crate::error::ProgramError;

/// Identifies the operation an instruction performs.
///
/// The set is closed: every mnemonic accepted by a front-end maps to exactly
/// one variant, and the dispatch loop matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Constants and I/O
    /// Push the literal given as the first argument.
    LoadConst,
    /// Read a line from the input collaborator, push it as text.
    InputString,
    /// Read a line from the input collaborator, push it as a float.
    InputNumber,
    /// Pop a value and hand it to the output collaborator.
    Print,

    // Variables
    /// Push the value bound to the named variable.
    LoadVar,
    /// Pop a value and bind it to the named variable.
    StoreVar,

    // Arithmetic
    /// Pop `a` (top), pop `b`, push `a + b`.
    Add,
    /// Pop `a` (top), pop `b`, push `a - b`.
    Sub,
    /// Pop `a` (top), pop `b`, push `a * b`.
    Mul,
    /// Pop `a` (top), pop `b`, push `a / b` (always a float).
    Div,
    /// Pop `a`, push `e^a`.
    Exp,
    /// Pop `a`, push the square root of `a`.
    Sqrt,
    /// Pop `a`, push `-a`.
    Neg,

    // Comparison. Same operand order as arithmetic; result is integer 1 or 0.
    /// `a == b`
    Eq,
    /// `a != b`
    Neq,
    /// `a > b`
    Gt,
    /// `a < b`
    Lt,
    /// `a >= b`
    Ge,
    /// `a <= b`
    Le,

    // Control flow
    /// Marks a jump target. No runtime effect.
    Label,
    /// Unconditional jump to a label in the current block.
    Jmp,
    /// Pop a condition, jump if it is the integer 1.
    Cjmp,
    /// Pop a block name and enter that block with a fresh variable scope.
    Call,
    /// Return to the caller, restoring its variables.
    Ret,
}

/// All opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 24] = [
    Opcode::LoadConst,
    Opcode::InputString,
    Opcode::InputNumber,
    Opcode::Print,
    Opcode::LoadVar,
    Opcode::StoreVar,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Exp,
    Opcode::Sqrt,
    Opcode::Neg,
    Opcode::Eq,
    Opcode::Neq,
    Opcode::Gt,
    Opcode::Lt,
    Opcode::Ge,
    Opcode::Le,
    Opcode::Label,
    Opcode::Jmp,
    Opcode::Cjmp,
    Opcode::Call,
    Opcode::Ret,
];

impl Opcode {
    /// Returns the source mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::LoadConst => "LOAD_CONST",
            Opcode::InputString => "INPUT_STRING",
            Opcode::InputNumber => "INPUT_NUMBER",
            Opcode::Print => "PRINT",
            Opcode::LoadVar => "LOAD_VAR",
            Opcode::StoreVar => "STORE_VAR",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Exp => "EXP",
            Opcode::Sqrt => "SQRT",
            Opcode::Neg => "NEG",
            Opcode::Eq => "EQ",
            Opcode::Neq => "NEQ",
            Opcode::Gt => "GT",
            Opcode::Lt => "LT",
            Opcode::Ge => "GE",
            Opcode::Le => "LE",
            Opcode::Label => "LABEL",
            Opcode::Jmp => "JMP",
            Opcode::Cjmp => "CJMP",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
        }
    }

    /// Net operand-stack effect of one execution, as `(pops, pushes)`.
    ///
    /// CALL and RET are listed with their own pop only; what the callee does
    /// to the stack is not knowable from the instruction alone.
    pub fn stack_effect(&self) -> (usize, usize) {
        match self {
            Opcode::LoadConst | Opcode::InputString | Opcode::InputNumber | Opcode::LoadVar => {
                (0, 1)
            }
            Opcode::Print | Opcode::StoreVar | Opcode::Cjmp | Opcode::Call => (1, 0),
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Eq
            | Opcode::Neq
            | Opcode::Gt
            | Opcode::Lt
            | Opcode::Ge
            | Opcode::Le => (2, 1),
            Opcode::Exp | Opcode::Sqrt | Opcode::Neg => (1, 1),
            Opcode::Label | Opcode::Jmp | Opcode::Ret => (0, 0),
        }
    }

    /// Whether this opcode reads its first argument token.
    pub fn takes_argument(&self) -> bool {
        matches!(
            self,
            Opcode::LoadConst
                | Opcode::LoadVar
                | Opcode::StoreVar
                | Opcode::Label
                | Opcode::Jmp
                | Opcode::Cjmp
        )
    }
}

impl FromStr for Opcode {
    type Err = ProgramError;

    /// Parse a mnemonic. Matching ignores ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        ALL_OPCODES
            .iter()
            .copied()
            .find(|op| op.mnemonic() == upper)
            .ok_or_else(|| ProgramError::UnknownOpcode(s.to_string()))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
