//! Runtime errors for the stackvm machine.
//!
//! Every error is fatal: the run stops at the first one. Errors raised while
//! executing an instruction carry its index in the active block (`at`).

use stackvm_common::Opcode;
use thiserror::Error;

/// Errors that occur while resolving or executing a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Pop on an empty operand stack.
    #[error("stack underflow at instruction {at}")]
    StackUnderflow { at: usize },

    /// LOAD_VAR of a name with no binding in the current scope.
    #[error("undefined variable '{name}' at instruction {at}")]
    UndefinedVariable { at: usize, name: String },

    /// JMP/CJMP to a label the current block does not define.
    #[error("undefined label '{label}' in block '{block}' at instruction {at}")]
    UndefinedLabel {
        at: usize,
        block: String,
        label: String,
    },

    /// RET with no matching CALL.
    #[error("return with empty call stack at instruction {at}")]
    EmptyCallStack { at: usize },

    /// LOAD_CONST argument is neither quoted text, an integer nor a float.
    #[error("cannot parse literal '{literal}' at instruction {at}")]
    LiteralParse { at: usize, literal: String },

    /// DIV with a zero divisor.
    #[error("division by zero at instruction {at}")]
    DivisionByZero { at: usize },

    /// SQRT of a negative number.
    #[error("square root of negative number at instruction {at}")]
    NegativeSqrt { at: usize },

    /// Integer overflow, or EXP of a finite value overflowing to infinity.
    #[error("{op} overflowed at instruction {at}")]
    Overflow { at: usize, op: Opcode },

    /// Operator applied to operand kinds it has no meaning for.
    #[error("{op} is not defined for {operands} at instruction {at}")]
    TypeMismatch {
        at: usize,
        op: Opcode,
        operands: String,
    },

    /// Instruction lacks an argument it needs.
    #[error("{op} requires an argument at instruction {at}")]
    MissingArgument { at: usize, op: Opcode },

    /// CALL names a block the program does not have.
    #[error("unknown block '{name}' at instruction {at}")]
    UnknownBlock { at: usize, name: String },

    /// CALL in a single-block program.
    #[error("CALL requires a multi-block program at instruction {at}")]
    NotMultiBlock { at: usize },

    /// INPUT_NUMBER read something that is not a number.
    #[error("invalid number input '{input}' at instruction {at}")]
    InvalidNumberInput { at: usize, input: String },

    /// The input collaborator failed.
    #[error("input failed at instruction {at}: {message}")]
    InputFailed { at: usize, message: String },

    /// Call depth reached the configured limit.
    #[error("call depth limit {limit} exceeded at instruction {at}")]
    CallDepthExceeded { at: usize, limit: usize },

    /// The configured step budget ran out before the program halted.
    #[error("step limit {limit} exceeded")]
    StepLimitExceeded { limit: u64 },
}

/// Broad category of a [`RuntimeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    StackUnderflow,
    UndefinedVariable,
    UndefinedLabel,
    EmptyCallStack,
    LiteralParseError,
    ArithmeticDomainError,
    TypeMismatch,
    /// Malformed instruction or block reference.
    Structure,
    /// Failure reading from the input collaborator.
    Input,
    /// A configured resource limit.
    Limit,
}

impl RuntimeError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::StackUnderflow { .. } => ErrorKind::StackUnderflow,
            RuntimeError::UndefinedVariable { .. } => ErrorKind::UndefinedVariable,
            RuntimeError::UndefinedLabel { .. } => ErrorKind::UndefinedLabel,
            RuntimeError::EmptyCallStack { .. } => ErrorKind::EmptyCallStack,
            RuntimeError::LiteralParse { .. } => ErrorKind::LiteralParseError,
            RuntimeError::DivisionByZero { .. }
            | RuntimeError::NegativeSqrt { .. }
            | RuntimeError::Overflow { .. } => ErrorKind::ArithmeticDomainError,
            RuntimeError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            RuntimeError::MissingArgument { .. }
            | RuntimeError::UnknownBlock { .. }
            | RuntimeError::NotMultiBlock { .. } => ErrorKind::Structure,
            RuntimeError::InvalidNumberInput { .. } | RuntimeError::InputFailed { .. } => {
                ErrorKind::Input
            }
            RuntimeError::CallDepthExceeded { .. } | RuntimeError::StepLimitExceeded { .. } => {
                ErrorKind::Limit
            }
        }
    }
}
