//! stackvm common types.
//!
//! This crate provides the data structures shared by the front-ends and the
//! virtual machine:
//!
//! - [`Opcode`]: the closed set of operations
//! - [`Instruction`]: an opcode plus raw argument tokens
//! - [`Value`]: runtime values (integer, float, text)
//! - [`Program`]: a single code block or a named collection of blocks
//! - [`ProgramError`]: errors from building instructions and programs
//!
//! # Dependencies
//!
//! `thiserror` for error derives and `serde` so that values can be persisted
//! by the VM's snapshot support.

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod value;

// Re-export commonly used types at the crate root.
pub use error::ProgramError;
pub use instruction::{is_quoted, strip_quotes, Instruction};
pub use opcode::Opcode;
pub use program::{CodeBlock, Program, ENTRY_BLOCK};
pub use value::Value;
