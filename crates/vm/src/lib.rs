//! stackvm virtual machine: executes stackvm programs.
//!
//! The VM is a stack-based machine with:
//! - An operand stack shared by every block
//! - A named variable environment, one per active call
//! - A call stack of frames saved by CALL and restored by RET
//! - A label table per block, resolved before execution starts
//!
//! # Usage
//!
//! ```
//! use stackvm_common::{Instruction, Opcode, Program, Value};
//! use stackvm_vm::{run, CapturedOutput, NoInput};
//!
//! let program = Program::flat(vec![
//!     Instruction::unary(Opcode::LoadConst, "40"),
//!     Instruction::unary(Opcode::LoadConst, "2"),
//!     Instruction::bare(Opcode::Add),
//! ]);
//!
//! let state = run(&program, NoInput, CapturedOutput::new()).unwrap();
//! assert_eq!(state.stack, vec![Value::Int(42)]);
//! ```

mod call;
pub mod config;
pub mod error;
pub mod execute;
pub mod io;
pub mod labels;
pub mod machine;
pub mod snapshot;

pub use config::VmConfig;
pub use error::{ErrorKind, RuntimeError};
pub use io::{CapturedOutput, Console, InputSource, NoInput, OutputSink, ScriptedInput};
pub use labels::{resolve_labels, LabelTable};
pub use machine::{CallFrame, ExecutionState, Step, Variables, VM};
pub use snapshot::SnapshotError;

use stackvm_common::Program;

/// Execute a program to completion and return its final state.
///
/// This is the primary entry point for the VM. It:
/// 1. Resolves the label table of every block
/// 2. Starts at index 0 of the entry block
/// 3. Executes until the entry block runs off its end
/// 4. Returns the operand stack and variables left behind
///
/// # Errors
///
/// Returns [`RuntimeError`] on the first failing instruction (stack
/// underflow, undefined variable or label, division by zero, etc.).
pub fn run<I, O>(program: &Program, input: I, output: O) -> Result<ExecutionState, RuntimeError>
where
    I: InputSource,
    O: OutputSink,
{
    let mut vm = VM::new(program, input, output)?;
    vm.execute()?;
    Ok(vm.into_state())
}
