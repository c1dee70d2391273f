//! VM state management: operand stack, variables, call stack, label tables.

use std::collections::HashMap;

use stackvm_common::{Instruction, Program, Value};
use tracing::debug;

use crate::config::VmConfig;
use crate::error::RuntimeError;
use crate::io::{InputSource, OutputSink};
use crate::labels::{resolve_program, LabelTable};

/// Variable environment: name → value.
pub type Variables = HashMap<String, Value>;

/// Saved caller context, pushed by CALL and popped by RET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame {
    /// Block that executed the CALL.
    pub block: String,
    /// Index of the CALL instruction. Execution resumes just after it.
    pub return_pc: usize,
    /// The caller's variables at the time of the call.
    pub saved_variables: Variables,
}

/// Everything a run mutates.
///
/// `pc` is always a valid index into the active block or equal to its
/// length, which means the block has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionState {
    /// Name of the active block.
    pub block: String,
    /// Instruction pointer into the active block.
    pub pc: usize,
    /// Operand stack.
    pub stack: Vec<Value>,
    /// Variables of the current scope.
    pub variables: Variables,
    /// Frames of unreturned CALLs.
    pub call_stack: Vec<CallFrame>,
}

impl ExecutionState {
    /// Fresh state positioned at the start of `block`.
    pub fn new(block: impl Into<String>) -> Self {
        Self {
            block: block.into(),
            pc: 0,
            stack: Vec::new(),
            variables: Variables::new(),
            call_stack: Vec::new(),
        }
    }
}

/// Result of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// An instruction ran; more may follow.
    Continue,
    /// The entry block finished with no pending calls.
    Halted,
}

/// The stackvm virtual machine.
///
/// Generic over its input and output collaborators; pass `&mut` references
/// to keep ownership of them.
pub struct VM<'a, I, O> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    /// Instructions of the active block.
    pub(crate) code: &'a [Instruction],
    /// Label table per block, built at load.
    pub(crate) labels: HashMap<String, LabelTable>,
    pub(crate) state: ExecutionState,
    pub(crate) input: I,
    pub(crate) output: O,
    pub(crate) config: VmConfig,
    /// Instructions executed so far.
    pub(crate) steps: u64,
}

impl<'a, I: InputSource, O: OutputSink> VM<'a, I, O> {
    /// Create a VM positioned at the start of the entry block.
    ///
    /// Every block's labels are resolved here, so a malformed LABEL in a
    /// block that is only reached through CALL is reported up front.
    pub fn new(program: &'a Program, input: I, output: O) -> Result<Self, RuntimeError> {
        let labels = resolve_program(program)?;
        debug!(
            blocks = program.block_count(),
            instructions = program.instruction_count(),
            labels = labels.values().map(HashMap::len).sum::<usize>(),
            "program loaded"
        );
        Ok(Self {
            program,
            code: program.entry_block(),
            labels,
            state: ExecutionState::new(program.entry_name()),
            input,
            output,
            config: VmConfig::default(),
            steps: 0,
        })
    }

    /// Apply execution limits.
    pub fn with_config(mut self, config: VmConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed the operand stack and variables, e.g. from snapshots.
    pub fn with_state(mut self, stack: Vec<Value>, variables: Variables) -> Self {
        self.state.stack = stack;
        self.state.variables = variables;
        self
    }

    /// Current execution state.
    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    /// Operand stack, bottom first.
    pub fn stack(&self) -> &[Value] {
        &self.state.stack
    }

    /// Variables of the current scope.
    pub fn variables(&self) -> &Variables {
        &self.state.variables
    }

    /// Instruction pointer into the active block.
    pub fn pc(&self) -> usize {
        self.state.pc
    }

    /// Name of the active block.
    pub fn block(&self) -> &str {
        &self.state.block
    }

    /// Number of unreturned CALLs.
    pub fn call_depth(&self) -> usize {
        self.state.call_stack.len()
    }

    /// Instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Active limits.
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// The input collaborator.
    pub fn input(&self) -> &I {
        &self.input
    }

    /// The output collaborator.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Whether the entry block has finished with no pending calls.
    pub fn is_halted(&self) -> bool {
        self.state.pc >= self.code.len() && self.state.call_stack.is_empty()
    }

    /// Consume the VM, keeping its final state.
    pub fn into_state(self) -> ExecutionState {
        self.state
    }

    /// Push a value onto the operand stack. The stack is unbounded.
    pub(crate) fn push(&mut self, value: Value) {
        self.state.stack.push(value);
    }

    /// Pop a value from the operand stack.
    pub(crate) fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.state
            .stack
            .pop()
            .ok_or(RuntimeError::StackUnderflow { at: self.state.pc })
    }

    /// Label table of the active block.
    pub(crate) fn current_labels(&self) -> Option<&LabelTable> {
        self.labels.get(&self.state.block)
    }
}
