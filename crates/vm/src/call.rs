//! CALL/RET: subroutine linkage between named blocks.
//!
//! A call gets an empty variable scope; the caller's variables are parked in
//! the call frame and put back wholesale on return. The operand stack is
//! shared, so arguments and results travel on it.

use stackvm_common::{Opcode, Value};
use tracing::debug;

use crate::error::RuntimeError;
use crate::execute::Flow;
use crate::io::{InputSource, OutputSink};
use crate::machine::{CallFrame, VM};

impl<'a, I: InputSource, O: OutputSink> VM<'a, I, O> {
    /// Pop a block name and enter that block.
    pub(crate) fn exec_call(&mut self) -> Result<Flow, RuntimeError> {
        let at = self.state.pc;
        if !self.program.is_multi_block() {
            return Err(RuntimeError::NotMultiBlock { at });
        }

        let callee = self.pop()?;
        let name = match callee {
            Value::Text(name) => name,
            other => return Err(self.type_mismatch(Opcode::Call, &[&other])),
        };

        let program = self.program;
        let code = program
            .block(&name)
            .ok_or_else(|| RuntimeError::UnknownBlock {
                at,
                name: name.clone(),
            })?;

        if let Some(limit) = self.config.max_call_depth {
            if self.state.call_stack.len() >= limit {
                return Err(RuntimeError::CallDepthExceeded { at, limit });
            }
        }

        let caller = std::mem::replace(&mut self.state.block, name);
        let saved_variables = std::mem::take(&mut self.state.variables);
        debug!(
            from = %caller,
            to = %self.state.block,
            depth = self.state.call_stack.len() + 1,
            "call"
        );
        self.state.call_stack.push(CallFrame {
            block: caller,
            return_pc: at,
            saved_variables,
        });
        self.code = code;

        Ok(Flow::Enter)
    }

    pub(crate) fn exec_ret(&mut self) -> Result<Flow, RuntimeError> {
        let call_pc = self.leave_block(self.state.pc)?;
        Ok(Flow::Resume(call_pc))
    }

    /// Pop the innermost frame and restore the caller's block and variables.
    ///
    /// Returns the index of the CALL being returned from.
    pub(crate) fn leave_block(&mut self, at: usize) -> Result<usize, RuntimeError> {
        let frame = self
            .state
            .call_stack
            .pop()
            .ok_or(RuntimeError::EmptyCallStack { at })?;

        let program = self.program;
        let code = program
            .block(&frame.block)
            .ok_or_else(|| RuntimeError::UnknownBlock {
                at,
                name: frame.block.clone(),
            })?;

        debug!(
            from = %self.state.block,
            to = %frame.block,
            depth = self.state.call_stack.len(),
            "return"
        );
        self.code = code;
        self.state.block = frame.block;
        self.state.variables = frame.saved_variables;

        Ok(frame.return_pc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{CapturedOutput, NoInput};
    use crate::VmConfig;
    use stackvm_common::{Instruction, Program};
    use std::collections::BTreeMap;

    fn program(blocks: Vec<(&str, Vec<Instruction>)>) -> Program {
        let map: BTreeMap<_, _> = blocks
            .into_iter()
            .map(|(name, code)| (name.to_string(), code))
            .collect();
        Program::with_blocks(map).unwrap()
    }

    fn call_block(name: &str) -> [Instruction; 2] {
        [
            Instruction::unary(Opcode::LoadConst, format!("\"{name}\"")),
            Instruction::bare(Opcode::Call),
        ]
    }

    #[test]
    fn call_pushes_frame_and_switches_block() {
        let [load, call] = call_block("sub");
        let p = program(vec![
            ("main", vec![load, call]),
            ("sub", vec![Instruction::bare(Opcode::Ret)]),
        ]);
        let mut vm = VM::new(&p, NoInput, CapturedOutput::new()).unwrap();
        vm.step().unwrap();
        vm.step().unwrap();
        assert_eq!(vm.block(), "sub");
        assert_eq!(vm.pc(), 0);
        assert_eq!(vm.call_depth(), 1);
        assert_eq!(vm.state().call_stack[0].return_pc, 1);
        assert_eq!(vm.state().call_stack[0].block, "main");

        vm.step().unwrap();
        assert_eq!(vm.block(), "main");
        assert_eq!(vm.pc(), 2);
        assert_eq!(vm.call_depth(), 0);
        assert!(vm.is_halted());
    }

    #[test]
    fn ret_without_call_fails() {
        let p = Program::flat(vec![Instruction::bare(Opcode::Ret)]);
        let mut vm = VM::new(&p, NoInput, CapturedOutput::new()).unwrap();
        assert_eq!(vm.execute(), Err(RuntimeError::EmptyCallStack { at: 0 }));
    }

    #[test]
    fn call_on_flat_program_fails() {
        let [load, call] = call_block("main");
        let p = Program::flat(vec![load, call]);
        let mut vm = VM::new(&p, NoInput, CapturedOutput::new()).unwrap();
        assert_eq!(vm.execute(), Err(RuntimeError::NotMultiBlock { at: 1 }));
    }

    #[test]
    fn call_unknown_block_fails() {
        let [load, call] = call_block("nowhere");
        let p = program(vec![("main", vec![load, call])]);
        let mut vm = VM::new(&p, NoInput, CapturedOutput::new()).unwrap();
        assert_eq!(
            vm.execute(),
            Err(RuntimeError::UnknownBlock {
                at: 1,
                name: "nowhere".to_string()
            })
        );
    }

    #[test]
    fn call_requires_text_callee() {
        let p = program(vec![(
            "main",
            vec![
                Instruction::unary(Opcode::LoadConst, "3"),
                Instruction::bare(Opcode::Call),
            ],
        )]);
        let mut vm = VM::new(&p, NoInput, CapturedOutput::new()).unwrap();
        assert_eq!(
            vm.execute(),
            Err(RuntimeError::TypeMismatch {
                at: 1,
                op: Opcode::Call,
                operands: "integer".to_string()
            })
        );
    }

    #[test]
    fn falling_off_callee_returns_implicitly() {
        let [load, call] = call_block("sub");
        let p = program(vec![
            ("main", vec![load, call, Instruction::unary(Opcode::LoadConst, "2")]),
            ("sub", vec![Instruction::unary(Opcode::LoadConst, "1")]),
        ]);
        let mut vm = VM::new(&p, NoInput, CapturedOutput::new()).unwrap();
        vm.execute().unwrap();
        assert_eq!(vm.stack(), [Value::Int(1), Value::Int(2)]);
        assert_eq!(vm.call_depth(), 0);
    }

    #[test]
    fn recursion_bounded_by_call_depth() {
        let [load, call] = call_block("main");
        let p = program(vec![("main", vec![load, call])]);
        let mut vm = VM::new(&p, NoInput, CapturedOutput::new())
            .unwrap()
            .with_config(VmConfig::default().with_max_call_depth(5));
        assert_eq!(
            vm.execute(),
            Err(RuntimeError::CallDepthExceeded { at: 1, limit: 5 })
        );
        assert_eq!(vm.call_depth(), 5);
    }
}
