//! Main execution loop and opcode dispatch.
//!
//! Every step runs one instruction and then moves the instruction pointer.
//! The default is `pc + 1`. A jump first sets the pointer to the LABEL's
//! index and then applies the same `+ 1`, so execution continues with the
//! instruction after the label. CALL starts the callee at index 0 and RET
//! resumes just after the CALL.

use std::cmp::Ordering;

use stackvm_common::{Instruction, Opcode, Value};
use tracing::{debug, trace};

use crate::config::{NUMBER_PROMPT, STRING_PROMPT};
use crate::error::RuntimeError;
use crate::io::{InputSource, OutputSink};
use crate::machine::{Step, VM};

/// How the instruction pointer moves after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Fall through to `pc + 1`.
    Next,
    /// Jumped to the LABEL at this index; continue after it.
    Jump(usize),
    /// Entered a new block; start at its first instruction.
    Enter,
    /// Returned to the CALL at this index; continue after it.
    Resume(usize),
}

impl<'a, I: InputSource, O: OutputSink> VM<'a, I, O> {
    /// Run until the entry block finishes.
    pub fn execute(&mut self) -> Result<(), RuntimeError> {
        debug!(entry = %self.state.block, "run started");
        while self.step()? == Step::Continue {}
        debug!(
            steps = self.steps,
            stack_depth = self.state.stack.len(),
            "run finished"
        );
        Ok(())
    }

    /// Execute at most `max_steps` instructions.
    ///
    /// Returns [`Step::Halted`] if the program finished, otherwise
    /// [`Step::Continue`]. This is how a caller bounds a program that may
    /// never terminate.
    pub fn run_for(&mut self, max_steps: u64) -> Result<Step, RuntimeError> {
        for _ in 0..max_steps {
            if self.step()? == Step::Halted {
                return Ok(Step::Halted);
            }
        }
        Ok(if self.is_halted() {
            Step::Halted
        } else {
            Step::Continue
        })
    }

    /// Execute exactly one instruction.
    ///
    /// Reaching the end of a called block without RET returns to the caller
    /// as if RET had been executed; that transition is not counted as a step.
    pub fn step(&mut self) -> Result<Step, RuntimeError> {
        if self.state.pc >= self.code.len() {
            if self.state.call_stack.is_empty() {
                return Ok(Step::Halted);
            }
            debug!(block = %self.state.block, "block ended without RET");
            let call_pc = self.leave_block(self.state.pc)?;
            self.state.pc = call_pc + 1;
            return Ok(Step::Continue);
        }

        if let Some(limit) = self.config.max_steps {
            if self.steps >= limit {
                return Err(RuntimeError::StepLimitExceeded { limit });
            }
        }

        let code = self.code;
        let instr = &code[self.state.pc];
        trace!(
            block = %self.state.block,
            pc = self.state.pc,
            op = %instr.opcode,
            depth = self.state.stack.len(),
            "execute"
        );

        let flow = self.dispatch(instr)?;
        self.steps += 1;
        self.state.pc = match flow {
            Flow::Next => self.state.pc + 1,
            Flow::Jump(label_pc) => label_pc + 1,
            Flow::Enter => 0,
            Flow::Resume(call_pc) => call_pc + 1,
        };
        Ok(Step::Continue)
    }

    fn dispatch(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        match instr.opcode {
            // Constants and I/O
            Opcode::LoadConst => self.exec_load_const(instr)?,
            Opcode::InputString => self.exec_input_string()?,
            Opcode::InputNumber => self.exec_input_number()?,
            Opcode::Print => self.exec_print()?,

            // Variables
            Opcode::LoadVar => self.exec_load_var(instr)?,
            Opcode::StoreVar => self.exec_store_var(instr)?,

            // Arithmetic
            Opcode::Add => self.exec_binary_arith(Opcode::Add, i64::checked_add, |a, b| a + b)?,
            Opcode::Sub => self.exec_binary_arith(Opcode::Sub, i64::checked_sub, |a, b| a - b)?,
            Opcode::Mul => self.exec_binary_arith(Opcode::Mul, i64::checked_mul, |a, b| a * b)?,
            Opcode::Div => self.exec_div()?,
            Opcode::Exp => self.exec_exp()?,
            Opcode::Sqrt => self.exec_sqrt()?,
            Opcode::Neg => self.exec_neg()?,

            // Comparison
            Opcode::Eq => self.exec_comparison(Opcode::Eq, |o| o == Some(Ordering::Equal))?,
            Opcode::Neq => self.exec_comparison(Opcode::Neq, |o| o != Some(Ordering::Equal))?,
            Opcode::Gt => self.exec_comparison(Opcode::Gt, |o| o == Some(Ordering::Greater))?,
            Opcode::Lt => self.exec_comparison(Opcode::Lt, |o| o == Some(Ordering::Less))?,
            Opcode::Ge => self.exec_comparison(Opcode::Ge, |o| {
                matches!(o, Some(Ordering::Greater | Ordering::Equal))
            })?,
            Opcode::Le => self.exec_comparison(Opcode::Le, |o| {
                matches!(o, Some(Ordering::Less | Ordering::Equal))
            })?,

            // Control flow
            Opcode::Label => {}
            Opcode::Jmp => return self.exec_jmp(instr),
            Opcode::Cjmp => return self.exec_cjmp(instr),
            Opcode::Call => return self.exec_call(),
            Opcode::Ret => return self.exec_ret(),
        }
        Ok(Flow::Next)
    }

    // ---- Constants and I/O ----

    fn exec_load_const(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let at = self.state.pc;
        let token = instr.arg(0).ok_or(RuntimeError::MissingArgument {
            at,
            op: Opcode::LoadConst,
        })?;
        let value = Value::parse_literal(token).ok_or_else(|| RuntimeError::LiteralParse {
            at,
            literal: token.to_string(),
        })?;
        self.push(value);
        Ok(())
    }

    fn exec_input_string(&mut self) -> Result<(), RuntimeError> {
        let line = self.read_input(STRING_PROMPT)?;
        self.push(Value::Text(line));
        Ok(())
    }

    fn exec_input_number(&mut self) -> Result<(), RuntimeError> {
        let line = self.read_input(NUMBER_PROMPT)?;
        let number = line
            .trim()
            .parse::<f64>()
            .map_err(|_| RuntimeError::InvalidNumberInput {
                at: self.state.pc,
                input: line.clone(),
            })?;
        self.push(Value::Float(number));
        Ok(())
    }

    fn read_input(&mut self, prompt: &str) -> Result<String, RuntimeError> {
        let at = self.state.pc;
        self.input
            .read_line(prompt)
            .map_err(|e| RuntimeError::InputFailed {
                at,
                message: e.to_string(),
            })
    }

    fn exec_print(&mut self) -> Result<(), RuntimeError> {
        let value = self.pop()?;
        self.output.emit(&value);
        Ok(())
    }

    // ---- Variables ----

    fn exec_load_var(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let at = self.state.pc;
        let name = instr.name_arg().ok_or(RuntimeError::MissingArgument {
            at,
            op: Opcode::LoadVar,
        })?;
        let value = self
            .state
            .variables
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                at,
                name: name.to_string(),
            })?;
        self.push(value);
        Ok(())
    }

    fn exec_store_var(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let name = instr.name_arg().ok_or(RuntimeError::MissingArgument {
            at: self.state.pc,
            op: Opcode::StoreVar,
        })?;
        let value = self.pop()?;
        self.state.variables.insert(name.to_string(), value);
        Ok(())
    }

    // ---- Arithmetic ----
    //
    // Binary operators pop `a` (the top) first and `b` second, then push
    // `a op b`: the top of the stack is the LEFT operand.

    /// ADD/SUB/MUL. Integers stay integers (overflow is an error); a float
    /// on either side promotes the other. ADD also concatenates text.
    fn exec_binary_arith(
        &mut self,
        op: Opcode,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> Result<(), RuntimeError> {
        let at = self.state.pc;
        let a = self.pop()?;
        let b = self.pop()?;

        let result = match (&a, &b) {
            (Value::Int(x), Value::Int(y)) => {
                Value::Int(int_op(*x, *y).ok_or(RuntimeError::Overflow { at, op })?)
            }
            (Value::Text(x), Value::Text(y)) if op == Opcode::Add => Value::Text(format!("{x}{y}")),
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => Value::Float(float_op(x, y)),
                _ => return Err(self.type_mismatch(op, &[&a, &b])),
            },
        };

        self.push(result);
        Ok(())
    }

    /// True division: the result is always a float.
    fn exec_div(&mut self) -> Result<(), RuntimeError> {
        let at = self.state.pc;
        let a = self.pop()?;
        let b = self.pop()?;

        let (x, y) = match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => (x, y),
            _ => return Err(self.type_mismatch(Opcode::Div, &[&a, &b])),
        };
        if y == 0.0 {
            return Err(RuntimeError::DivisionByZero { at });
        }

        self.push(Value::Float(x / y));
        Ok(())
    }

    fn exec_exp(&mut self) -> Result<(), RuntimeError> {
        let at = self.state.pc;
        let a = self.pop()?;
        let x = a
            .as_f64()
            .ok_or_else(|| self.type_mismatch(Opcode::Exp, &[&a]))?;

        let r = x.exp();
        if r.is_infinite() && x.is_finite() {
            return Err(RuntimeError::Overflow { at, op: Opcode::Exp });
        }

        self.push(Value::Float(r));
        Ok(())
    }

    fn exec_sqrt(&mut self) -> Result<(), RuntimeError> {
        let at = self.state.pc;
        let a = self.pop()?;
        let x = a
            .as_f64()
            .ok_or_else(|| self.type_mismatch(Opcode::Sqrt, &[&a]))?;

        if x < 0.0 {
            return Err(RuntimeError::NegativeSqrt { at });
        }

        self.push(Value::Float(x.sqrt()));
        Ok(())
    }

    fn exec_neg(&mut self) -> Result<(), RuntimeError> {
        let at = self.state.pc;
        let a = self.pop()?;

        let result = match a {
            Value::Int(x) => Value::Int(x.checked_neg().ok_or(RuntimeError::Overflow {
                at,
                op: Opcode::Neg,
            })?),
            Value::Float(x) => Value::Float(-x),
            Value::Text(_) => return Err(self.type_mismatch(Opcode::Neg, &[&a])),
        };

        self.push(result);
        Ok(())
    }

    // ---- Comparison ----

    /// Pop `a` then `b`, push 1 if `test(a.cmp(b))` holds, else 0.
    ///
    /// Integers compare exactly, mixed numbers compare as floats, text
    /// compares lexicographically. Text against a number is only defined for
    /// EQ and NEQ (never equal). NaN is unordered.
    fn exec_comparison(
        &mut self,
        op: Opcode,
        test: fn(Option<Ordering>) -> bool,
    ) -> Result<(), RuntimeError> {
        let a = self.pop()?;
        let b = self.pop()?;

        let ordering = match (&a, &b) {
            (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
            (Value::Text(x), Value::Text(y)) => Some(x.cmp(y)),
            (Value::Text(_), _) | (_, Value::Text(_)) => {
                if !matches!(op, Opcode::Eq | Opcode::Neq) {
                    return Err(self.type_mismatch(op, &[&a, &b]));
                }
                None
            }
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            },
        };

        self.push(Value::from_bool(test(ordering)));
        Ok(())
    }

    // ---- Control flow ----

    fn exec_jmp(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        Ok(Flow::Jump(self.jump_target(instr)?))
    }

    /// Only the integer 1 takes the jump; anything else falls through.
    fn exec_cjmp(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let condition = self.pop()?;
        if condition == Value::Int(1) {
            Ok(Flow::Jump(self.jump_target(instr)?))
        } else {
            Ok(Flow::Next)
        }
    }

    /// Index of the LABEL named by the first argument, in the active block.
    fn jump_target(&self, instr: &Instruction) -> Result<usize, RuntimeError> {
        let at = self.state.pc;
        let label = instr.name_arg().ok_or(RuntimeError::MissingArgument {
            at,
            op: instr.opcode,
        })?;
        self.current_labels()
            .and_then(|table| table.get(label))
            .copied()
            .ok_or_else(|| RuntimeError::UndefinedLabel {
                at,
                block: self.state.block.clone(),
                label: label.to_string(),
            })
    }

    pub(crate) fn type_mismatch(&self, op: Opcode, operands: &[&Value]) -> RuntimeError {
        let kinds: Vec<&str> = operands.iter().map(|v| v.kind()).collect();
        RuntimeError::TypeMismatch {
            at: self.state.pc,
            op,
            operands: kinds.join(" and "),
        }
    }
}
