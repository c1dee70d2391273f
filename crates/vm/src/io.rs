//! Input and output collaborators.
//!
//! The machine never touches a terminal directly. INPUT_STRING and
//! INPUT_NUMBER ask an [`InputSource`] for a line; PRINT hands a value to an
//! [`OutputSink`].

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use stackvm_common::Value;

/// Supplies lines of input on request.
pub trait InputSource {
    /// Show `prompt` and return one line, without its line terminator.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;
}

/// Receives values printed by the program.
pub trait OutputSink {
    /// Consume one printed value.
    fn emit(&mut self, value: &Value);
}

impl<T: InputSource + ?Sized> InputSource for &mut T {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        (**self).read_line(prompt)
    }
}

impl<T: OutputSink + ?Sized> OutputSink for &mut T {
    fn emit(&mut self, value: &Value) {
        (**self).emit(value)
    }
}

/// Standard input and output.
#[derive(Debug, Default, Clone, Copy)]
pub struct Console;

impl InputSource for Console {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "end of input",
            ));
        }
        Ok(strip_line_ending(line))
    }
}

impl OutputSink for Console {
    fn emit(&mut self, value: &Value) {
        println!("{value}");
    }
}

fn strip_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

/// Canned answers, handed out in order. Records the prompts it was shown.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    answers: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts seen so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "scripted input exhausted")
        })
    }
}

/// An input source for programs that must not read.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputSource for NoInput {
    fn read_line(&mut self, _prompt: &str) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "no input available",
        ))
    }
}

/// Collects every printed value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CapturedOutput {
    pub values: Vec<Value>,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Printed values rendered as the console would show them.
    pub fn lines(&self) -> Vec<String> {
        self.values.iter().map(ToString::to_string).collect()
    }
}

impl OutputSink for CapturedOutput {
    fn emit(&mut self, value: &Value) {
        self.values.push(value.clone());
    }
}
