//! stackvm assembler: front-ends that turn program source into a [`Program`].
//!
//! Two source formats are accepted:
//!
//! - line-oriented text, one instruction per line, producing a flat program
//! - a JSON object of named blocks, producing a multi-block program
//!
//! Neither front-end validates arguments or labels; that happens when the VM
//! loads the program.
//!
//! # Usage
//!
//! ```
//! use stackvm_assembler::{list, parse_text};
//!
//! let text = "LOAD_CONST 5\nLOAD_CONST 3\nSUB\nPRINT\n";
//! let program = parse_text(text).unwrap();
//! assert_eq!(program.instruction_count(), 4);
//! assert_eq!(list(&program), text);
//! ```

pub mod error;

mod json;
mod lexer;
mod listing;
mod parser;

pub use error::AsmError;
pub use listing::list;

use lexer::tokenize_line;
use parser::parse_line;
use stackvm_common::Program;
use tracing::debug;

/// Parse line-oriented text into a flat program.
///
/// Returns the first error encountered.
pub fn parse_text(text: &str) -> Result<Program, AsmError> {
    let mut instructions = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let tokens = tokenize_line(line);
        if let Some(instr) = parse_line(&tokens, idx + 1)? {
            instructions.push(instr);
        }
    }

    debug!(instructions = instructions.len(), "parsed text program");
    Ok(Program::flat(instructions))
}

/// Parse a JSON document of named blocks into a multi-block program.
///
/// The `main` block is required and is the entry point.
pub fn parse_json(source: &str) -> Result<Program, AsmError> {
    let program = json::parse(source)?;
    debug!(
        blocks = program.block_count(),
        instructions = program.instruction_count(),
        "parsed JSON program"
    );
    Ok(program)
}

/// Parse either format, choosing JSON when the source starts with `{`.
pub fn parse_source(source: &str) -> Result<Program, AsmError> {
    if source.trim_start().starts_with('{') {
        parse_json(source)
    } else {
        parse_text(source)
    }
}
