//! Label resolution.
//!
//! Each code block gets its own table mapping label name to the index of
//! the LABEL instruction that defines it. Tables for every block are built
//! once, before execution starts.

use std::collections::HashMap;

use stackvm_common::{Instruction, Opcode, Program};

use crate::error::RuntimeError;

/// Label name → index of its LABEL instruction, for one block.
pub type LabelTable = HashMap<String, usize>;

/// Build the label table for one block.
///
/// Names are stored with quote markers stripped. When a name is defined
/// more than once the last definition wins.
pub fn resolve_labels(code: &[Instruction]) -> Result<LabelTable, RuntimeError> {
    let mut table = LabelTable::new();
    for (index, instr) in code.iter().enumerate() {
        if instr.opcode != Opcode::Label {
            continue;
        }
        let name = instr.name_arg().ok_or(RuntimeError::MissingArgument {
            at: index,
            op: Opcode::Label,
        })?;
        table.insert(name.to_string(), index);
    }
    Ok(table)
}

/// Build label tables for every block of a program, keyed by block name.
pub fn resolve_program(program: &Program) -> Result<HashMap<String, LabelTable>, RuntimeError> {
    program
        .blocks()
        .into_iter()
        .map(|(name, code)| resolve_labels(code).map(|table| (name.to_string(), table)))
        .collect()
}
