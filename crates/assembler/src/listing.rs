//! Listing: program → line-oriented text.
//!
//! One instruction per line, arguments verbatim. Multi-block programs get a
//! `; block <name>` comment before each block, entry block first, so the
//! output is still accepted by the text front-end.

use stackvm_common::Program;

/// Render a program as text.
pub fn list(program: &Program) -> String {
    let mut out = String::new();

    for (name, code) in program.blocks() {
        if program.is_multi_block() {
            out.push_str("; block ");
            out.push_str(name);
            out.push('\n');
        }
        for instr in code {
            out.push_str(&instr.to_string());
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackvm_common::{Instruction, Opcode};
    use std::collections::BTreeMap;

    #[test]
    fn flat_listing() {
        let program = Program::flat(vec![
            Instruction::unary(Opcode::LoadConst, "5"),
            Instruction::unary(Opcode::StoreVar, "\"x\""),
            Instruction::bare(Opcode::Print),
        ]);
        assert_eq!(list(&program), "LOAD_CONST 5\nSTORE_VAR \"x\"\nPRINT\n");
    }

    #[test]
    fn empty_flat_listing() {
        assert_eq!(list(&Program::flat(vec![])), "");
    }

    #[test]
    fn blocks_listed_entry_first() {
        let mut blocks = BTreeMap::new();
        blocks.insert("a".to_string(), vec![Instruction::bare(Opcode::Ret)]);
        blocks.insert(
            "main".to_string(),
            vec![
                Instruction::unary(Opcode::LoadConst, "\"a\""),
                Instruction::bare(Opcode::Call),
            ],
        );
        let program = Program::with_blocks(blocks).unwrap();
        assert_eq!(
            list(&program),
            "; block main\nLOAD_CONST \"a\"\nCALL\n; block a\nRET\n"
        );
    }
}
