//! Parser for stackvm text tokens → instructions.

use crate::error::AsmError;
use stackvm_common::{Instruction, Opcode};

/// Parse the tokens of one line into an instruction.
///
/// Returns `Ok(None)` for blank lines (empty token list). Arguments are
/// not validated here; the engine decides what each opcode needs.
pub(crate) fn parse_line(tokens: &[&str], line_num: usize) -> Result<Option<Instruction>, AsmError> {
    let Some((mnemonic, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let opcode: Opcode = mnemonic.parse().map_err(|_| AsmError::UnknownOpcode {
        line: line_num,
        token: mnemonic.to_string(),
    })?;

    Ok(Some(Instruction::new(opcode, args.iter().copied())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_none() {
        assert_eq!(parse_line(&[], 1).unwrap(), None);
    }

    #[test]
    fn bare_opcode() {
        assert_eq!(
            parse_line(&["ADD"], 1).unwrap(),
            Some(Instruction::bare(Opcode::Add))
        );
    }

    #[test]
    fn mnemonic_case_insensitive() {
        assert_eq!(
            parse_line(&["load_const", "7"], 1).unwrap(),
            Some(Instruction::unary(Opcode::LoadConst, "7"))
        );
    }

    #[test]
    fn quoted_argument_kept_verbatim() {
        let instr = parse_line(&["JMP", "\"loop\""], 1).unwrap().unwrap();
        assert_eq!(instr.arg(0), Some("\"loop\""));
        assert_eq!(instr.name_arg(), Some("loop"));
    }

    #[test]
    fn extra_arguments_kept() {
        let instr = parse_line(&["PRINT", "a", "b"], 1).unwrap().unwrap();
        assert_eq!(instr.args, vec!["a", "b"]);
    }

    #[test]
    fn unknown_opcode_carries_line() {
        assert_eq!(
            parse_line(&["HALT"], 9),
            Err(AsmError::UnknownOpcode {
                line: 9,
                token: "HALT".to_string()
            })
        );
    }

    #[test]
    fn every_mnemonic_parses() {
        for opcode in stackvm_common::opcode::ALL_OPCODES {
            let parsed = parse_line(&[opcode.mnemonic()], 1).unwrap().unwrap();
            assert_eq!(parsed.opcode, opcode);
        }
    }
}
