//! Instruction representation: an opcode plus raw argument tokens.
//!
//! Arguments are kept exactly as the front-end produced them. Quote markers
//! around text literals, variable names and labels are stripped by the
//! engine when the argument is used, not here.

use std::fmt;

use crate::error::ProgramError;
use crate::opcode::Opcode;

/// A single stackvm instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// Positional argument tokens, verbatim.
    pub args: Vec<String>,
}

impl Instruction {
    /// Create an instruction from an opcode and its argument tokens.
    pub fn new<I, S>(opcode: Opcode, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            opcode,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// An instruction with no arguments.
    pub fn bare(opcode: Opcode) -> Self {
        Self {
            opcode,
            args: Vec::new(),
        }
    }

    /// An instruction with a single argument token.
    pub fn unary(opcode: Opcode, arg: impl Into<String>) -> Self {
        Self {
            opcode,
            args: vec![arg.into()],
        }
    }

    /// Build an instruction from a mnemonic and argument tokens.
    pub fn from_mnemonic<I, S>(mnemonic: &str, args: I) -> Result<Self, ProgramError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(mnemonic.parse()?, args))
    }

    /// The argument token at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// The first argument with surrounding quote markers removed.
    ///
    /// This is how names (variables, labels) are read.
    pub fn name_arg(&self) -> Option<&str> {
        self.arg(0).map(strip_quotes)
    }
}

/// Remove every leading and trailing `"` from a token.
pub fn strip_quotes(token: &str) -> &str {
    token.trim_matches('"')
}

/// Whether a token is delimited by `"` on both ends.
pub fn is_quoted(token: &str) -> bool {
    token.starts_with('"') && token.ends_with('"')
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode.mnemonic())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_mnemonic_keeps_args_verbatim() {
        let instr = Instruction::from_mnemonic("LOAD_CONST", ["\"hi\""]).unwrap();
        assert_eq!(instr.opcode, Opcode::LoadConst);
        assert_eq!(instr.arg(0), Some("\"hi\""));
    }

    #[test]
    fn from_mnemonic_unknown() {
        let err = Instruction::from_mnemonic("NOP", Vec::<String>::new()).unwrap_err();
        assert_eq!(err, ProgramError::UnknownOpcode("NOP".to_string()));
    }

    #[test]
    fn name_arg_strips_quotes() {
        let instr = Instruction::unary(Opcode::StoreVar, "\"x\"");
        assert_eq!(instr.name_arg(), Some("x"));
        let bare = Instruction::unary(Opcode::StoreVar, "y");
        assert_eq!(bare.name_arg(), Some("y"));
    }

    #[test]
    fn missing_arg_is_none() {
        let instr = Instruction::bare(Opcode::Jmp);
        assert_eq!(instr.arg(0), None);
        assert_eq!(instr.name_arg(), None);
    }

    #[test]
    fn strip_quotes_removes_repeated_markers() {
        assert_eq!(strip_quotes("\"\"a\"\""), "a");
        assert_eq!(strip_quotes("\""), "");
        assert_eq!(strip_quotes("a\"b"), "a\"b");
    }

    #[test]
    fn quoted_detection() {
        assert!(is_quoted("\"x\""));
        assert!(is_quoted("\""));
        assert!(!is_quoted("\"x"));
        assert!(!is_quoted("12"));
    }

    #[test]
    fn display_joins_args() {
        let instr = Instruction::new(Opcode::LoadConst, ["\"a\"", "b"]);
        assert_eq!(instr.to_string(), "LOAD_CONST \"a\" b");
        assert_eq!(Instruction::bare(Opcode::Ret).to_string(), "RET");
    }
}
