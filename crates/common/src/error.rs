//! Errors raised while building stackvm programs.

use thiserror::Error;

/// Errors that occur when constructing instructions or programs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    /// Mnemonic does not name any opcode.
    #[error("unknown opcode '{0}'")]
    UnknownOpcode(String),

    /// A multi-block program has no block under the entry name.
    #[error("entry block '{0}' not found")]
    MissingEntryBlock(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_opcode() {
        assert_eq!(
            ProgramError::UnknownOpcode("HALT".to_string()).to_string(),
            "unknown opcode 'HALT'"
        );
    }

    #[test]
    fn display_missing_entry_block() {
        assert_eq!(
            ProgramError::MissingEntryBlock("main".to_string()).to_string(),
            "entry block 'main' not found"
        );
    }
}
