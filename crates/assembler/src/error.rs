//! Error types for the stackvm front-ends.

use thiserror::Error;

/// Errors produced while turning program source into a [`Program`].
///
/// [`Program`]: stackvm_common::Program
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// A text line started with an unrecognized mnemonic.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// A JSON instruction named an unrecognized mnemonic.
    #[error("block '{block}', instruction {index}: unknown opcode '{token}'")]
    UnknownJsonOpcode {
        block: String,
        index: usize,
        token: String,
    },

    /// A JSON `arg` was a boolean, array or object.
    #[error("block '{block}', instruction {index}: arg must be a string, number or null")]
    InvalidArgument { block: String, index: usize },

    /// The document is not valid JSON or does not have the expected shape.
    #[error("invalid JSON program: {message}")]
    Json { message: String },

    /// The JSON document has no `main` block.
    #[error("JSON program has no 'main' block")]
    MissingEntryBlock,
}

impl From<serde_json::Error> for AsmError {
    fn from(e: serde_json::Error) -> Self {
        AsmError::Json {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unknown_opcode() {
        let e = AsmError::UnknownOpcode {
            line: 3,
            token: "FOO".to_string(),
        };
        assert_eq!(e.to_string(), "line 3: unknown opcode 'FOO'");
    }

    #[test]
    fn error_display_unknown_json_opcode() {
        let e = AsmError::UnknownJsonOpcode {
            block: "main".to_string(),
            index: 2,
            token: "HALT".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "block 'main', instruction 2: unknown opcode 'HALT'"
        );
    }

    #[test]
    fn error_display_invalid_argument() {
        let e = AsmError::InvalidArgument {
            block: "sub".to_string(),
            index: 0,
        };
        assert_eq!(
            e.to_string(),
            "block 'sub', instruction 0: arg must be a string, number or null"
        );
    }

    #[test]
    fn error_display_missing_entry() {
        assert_eq!(
            AsmError::MissingEntryBlock.to_string(),
            "JSON program has no 'main' block"
        );
    }

    #[test]
    fn serde_error_converts_to_json_variant() {
        let e: AsmError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(e, AsmError::Json { .. }));
    }
}
