//! JSON front-end: a document of named blocks.
//!
//! ```json
//! {
//!   "main": [{"op": "LOAD_CONST", "arg": "sub"}, {"op": "CALL"}],
//!   "sub":  [{"op": "LOAD_CONST", "arg": 5}, {"op": "PRINT"}, {"op": "RET"}]
//! }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value as JsonValue;
use stackvm_common::{CodeBlock, Instruction, Opcode, Program, ENTRY_BLOCK};

use crate::error::AsmError;

/// One `{ "op": ..., "arg": ... }` entry as it appears in the document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonInstruction {
    op: String,
    #[serde(default)]
    arg: Option<JsonValue>,
}

/// Parse a JSON program document.
pub(crate) fn parse(source: &str) -> Result<Program, AsmError> {
    let document: BTreeMap<String, Vec<JsonInstruction>> = serde_json::from_str(source)?;
    if !document.contains_key(ENTRY_BLOCK) {
        return Err(AsmError::MissingEntryBlock);
    }

    let mut blocks = BTreeMap::new();
    for (name, entries) in document {
        let code = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| convert(&name, index, entry))
            .collect::<Result<CodeBlock, _>>()?;
        blocks.insert(name, code);
    }

    Program::with_blocks(blocks).map_err(|_| AsmError::MissingEntryBlock)
}

fn convert(block: &str, index: usize, entry: JsonInstruction) -> Result<Instruction, AsmError> {
    let opcode: Opcode = entry
        .op
        .parse()
        .map_err(|_| AsmError::UnknownJsonOpcode {
            block: block.to_string(),
            index,
            token: entry.op.clone(),
        })?;

    let arg = match entry.arg {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) => Some(format!("\"{s}\"")),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        Some(_) => {
            return Err(AsmError::InvalidArgument {
                block: block.to_string(),
                index,
            })
        }
    };

    Ok(Instruction::new(opcode, arg))
}
