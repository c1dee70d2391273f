//! Program representation: one code block, or a named set of them.
//!
//! A program is built once by a front-end and is read-only afterwards.

use std::collections::BTreeMap;

use crate::error::ProgramError;
use crate::instruction::Instruction;

/// Name of the block where execution starts.
pub const ENTRY_BLOCK: &str = "main";

/// An ordered sequence of instructions.
pub type CodeBlock = Vec<Instruction>;

/// A stackvm program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Program {
    /// A single block. CALL is not available.
    Flat(CodeBlock),
    /// Named blocks; execution starts at `entry`.
    Blocks {
        blocks: BTreeMap<String, CodeBlock>,
        entry: String,
    },
}

impl Program {
    /// Create a single-block program.
    pub fn flat(instructions: Vec<Instruction>) -> Self {
        Program::Flat(instructions)
    }

    /// Create a multi-block program entered at [`ENTRY_BLOCK`].
    pub fn with_blocks(blocks: BTreeMap<String, CodeBlock>) -> Result<Self, ProgramError> {
        Self::with_entry(blocks, ENTRY_BLOCK)
    }

    /// Create a multi-block program entered at `entry`.
    pub fn with_entry(
        blocks: BTreeMap<String, CodeBlock>,
        entry: &str,
    ) -> Result<Self, ProgramError> {
        if !blocks.contains_key(entry) {
            return Err(ProgramError::MissingEntryBlock(entry.to_string()));
        }
        Ok(Program::Blocks {
            blocks,
            entry: entry.to_string(),
        })
    }

    /// Name of the entry block. A flat program reports [`ENTRY_BLOCK`].
    pub fn entry_name(&self) -> &str {
        match self {
            Program::Flat(_) => ENTRY_BLOCK,
            Program::Blocks { entry, .. } => entry,
        }
    }

    /// Look up a block by name.
    ///
    /// For a flat program only the entry name resolves.
    pub fn block(&self, name: &str) -> Option<&[Instruction]> {
        match self {
            Program::Flat(code) if name == ENTRY_BLOCK => Some(code.as_slice()),
            Program::Flat(_) => None,
            Program::Blocks { blocks, .. } => blocks.get(name).map(Vec::as_slice),
        }
    }

    /// The entry block.
    pub fn entry_block(&self) -> &[Instruction] {
        match self {
            Program::Flat(code) => code,
            // with_entry guarantees presence; an empty slice covers a
            // hand-built variant that broke that rule.
            Program::Blocks { blocks, entry } => {
                blocks.get(entry).map(Vec::as_slice).unwrap_or(&[])
            }
        }
    }

    /// Iterate over `(name, block)` pairs, entry block first.
    pub fn blocks(&self) -> Vec<(&str, &[Instruction])> {
        match self {
            Program::Flat(code) => vec![(ENTRY_BLOCK, code.as_slice())],
            Program::Blocks { blocks, entry } => {
                let mut out = Vec::with_capacity(blocks.len());
                if let Some(code) = blocks.get(entry) {
                    out.push((entry.as_str(), code.as_slice()));
                }
                out.extend(
                    blocks
                        .iter()
                        .filter(|(name, _)| *name != entry)
                        .map(|(name, code)| (name.as_str(), code.as_slice())),
                );
                out
            }
        }
    }

    /// Whether CALL can switch blocks in this program.
    pub fn is_multi_block(&self) -> bool {
        matches!(self, Program::Blocks { .. })
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        match self {
            Program::Flat(_) => 1,
            Program::Blocks { blocks, .. } => blocks.len(),
        }
    }

    /// Total number of instructions across all blocks.
    pub fn instruction_count(&self) -> usize {
        self.blocks().iter().map(|(_, code)| code.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode;

    fn block(ops: &[Opcode]) -> CodeBlock {
        ops.iter().map(|&op| Instruction::bare(op)).collect()
    }

    #[test]
    fn flat_program_entry() {
        let program = Program::flat(block(&[Opcode::Add, Opcode::Print]));
        assert_eq!(program.entry_name(), "main");
        assert_eq!(program.entry_block().len(), 2);
        assert!(program.block("main").is_some());
        assert!(program.block("other").is_none());
        assert!(!program.is_multi_block());
        assert_eq!(program.block_count(), 1);
    }

    #[test]
    fn with_blocks_requires_entry() {
        let mut blocks = BTreeMap::new();
        blocks.insert("helper".to_string(), block(&[Opcode::Ret]));
        assert_eq!(
            Program::with_blocks(blocks),
            Err(ProgramError::MissingEntryBlock("main".to_string()))
        );
    }

    #[test]
    fn blocks_lists_entry_first() {
        let mut blocks = BTreeMap::new();
        blocks.insert("alpha".to_string(), block(&[Opcode::Ret]));
        blocks.insert("main".to_string(), block(&[Opcode::Call]));
        blocks.insert("zeta".to_string(), block(&[Opcode::Ret, Opcode::Ret]));
        let program = Program::with_blocks(blocks).unwrap();

        let names: Vec<_> = program.blocks().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["main", "alpha", "zeta"]);
        assert_eq!(program.instruction_count(), 4);
        assert_eq!(program.block_count(), 3);
        assert!(program.is_multi_block());
    }

    #[test]
    fn custom_entry() {
        let mut blocks = BTreeMap::new();
        blocks.insert("start".to_string(), block(&[Opcode::Print]));
        let program = Program::with_entry(blocks, "start").unwrap();
        assert_eq!(program.entry_name(), "start");
        assert_eq!(program.entry_block().len(), 1);
        assert!(program.block("main").is_none());
    }

    #[test]
    fn empty_flat_program() {
        let program = Program::flat(vec![]);
        assert_eq!(program.instruction_count(), 0);
        assert!(program.entry_block().is_empty());
    }
}
