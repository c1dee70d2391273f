//! Snapshot persistence for the operand stack and the variable environment.
//!
//! Each is written to its own file so either can be restored without the
//! other. The encoding is bincode; it only has to round-trip within this
//! implementation.

use std::fs;
use std::path::Path;

use stackvm_common::Value;
use thiserror::Error;
use tracing::debug;

use crate::machine::{ExecutionState, Variables};

/// Errors from reading or writing snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] bincode::Error),
}

/// Encode an operand stack.
pub fn encode_stack(stack: &[Value]) -> Result<Vec<u8>, SnapshotError> {
    Ok(bincode::serialize(stack)?)
}

/// Decode an operand stack.
pub fn decode_stack(bytes: &[u8]) -> Result<Vec<Value>, SnapshotError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Encode a variable environment.
pub fn encode_variables(variables: &Variables) -> Result<Vec<u8>, SnapshotError> {
    Ok(bincode::serialize(variables)?)
}

/// Decode a variable environment.
pub fn decode_variables(bytes: &[u8]) -> Result<Variables, SnapshotError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Write an operand stack snapshot to `path`.
pub fn save_stack(path: impl AsRef<Path>, stack: &[Value]) -> Result<(), SnapshotError> {
    let bytes = encode_stack(stack)?;
    fs::write(path.as_ref(), &bytes)?;
    debug!(path = %path.as_ref().display(), values = stack.len(), bytes = bytes.len(), "stack saved");
    Ok(())
}

/// Read an operand stack snapshot from `path`.
pub fn load_stack(path: impl AsRef<Path>) -> Result<Vec<Value>, SnapshotError> {
    let stack = decode_stack(&fs::read(path.as_ref())?)?;
    debug!(path = %path.as_ref().display(), values = stack.len(), "stack loaded");
    Ok(stack)
}

/// Write a variable environment snapshot to `path`.
pub fn save_variables(path: impl AsRef<Path>, variables: &Variables) -> Result<(), SnapshotError> {
    let bytes = encode_variables(variables)?;
    fs::write(path.as_ref(), &bytes)?;
    debug!(path = %path.as_ref().display(), variables = variables.len(), bytes = bytes.len(), "variables saved");
    Ok(())
}

/// Read a variable environment snapshot from `path`.
pub fn load_variables(path: impl AsRef<Path>) -> Result<Variables, SnapshotError> {
    let variables = decode_variables(&fs::read(path.as_ref())?)?;
    debug!(path = %path.as_ref().display(), variables = variables.len(), "variables loaded");
    Ok(variables)
}

impl ExecutionState {
    /// Save this state's operand stack.
    pub fn dump_stack(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        save_stack(path, &self.stack)
    }

    /// Replace this state's operand stack with a snapshot.
    pub fn restore_stack(&mut self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        self.stack = load_stack(path)?;
        Ok(())
    }

    /// Save this state's variables.
    pub fn dump_variables(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        save_variables(path, &self.variables)
    }

    /// Replace this state's variables with a snapshot.
    pub fn restore_variables(&mut self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        self.variables = load_variables(path)?;
        Ok(())
    }
}
