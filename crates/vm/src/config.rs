//! Execution limits.
//!
//! The machine itself is unbounded; these limits let a caller stop a program
//! that would otherwise loop or recurse forever.

/// Prompt passed to the input collaborator by INPUT_STRING.
pub const STRING_PROMPT: &str = "Enter a string: ";

/// Prompt passed to the input collaborator by INPUT_NUMBER.
pub const NUMBER_PROMPT: &str = "Enter a number: ";

/// Optional resource limits for a run. The default imposes none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VmConfig {
    /// Maximum number of instructions to execute.
    pub max_steps: Option<u64>,
    /// Maximum number of unreturned CALLs.
    pub max_call_depth: Option<usize>,
}

impl VmConfig {
    /// A configuration with no limits.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Limit the number of executed instructions.
    pub fn with_max_steps(mut self, limit: u64) -> Self {
        self.max_steps = Some(limit);
        self
    }

    /// Limit the call stack depth.
    pub fn with_max_call_depth(mut self, limit: usize) -> Self {
        self.max_call_depth = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unbounded() {
        let config = VmConfig::default();
        assert_eq!(config, VmConfig::unbounded());
        assert_eq!(config.max_steps, None);
        assert_eq!(config.max_call_depth, None);
    }

    #[test]
    fn builders_set_limits() {
        let config = VmConfig::unbounded()
            .with_max_steps(100)
            .with_max_call_depth(8);
        assert_eq!(config.max_steps, Some(100));
        assert_eq!(config.max_call_depth, Some(8));
    }
}
