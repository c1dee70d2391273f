//! Tokenizer for line-oriented stackvm source.

/// Split one source line into tokens.
///
/// Returns an empty Vec for blank lines and for comment lines (first
/// non-blank character is `;`). Tokens are whitespace-separated and kept
/// verbatim, quotes included.
pub(crate) fn tokenize_line(line: &str) -> Vec<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(';') {
        return Vec::new();
    }
    line.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line() {
        assert!(tokenize_line("").is_empty());
    }

    #[test]
    fn whitespace_only() {
        assert!(tokenize_line("   \t  ").is_empty());
    }

    #[test]
    fn comment_only() {
        assert!(tokenize_line("; this is a comment").is_empty());
    }

    #[test]
    fn indented_comment() {
        assert!(tokenize_line("    ; indented").is_empty());
    }

    #[test]
    fn simple_opcode() {
        assert_eq!(tokenize_line("ADD"), vec!["ADD"]);
    }

    #[test]
    fn opcode_with_quoted_arg() {
        assert_eq!(tokenize_line("STORE_VAR \"x\""), vec!["STORE_VAR", "\"x\""]);
    }

    #[test]
    fn surrounding_whitespace_dropped() {
        assert_eq!(
            tokenize_line("\t LOAD_CONST   42  \r"),
            vec!["LOAD_CONST", "42"]
        );
    }

    #[test]
    fn case_preserved() {
        assert_eq!(tokenize_line("add"), vec!["add"]);
    }

    #[test]
    fn semicolon_after_mnemonic_is_a_token() {
        // Only whole-line comments are recognized.
        assert_eq!(tokenize_line("PRINT ;x"), vec!["PRINT", ";x"]);
    }
}
