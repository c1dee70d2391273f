//! Log setup for the `stackvm` binary.

use tracing::level_filters::LevelFilter;

/// Environment variable consulted when `--log-level` is not given.
pub const LOG_ENV: &str = "STACKVM_LOG";

/// Level used when neither the flag nor the environment sets one.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::WARN;

/// Remove a global `--log-level <level>` pair from the argument list.
///
/// The pair may appear anywhere after the program name. Returns the
/// remaining arguments and the level text, if present.
pub fn take_log_level(args: Vec<String>) -> Result<(Vec<String>, Option<String>), String> {
    let mut rest = Vec::with_capacity(args.len());
    let mut level = None;
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        if arg == "--log-level" {
            let value = iter
                .next()
                .ok_or_else(|| "--log-level requires a value".to_string())?;
            level = Some(value);
        } else {
            rest.push(arg);
        }
    }

    Ok((rest, level))
}

/// Pick the max level: the flag wins over the environment.
pub fn resolve_level(flag: Option<&str>, env: Option<&str>) -> Result<LevelFilter, String> {
    match flag.or(env) {
        Some(text) => text
            .trim()
            .parse()
            .map_err(|_| format!("invalid log level '{text}'")),
        None => Ok(DEFAULT_LEVEL),
    }
}

/// Install the stderr `fmt` subscriber.
pub fn init_logging(level: LevelFilter) {
    // Keep any subscriber that is already installed.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn level_pair_removed() {
        let (rest, level) =
            take_log_level(args(&["stackvm", "run", "--log-level", "debug", "p.svm"])).unwrap();
        assert_eq!(rest, args(&["stackvm", "run", "p.svm"]));
        assert_eq!(level.as_deref(), Some("debug"));
    }

    #[test]
    fn absent_flag_leaves_args() {
        let (rest, level) = take_log_level(args(&["stackvm", "list", "p.svm"])).unwrap();
        assert_eq!(rest.len(), 3);
        assert!(level.is_none());
    }

    #[test]
    fn dangling_flag_is_error() {
        assert!(take_log_level(args(&["stackvm", "--log-level"])).is_err());
    }

    #[test]
    fn flag_beats_env() {
        assert_eq!(
            resolve_level(Some("trace"), Some("error")),
            Ok(LevelFilter::TRACE)
        );
    }

    #[test]
    fn env_used_without_flag() {
        assert_eq!(resolve_level(None, Some("info")), Ok(LevelFilter::INFO));
    }

    #[test]
    fn default_is_warn() {
        assert_eq!(resolve_level(None, None), Ok(LevelFilter::WARN));
    }

    #[test]
    fn case_insensitive_and_off() {
        assert_eq!(resolve_level(Some("DEBUG"), None), Ok(LevelFilter::DEBUG));
        assert_eq!(resolve_level(Some("off"), None), Ok(LevelFilter::OFF));
    }

    #[test]
    fn bad_level_is_error() {
        assert!(resolve_level(Some("loud"), None).is_err());
    }
}
