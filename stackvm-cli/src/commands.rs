//! CLI command implementations.
//!
//! Each command takes the arguments after its name and returns the exit
//! code on failure. Errors are reported on stderr as they happen.

use std::fs;

use stackvm_common::{Opcode, Program, Value};
use stackvm_vm::{snapshot, Console, Variables, VmConfig, VM};
use tracing::debug;

/// Exit code for usage, input, parse and snapshot errors.
pub const EXIT_INPUT: i32 = 1;
/// Exit code for errors raised while the program runs.
pub const EXIT_RUNTIME: i32 = 2;

/// Options accepted by `stackvm run`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub program: String,
    pub max_steps: Option<u64>,
    pub max_call_depth: Option<usize>,
    pub load_stack: Option<String>,
    pub load_vars: Option<String>,
    pub dump_stack: Option<String>,
    pub dump_vars: Option<String>,
    pub show_state: bool,
}

impl RunOptions {
    /// Parse `run` arguments. The first non-flag argument is the program.
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let mut opts = RunOptions::default();
        let mut program = None;
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--max-steps" => opts.max_steps = Some(parse_number(arg, iter.next())?),
                "--max-call-depth" => opts.max_call_depth = Some(parse_number(arg, iter.next())?),
                "--load-stack" => opts.load_stack = Some(flag_value(arg, iter.next())?),
                "--load-vars" => opts.load_vars = Some(flag_value(arg, iter.next())?),
                "--dump-stack" => opts.dump_stack = Some(flag_value(arg, iter.next())?),
                "--dump-vars" => opts.dump_vars = Some(flag_value(arg, iter.next())?),
                "--show-state" => opts.show_state = true,
                flag if flag.starts_with("--") => return Err(format!("unknown option '{flag}'")),
                path if program.is_none() => program = Some(path.to_string()),
                extra => return Err(format!("unexpected argument '{extra}'")),
            }
        }

        opts.program = program.ok_or_else(|| "run requires a program file".to_string())?;
        Ok(opts)
    }

    /// Resource limits for the VM.
    pub fn config(&self) -> VmConfig {
        let mut config = VmConfig::default();
        if let Some(n) = self.max_steps {
            config = config.with_max_steps(n);
        }
        if let Some(n) = self.max_call_depth {
            config = config.with_max_call_depth(n);
        }
        config
    }
}

fn flag_value(flag: &str, value: Option<&String>) -> Result<String, String> {
    value
        .cloned()
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, String> {
    let text = flag_value(flag, value)?;
    text.parse()
        .map_err(|_| format!("{flag} expects a non-negative integer, got '{text}'"))
}

/// Parse and execute a program with console I/O.
pub fn run(args: &[String]) -> Result<(), i32> {
    let opts = RunOptions::parse(args).map_err(|e| {
        eprintln!("error: {e}");
        eprintln!("Usage: stackvm run <program> [--max-steps N] [--max-call-depth N] [--load-stack F] [--load-vars F] [--dump-stack F] [--dump-vars F] [--show-state]");
        EXIT_INPUT
    })?;

    let program = read_program(&opts.program)?;

    let stack = match &opts.load_stack {
        Some(path) => snapshot::load_stack(path).map_err(|e| snapshot_error(path, e))?,
        None => Vec::new(),
    };
    let variables = match &opts.load_vars {
        Some(path) => snapshot::load_variables(path).map_err(|e| snapshot_error(path, e))?,
        None => Variables::new(),
    };

    let mut vm = VM::new(&program, Console, Console)
        .map_err(runtime_error)?
        .with_config(opts.config())
        .with_state(stack, variables);
    vm.execute().map_err(runtime_error)?;
    debug!(steps = vm.steps(), "program finished");

    let state = vm.into_state();
    if let Some(path) = &opts.dump_stack {
        state.dump_stack(path).map_err(|e| snapshot_error(path, e))?;
    }
    if let Some(path) = &opts.dump_vars {
        state.dump_variables(path).map_err(|e| snapshot_error(path, e))?;
    }
    if opts.show_state {
        println!("stack:");
        for line in format_stack(&state.stack) {
            println!("  {line}");
        }
        println!("variables:");
        for line in format_variables(&state.variables) {
            println!("  {line}");
        }
    }

    Ok(())
}

/// Parse a program, check instruction arguments and resolve labels without
/// running it.
pub fn check(args: &[String]) -> Result<(), i32> {
    let Some(input) = args.first() else {
        eprintln!("error: check requires a program file");
        eprintln!("Usage: stackvm check <program>");
        return Err(EXIT_INPUT);
    };

    let program = read_program(input)?;

    let missing = missing_arguments(&program);
    for (block, index, opcode) in &missing {
        eprintln!("error: block '{block}', instruction {index}: {opcode} requires an argument");
    }
    if !missing.is_empty() {
        return Err(EXIT_INPUT);
    }

    stackvm_vm::labels::resolve_program(&program).map_err(|e| {
        eprintln!("error: {e}");
        EXIT_INPUT
    })?;

    println!(
        "OK: {input} ({} instructions in {} blocks)",
        program.instruction_count(),
        program.block_count()
    );
    Ok(())
}

/// Print a program as text.
pub fn list(args: &[String]) -> Result<(), i32> {
    let Some(input) = args.first() else {
        eprintln!("error: list requires a program file");
        eprintln!("Usage: stackvm list <program>");
        return Err(EXIT_INPUT);
    };

    let program = read_program(input)?;
    print!("{}", stackvm_assembler::list(&program));
    Ok(())
}

/// Print the contents of a stack or variables snapshot.
pub fn inspect(args: &[String]) -> Result<(), i32> {
    let usage = || {
        eprintln!("Usage: stackvm inspect (--stack|--vars) <snapshot>");
        EXIT_INPUT
    };

    let (kind, path) = match args {
        [kind, path] => (kind.as_str(), path),
        _ => {
            eprintln!("error: inspect requires a snapshot kind and file");
            return Err(usage());
        }
    };

    let lines = match kind {
        "--stack" => format_stack(&snapshot::load_stack(path).map_err(|e| snapshot_error(path, e))?),
        "--vars" => format_variables(
            &snapshot::load_variables(path).map_err(|e| snapshot_error(path, e))?,
        ),
        other => {
            eprintln!("error: unknown snapshot kind '{other}'");
            return Err(usage());
        }
    };

    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// Stack entries bottom to top, each prefixed with its depth index.
pub fn format_stack(stack: &[Value]) -> Vec<String> {
    stack
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{i}: {v} ({})", v.kind()))
        .collect()
}

/// Variables sorted by name.
pub fn format_variables(variables: &Variables) -> Vec<String> {
    let mut entries: Vec<_> = variables.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
        .into_iter()
        .map(|(name, v)| format!("{name} = {v} ({})", v.kind()))
        .collect()
}

/// Instructions whose opcode reads an argument but that carry none.
pub fn missing_arguments(program: &Program) -> Vec<(String, usize, Opcode)> {
    program
        .blocks()
        .into_iter()
        .flat_map(|(name, code)| {
            code.iter()
                .enumerate()
                .filter(|(_, instr)| instr.opcode.takes_argument() && instr.args.is_empty())
                .map(move |(i, instr)| (name.to_string(), i, instr.opcode))
        })
        .collect()
}

// ---- Helpers ----

fn read_program(path: &str) -> Result<Program, i32> {
    let source = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        EXIT_INPUT
    })?;

    stackvm_assembler::parse_source(&source).map_err(|e| {
        eprintln!("error: {path}: {e}");
        EXIT_INPUT
    })
}

fn snapshot_error(path: &str, e: snapshot::SnapshotError) -> i32 {
    eprintln!("error: {path}: {e}");
    EXIT_INPUT
}

fn runtime_error(e: stackvm_vm::RuntimeError) -> i32 {
    eprintln!("runtime error: {e}");
    EXIT_RUNTIME
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn run_options_program_only() {
        let opts = RunOptions::parse(&args(&["p.svm"])).unwrap();
        assert_eq!(opts.program, "p.svm");
        assert_eq!(opts.config(), VmConfig::default());
        assert!(!opts.show_state);
    }

    #[test]
    fn run_options_all_flags() {
        let opts = RunOptions::parse(&args(&[
            "--max-steps",
            "100",
            "p.json",
            "--max-call-depth",
            "8",
            "--load-stack",
            "in.stack",
            "--load-vars",
            "in.vars",
            "--dump-stack",
            "out.stack",
            "--dump-vars",
            "out.vars",
            "--show-state",
        ]))
        .unwrap();
        assert_eq!(opts.program, "p.json");
        assert_eq!(
            opts.config(),
            VmConfig::default().with_max_steps(100).with_max_call_depth(8)
        );
        assert_eq!(opts.load_stack.as_deref(), Some("in.stack"));
        assert_eq!(opts.load_vars.as_deref(), Some("in.vars"));
        assert_eq!(opts.dump_stack.as_deref(), Some("out.stack"));
        assert_eq!(opts.dump_vars.as_deref(), Some("out.vars"));
        assert!(opts.show_state);
    }

    #[test]
    fn run_options_require_program() {
        assert!(RunOptions::parse(&args(&["--show-state"])).is_err());
    }

    #[test]
    fn run_options_reject_unknown_flag() {
        let err = RunOptions::parse(&args(&["p.svm", "--fast"])).unwrap_err();
        assert_eq!(err, "unknown option '--fast'");
    }

    #[test]
    fn run_options_reject_bad_number() {
        let err = RunOptions::parse(&args(&["p.svm", "--max-steps", "-3"])).unwrap_err();
        assert!(err.contains("--max-steps"));
    }

    #[test]
    fn run_options_reject_missing_value() {
        let err = RunOptions::parse(&args(&["p.svm", "--dump-vars"])).unwrap_err();
        assert_eq!(err, "--dump-vars requires a value");
    }

    #[test]
    fn run_options_reject_second_program() {
        assert!(RunOptions::parse(&args(&["a.svm", "b.svm"])).is_err());
    }

    #[test]
    fn missing_arguments_found_per_block() {
        use stackvm_common::Instruction;
        use std::collections::BTreeMap;

        let mut blocks = BTreeMap::new();
        blocks.insert(
            "main".to_string(),
            vec![Instruction::unary(Opcode::LoadConst, "1"), Instruction::bare(Opcode::Print)],
        );
        blocks.insert(
            "f".to_string(),
            vec![Instruction::bare(Opcode::Ret), Instruction::bare(Opcode::StoreVar)],
        );
        let program = Program::with_blocks(blocks).unwrap();
        assert_eq!(
            missing_arguments(&program),
            vec![("f".to_string(), 1, Opcode::StoreVar)]
        );
    }

    #[test]
    fn stack_formatting() {
        let lines = format_stack(&[Value::Int(1), Value::Float(2.0), Value::from("hi")]);
        assert_eq!(
            lines,
            vec!["0: 1 (integer)", "1: 2.0 (float)", "2: hi (text)"]
        );
    }

    #[test]
    fn variables_sorted_by_name() {
        let mut vars = Variables::new();
        vars.insert("zeta".to_string(), Value::Int(1));
        vars.insert("alpha".to_string(), Value::from("a"));
        assert_eq!(
            format_variables(&vars),
            vec!["alpha = a (text)", "zeta = 1 (integer)"]
        );
    }
}
