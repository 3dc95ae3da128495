//! CLI entry point for the MC-8 driver binary.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use mc8_asm::{auto_run, Program, RunOutcome, Session};
use mc8_core as _;
#[cfg(test)]
use proptest as _;
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: mc8 <command> [options]

Commands:
  check <input>            Parse source and print its binary listing
  run   <input> [options]  Load source and auto-run it to the end

Run options:
  --memory <words>     Total memory size (default: 100)
  --os <words>         OS region size (default: 20)
  --interval-ms <ms>   Delay between steps (default: 0)
  --status             Also print the memory table after the run

Options:
  -h, --help           Show this help message

Examples:
  mc8 check program.asm
  mc8 run program.asm --interval-ms 250
  mc8 run program.asm --memory 40 --os 8 --status
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Check(CheckArgs),
    Run(RunArgs),
}

#[derive(Debug, PartialEq, Eq)]
struct CheckArgs {
    input: PathBuf,
}

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    input: PathBuf,
    memory: Option<usize>,
    os: Option<usize>,
    interval_ms: u64,
    status: bool,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "check" => parse_check_args(args)
            .map(Command::Check)
            .map(ParseResult::Command),
        "run" => parse_run_args(args)
            .map(Command::Run)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

fn parse_check_args(args: impl Iterator<Item = OsString>) -> Result<CheckArgs, String> {
    let mut input: Option<PathBuf> = None;

    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(CheckArgs { input })
}

#[allow(clippy::while_let_on_iterator)]
fn parse_run_args(mut args: impl Iterator<Item = OsString>) -> Result<RunArgs, String> {
    let mut input: Option<PathBuf> = None;
    let mut memory: Option<usize> = None;
    let mut os: Option<usize> = None;
    let mut interval_ms = 0;
    let mut status = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--status" {
            status = true;
            continue;
        }

        if arg == "--memory" {
            memory = Some(numeric_value(args.next(), "--memory")?);
            continue;
        }

        if arg == "--os" {
            os = Some(numeric_value(args.next(), "--os")?);
            continue;
        }

        if arg == "--interval-ms" {
            interval_ms = numeric_value(args.next(), "--interval-ms")?;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(RunArgs {
        input,
        memory,
        os,
        interval_ms,
        status,
    })
}

fn numeric_value<T: std::str::FromStr>(
    value: Option<OsString>,
    option: &str,
) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("missing value for {option}"))?;
    value
        .to_string_lossy()
        .parse()
        .map_err(|_| format!("invalid value for {option}: {}", value.to_string_lossy()))
}

fn run_check(args: &CheckArgs) -> Result<(), i32> {
    let program = match Program::from_file(&args.input) {
        Ok(program) => program,
        Err(error) => {
            eprintln!("error: {error}");
            return Err(1);
        }
    };

    for (assembly, binary) in program.listing() {
        println!("{binary:<17} ; {assembly}");
    }
    Ok(())
}

fn run_program(args: &RunArgs) -> Result<(), i32> {
    let mut session = Session::new();
    if args.memory.is_some() || args.os.is_some() {
        let total = args.memory.unwrap_or(100);
        let os = args.os.unwrap_or(20);
        if let Err(error) = session.configure_memory(total, os) {
            eprintln!("error: {error}");
            return Err(1);
        }
    }

    let program = match Program::from_file(&args.input) {
        Ok(program) => program,
        Err(error) => {
            eprintln!("error: {error}");
            return Err(1);
        }
    };
    if let Err(error) = session.load(program) {
        eprintln!("error: {error}");
        return Err(1);
    }

    let cancel = AtomicBool::new(false);
    let summary = auto_run(
        &mut session,
        Duration::from_millis(args.interval_ms),
        &cancel,
    );

    println!("{}", session.cpu_snapshot());
    if args.status {
        println!();
        println!("=== MEMORY ===");
        for cell in session.memory_snapshot() {
            println!("{:>3}: {}", cell.address, cell);
        }
    }

    match summary.outcome {
        RunOutcome::Completed => {
            println!();
            println!(
                "Program completed ({} instructions stepped)",
                summary.steps
            );
            Ok(())
        }
        RunOutcome::Halted(fault) => {
            eprintln!("error: execution halted: {fault}");
            Err(1)
        }
        RunOutcome::Cancelled | RunOutcome::NoProgram => {
            eprintln!("error: program did not run to completion");
            Err(1)
        }
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Check(args))) => match run_check(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Ok(ParseResult::Command(Command::Run(args))) => match run_program(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn parses_check_command() {
        let result = parse_args([OsString::from("check"), OsString::from("program.asm")].into_iter())
            .expect("valid check args should parse");

        assert!(matches!(
            result,
            ParseResult::Command(Command::Check(CheckArgs { .. }))
        ));
    }

    #[test]
    fn parses_run_command_with_every_option() {
        let result = parse_run_args(
            [
                OsString::from("program.asm"),
                OsString::from("--memory"),
                OsString::from("40"),
                OsString::from("--os"),
                OsString::from("8"),
                OsString::from("--interval-ms"),
                OsString::from("250"),
                OsString::from("--status"),
            ]
            .into_iter(),
        )
        .expect("valid run args should parse");

        assert_eq!(
            result,
            RunArgs {
                input: PathBuf::from("program.asm"),
                memory: Some(40),
                os: Some(8),
                interval_ms: 250,
                status: true,
            }
        );
    }

    #[test]
    fn run_defaults_leave_the_memory_flags_unset() {
        let result = parse_run_args([OsString::from("program.asm")].into_iter())
            .expect("valid run args should parse");

        assert_eq!(result.memory, None);
        assert_eq!(result.os, None);
        assert_eq!(result.interval_ms, 0);
        assert!(!result.status);
    }

    #[test]
    fn parses_help_flag() {
        let result = parse_args([OsString::from("--help")].into_iter())
            .expect("help should parse without error");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn rejects_unknown_command() {
        let error = parse_args([OsString::from("unknown")].into_iter())
            .expect_err("unknown command should fail parse");
        assert!(error.contains("unknown command"));
    }

    #[test]
    fn rejects_non_numeric_option_values() {
        let error = parse_run_args(
            [
                OsString::from("program.asm"),
                OsString::from("--memory"),
                OsString::from("lots"),
            ]
            .into_iter(),
        )
        .expect_err("non-numeric value should fail");
        assert!(error.contains("invalid value for --memory"));
    }

    #[test]
    fn rejects_missing_option_values() {
        let error = parse_run_args(
            [OsString::from("program.asm"), OsString::from("--os")].into_iter(),
        )
        .expect_err("missing value should fail");
        assert!(error.contains("missing value for --os"));
    }

    #[test]
    fn check_rejects_options() {
        let error = parse_check_args([OsString::from("--verbose")].into_iter())
            .expect_err("check should reject options");
        assert!(error.contains("unknown option"));
    }

    #[test]
    fn rejects_multiple_inputs() {
        let error = parse_run_args(
            [OsString::from("a.asm"), OsString::from("b.asm")].into_iter(),
        )
        .expect_err("two inputs should fail");
        assert!(error.contains("multiple input paths"));
    }
}
