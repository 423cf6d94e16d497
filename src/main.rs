//! Purpose: `funcson` CLI entry point and command dispatch.
//! Role: Binary crate root; parses args, runs commands, emits output on stdout.
//! Invariants: Commands emit stable stdout formats (human or JSON by command/flags).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: All document processing goes through `api::Codec`.
#![allow(clippy::result_large_err)]
use std::io::{self, IsTerminal, Read};

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod color_json;
mod command_dispatch;

use color_json::{colorize_extended, colorize_json};
use funcson::api::{
    Codec, Error, ErrorKind, ParseDiagnostic, ParseResult, Value as DocValue, to_exit_code,
};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                let message = clap_error_summary(&err);
                let hint = clap_error_hint(&err);
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint(hint),
                    ColorMode::Auto,
                ));
            }
        },
    };

    init_tracing();
    let color_mode = cli.color;

    let result = command_dispatch::dispatch_command(cli.command, color_mode);

    result
        .map_err(add_invalid_json_hint)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "funcson",
    version,
    about = "Format and inspect JSON documents with inline JavaScript functions",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Documents are JSON plus inline function literals. Function bodies ride
along as opaque source text: they are parsed structurally, never executed.

Mental model:
  - `fmt` parses and re-serializes (functions stay inline)
  - `check` validates structure
  - `inspect` reports where functions live
"#,
    after_help = r#"EXAMPLES
  $ funcson fmt chart.json                  # pretty-print, functions inline
  $ cat chart.json | funcson fmt            # read from stdin
  $ funcson fmt --indent 0 chart.json       # compact one-line output
  $ funcson check chart.json                # exit 0 if valid, 3 if not
  $ funcson inspect --json chart.json       # list function paths as JSON

LEARN MORE
  $ funcson <command> --help
  https://github.com/sandover/funcson"#,
    arg_required_else_help = true,
    disable_help_subcommand = false
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Color output: auto, always, or never"
    )]
    color: ColorMode,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Format a document",
        long_about = r#"Parse a document and re-serialize it with the requested indentation.

Function literals survive the round trip verbatim at their original
positions. `--indent 0` emits compact single-line output."#,
        after_help = r#"EXAMPLES
  $ funcson fmt chart.json
  $ funcson fmt --indent 4 chart.json
  $ funcson fmt --indent 0 chart.json
  $ cat chart.json | funcson fmt

NOTES
  - Output goes to stdout; colorized when stdout is a terminal.
  - Malformed input is an error (exit 3), never echoed back."#
    )]
    Fmt {
        #[arg(
            help = "Input file, or '-' for stdin (default: stdin)",
            value_hint = ValueHint::FilePath
        )]
        input: Option<String>,
        #[arg(
            long,
            default_value_t = 2,
            help = "Spaces per indent level (0 = compact)"
        )]
        indent: usize,
    },
    #[command(
        about = "Validate a document",
        long_about = r#"Parse a document and report whether it is well-formed.

Valid input exits 0. Invalid input reports the failure (with line and
column when known) and exits 3."#,
        after_help = r#"EXAMPLES
  $ funcson check chart.json
  $ funcson check --json chart.json
  $ echo '{"x": 1,}' | funcson check

NOTES
  - Human-readable output is the default on a terminal.
  - Use --json for machine-readable output."#
    )]
    Check {
        #[arg(
            help = "Input file, or '-' for stdin (default: stdin)",
            value_hint = ValueHint::FilePath
        )]
        input: Option<String>,
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
    },
    #[command(
        about = "Report the function literals in a document",
        long_about = r#"Parse a document and list the access paths of its function literals.

Paths use dot/bracket notation, e.g. `tooltip.formatter` or
`series[0].label`. A function at the document root has an empty path
and is reported only in the count."#,
        after_help = r#"EXAMPLES
  $ funcson inspect chart.json
  $ funcson inspect --json chart.json"#
    )]
    Inspect {
        #[arg(
            help = "Input file, or '-' for stdin (default: stdin)",
            value_hint = ValueHint::FilePath
        )]
        input: Option<String>,
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
    },
    #[command(
        about = "Print version info as JSON",
        long_about = r#"Emit version info as JSON (stable, machine-readable)."#,
        after_help = r#"EXAMPLES
  $ funcson version"#
    )]
    Version,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        long_about = r#"Generate shell completion scripts.

Prints a completion script for the given shell to stdout.
Install the generated file in your shell's completion directory (or source it)
to enable tab completion."#,
        after_help = r#"EXAMPLES
  $ funcson completion bash > ~/.local/share/bash-completion/completions/funcson
  $ source ~/.bashrc
  $ funcson completion zsh > ~/.zfunc/_funcson
  $ autoload -U compinit && compinit
  $ funcson completion fish > ~/.config/fish/completions/funcson.fish"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

struct InputText {
    label: String,
    text: String,
}

fn read_input(input: Option<&str>) -> Result<InputText, Error> {
    match input {
        None | Some("-") => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            Ok(InputText {
                label: "<stdin>".to_string(),
                text,
            })
        }
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read input file")
                    .with_path(path)
                    .with_source(err)
            })?;
            Ok(InputText {
                label: path.to_string(),
                text,
            })
        }
    }
}

fn emit_json(value: serde_json::Value, color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let use_color = color_mode.use_color(is_tty);
    let pretty = is_tty || use_color;
    let json = if pretty {
        if use_color {
            colorize_json(&value, true)
        } else {
            serde_json::to_string_pretty(&value)
                .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
        }
    } else {
        serde_json::to_string(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{json}");
}

fn emit_version_output(color_mode: ColorMode) {
    if io::stdout().is_terminal() {
        println!("funcson {}", env!("CARGO_PKG_VERSION"));
        return;
    }
    emit_json(
        json!({
            "name": "funcson",
            "version": env!("CARGO_PKG_VERSION"),
        }),
        color_mode,
    );
}

fn emit_check_human(label: &str, diagnostic: Option<&ParseDiagnostic>) {
    if !io::stdout().is_terminal() {
        match diagnostic {
            None => println!("OK: {label}"),
            Some(diag) => {
                let mut summary = format!("INVALID: {label} issue={}", diag.message);
                if let Some(line) = diag.line {
                    summary.push_str(&format!(" line={line}"));
                }
                if let Some(column) = diag.column {
                    summary.push_str(&format!(" column={column}"));
                }
                println!("{summary}");
            }
        }
        return;
    }

    match diagnostic {
        None => {
            println!("{label}: valid");
        }
        Some(diag) => {
            println!("{label}: invalid");
            println!("  detail:    {}", diag.message);
            if let Some(line) = diag.line {
                match diag.column {
                    Some(column) => println!("  location:  line {line}, column {column}"),
                    None => println!("  location:  line {line}"),
                }
            }
        }
    }
}

fn emit_inspect_human(label: &str, result: &ParseResult) {
    let count = count_functions(&result.data);
    if !io::stdout().is_terminal() {
        println!("{label}: functions={count}");
        for path in &result.function_paths {
            println!("{path}");
        }
        return;
    }

    if count == 0 {
        println!("{label}: no function literals");
        return;
    }
    let noun = if count == 1 {
        "function literal"
    } else {
        "function literals"
    };
    println!("{label}: {count} {noun}");
    for path in &result.function_paths {
        println!("  {path}");
    }
    // A function at the document root restores without a recorded path.
    if result.function_paths.len() < count {
        println!("  (document root)");
    }
}

fn count_functions(value: &DocValue) -> usize {
    match value {
        DocValue::Array(items) => items.iter().map(count_functions).sum(),
        DocValue::Object(entries) => entries.values().map(count_functions).sum(),
        DocValue::Function(_) => 1,
        _ => 0,
    }
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::InvalidJsonStructure => "invalid JSON structure".to_string(),
        ErrorKind::FunctionCompile => "function compilation failed".to_string(),
        ErrorKind::Unsupported => "unsupported operation".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    if let Some(column) = err.column() {
        inner.insert("column".to_string(), json!(column));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let Some(line) = err.line() {
        lines.push(format!(
            "{} {line}",
            colorize_label("line:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(column) = err.column() {
        lines.push(format!(
            "{} {column}",
            colorize_label("column:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);

    let Some(usage) = usage else {
        return "Try `funcson --help`.".to_string();
    };

    let tokens: Vec<&str> = usage.split_whitespace().collect();
    let Some(pos) = tokens.iter().position(|t| *t == "funcson") else {
        return "Try `funcson --help`.".to_string();
    };

    let mut parts = Vec::new();
    for token in tokens.iter().skip(pos + 1) {
        if token.starts_with('-') || token.starts_with('<') || token.starts_with('[') {
            break;
        }
        parts.push(*token);
    }

    if parts.is_empty() {
        return "Try `funcson --help`.".to_string();
    }

    format!("Try `funcson {} --help`.", parts.join(" "))
}

fn attach_input_path(err: Error, input: Option<&str>) -> Error {
    match input {
        Some(path) if path != "-" && err.path().is_none() => err.with_path(path),
        _ => err,
    }
}

fn add_invalid_json_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::InvalidJsonStructure || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "The document is not valid JSON after function extraction. Check the reported line and column.",
    )
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::Io => err.with_hint("I/O error. Check the path and file permissions."),
        _ => err,
    }
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_BACKTRACE=1 and share command/context if it persists.",
    )
}

#[cfg(test)]
mod tests {
    use super::{
        AnsiColor, ColorMode, Error, ErrorKind, add_invalid_json_hint, add_io_hint,
        attach_input_path, clap_error_hint, clap_error_summary, colorize_label, count_functions,
        error_json, error_message, error_text,
    };
    use clap::CommandFactory;

    #[test]
    fn error_text_respects_color_flag() {
        let err = Error::new(ErrorKind::Usage).with_message("bad input");
        let colored = error_text(&err, true);
        let plain = error_text(&err, false);
        assert!(colored.contains("\u{1b}[31merror:\u{1b}[0m"));
        assert!(plain.contains("error:"));
        assert!(!plain.contains("\u{1b}["));
    }

    #[test]
    fn error_text_includes_line_and_column() {
        let err = Error::new(ErrorKind::InvalidJsonStructure)
            .with_message("invalid JSON structure: expected value")
            .with_line(3)
            .with_column(14);
        let text = error_text(&err, false);
        assert!(text.contains("line: 3"));
        assert!(text.contains("column: 14"));
    }

    #[test]
    fn error_json_envelope_contains_kind_message_and_location() {
        let err = Error::new(ErrorKind::InvalidJsonStructure)
            .with_message("invalid JSON structure: trailing comma")
            .with_line(1)
            .with_column(9);
        let value = error_json(&err);
        let inner = value.get("error").expect("error envelope");
        assert_eq!(inner.get("kind").unwrap(), "InvalidJsonStructure");
        assert_eq!(
            inner.get("message").unwrap(),
            "invalid JSON structure: trailing comma"
        );
        assert_eq!(inner.get("line").unwrap(), 1);
        assert_eq!(inner.get("column").unwrap(), 9);
        assert!(inner.get("causes").is_none());
    }

    #[test]
    fn error_message_falls_back_to_kind_description() {
        let err = Error::new(ErrorKind::FunctionCompile);
        assert_eq!(error_message(&err), "function compilation failed");
    }

    #[test]
    fn colorize_label_passthrough_when_disabled() {
        assert_eq!(colorize_label("error:", false, AnsiColor::Red), "error:");
    }

    #[test]
    fn clap_error_summary_extracts_first_error_line() {
        let cmd = super::Cli::command();
        let err = cmd.clone().try_get_matches_from(["funcson", "bogus"]);
        let err = err.expect_err("bogus subcommand should fail");
        let summary = clap_error_summary(&err);
        assert!(summary.contains("bogus"), "summary was: {summary}");
    }

    #[test]
    fn clap_error_hint_points_at_subcommand_help() {
        let cmd = super::Cli::command();
        let err = cmd
            .clone()
            .try_get_matches_from(["funcson", "completion"])
            .expect_err("completion without shell should fail");
        let hint = clap_error_hint(&err);
        assert!(
            hint.contains("--help"),
            "hint should point at help, was: {hint}"
        );
    }

    #[test]
    fn invalid_json_hint_added_only_when_missing() {
        let err = Error::new(ErrorKind::InvalidJsonStructure).with_message("bad");
        let hinted = add_invalid_json_hint(err);
        assert!(hinted.hint().is_some());

        let already = Error::new(ErrorKind::InvalidJsonStructure)
            .with_message("bad")
            .with_hint("existing");
        let kept = add_invalid_json_hint(already);
        assert_eq!(kept.hint(), Some("existing"));
    }

    #[test]
    fn io_hint_skips_other_kinds() {
        let err = Error::new(ErrorKind::Usage).with_message("bad flag");
        let unchanged = add_io_hint(err);
        assert!(unchanged.hint().is_none());
    }

    #[test]
    fn color_mode_auto_follows_tty() {
        assert!(ColorMode::Auto.use_color(true));
        assert!(!ColorMode::Auto.use_color(false));
        assert!(ColorMode::Always.use_color(false));
        assert!(!ColorMode::Never.use_color(true));
    }

    #[test]
    fn count_functions_walks_nested_containers() {
        let parsed = funcson::api::parse(
            r#"{"a": function () { return 1; }, "b": [1, (x) => x, {"c": function named() { return 2; }}]}"#,
        )
        .expect("parse");
        assert_eq!(count_functions(&parsed.data), 3);
    }

    #[test]
    fn attach_input_path_skips_stdin_and_existing_paths() {
        let err = Error::new(ErrorKind::InvalidJsonStructure).with_message("bad");
        let attached = attach_input_path(err, Some("chart.json"));
        assert_eq!(
            attached.path().map(|p| p.display().to_string()),
            Some("chart.json".to_string())
        );

        let err = Error::new(ErrorKind::InvalidJsonStructure).with_message("bad");
        let stdin_err = attach_input_path(err, Some("-"));
        assert!(stdin_err.path().is_none());
    }

    #[test]
    fn cli_declares_expected_subcommands() {
        let cmd = super::Cli::command();
        let names: Vec<&str> = cmd.get_subcommands().map(|sub| sub.get_name()).collect();
        for expected in ["fmt", "check", "inspect", "version", "completion"] {
            assert!(names.contains(&expected), "missing subcommand {expected}");
        }
    }
}
