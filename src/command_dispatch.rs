//! Purpose: Hold top-level CLI command dispatch for `funcson`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Command behavior, output envelopes, and exit code semantics stay unchanged.
//! Invariants: Helpers in `main.rs` remain the source of command business logic.

use super::*;

pub(super) fn dispatch_command(command: Command, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "funcson", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output(color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Fmt { input, indent } => {
            let source = read_input(input.as_deref())?;
            if source.text.trim().is_empty() {
                return Ok(RunOutcome::ok());
            }
            let codec = Codec::new();
            let parsed = codec
                .parse(&source.text)
                .map_err(|err| attach_input_path(err, input.as_deref()))?;
            let is_tty = io::stdout().is_terminal();
            let use_color = color_mode.use_color(is_tty);
            let text = if indent == 0 {
                codec.stringify(&parsed.data, None)
            } else if use_color {
                colorize_extended(&parsed.data, indent, true)
            } else {
                codec.stringify(&parsed.data, Some(indent))
            };
            println!("{text}");
            Ok(RunOutcome::ok())
        }
        Command::Check { input, json } => {
            let source = read_input(input.as_deref())?;
            let diagnostic = Codec::new().validate(&source.text);
            if json {
                let value = match &diagnostic {
                    None => json!({
                        "check": { "input": source.label, "valid": true }
                    }),
                    Some(diag) => json!({
                        "check": { "input": source.label, "valid": false, "diagnostic": diag }
                    }),
                };
                emit_json(value, color_mode);
            } else {
                emit_check_human(&source.label, diagnostic.as_ref());
            }
            match diagnostic {
                None => Ok(RunOutcome::ok()),
                Some(_) => Ok(RunOutcome::with_code(to_exit_code(
                    ErrorKind::InvalidJsonStructure,
                ))),
            }
        }
        Command::Inspect { input, json } => {
            let source = read_input(input.as_deref())?;
            let parsed = Codec::new()
                .parse(&source.text)
                .map_err(|err| attach_input_path(err, input.as_deref()))?;
            if json {
                emit_json(
                    json!({
                        "inspect": {
                            "input": source.label,
                            "has_functions": parsed.has_functions,
                            "function_count": count_functions(&parsed.data),
                            "function_paths": parsed.function_paths,
                        }
                    }),
                    color_mode,
                );
            } else {
                emit_inspect_human(&source.label, &parsed);
            }
            Ok(RunOutcome::ok())
        }
    }
}
