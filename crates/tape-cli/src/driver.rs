//! Subcommand execution.
//!
//! Every subcommand writes its normal output to `out` and warnings to `err`,
//! and returns a [`CliError`] for the caller to render and turn into an exit
//! status.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use tape_core::{
    is_operator, EngineConfig, Interpreter, PointerBehavior, ResumeCursor, RunState, StopReason,
    TapeError,
};
use tracing::{debug, warn};

use crate::{Cli, CliError, Command, CompileArgs, ModeArg, PseudoArgs, RunArgs, SourceArgs};

/// JSON document printed by `run --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Output decoded one character per byte.
    pub output: String,
    /// Steps executed.
    pub steps: u64,
    /// Source offset of the next character to execute.
    pub program_counter: usize,
    /// Active cell index.
    pub pointer: usize,
    /// Value of the active cell.
    pub current_cell: i64,
    /// Lifecycle state when the run returned.
    pub run_state: RunState,
    /// Why the run returned.
    pub stop: StopReason,
    /// Tape contents up to the last non-zero cell.
    pub cells: Vec<i64>,
}

impl RunReport {
    /// Captures `interp` after a run that ended with `stop`.
    #[must_use]
    pub fn new(interp: &Interpreter, stop: StopReason) -> Self {
        let memory = interp.memory();
        let used = memory
            .iter()
            .rposition(|cell| *cell != 0)
            .map_or(0, |last| last + 1);

        Self {
            output: interp.output_text(),
            steps: interp.step_count(),
            program_counter: interp.program_counter(),
            pointer: interp.pointer(),
            current_cell: interp.current_cell(),
            run_state: interp.run_state(),
            stop,
            cells: memory[..used].to_vec(),
        }
    }
}

/// Runs the parsed command line.
///
/// # Errors
///
/// Any [`CliError`]; output produced before a runtime failure has already
/// been written to `out`.
pub fn execute(cli: &Cli, out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    match &cli.command {
        Command::Run(args) => run(args, out, err),
        Command::Check(args) => check(args, out),
        Command::Compile(args) => compile_report(args, out),
        Command::Pseudo(args) => pseudo(args, out),
    }
}

/// Reads a program file.
///
/// Trailing whitespace is dropped. With `lenient`, every character outside
/// the operator alphabet is dropped as well.
///
/// # Errors
///
/// [`CliError::Read`] when the file cannot be read.
pub fn read_program(source: &SourceArgs) -> Result<String, CliError> {
    let text = fs::read_to_string(&source.file).map_err(|error| CliError::Read {
        path: source.file.clone(),
        source: error,
    })?;

    let text = if source.lenient {
        text.chars().filter(|c| is_operator(*c)).collect()
    } else {
        text.trim_end().to_string()
    };
    debug!(path = %source.file.display(), chars = text.chars().count(), "program read");
    Ok(text)
}

fn ensure_valid(interp: &Interpreter, path: &Path) -> Result<(), CliError> {
    let errors = interp.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CliError::Invalid {
            path: path.to_path_buf(),
            errors,
        })
    }
}

fn read_stdin_line() -> String {
    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(_) => line,
        Err(error) => {
            warn!(%error, "stdin read failed; feeding no input");
            String::new()
        }
    }
}

fn end_reason(interp: &Interpreter) -> StopReason {
    if interp.program_counter() >= interp.program().len() {
        StopReason::Finished
    } else {
        StopReason::StepLimit
    }
}

fn run_chunked(
    interp: &mut Interpreter,
    breakpoints: &BTreeSet<usize>,
) -> Result<StopReason, TapeError> {
    let mut cursor = ResumeCursor::new();
    loop {
        if !interp.run_chunk(&mut cursor)? {
            return Ok(end_reason(interp));
        }
        if let Some(offset) = interp
            .source_offset_of(&cursor)
            .filter(|offset| breakpoints.contains(offset))
        {
            return Ok(StopReason::Breakpoint(offset));
        }
    }
}

fn run(args: &RunArgs, out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let path = args.source.file.as_path();
    let source = read_program(&args.source)?;
    let config = args.engine.config();

    let mut interp = Interpreter::with_config(config);
    interp.load(&source, &args.input);
    ensure_valid(&interp, path)?;
    if args.interactive {
        interp.set_input_supplier(read_stdin_line);
    }

    let breakpoints: BTreeSet<usize> = args.breakpoints.iter().copied().collect();
    let result = match args.mode {
        ModeArg::Bulk => {
            if !breakpoints.is_empty() {
                warn!("breakpoints are ignored in bulk mode");
            }
            interp
                .compile()
                .map_err(|error| CliError::compile(path, error))?;
            interp.run_to_completion().map(|_| end_reason(&interp))
        }
        ModeArg::Chunked => {
            interp
                .compile()
                .map_err(|error| CliError::compile(path, error))?;
            run_chunked(&mut interp, &breakpoints)
        }
        ModeArg::Step => interp
            .run_until_end(config.max_steps, &breakpoints)
            .map(|outcome| outcome.stop),
    };

    let stop = match result {
        Ok(stop) => stop,
        Err(error) => {
            if !args.json {
                out.write_all(interp.output())?;
                out.flush()?;
            }
            return Err(CliError::engine(path, Some(interp.program_counter()), error));
        }
    };

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &RunReport::new(&interp, stop))?;
        writeln!(out)?;
    } else {
        out.write_all(interp.output())?;
        match stop {
            StopReason::Finished => {}
            StopReason::StepLimit => writeln!(
                err,
                "warning: stopped after {} steps (step limit {})",
                interp.step_count(),
                config.max_steps
            )?,
            StopReason::Breakpoint(offset) => writeln!(
                err,
                "{}:{offset}: breakpoint reached after {} steps",
                path.display(),
                interp.step_count()
            )?,
        }
    }
    out.flush()?;
    Ok(())
}

fn check(args: &SourceArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let path = args.file.as_path();
    let source = read_program(args)?;
    let mut interp = Interpreter::new();
    interp.load(&source, "");
    ensure_valid(&interp, path)?;

    let characters = interp.program().len();
    let compiled = interp
        .compile()
        .map_err(|error| CliError::compile(path, error))?;
    writeln!(
        out,
        "{}: ok ({characters} characters, {} instructions, {} fused away)",
        path.display(),
        compiled.len(),
        compiled.fused_savings()
    )?;
    Ok(())
}

fn compile_report(args: &CompileArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let path = args.source.file.as_path();
    let source = read_program(&args.source)?;
    let mut interp = Interpreter::new();
    interp.load(&source, "");
    ensure_valid(&interp, path)?;

    let report = interp
        .compile_report()
        .map_err(|error| CliError::compile(path, error))?;
    if args.json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        write!(out, "{report}")?;
    }
    Ok(())
}

fn pseudo(args: &PseudoArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let source = read_program(&SourceArgs {
        file: args.file.clone(),
        lenient: false,
    })?;
    let mut interp = Interpreter::with_config(EngineConfig {
        memory_size: args.memory,
        ..EngineConfig::default()
    });
    interp.configure(PointerBehavior::default(), args.cell.into());
    interp.load(&source, "");

    write!(out, "{}", interp.pseudocode())?;
    Ok(())
}
