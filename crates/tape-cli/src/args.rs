//! Command-line grammar for `tapevm`.

use std::num::{NonZeroU64, NonZeroUsize};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tape_core::{
    BehaviorPolicy, CellBehavior, EngineConfig, PointerBehavior, DEFAULT_CHUNK_STEPS,
    DEFAULT_MAX_STEPS, DEFAULT_MEMORY_SIZE,
};

/// Top-level command line.
#[derive(Debug, Parser)]
#[command(
    name = "tapevm",
    version,
    about = "Validate, compile, inspect and run tape-language programs",
    long_about = "Validate, compile, inspect and run tape-language programs.\n\nExit status: 0 on success, 1 for usage or I/O failures, 2 for malformed programs, 3 when a run violates the error policy.\n\nExamples:\n  tapevm run hello.b\n  tapevm run echo.b --input 'abc' --cell error\n  tapevm run loop.b --mode step --break 12\n  tapevm compile hello.b --json"
)]
pub struct Cli {
    /// Log engine activity at debug level. `TAPEVM_LOG` takes precedence.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Operation to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a program and write its output to stdout.
    Run(RunArgs),
    /// Validate and compile a program without running it.
    Check(SourceArgs),
    /// Print fusion statistics, the instruction listing and the jump table.
    Compile(CompileArgs),
    /// Print structured pseudocode for a program.
    Pseudo(PseudoArgs),
}

/// Where the program comes from.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct SourceArgs {
    /// Program file.
    pub file: PathBuf,

    /// Drop characters outside the operator alphabet instead of rejecting them.
    #[arg(long)]
    pub lenient: bool,
}

/// Engine tunables shared by the subcommands that build an interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Args)]
pub struct EngineArgs {
    /// Pointer behavior at the tape edges.
    #[arg(long, value_enum, default_value_t = PointerArg::Clamp)]
    pub pointer: PointerArg,

    /// Cell behavior outside 0..=255.
    #[arg(long, value_enum, default_value_t = CellArg::Wrap)]
    pub cell: CellArg,

    /// Number of tape cells.
    #[arg(long, default_value_t = DEFAULT_MEMORY_SIZE)]
    pub memory: NonZeroUsize,

    /// Step ceiling for a run.
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    pub max_steps: u64,

    /// Instructions per chunk in chunked mode.
    #[arg(long, default_value_t = DEFAULT_CHUNK_STEPS)]
    pub chunk: NonZeroU64,
}

impl EngineArgs {
    /// Engine configuration described by these flags.
    #[must_use]
    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            memory_size: self.memory,
            policy: BehaviorPolicy::new(self.pointer.into(), self.cell.into()),
            max_steps: self.max_steps,
            chunk_steps: self.chunk,
        }
    }
}

/// `run` subcommand flags.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct RunArgs {
    /// Program source.
    #[command(flatten)]
    pub source: SourceArgs,

    /// Engine tunables.
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Text staged as the input queue.
    #[arg(long, default_value = "")]
    pub input: String,

    /// Read further input lines from stdin once the staged input is used up.
    #[arg(long)]
    pub interactive: bool,

    /// Execution strategy.
    #[arg(long, value_enum, default_value_t = ModeArg::Bulk)]
    pub mode: ModeArg,

    /// Source offset to stop at. Checked after every step in step mode and
    /// between chunks in chunked mode.
    #[arg(long = "break", value_name = "OFFSET")]
    pub breakpoints: Vec<usize>,

    /// Print a JSON run report instead of the raw program output.
    #[arg(long)]
    pub json: bool,
}

/// `compile` subcommand flags.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct CompileArgs {
    /// Program source.
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// `pseudo` subcommand flags.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct PseudoArgs {
    /// Program file.
    pub file: PathBuf,

    /// Cell behavior named in the rendering.
    #[arg(long, value_enum, default_value_t = CellArg::Wrap)]
    pub cell: CellArg,

    /// Tape size named in the header.
    #[arg(long, default_value_t = DEFAULT_MEMORY_SIZE)]
    pub memory: NonZeroUsize,
}

/// Command-line spelling of [`PointerBehavior`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PointerArg {
    /// Saturate at the tape edges.
    Clamp,
    /// Wrap around the tape.
    Wrap,
    /// Fail on leaving the tape.
    Error,
}

impl From<PointerArg> for PointerBehavior {
    fn from(value: PointerArg) -> Self {
        match value {
            PointerArg::Clamp => Self::Clamp,
            PointerArg::Wrap => Self::Wrap,
            PointerArg::Error => Self::Error,
        }
    }
}

/// Command-line spelling of [`CellBehavior`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CellArg {
    /// Fold values into 0..=255.
    Wrap,
    /// Keep values unbounded.
    Unlimited,
    /// Fail on leaving 0..=255.
    Error,
}

impl From<CellArg> for CellBehavior {
    fn from(value: CellArg) -> Self {
        match value {
            CellArg::Wrap => Self::Wrap,
            CellArg::Unlimited => Self::Unlimited,
            CellArg::Error => Self::Error,
        }
    }
}

/// Execution strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Compile and run to completion in one call.
    Bulk,
    /// Compile and run in resumable chunks.
    Chunked,
    /// Step the raw source one character at a time.
    Step,
}
