//! Command-line driver for the tape-language interpreter.
//!
//! The `tapevm` binary parses [`Cli`], installs logging, and hands the command
//! to [`execute`]. Everything here is a thin host over `tape_core`: it reads
//! program files, maps flags onto [`tape_core::EngineConfig`], picks an
//! execution strategy, and renders output and diagnostics.

/// Command-line grammar.
pub mod args;
pub use args::{
    CellArg, Cli, Command, CompileArgs, EngineArgs, ModeArg, PointerArg, PseudoArgs, RunArgs,
    SourceArgs,
};

/// Diagnostics and exit statuses.
pub mod error;
pub use error::{CliError, SourceLocation, EXIT_PROGRAM, EXIT_RUNTIME, EXIT_USAGE};

/// `tracing` subscriber setup.
pub mod logging;
pub use logging::{default_directive, init_logging, LOG_ENV};

/// Subcommand execution.
pub mod driver;
pub use driver::{execute, read_program, RunReport};
