//! Located diagnostics and process exit statuses.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tape_core::{InvalidCharacter, SyntaxError, TapeError};
use thiserror::Error;

/// Exit status for usage and I/O failures.
pub const EXIT_USAGE: u8 = 1;
/// Exit status for malformed or missing programs.
pub const EXIT_PROGRAM: u8 = 2;
/// Exit status for policy violations during a run.
pub const EXIT_RUNTIME: u8 = 3;

/// Program file plus an optional character offset, rendered `file:offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Program file.
    pub path: PathBuf,
    /// Character offset into the program source.
    pub offset: Option<usize>,
}

impl SourceLocation {
    /// Location of `offset` in `path`.
    #[must_use]
    pub fn new(path: &Path, offset: Option<usize>) -> Self {
        Self {
            path: path.to_path_buf(),
            offset,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{}:{offset}", self.path.display()),
            None => write!(f, "{}", self.path.display()),
        }
    }
}

/// Failures reported by the command-line driver. `Display` renders the full
/// stderr diagnostic.
#[derive(Debug, Error)]
pub enum CliError {
    /// The program file could not be read.
    #[error("{}: error: cannot read program: {source}", .path.display())]
    Read {
        /// Program file.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The program contains characters outside the operator alphabet.
    #[error("{}", invalid_lines(.path, .errors))]
    Invalid {
        /// Program file.
        path: PathBuf,
        /// Every offending character in source order.
        errors: Vec<InvalidCharacter>,
    },
    /// Compilation or execution failed.
    #[error("{location}: error: {error}")]
    Engine {
        /// Where the failure happened.
        location: SourceLocation,
        /// Engine error.
        error: TapeError,
    },
    /// Writing to stdout or stderr failed.
    #[error("error: cannot write output: {0}")]
    Write(#[from] io::Error),
    /// A JSON report could not be produced.
    #[error("error: cannot encode report: {0}")]
    Json(#[from] serde_json::Error),
}

fn invalid_lines(path: &Path, errors: &[InvalidCharacter]) -> String {
    errors
        .iter()
        .map(|invalid| {
            let location = SourceLocation::new(path, Some(invalid.index));
            format!("{location}: error: {}", SyntaxError::from(*invalid))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl CliError {
    /// Engine failure located at `offset` in `path`.
    #[must_use]
    pub fn engine(path: &Path, offset: Option<usize>, error: TapeError) -> Self {
        Self::Engine {
            location: SourceLocation::new(path, offset),
            error,
        }
    }

    /// Engine failure raised before execution, located from the error itself.
    #[must_use]
    pub fn compile(path: &Path, error: TapeError) -> Self {
        let offset = match error {
            TapeError::Syntax(SyntaxError::InvalidCharacter { index, .. }) => Some(index),
            _ => None,
        };
        Self::engine(path, offset, error)
    }

    /// Process exit status for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Read { .. } | Self::Write(_) | Self::Json(_) => EXIT_USAGE,
            Self::Invalid { .. } => EXIT_PROGRAM,
            Self::Engine { error, .. } if error.is_runtime() => EXIT_RUNTIME,
            Self::Engine { .. } => EXIT_PROGRAM,
        }
    }
}
