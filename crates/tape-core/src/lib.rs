//! Compiler and execution engine for a tape-and-pointer instruction language.
//!
//! Programs are strings over the eight operators `> < + - . , [ ]`. The
//! [`Interpreter`] validates and compiles them into fused, jump-resolved
//! [`Instruction`] sequences and executes them under a configurable
//! [`BehaviorPolicy`] with one of three strategies: single-step over the raw
//! source, run-to-completion, or interruptible chunks driven by a
//! caller-owned [`ResumeCursor`].

/// Error taxonomy shared by validation, compilation, and execution.
pub mod fault;
pub use fault::{Direction, ErrorClass, SyntaxError, TapeError};

/// Pointer and cell boundary behaviors and their gate functions.
pub mod policy;
pub use policy::{
    BehaviorPolicy, CellBehavior, CellWrite, GateOutcome, PointerBehavior, CELL_MAX, CELL_MODULUS,
};

/// Fixed-length cell tape.
pub mod memory;
pub use memory::{Tape, DEFAULT_MEMORY_SIZE};

/// Operator alphabet and opcode table.
pub mod opcode;
pub use opcode::{is_operator, Opcode, OPCODE_TABLE};

/// Program text and syntax validation.
pub mod program;
pub use program::{validate, InvalidCharacter, Program};

/// Single-pass compiler with run-length fusion and jump resolution.
pub mod compiler;
pub use compiler::{compile, CompiledProgram, Instruction};

/// Output accumulator and input queue.
pub mod io;
pub use io::{InputSupplier, IoChannel};

/// Run flag lifecycle.
pub mod state;
pub use state::RunState;

/// Shared instruction semantics and the resumable compiled-run loop.
pub mod execute;
pub use execute::{
    execute_instruction, execute_op, matching_bracket, run_compiled, ChunkStatus, Flow, Machine,
    ResumeCursor,
};

/// Compile statistics, instruction listing and jump table.
pub mod listing;
pub use listing::{CompileReport, JumpEntry, ListingRow};

/// Structured pseudocode rendering.
pub mod pseudocode;
pub use pseudocode::generate_pseudocode;

/// Host-facing interpreter and its configuration.
pub mod api;
pub use api::{
    EngineConfig, Interpreter, RunOutcome, Snapshot, StopReason, DEFAULT_CHUNK_STEPS,
    DEFAULT_MAX_STEPS,
};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
