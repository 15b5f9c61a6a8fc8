//! Host-facing interpreter: load, configure, validate, compile, and the three
//! execution strategies, plus the read surface consumed by front ends.

use std::collections::BTreeSet;
use std::num::{NonZeroU64, NonZeroUsize};

use tracing::debug;

use crate::{
    compile, execute_op, generate_pseudocode, matching_bracket, run_compiled, BehaviorPolicy,
    CellBehavior, ChunkStatus, CompileReport, CompiledProgram, Flow, InputSupplier,
    InvalidCharacter, Machine, Opcode, PointerBehavior, Program, ResumeCursor, RunState,
    SyntaxError, Tape, TapeError, DEFAULT_MEMORY_SIZE,
};

/// Default step ceiling for bulk and chunked runs.
pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;

/// Default number of instructions per interruptible chunk.
pub const DEFAULT_CHUNK_STEPS: NonZeroU64 = match NonZeroU64::new(10_000) {
    Some(steps) => steps,
    None => panic!("default chunk size must be non-zero"),
};

/// Interpreter construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct EngineConfig {
    /// Number of cells on the tape.
    pub memory_size: NonZeroUsize,
    /// Pointer and cell boundary handling.
    pub policy: BehaviorPolicy,
    /// Step ceiling for bulk and chunked runs.
    pub max_steps: u64,
    /// Instructions executed per interruptible chunk.
    pub chunk_steps: NonZeroU64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            policy: BehaviorPolicy::default(),
            max_steps: DEFAULT_MAX_STEPS,
            chunk_steps: DEFAULT_CHUNK_STEPS,
        }
    }
}

/// Why a character-stepped run returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StopReason {
    /// The program counter reached the end of the source.
    Finished,
    /// The requested step budget was used up.
    StepLimit,
    /// The program counter landed on this breakpoint offset.
    Breakpoint(usize),
}

/// Aggregated outcome of [`Interpreter::run_until_end`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RunOutcome {
    /// Characters executed during this call.
    pub steps: u64,
    /// Condition that ended the call.
    pub stop: StopReason,
}

/// Point-in-time copy of everything a front end displays.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Snapshot {
    /// Source index of the next character to execute.
    pub program_counter: usize,
    /// Active cell index.
    pub pointer: usize,
    /// Value of the active cell.
    pub current_cell: i64,
    /// Every cell in index order.
    pub memory: Vec<i64>,
    /// Output bytes produced since the last load.
    pub output: Vec<u8>,
    /// Run flag state.
    pub run_state: RunState,
    /// Cumulative executed steps since the last load.
    pub steps: u64,
}

/// Tape-language interpreter owning one program, one tape, and one I/O
/// channel.
///
/// The program counter reported to hosts is always a source index, whichever
/// strategy advanced it. Not meant to be driven by more than one caller at a
/// time.
#[derive(Debug)]
pub struct Interpreter {
    config: EngineConfig,
    program: Program,
    compiled: Option<CompiledProgram>,
    machine: Machine,
    pc: usize,
    steps: u64,
    run_state: RunState,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter with [`EngineConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an idle interpreter with a zeroed tape of `config.memory_size`
    /// cells.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            program: Program::default(),
            compiled: None,
            machine: Machine::new(Tape::new(config.memory_size)),
            pc: 0,
            steps: 0,
            run_state: RunState::Idle,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Active behavior policy.
    #[must_use]
    pub const fn policy(&self) -> BehaviorPolicy {
        self.config.policy
    }

    /// Replaces the behavior policy for every subsequent mutation.
    pub fn configure(&mut self, pointer: PointerBehavior, cell: CellBehavior) {
        self.config.policy = BehaviorPolicy::new(pointer, cell);
        debug!(pointer = pointer.name(), cell = cell.name(), "policy configured");
    }

    /// Reallocates the tape and clears the program, compiled cache, I/O
    /// channel, input supplier and counters. The policy is kept.
    pub fn reset(&mut self) {
        self.machine = Machine::new(Tape::new(self.config.memory_size));
        self.program = Program::default();
        self.compiled = None;
        self.pc = 0;
        self.steps = 0;
        self.run_state = RunState::Idle;
        debug!(memory_size = self.config.memory_size.get(), "interpreter reset");
    }

    /// Installs `source` with `input` staged as the input queue.
    ///
    /// Clears output, counters and the compiled cache and raises the run
    /// flag. The tape and any input supplier are kept.
    pub fn load(&mut self, source: &str, input: &str) {
        self.program = Program::new(source);
        self.compiled = None;
        self.pc = 0;
        self.steps = 0;
        self.machine.io.clear_output();
        self.machine.io.stage_input(input);
        self.run_state = RunState::Running;
        debug!(
            source_len = self.program.len(),
            staged_input = self.machine.io.pending_input(),
            "program loaded"
        );
    }

    /// Registers the source consulted when the input queue runs dry.
    pub fn set_input_supplier<S>(&mut self, supplier: S)
    where
        S: InputSupplier + 'static,
    {
        self.machine.io.set_supplier(Box::new(supplier));
    }

    /// Characters of the loaded program outside the operator alphabet.
    #[must_use]
    pub fn validate(&self) -> Vec<InvalidCharacter> {
        self.program.validate()
    }

    /// Compiles the loaded program, reusing the cached result when present.
    ///
    /// # Errors
    ///
    /// See [`compile`].
    pub fn compile(&mut self) -> Result<&CompiledProgram, TapeError> {
        let compiled = match self.compiled.take() {
            Some(compiled) => compiled,
            None => compile(&self.program)?,
        };
        Ok(self.compiled.insert(compiled))
    }

    /// Executes exactly one source character.
    ///
    /// Jumps are resolved by scanning the source for the partner bracket.
    /// Returns `false` without doing anything when the run flag is down or the
    /// program counter is past the end; the latter also lowers the flag.
    ///
    /// # Errors
    ///
    /// - [`SyntaxError::InvalidCharacter`] on a non-operator character.
    /// - [`SyntaxError::UnmatchedOpen`]/[`SyntaxError::UnmatchedClose`] when a
    ///   taken jump has no partner.
    /// - Policy violations from the tape gates.
    pub fn step(&mut self) -> Result<bool, TapeError> {
        if !self.run_state.is_running() {
            return Ok(false);
        }
        let Some(symbol) = self.program.get(self.pc) else {
            self.run_state = RunState::Halted;
            debug!(steps = self.steps, "program finished");
            return Ok(false);
        };

        let opcode = Opcode::from_symbol(symbol).ok_or(SyntaxError::InvalidCharacter {
            index: self.pc,
            character: symbol,
        })?;
        if execute_op(opcode, 1, &mut self.machine, self.config.policy)? == Flow::Branch {
            self.pc = matching_bracket(&self.program, self.pc)?;
        }
        self.pc += 1;
        self.steps += 1;
        Ok(true)
    }

    /// Compiles if needed and runs the whole program, bounded by
    /// `config.max_steps`. Returns the number of instructions executed.
    ///
    /// # Errors
    ///
    /// Compilation failures and policy violations.
    pub fn run_to_completion(&mut self) -> Result<u64, TapeError> {
        self.run_to_completion_with_limit(self.config.max_steps)
    }

    /// [`Self::run_to_completion`] with an explicit step ceiling.
    ///
    /// # Errors
    ///
    /// Compilation failures and policy violations. Progress made before a
    /// violation stays on the tape and in the output.
    pub fn run_to_completion_with_limit(&mut self, max_steps: u64) -> Result<u64, TapeError> {
        let mut cursor = ResumeCursor::new();
        let status = self.advance_compiled(&mut cursor, NonZeroU64::MAX, max_steps)?;
        self.run_state = RunState::Halted;

        if status == ChunkStatus::StepLimit {
            debug!(max_steps, "run stopped at step ceiling");
        }
        debug!(steps = cursor.steps(), output_len = self.machine.io.output().len(), "run finished");
        Ok(cursor.steps())
    }

    /// Runs one chunk of `config.chunk_steps` instructions from `cursor`,
    /// bounded overall by `config.max_steps`.
    ///
    /// Returns `true` while more work remains. `false` means the program
    /// ended or hit the ceiling; the run flag is lowered and the host should
    /// stop calling.
    ///
    /// # Errors
    ///
    /// Compilation failures and policy violations. The cursor stays on the
    /// failing instruction.
    pub fn run_chunk(&mut self, cursor: &mut ResumeCursor) -> Result<bool, TapeError> {
        self.run_chunk_with(cursor, self.config.chunk_steps, self.config.max_steps)
    }

    /// [`Self::run_chunk`] with explicit chunk size and cumulative ceiling.
    ///
    /// # Errors
    ///
    /// Same as [`Self::run_chunk`].
    pub fn run_chunk_with(
        &mut self,
        cursor: &mut ResumeCursor,
        chunk_steps: NonZeroU64,
        max_steps: u64,
    ) -> Result<bool, TapeError> {
        match self.advance_compiled(cursor, chunk_steps, max_steps)? {
            ChunkStatus::Suspended => Ok(true),
            status => {
                self.run_state = RunState::Halted;
                debug!(steps = cursor.steps(), ?status, "chunked run ended");
                Ok(false)
            }
        }
    }

    fn advance_compiled(
        &mut self,
        cursor: &mut ResumeCursor,
        chunk_steps: NonZeroU64,
        max_steps: u64,
    ) -> Result<ChunkStatus, TapeError> {
        self.compile()?;
        let Some(compiled) = self.compiled.as_ref() else {
            return Err(TapeError::EmptyProgram);
        };

        let before = cursor.steps();
        let result = run_compiled(
            compiled,
            &mut self.machine,
            self.config.policy,
            cursor,
            chunk_steps,
            max_steps,
        );
        self.steps += cursor.steps().saturating_sub(before);
        self.pc = compiled
            .source_offset(cursor.pc())
            .unwrap_or(self.program.len());
        result
    }

    /// Steps character by character until the program ends, `max_steps`
    /// characters ran, or the program counter lands on a breakpoint.
    ///
    /// A breakpoint at the starting position does not stop the first step, so
    /// calling again after a breakpoint stop resumes past it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::step`].
    pub fn run_until_end(
        &mut self,
        max_steps: u64,
        breakpoints: &BTreeSet<usize>,
    ) -> Result<RunOutcome, TapeError> {
        let mut steps = 0_u64;
        let stop = loop {
            if steps >= max_steps {
                break StopReason::StepLimit;
            }
            if steps > 0 && breakpoints.contains(&self.pc) {
                break StopReason::Breakpoint(self.pc);
            }
            if !self.step()? {
                break StopReason::Finished;
            }
            steps += 1;
        };
        debug!(steps, ?stop, "stepped run returned");
        Ok(RunOutcome { steps, stop })
    }

    /// Source index of the next character to execute.
    #[must_use]
    pub const fn program_counter(&self) -> usize {
        self.pc
    }

    /// Active cell index.
    #[must_use]
    pub const fn pointer(&self) -> usize {
        self.machine.tape.pointer()
    }

    /// Value of the active cell.
    #[must_use]
    pub fn current_cell(&self) -> i64 {
        self.machine.tape.current()
    }

    /// Every cell in index order.
    #[must_use]
    pub fn memory(&self) -> &[i64] {
        self.machine.tape.cells()
    }

    /// Output bytes produced since the last load.
    #[must_use]
    pub fn output(&self) -> &[u8] {
        self.machine.io.output()
    }

    /// Output decoded one character per byte.
    #[must_use]
    pub fn output_text(&self) -> String {
        self.machine.io.output_text()
    }

    /// The run flag.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.run_state.is_running()
    }

    /// Lifecycle state behind the run flag.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Cumulative executed steps since the last load.
    #[must_use]
    pub const fn step_count(&self) -> u64 {
        self.steps
    }

    /// Loaded program.
    #[must_use]
    pub const fn program(&self) -> &Program {
        &self.program
    }

    /// Cached compiled program, if compiled since the last load.
    #[must_use]
    pub const fn compiled(&self) -> Option<&CompiledProgram> {
        self.compiled.as_ref()
    }

    /// Source index of the instruction `cursor` will execute next, for
    /// breakpoint checks between chunks.
    #[must_use]
    pub fn source_offset_of(&self, cursor: &ResumeCursor) -> Option<usize> {
        self.compiled.as_ref()?.source_offset(cursor.pc())
    }

    /// Captures the read surface in one value.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            program_counter: self.pc,
            pointer: self.pointer(),
            current_cell: self.current_cell(),
            memory: self.memory().to_vec(),
            output: self.output().to_vec(),
            run_state: self.run_state,
            steps: self.steps,
        }
    }

    /// Compiles if needed and summarises the result.
    ///
    /// # Errors
    ///
    /// See [`compile`].
    pub fn compile_report(&mut self) -> Result<CompileReport, TapeError> {
        self.compile()?;
        let Some(compiled) = self.compiled.as_ref() else {
            return Err(TapeError::EmptyProgram);
        };
        Ok(CompileReport::new(&self.program, compiled))
    }

    /// Pseudocode for the loaded program under the active cell behavior.
    #[must_use]
    pub fn pseudocode(&self) -> String {
        generate_pseudocode(
            &self.program,
            self.config.policy.cell,
            self.config.memory_size,
        )
    }
}
