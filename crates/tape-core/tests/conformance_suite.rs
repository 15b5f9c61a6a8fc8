//! End-to-end behavior of the interpreter through its public API.

use std::collections::BTreeSet;
use std::num::{NonZeroU64, NonZeroUsize};

use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use tape_core::{
    validate, CellBehavior, Direction, EngineConfig, Interpreter, PointerBehavior, Program,
    ResumeCursor, RunState, StopReason, TapeError, OPCODE_TABLE,
};
use thiserror as _;
use tracing as _;

const HELLO_WORLD: &str = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";

#[derive(Debug, Clone, Copy)]
enum Mode {
    Step,
    Bulk,
    Chunked,
}

fn run(interp: &mut Interpreter, strategy: Mode) -> Result<(), TapeError> {
    match strategy {
        Mode::Step => {
            interp.run_until_end(u64::MAX, &BTreeSet::new())?;
        }
        Mode::Bulk => {
            interp.run_to_completion()?;
        }
        Mode::Chunked => {
            let mut cursor = ResumeCursor::new();
            while interp.run_chunk(&mut cursor)? {}
        }
    }
    Ok(())
}

fn chunk(steps: u64) -> NonZeroU64 {
    NonZeroU64::new(steps).expect("non-zero chunk size")
}

fn small_interpreter(size: usize, pointer: PointerBehavior, cell: CellBehavior) -> Interpreter {
    let mut interp = Interpreter::with_config(EngineConfig {
        memory_size: NonZeroUsize::new(size).expect("non-zero tape size"),
        ..EngineConfig::default()
    });
    interp.configure(pointer, cell);
    interp
}

#[rstest]
#[case(Mode::Step)]
#[case(Mode::Bulk)]
#[case(Mode::Chunked)]
fn hello_world_prints_under_every_strategy(#[case] strategy: Mode) {
    let mut interp = Interpreter::new();
    interp.load(HELLO_WORLD, "");

    run(&mut interp, strategy).expect("hello world runs");

    assert_eq!(interp.output_text(), "Hello World!\n");
    assert!(!interp.is_running());
    assert_eq!(interp.run_state(), RunState::Halted);
}

#[rstest]
#[case(Mode::Step)]
#[case(Mode::Bulk)]
#[case(Mode::Chunked)]
fn echo_program_copies_staged_input(#[case] strategy: Mode) {
    let mut interp = Interpreter::new();
    interp.load(",[.,]", "tape");

    run(&mut interp, strategy).expect("echo runs");

    assert_eq!(interp.output_text(), "tape");
}

#[rstest]
#[case(CellBehavior::Wrap, "+", 255, Ok(0))]
#[case(CellBehavior::Wrap, "-", 0, Ok(255))]
#[case(CellBehavior::Unlimited, "+", 255, Ok(256))]
#[case(CellBehavior::Unlimited, "-", 0, Ok(-1))]
#[case(
    CellBehavior::Error,
    "+",
    255,
    Err(TapeError::CellOverflow { cell_index: 0, attempted: 256 })
)]
#[case(
    CellBehavior::Error,
    "-",
    0,
    Err(TapeError::CellOverflow { cell_index: 0, attempted: -1 })
)]
fn cell_wrap_law(
    #[case] cell: CellBehavior,
    #[case] op: &str,
    #[case] start: u8,
    #[case] expected: Result<i64, TapeError>,
) {
    let mut interp = small_interpreter(4, PointerBehavior::Clamp, cell);
    interp.load(&format!(",{op}"), &char::from(start).to_string());

    let result = interp.run_to_completion().map(|_| interp.current_cell());

    assert_eq!(result, expected);
    assert_eq!(interp.current_cell(), expected.unwrap_or(i64::from(start)));
}

#[rstest]
#[case(PointerBehavior::Clamp, Ok(0))]
#[case(PointerBehavior::Wrap, Ok(9))]
#[case(
    PointerBehavior::Error,
    Err(TapeError::PointerOverflow { direction: Direction::Left, attempted: -1 })
)]
fn pointer_boundary_law(
    #[case] pointer: PointerBehavior,
    #[case] expected: Result<usize, TapeError>,
) {
    let mut interp = small_interpreter(10, pointer, CellBehavior::Wrap);
    interp.load("<", "");

    let result = interp.step().map(|_| interp.pointer());

    assert_eq!(result, expected);
}

#[test]
fn moving_off_the_right_edge_under_error_names_the_tape_length() {
    let mut interp = small_interpreter(3, PointerBehavior::Error, CellBehavior::Wrap);
    interp.load(">>>>>", "");

    assert_eq!(
        interp.run_to_completion(),
        Err(TapeError::PointerOverflow {
            direction: Direction::Right,
            attempted: 3,
        })
    );
    assert_eq!(interp.pointer(), 2);
}

#[rstest]
#[case("A", 65)]
#[case("", 0)]
fn single_input_step_scenario(#[case] input: &str, #[case] expected: i64) {
    let mut interp = Interpreter::new();
    interp.load(",", input);

    assert_eq!(interp.step(), Ok(true));
    assert_eq!(interp.current_cell(), expected);
}

#[test]
fn supplier_returning_nothing_stores_zero() {
    let mut interp = Interpreter::new();
    interp.load("+,", "");
    interp.set_input_supplier(String::new);

    interp.run_to_completion().expect("program runs");

    assert_eq!(interp.current_cell(), 0);
}

#[rstest]
#[case(CellBehavior::Wrap, Ok(i64::from(0x20AC_u32 % 256)))]
#[case(CellBehavior::Unlimited, Ok(0x20AC))]
#[case(
    CellBehavior::Error,
    Err(TapeError::CellOverflow { cell_index: 0, attempted: 0x20AC })
)]
fn input_values_pass_through_the_cell_behavior(
    #[case] cell: CellBehavior,
    #[case] expected: Result<i64, TapeError>,
) {
    let mut interp = small_interpreter(2, PointerBehavior::Clamp, cell);
    interp.load(",", "\u{20AC}");

    assert_eq!(interp.run_to_completion().map(|_| interp.current_cell()), expected);
}

#[test]
fn unlimited_cells_clamp_only_at_output() {
    let mut interp = small_interpreter(2, PointerBehavior::Clamp, CellBehavior::Unlimited);
    interp.load("-.>+++.", "");

    interp.run_to_completion().expect("program runs");

    assert_eq!(interp.output(), &[0, 3]);
    assert_eq!(interp.memory(), &[-1, 3]);
}

#[test]
fn failing_run_keeps_output_and_tape_changes_already_made() {
    let mut interp = small_interpreter(8, PointerBehavior::Clamp, CellBehavior::Error);
    interp.load("++.>+++.<---", "");

    let result = interp.run_to_completion();

    assert_eq!(
        result,
        Err(TapeError::CellOverflow {
            cell_index: 0,
            attempted: -1,
        })
    );
    assert_eq!(interp.output(), &[2, 3]);
    assert_eq!(&interp.memory()[..2], &[0, 3]);
}

#[test]
fn breakpoints_pause_a_stepped_run() {
    let mut interp = Interpreter::new();
    interp.load("+[-]+.", "");
    let breakpoints = BTreeSet::from([4]);

    let paused = interp
        .run_until_end(1_000, &breakpoints)
        .expect("program runs");
    assert_eq!(paused.stop, StopReason::Breakpoint(4));
    assert!(interp.is_running());

    let finished = interp
        .run_until_end(1_000, &breakpoints)
        .expect("program runs");
    assert_eq!(finished.stop, StopReason::Finished);
    assert_eq!(interp.output(), &[1]);
}

#[test]
fn independent_cursors_do_not_share_progress() {
    let mut first = Interpreter::new();
    let mut second = Interpreter::new();
    first.load(HELLO_WORLD, "");
    second.load(HELLO_WORLD, "");
    let mut first_cursor = ResumeCursor::new();
    let mut second_cursor = ResumeCursor::new();

    first
        .run_chunk_with(&mut first_cursor, chunk(50), u64::MAX)
        .expect("program runs");
    while second
        .run_chunk_with(&mut second_cursor, chunk(3), u64::MAX)
        .expect("program runs")
    {}
    while first
        .run_chunk_with(&mut first_cursor, chunk(50), u64::MAX)
        .expect("program runs")
    {}

    assert_eq!(first.output(), second.output());
    assert_eq!(first_cursor.steps(), second_cursor.steps());
}

#[test]
fn policy_survives_reset_and_applies_to_the_next_load() {
    let mut interp = small_interpreter(4, PointerBehavior::Wrap, CellBehavior::Wrap);
    interp.reset();
    interp.load("<+", "");

    interp.run_to_completion().expect("program runs");

    assert_eq!(interp.pointer(), 3);
    assert_eq!(interp.memory(), &[0, 0, 0, 1]);
}

fn operator_string() -> impl Strategy<Value = String> {
    let symbols: Vec<char> = OPCODE_TABLE.iter().map(|(symbol, _)| *symbol).collect();
    prop::collection::vec(prop::sample::select(symbols), 0..64)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn validator_accepts_every_operator_string(source in operator_string()) {
        prop_assert!(validate(&Program::new(&source)).is_empty());
    }

    #[test]
    fn validator_reports_each_foreign_character_in_order(
        source in operator_string(),
        noise in prop::collection::vec((any::<prop::sample::Index>(), "[a-z0-9 \n]"), 1..8),
    ) {
        let mut chars: Vec<char> = source.chars().collect();
        for (slot, text) in &noise {
            let position = slot.index(chars.len() + 1);
            chars.insert(position, text.chars().next().unwrap_or('x'));
        }
        let program = Program::new(&chars.iter().collect::<String>());

        let report = validate(&program);

        let expected: Vec<(usize, char)> = chars
            .iter()
            .enumerate()
            .filter(|(_, c)| !tape_core::is_operator(**c))
            .map(|(index, c)| (index, *c))
            .collect();
        let actual: Vec<(usize, char)> = report
            .iter()
            .map(|invalid| (invalid.index, invalid.character))
            .collect();
        prop_assert_eq!(actual.len(), noise.len());
        prop_assert_eq!(actual, expected);
    }
}
