//! Structured-pseudocode rendering of a program.

use std::num::NonZeroUsize;

use crate::{CellBehavior, Opcode, Program};

const INDENT: &str = "  ";

fn cell_behavior_label(cell: CellBehavior) -> &'static str {
    match cell {
        CellBehavior::Wrap => "wrap around (0-255)",
        CellBehavior::Unlimited => "unlimited range",
        CellBehavior::Error => "error on overflow/underflow",
    }
}

fn arithmetic_note(cell: CellBehavior, increment: bool) -> &'static str {
    match (cell, increment) {
        (CellBehavior::Wrap, _) => "mod 256",
        (CellBehavior::Unlimited, _) => "unlimited",
        (CellBehavior::Error, true) => "0-255, error on overflow",
        (CellBehavior::Error, false) => "0-255, error on underflow",
    }
}

/// Renders `program` as indented pseudocode, one line per operator.
///
/// Loops become `while` blocks. Pointer moves are annotated with a naive
/// running position that ignores loops and the pointer policy. Characters
/// outside the operator alphabet are skipped.
#[must_use]
pub fn generate_pseudocode(
    program: &Program,
    cell: CellBehavior,
    memory_size: NonZeroUsize,
) -> String {
    let mut lines = vec![
        format!("Program loaded with {} characters.", program.len()),
        format!("Memory initialized with {memory_size} cells."),
        "Pointer initialized at position 0.".to_string(),
        "pointer = 0".to_string(),
        String::new(),
        format!("Cell behavior: {}", cell_behavior_label(cell)),
        String::new(),
    ];

    let mut depth = 0_usize;
    let mut pointer = 0_i64;

    for symbol in program.chars() {
        let Some(opcode) = Opcode::from_symbol(*symbol) else {
            continue;
        };
        if opcode == Opcode::JumpIfNonZero {
            depth = depth.saturating_sub(1);
        }
        let indent = INDENT.repeat(depth);

        let body = match opcode {
            Opcode::MoveRight => {
                pointer += 1;
                format!("pointer++ ({pointer})")
            }
            Opcode::MoveLeft => {
                pointer -= 1;
                format!("pointer-- ({pointer})")
            }
            Opcode::Increment => {
                format!("memory[pointer] += 1 ({})", arithmetic_note(cell, true))
            }
            Opcode::Decrement => {
                format!("memory[pointer] -= 1 ({})", arithmetic_note(cell, false))
            }
            Opcode::Output => "print(char(memory[pointer]))".to_string(),
            Opcode::Input => "memory[pointer] = input_char()".to_string(),
            Opcode::JumpIfZero => {
                depth += 1;
                "while memory[pointer] != 0:".to_string()
            }
            Opcode::JumpIfNonZero => "end while".to_string(),
        };
        lines.push(format!("{indent}{body}"));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::generate_pseudocode;
    use crate::{CellBehavior, Program, DEFAULT_MEMORY_SIZE};

    fn body(source: &str, cell: CellBehavior) -> Vec<String> {
        generate_pseudocode(&Program::new(source), cell, DEFAULT_MEMORY_SIZE)
            .lines()
            .skip(7)
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn header_describes_program_memory_and_cell_behavior() {
        let text = generate_pseudocode(
            &Program::new("+."),
            CellBehavior::Unlimited,
            DEFAULT_MEMORY_SIZE,
        );
        assert!(text.starts_with(
            "Program loaded with 2 characters.\n\
             Memory initialized with 30000 cells.\n\
             Pointer initialized at position 0.\n\
             pointer = 0\n\
             \n\
             Cell behavior: unlimited range\n\
             \n"
        ));
    }

    #[test]
    fn loops_indent_their_bodies() {
        assert_eq!(
            body("+[->+<]", CellBehavior::Wrap),
            vec![
                "memory[pointer] += 1 (mod 256)",
                "while memory[pointer] != 0:",
                "  memory[pointer] -= 1 (mod 256)",
                "  pointer++ (1)",
                "  memory[pointer] += 1 (mod 256)",
                "  pointer-- (0)",
                "end while",
            ]
        );
    }

    #[rstest]
    #[case(CellBehavior::Wrap, "(mod 256)", "(mod 256)")]
    #[case(CellBehavior::Unlimited, "(unlimited)", "(unlimited)")]
    #[case(
        CellBehavior::Error,
        "(0-255, error on overflow)",
        "(0-255, error on underflow)"
    )]
    fn arithmetic_lines_name_the_cell_behavior(
        #[case] cell: CellBehavior,
        #[case] up: &str,
        #[case] down: &str,
    ) {
        let lines = body("+-", cell);
        assert!(lines[0].ends_with(up));
        assert!(lines[1].ends_with(down));
    }

    #[test]
    fn non_operators_are_skipped_and_io_is_rendered() {
        assert_eq!(
            body("a,b.<", CellBehavior::Wrap),
            vec![
                "memory[pointer] = input_char()",
                "print(char(memory[pointer]))",
                "pointer-- (-1)",
            ]
        );
    }
}
