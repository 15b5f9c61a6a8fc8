//! Operator alphabet and opcode table.

/// Operation tags of the instruction language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Opcode {
    /// `>`: move the pointer right.
    MoveRight,
    /// `<`: move the pointer left.
    MoveLeft,
    /// `+`: increment the active cell.
    Increment,
    /// `-`: decrement the active cell.
    Decrement,
    /// `.`: emit the active cell.
    Output,
    /// `,`: read one input value into the active cell.
    Input,
    /// `[`: jump past the matching `]` when the active cell is zero.
    JumpIfZero,
    /// `]`: jump back to the matching `[` when the active cell is non-zero.
    JumpIfNonZero,
}

/// Operator alphabet, in [`Opcode`] declaration order.
///
/// Decoding, encoding and validation all read this table. Any character not
/// present here is invalid program text.
pub const OPCODE_TABLE: &[(char, Opcode)] = &[
    ('>', Opcode::MoveRight),
    ('<', Opcode::MoveLeft),
    ('+', Opcode::Increment),
    ('-', Opcode::Decrement),
    ('.', Opcode::Output),
    (',', Opcode::Input),
    ('[', Opcode::JumpIfZero),
    (']', Opcode::JumpIfNonZero),
];

impl Opcode {
    /// Decodes an operator character.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        let mut index = 0;
        while index < OPCODE_TABLE.len() {
            let (candidate, opcode) = OPCODE_TABLE[index];
            if candidate == symbol {
                return Some(opcode);
            }
            index += 1;
        }
        None
    }

    /// Operator character for this opcode.
    #[must_use]
    pub const fn symbol(self) -> char {
        OPCODE_TABLE[self as usize].0
    }

    /// Opcodes whose consecutive runs the compiler fuses into one instruction.
    #[must_use]
    pub const fn is_fusable(self) -> bool {
        matches!(
            self,
            Self::MoveRight | Self::MoveLeft | Self::Increment | Self::Decrement
        )
    }
}

/// Returns `true` when `symbol` belongs to the operator alphabet.
#[must_use]
pub const fn is_operator(symbol: char) -> bool {
    Opcode::from_symbol(symbol).is_some()
}

#[cfg(test)]
mod tests {
    use super::{is_operator, Opcode, OPCODE_TABLE};

    #[test]
    fn table_agrees_with_symbol_decoding_in_both_directions() {
        assert_eq!(OPCODE_TABLE.len(), 8);
        for (position, (symbol, opcode)) in OPCODE_TABLE.iter().copied().enumerate() {
            assert_eq!(opcode as usize, position);
            assert_eq!(Opcode::from_symbol(symbol), Some(opcode));
            assert_eq!(opcode.symbol(), symbol);
        }
    }

    #[test]
    fn characters_outside_the_alphabet_are_not_operators() {
        for symbol in ['a', ' ', '\n', '#', '{', '0', 'é'] {
            assert!(!is_operator(symbol));
        }
    }

    #[test]
    fn only_moves_and_arithmetic_fuse() {
        let fusable: Vec<char> = OPCODE_TABLE
            .iter()
            .filter(|(_, opcode)| opcode.is_fusable())
            .map(|(symbol, _)| *symbol)
            .collect();
        assert_eq!(fusable, vec!['>', '<', '+', '-']);
    }
}
