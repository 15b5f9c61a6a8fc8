//! Output accumulator and pull-based input source.

use std::collections::VecDeque;
use std::fmt;

/// On-demand input source consulted when the staged input queue is empty.
///
/// Any `FnMut() -> String` closure is a supplier. An empty string means no
/// input is available and the input instruction stores 0.
pub trait InputSupplier {
    /// Produces the next batch of input characters.
    fn supply(&mut self) -> String;
}

impl<F> InputSupplier for F
where
    F: FnMut() -> String,
{
    fn supply(&mut self) -> String {
        self()
    }
}

/// Append-only output bytes plus a FIFO of pending input values.
#[derive(Default)]
pub struct IoChannel {
    output: Vec<u8>,
    input: VecDeque<i64>,
    supplier: Option<Box<dyn InputSupplier>>,
}

impl fmt::Debug for IoChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoChannel")
            .field("output", &self.output)
            .field("input", &self.input)
            .field("supplier", &self.supplier.is_some())
            .finish()
    }
}

impl IoChannel {
    /// Creates an empty channel with no supplier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the pending input queue with the ordinals of `input`.
    pub fn stage_input(&mut self, input: &str) {
        self.input.clear();
        self.extend_input(input);
    }

    fn extend_input(&mut self, input: &str) {
        self.input.extend(input.chars().map(|c| i64::from(u32::from(c))));
    }

    /// Installs the supplier used once the queue runs dry.
    pub fn set_supplier(&mut self, supplier: Box<dyn InputSupplier>) {
        self.supplier = Some(supplier);
    }

    /// Number of staged input values not yet consumed.
    #[must_use]
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Takes the next input value.
    ///
    /// Pops the queue; when it is empty, asks the supplier for more and pops
    /// from what it returned. Yields 0 when no input is available.
    pub fn next_input(&mut self) -> i64 {
        if let Some(value) = self.input.pop_front() {
            return value;
        }
        let Some(supplier) = self.supplier.as_mut() else {
            return 0;
        };
        let supplied = supplier.supply();
        self.extend_input(&supplied);
        self.input.pop_front().unwrap_or(0)
    }

    /// Appends one output byte.
    pub fn push_output(&mut self, byte: u8) {
        self.output.push(byte);
    }

    /// Output bytes in production order.
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Output rendered one character per byte (Latin-1).
    #[must_use]
    pub fn output_text(&self) -> String {
        self.output.iter().copied().map(char::from).collect()
    }

    /// Drops all accumulated output.
    pub fn clear_output(&mut self) {
        self.output.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::IoChannel;

    #[test]
    fn staged_input_is_consumed_in_order_then_defaults_to_zero() {
        let mut io = IoChannel::new();
        io.stage_input("AB");

        assert_eq!(io.next_input(), 65);
        assert_eq!(io.next_input(), 66);
        assert_eq!(io.next_input(), 0);
    }

    #[test]
    fn supplier_is_called_only_when_the_queue_is_empty() {
        let calls = Rc::new(Cell::new(0_u32));
        let counter = Rc::clone(&calls);
        let mut io = IoChannel::new();
        io.stage_input("x");
        io.set_supplier(Box::new(move || {
            counter.set(counter.get() + 1);
            "yz".to_string()
        }));

        assert_eq!(io.next_input(), i64::from(b'x'));
        assert_eq!(calls.get(), 0);
        assert_eq!(io.next_input(), i64::from(b'y'));
        assert_eq!(calls.get(), 1);
        assert_eq!(io.pending_input(), 1);
        assert_eq!(io.next_input(), i64::from(b'z'));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn empty_supplier_result_yields_zero() {
        let mut io = IoChannel::new();
        io.set_supplier(Box::new(String::new));
        assert_eq!(io.next_input(), 0);
    }

    #[test]
    fn output_text_maps_each_byte_to_one_character() {
        let mut io = IoChannel::new();
        for byte in [b'H', b'i', 0xE9] {
            io.push_output(byte);
        }
        assert_eq!(io.output(), &[b'H', b'i', 0xE9]);
        assert_eq!(io.output_text(), "Hié");

        io.clear_output();
        assert!(io.output().is_empty());
    }
}
