//! Interpreter run flag lifecycle.

/// Host-observable run flag of an interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Nothing loaded since construction or reset.
    #[default]
    Idle,
    /// A program is loaded and may make progress.
    Running,
    /// The program ran to its end or hit a step ceiling.
    Halted,
}

impl RunState {
    /// The run flag: `true` only while a loaded program may still advance.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}
