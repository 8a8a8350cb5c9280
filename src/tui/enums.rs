//! Enumerations for TUI state management.

/// Screen the terminal user interface is showing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    TaskList,
    AddTask,
    EditTask,
    Help,
    Confirm,
}

/// Outcome of handling a single key press.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyOutcome {
    Continue,
    Quit,
}
