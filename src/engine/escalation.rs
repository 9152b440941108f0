// src/engine/escalation.rs

//! Pure interrupt-escalation state machine.
//!
//! No Tokio, no timers: the main loop feeds it events and acts on the
//! resulting state.
//!
//! ```text
//! Running --interrupt--> ForceScanWindow --interrupt--> ShuttingDown
//!    ^                          |
//!    +------window elapsed------+
//! ```

/// Where the main loop is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoopState {
    #[default]
    Running,
    /// First interrupt seen; forced full runs until the window closes.
    ForceScanWindow,
    /// Terminal.
    ShuttingDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    Interrupt,
    WindowElapsed,
}

#[derive(Debug, Default)]
pub struct Escalation {
    state: LoopState,
}

impl Escalation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Apply one event and return the new state.
    pub fn step(&mut self, event: LoopEvent) -> LoopState {
        use LoopEvent::*;
        use LoopState::*;

        self.state = match (self.state, event) {
            (Running, Interrupt) => ForceScanWindow,
            (ForceScanWindow, Interrupt) => ShuttingDown,
            (ForceScanWindow, WindowElapsed) => Running,
            // A stale window timer after returning to Running changes nothing.
            (Running, WindowElapsed) => Running,
            (ShuttingDown, _) => ShuttingDown,
        };
        self.state
    }
}
