// src/barrier/core.rs

//! Pure barrier state machine.
//!
//! Consumes one [`QueuePosition`] per poll and says what the async shell
//! should do next. No Tokio types, no IO, no clock.
//!
//! ```text
//! Polling --(first)--------> Done
//! Polling --(not first)----> Polling   (wait `interval`, poll again)
//! Polling --(not first, once)--> Done
//! ```
//!
//! Errors never reach the core: the shell aborts on the first one.

use std::time::Duration;

use crate::ordering::QueuePosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierState {
    Polling,
    Done,
}

/// What the shell should do after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierStep {
    /// We are first in line; stop successfully.
    Finish,
    /// Not first; wait this long and poll again.
    WaitAndRetry(Duration),
    /// Not first, and only a single check was requested.
    GiveUp,
}

#[derive(Debug, Clone)]
pub struct BarrierCore {
    interval: Duration,
    once: bool,
    state: BarrierState,
    attempts: u32,
}

impl BarrierCore {
    pub fn new(interval: Duration, once: bool) -> Self {
        Self {
            interval,
            once,
            state: BarrierState::Polling,
            attempts: 0,
        }
    }

    pub fn state(&self) -> BarrierState {
        self.state
    }

    /// Number of completed polls so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Feed the result of one successful poll. Only valid while `Polling`.
    pub fn on_position(&mut self, position: &QueuePosition) -> BarrierStep {
        debug_assert_eq!(self.state, BarrierState::Polling, "poll after barrier finished");
        self.attempts = self.attempts.saturating_add(1);

        if position.is_first() {
            self.state = BarrierState::Done;
            BarrierStep::Finish
        } else if self.once {
            self.state = BarrierState::Done;
            BarrierStep::GiveUp
        } else {
            BarrierStep::WaitAndRetry(self.interval)
        }
    }
}
