//! Counter state machine.

use serde::{Deserialize, Serialize};

/// A single non-negative count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterState {
    count: u64,
}

impl CounterState {
    pub fn new(count: u64) -> Self {
        Self { count }
    }

    pub fn get(&self) -> u64 {
        self.count
    }

    /// Add one and return the new value.
    pub fn increment(&mut self) -> u64 {
        self.count = self.count.saturating_add(1);
        self.count
    }

    /// Subtract one, holding at zero, and return the new value.
    pub fn decrement(&mut self) -> u64 {
        self.count = self.count.saturating_sub(1);
        self.count
    }
}

/// Operation requested by a counter route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterOp {
    Get,
    Increment,
    Decrement,
}

impl CounterOp {
    /// Apply to `state`, returning the count observed afterwards.
    pub fn apply(self, state: &mut CounterState) -> u64 {
        match self {
            CounterOp::Get => state.get(),
            CounterOp::Increment => state.increment(),
            CounterOp::Decrement => state.decrement(),
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterOp::Get => "get",
            CounterOp::Increment => "increment",
            CounterOp::Decrement => "decrement",
        }
    }
}
