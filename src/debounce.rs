use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Collapses bursts of triggers into a single action.
///
/// Every `trigger` raises the pending flag and queues one delayed firing.
/// The first firing that finds the flag raised reports `true` and every
/// firing clears the flag, so later firings from the same burst do nothing.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: bool,
    firings: VecDeque<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: false,
            firings: VecDeque::new(),
        }
    }

    pub fn trigger(&mut self, now: Instant) {
        self.pending = true;
        self.firings.push_back(now + self.delay);
    }

    /// Consume all firings due at `now`. Returns true if the action should run.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut fire = false;
        while let Some(&at) = self.firings.front() {
            if at > now {
                break;
            }
            self.firings.pop_front();
            fire |= self.pending;
            self.pending = false;
        }
        fire
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.firings.front().copied()
    }
}
