//! Debounced, generation-tagged automatic statistics requests.

use std::time::Duration;

use tokio::time::Instant;

use crate::{
    availability::Availability,
    generation::{Generation, GenerationCounter},
};

/// Single re-armable deadline.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Replaces any pending deadline with one a full quiet period from `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsAction {
    /// Drop displayed statistics.
    Clear,
    Fetch {
        generation: Generation,
        sequence: String,
    },
}

#[derive(Debug)]
pub struct StatsAutoFetch {
    debounce: Debouncer,
    generations: GenerationCounter,
}

impl StatsAutoFetch {
    pub fn new(quiet: Duration) -> Self {
        Self {
            debounce: Debouncer::new(quiet),
            generations: GenerationCounter::default(),
        }
    }

    /// Sequence text or availability changed.
    pub fn observe_change(&mut self, now: Instant) {
        self.debounce.schedule(now);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Settles the pending change if its quiet period has elapsed.
    pub fn fire(
        &mut self,
        now: Instant,
        sequence: &str,
        availability: Availability,
    ) -> Option<StatsAction> {
        self.debounce
            .fire_if_due(now)
            .then(|| self.settle(sequence, availability))
    }

    pub fn settle(&mut self, sequence: &str, availability: Availability) -> StatsAction {
        if sequence.trim().is_empty() || availability != Availability::Online {
            self.generations.invalidate();
            return StatsAction::Clear;
        }
        StatsAction::Fetch {
            generation: self.generations.advance(),
            sequence: sequence.to_string(),
        }
    }

    /// Only the most recently dispatched request may update the display.
    pub fn accepts(&self, generation: Generation) -> bool {
        self.generations.is_current(generation)
    }

    pub fn invalidate(&mut self) {
        self.generations.invalidate();
    }

    pub fn cancel(&mut self) {
        self.debounce.cancel();
        self.generations.invalidate();
    }
}

#[cfg(test)]
#[path = "tests/stats_pipeline_tests.rs"]
mod tests;
