/// Tag carried by an asynchronous request so its completion can be matched
/// against the latest one issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic counter; only the most recently issued generation is current.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    latest: u64,
}

impl GenerationCounter {
    pub fn advance(&mut self) -> Generation {
        self.latest += 1;
        Generation(self.latest)
    }

    /// Makes every generation issued so far stale.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_generation_is_current() {
        let mut counter = GenerationCounter::default();
        let first = counter.advance();
        let second = counter.advance();
        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
        assert!(second > first);

        counter.invalidate();
        assert!(!counter.is_current(second));
    }
}
