#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session score accumulator shared by both simulators.

/// Running point total that only grows until explicitly reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreKeeper {
    total: u64,
}

impl ScoreKeeper {
    /// Creates a keeper holding zero points.
    #[must_use]
    pub const fn new() -> Self {
        Self { total: 0 }
    }

    /// Adds points to the running total, saturating at `u64::MAX`.
    pub fn add(&mut self, points: u64) {
        self.total = self.total.saturating_add(points);
    }

    /// Drops the running total back to zero.
    pub fn reset(&mut self) {
        self.total = 0;
    }

    /// Current running total.
    #[must_use]
    pub const fn current(&self) -> u64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::ScoreKeeper;

    #[test]
    fn accumulates_until_reset() {
        let mut score = ScoreKeeper::new();
        score.add(100);
        score.add(0);
        score.add(200);
        assert_eq!(score.current(), 300);

        score.reset();
        assert_eq!(score.current(), 0);
    }

    #[test]
    fn addition_saturates() {
        let mut score = ScoreKeeper::new();
        score.add(u64::MAX - 1);
        score.add(10);
        assert_eq!(score.current(), u64::MAX);
    }
}
