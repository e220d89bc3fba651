use std::time::{Duration, Instant};

/// Wall-clock budget for one slice of cooperative work.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    begin: Instant,
    timeout: Duration,
}

impl Timer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            begin: Instant::now(),
            timeout,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// A timer that never runs out.
    pub fn unbounded() -> Self {
        Self::new(Duration::MAX)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether the budget has been used up. A zero budget is always spent.
    pub fn overtime(&self) -> bool {
        self.begin.elapsed() >= self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_budget_is_overtime() {
        assert!(Timer::from_millis(0).overtime());
    }

    #[test]
    fn generous_budget_is_not_overtime() {
        assert!(!Timer::from_millis(60_000).overtime());
        assert!(!Timer::unbounded().overtime());
    }
}
