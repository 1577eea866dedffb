use chrono::{DateTime, Duration, Utc};

/// Source of "now" for services, so attempt timing and credential stamps are testable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    /// Moves a fixed clock forward. No effect on the system clock.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(at) = self {
            *at += delta;
        }
    }

    /// Time elapsed since `start`, never negative.
    #[must_use]
    pub fn elapsed_since(&self, start: DateTime<Utc>) -> Duration {
        (self.now() - start).max(Duration::zero())
    }
}

/// 2023-11-14T22:13:20Z
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Deterministic timestamp for tests.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let mut clock = fixed_clock();
        clock.advance(Duration::minutes(5));
        assert_eq!(clock.now(), fixed_now() + Duration::minutes(5));
        assert_eq!(clock.elapsed_since(fixed_now()), Duration::minutes(5));
    }

    #[test]
    fn elapsed_is_clamped_at_zero() {
        let clock = fixed_clock();
        let later = fixed_now() + Duration::seconds(30);
        assert_eq!(clock.elapsed_since(later), Duration::zero());
    }
}
