//! # TP Admin Testing
//!
//! Testing utilities and helpers for the TP Admin console.
//!
//! This crate provides:
//! - A fluent Given-When-Then harness for reducers ([`ReducerTest`])
//! - Assertion helpers for returned effects
//! - Deterministic implementations of Environment traits
//!
//! ## Example
//!
//! ```ignore
//! use tp_admin_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(ManageOrdersReducer::new())
//!     .with_env(environment(test_clock()))
//!     .given_state(ManageOrdersState::new(10))
//!     .when_action(ManageOrdersAction::NextPage)
//!     .then_state(|s| assert_eq!(s.pagination.current_page(), 1))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use tp_admin_core::environment::Clock;


/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use tp_admin_testing::mocks::FixedClock;
    /// use tp_admin_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock};
pub use reducer_test::{assertions, ReducerTest};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
        assert_eq!(time1.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }
}
