// SPDX-License-Identifier: MIT

//! Reconnect backoff policies.
//!
//! [`RetryPolicy`] bounds how often the connection manager re-dials the
//! compiler service after a drop and how long it waits in between.
//!
//! # Determinism
//!
//! Backoff delays use fixed formulas (no jitter/randomness) so that
//! host-driven tests can reproduce exact reconnect timelines.
//!
//! # Example
//!
//! ```
//! use typlive_runtime::retry::{BackoffStrategy, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::default();
//!
//! assert_eq!(policy.max_retries, 5);
//! assert_eq!(policy.delay(0), Duration::from_millis(1000));
//! assert_eq!(policy.delay(1), Duration::from_millis(2000));
//! assert_eq!(policy.delay(3), Duration::from_millis(5000));
//! ```

#![forbid(unsafe_code)]

use web_time::Duration;

/// Backoff strategy for retry delays.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum BackoffStrategy {
    /// Fixed delay between retries.
    Fixed {
        /// Delay in milliseconds.
        delay_ms: u64,
    },
    /// Exponential backoff: `base_ms * 2^attempt`, capped at `max_ms`.
    Exponential {
        /// Base delay in milliseconds.
        base_ms: u64,
        /// Maximum delay cap in milliseconds.
        max_ms: u64,
    },
    /// Linear backoff: `base_ms * (attempt + 1)`, capped at `max_ms`.
    Linear {
        /// Base delay in milliseconds.
        base_ms: u64,
        /// Maximum delay cap in milliseconds.
        max_ms: u64,
    },
}

/// A retry policy with configurable attempts and backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct RetryPolicy {
    /// Maximum number of reconnect attempts after a drop (0 = give up at once).
    pub max_retries: u32,
    /// Backoff strategy between retries.
    pub backoff: BackoffStrategy,
}

impl RetryPolicy {
    /// Attempts used by [`RetryPolicy::default`].
    pub const DEFAULT_MAX_RETRIES: u32 = 5;
    /// First reconnect delay used by [`RetryPolicy::default`].
    pub const DEFAULT_BASE_MS: u64 = 1000;
    /// Delay cap used by [`RetryPolicy::default`].
    pub const DEFAULT_MAX_MS: u64 = 5000;

    /// Create a new retry policy.
    #[must_use]
    pub fn new(max_retries: u32, backoff: BackoffStrategy) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Never reconnect automatically.
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            backoff: BackoffStrategy::Fixed { delay_ms: 0 },
        }
    }

    /// Compute the delay before the given attempt (0-indexed).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        match &self.backoff {
            BackoffStrategy::Fixed { delay_ms } => Duration::from_millis(*delay_ms),
            BackoffStrategy::Exponential { base_ms, max_ms } => {
                let multiplier = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
                let delay = base_ms.saturating_mul(multiplier);
                Duration::from_millis(delay.min(*max_ms))
            }
            BackoffStrategy::Linear { base_ms, max_ms } => {
                let delay = base_ms.saturating_mul(u64::from(attempt) + 1);
                Duration::from_millis(delay.min(*max_ms))
            }
        }
    }

    /// Whether attempt `attempt` (0-indexed) is still within budget.
    #[inline]
    #[must_use]
    pub const fn allows(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Worst-case time spent waiting before giving up.
    #[must_use]
    pub fn total_max_delay(&self) -> Duration {
        (0..self.max_retries).fold(Duration::ZERO, |total, i| {
            total.saturating_add(self.delay(i))
        })
    }

    /// Range problems, one message per problem.
    pub(crate) fn problems(&self, prefix: &str) -> Vec<String> {
        let mut errors = Vec::new();
        match self.backoff {
            BackoffStrategy::Fixed { .. } => {}
            BackoffStrategy::Exponential { base_ms, max_ms }
            | BackoffStrategy::Linear { base_ms, max_ms } => {
                if base_ms == 0 {
                    errors.push(format!("{prefix}.backoff.base_ms must be > 0"));
                }
                if max_ms < base_ms {
                    errors.push(format!(
                        "{prefix}.backoff.max_ms must be >= base_ms ({base_ms}), got {max_ms}"
                    ));
                }
            }
        }
        errors
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_MAX_RETRIES,
            BackoffStrategy::Exponential {
                base_ms: Self::DEFAULT_BASE_MS,
                max_ms: Self::DEFAULT_MAX_MS,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_backoff_constant_delay() {
        let policy = RetryPolicy::new(3, BackoffStrategy::Fixed { delay_ms: 1000 });
        assert_eq!(policy.delay(0), Duration::from_millis(1000));
        assert_eq!(policy.delay(2), Duration::from_millis(1000));
    }

    #[test]
    fn default_doubles_up_to_cap() {
        let policy = RetryPolicy::default();
        let delays: Vec<_> = (0..5).map(|i| policy.delay(i).as_millis()).collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 5000, 5000]);
    }

    #[test]
    fn linear_backoff_increments_and_caps() {
        let policy = RetryPolicy::new(
            4,
            BackoffStrategy::Linear {
                base_ms: 200,
                max_ms: 500,
            },
        );
        assert_eq!(policy.delay(0), Duration::from_millis(200));
        assert_eq!(policy.delay(1), Duration::from_millis(400));
        assert_eq!(policy.delay(2), Duration::from_millis(500)); // 600 capped
    }

    #[test]
    fn allows_counts_attempts() {
        let policy = RetryPolicy::default();
        assert!(policy.allows(0));
        assert!(policy.allows(4));
        assert!(!policy.allows(5));
        assert!(!RetryPolicy::no_retry().allows(0));
    }

    #[test]
    fn total_max_delay_sums_schedule() {
        assert_eq!(
            RetryPolicy::default().total_max_delay(),
            Duration::from_millis(1000 + 2000 + 4000 + 5000 + 5000)
        );
        assert_eq!(RetryPolicy::no_retry().total_max_delay(), Duration::ZERO);
    }

    #[test]
    fn total_max_delay_saturates_on_extreme_policies() {
        let policy = RetryPolicy::new(
            2000,
            BackoffStrategy::Fixed {
                delay_ms: u64::MAX,
            },
        );
        assert_eq!(policy.total_max_delay(), Duration::MAX);
    }

    #[test]
    fn exponential_backoff_overflow_saturates() {
        let policy = RetryPolicy::new(
            1,
            BackoffStrategy::Exponential {
                base_ms: u64::MAX / 2,
                max_ms: u64::MAX,
            },
        );
        assert_eq!(policy.delay(70), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn problems_flag_inverted_caps() {
        let policy = RetryPolicy::new(
            2,
            BackoffStrategy::Exponential {
                base_ms: 0,
                max_ms: 0,
            },
        );
        assert_eq!(
            policy.problems("reconnect"),
            vec!["reconnect.backoff.base_ms must be > 0".to_owned()]
        );

        let policy = RetryPolicy::new(
            2,
            BackoffStrategy::Linear {
                base_ms: 500,
                max_ms: 100,
            },
        );
        assert_eq!(policy.problems("reconnect").len(), 1);
        assert!(RetryPolicy::default().problems("reconnect").is_empty());
    }
}
