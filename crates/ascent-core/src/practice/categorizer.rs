//! Error categorization policy.

use crate::domain::ErrorCategory;

/// Infers a coarse cause for an incorrect response. The default policy is
/// timing-based and intentionally rough; callers with richer signals can
/// plug in their own.
pub trait ErrorCategorizer: Send + Sync {
    fn categorize(&self, response_time_ms: u64, time_benchmark_secs: u32) -> ErrorCategory;
}

/// Timing heuristic: well past the benchmark means time pressure, an
/// implausibly fast answer means carelessness.
pub struct TimingCategorizer;

impl TimingCategorizer {
    const CARELESS_CUTOFF_MS: u64 = 15_000;
}

impl ErrorCategorizer for TimingCategorizer {
    fn categorize(&self, response_time_ms: u64, time_benchmark_secs: u32) -> ErrorCategory {
        let benchmark_ms = time_benchmark_secs as u64 * 1000;
        if benchmark_ms > 0 && response_time_ms > 2 * benchmark_ms {
            ErrorCategory::TimePressure
        } else if response_time_ms < Self::CARELESS_CUTOFF_MS {
            ErrorCategory::Careless
        } else {
            ErrorCategory::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slow_response_is_time_pressure() {
        let c = TimingCategorizer;
        assert_eq!(c.categorize(190_000, 90), ErrorCategory::TimePressure);
    }

    #[test]
    fn test_fast_response_is_careless() {
        let c = TimingCategorizer;
        assert_eq!(c.categorize(8_000, 90), ErrorCategory::Careless);
    }

    #[test]
    fn test_ordinary_miss_is_unknown() {
        let c = TimingCategorizer;
        assert_eq!(c.categorize(60_000, 90), ErrorCategory::Unknown);
    }

    #[test]
    fn test_boundaries() {
        let c = TimingCategorizer;
        // Exactly 2x the benchmark is not yet time pressure.
        assert_eq!(c.categorize(180_000, 90), ErrorCategory::Unknown);
        // Exactly 15 s is no longer careless.
        assert_eq!(c.categorize(15_000, 90), ErrorCategory::Unknown);
        // Time pressure wins for short benchmarks answered both slow and fast.
        assert_eq!(c.categorize(12_000, 5), ErrorCategory::TimePressure);
    }
}
