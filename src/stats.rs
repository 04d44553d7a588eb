//! Latency statistics derived from successful invocation durations.

use serde::{Deserialize, Serialize};

/// Mean/min/max over a non-empty set of successful durations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    /// Mean duration in seconds
    pub mean_secs: f64,
    /// Minimum duration in seconds
    pub min_secs: f64,
    /// Maximum duration in seconds
    pub max_secs: f64,
    /// Number of durations aggregated
    pub samples: usize,
}

impl LatencyStats {
    /// Compute statistics over durations in seconds.
    ///
    /// Returns `None` for an empty slice: statistics over zero successes are
    /// undefined, never a spurious zero mean.
    #[must_use]
    pub fn from_durations(durations: &[f64]) -> Option<Self> {
        if durations.is_empty() {
            return None;
        }

        let n = durations.len() as f64;
        let mean_secs = durations.iter().sum::<f64>() / n;
        let min_secs = durations.iter().copied().fold(f64::INFINITY, f64::min);
        let max_secs = durations.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            mean_secs,
            min_secs,
            max_secs,
            samples: durations.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_durations_undefined() {
        assert!(LatencyStats::from_durations(&[]).is_none());
    }

    #[test]
    fn test_known_durations() {
        let stats = LatencyStats::from_durations(&[1.0, 2.0, 3.0]).expect("stats");
        assert_eq!(stats.mean_secs, 2.0);
        assert_eq!(stats.min_secs, 1.0);
        assert_eq!(stats.max_secs, 3.0);
        assert_eq!(stats.samples, 3);
    }

    #[test]
    fn test_single_duration() {
        let stats = LatencyStats::from_durations(&[1.5]).expect("stats");
        assert_eq!(stats.mean_secs, 1.5);
        assert_eq!(stats.min_secs, 1.5);
        assert_eq!(stats.max_secs, 1.5);
    }

    #[test]
    fn test_mean_within_bounds() {
        let stats = LatencyStats::from_durations(&[0.4, 9.7, 3.3, 2.1]).expect("stats");
        assert!(stats.min_secs <= stats.mean_secs);
        assert!(stats.mean_secs <= stats.max_secs);
    }
}
