//! Comparison harness: repeated, multi-profile, multi-input measurement.
//!
//! The harness drives every (adapter, input) pair for R repeats, strictly
//! sequentially — one outbound call in flight at a time, by design, so
//! repeated measurements stay comparable and the endpoint is not pushed into
//! rate limiting. An optional fixed inter-call delay is the only throttling
//! mitigation; there is no retry policy and no adaptive backoff.
//!
//! Results accumulate into a [`ComparisonTable`] keyed by profile name and
//! input name. Statistics per pair cover successful attempts only; a pair
//! with zero successes is flagged as fully failed instead of reporting a
//! spurious zero mean.

use std::fmt::Write;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapter::{Adapter, Invocation};
use crate::input::NamedInput;
use crate::stats::LatencyStats;

/// Harness run parameters
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Repeats per (profile, input) pair; clamped to at least 1
    pub repeats: usize,
    /// Fixed pause between successive calls
    pub inter_call_delay: Option<Duration>,
    /// Print per-call progress to stdout
    pub verbose: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            repeats: 1,
            inter_call_delay: None,
            verbose: false,
        }
    }
}

impl HarnessConfig {
    /// Set the repeat count (values below 1 are clamped to 1)
    #[must_use]
    pub fn with_repeats(mut self, repeats: usize) -> Self {
        self.repeats = repeats.max(1);
        self
    }

    /// Set a fixed delay between successive calls
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.inter_call_delay = Some(delay);
        self
    }

    /// Enable per-call progress output
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// All attempts for one (profile, input) pair plus derived statistics.
///
/// Built incrementally during a run, finalized when all repeats complete,
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Ordered invocation attempts
    pub invocations: Vec<Invocation>,
    /// Statistics over successful attempts; `None` when none succeeded
    pub stats: Option<LatencyStats>,
    /// Whether the run ended before the requested repeat count
    pub truncated: bool,
}

impl AggregateResult {
    /// Finalize an aggregate from collected invocations.
    ///
    /// `requested` is the repeat count the harness was asked for; fewer
    /// collected invocations mark the aggregate as truncated rather than
    /// silently dropping the shortfall.
    #[must_use]
    pub fn from_invocations(invocations: Vec<Invocation>, requested: usize) -> Self {
        let durations: Vec<f64> = invocations
            .iter()
            .filter(|inv| inv.succeeded())
            .map(|inv| inv.duration_secs)
            .collect();

        Self {
            truncated: invocations.len() < requested,
            stats: LatencyStats::from_durations(&durations),
            invocations,
        }
    }

    /// Number of successful attempts
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.invocations.iter().filter(|inv| inv.succeeded()).count()
    }

    /// Whether every attempt for this pair failed
    #[must_use]
    pub fn fully_failed(&self) -> bool {
        self.success_count() == 0
    }
}

/// One row of the comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    /// Profile name
    pub profile: String,
    /// Input name
    pub input: String,
    /// Aggregated attempts for this pair
    pub aggregate: AggregateResult,
}

/// Completed comparison across profiles and inputs.
///
/// Read-only after the run completes; consumed by export/report steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    /// Entries in run order, one per (profile, input) pair
    pub entries: Vec<ComparisonEntry>,
}

impl ComparisonTable {
    /// Empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, replacing any existing entry for the same pair
    pub fn add_entry(&mut self, entry: ComparisonEntry) {
        self.entries
            .retain(|e| e.profile != entry.profile || e.input != entry.input);
        self.entries.push(entry);
    }

    /// Entry for a specific (profile, input) pair
    #[must_use]
    pub fn get(&self, profile: &str, input: &str) -> Option<&ComparisonEntry> {
        self.entries
            .iter()
            .find(|e| e.profile == profile && e.input == input)
    }

    /// Profile names in first-seen order
    #[must_use]
    pub fn profiles(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !names.contains(&entry.profile.as_str()) {
                names.push(&entry.profile);
            }
        }
        names
    }

    /// Input names in first-seen order
    #[must_use]
    pub fn inputs(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !names.contains(&entry.input.as_str()) {
                names.push(&entry.input);
            }
        }
        names
    }

    /// Render a markdown table: one row per (profile, input) pair
    #[must_use]
    pub fn to_markdown_table(&self) -> String {
        let mut table = String::new();

        table.push_str("| Profile | Input | Mean | Min | Max | Ok/Total |\n");
        table.push_str("|---------|-------|------|-----|-----|----------|\n");

        for entry in &self.entries {
            let aggregate = &entry.aggregate;
            let total = aggregate.invocations.len();
            let marker = if aggregate.truncated { " (truncated)" } else { "" };
            match &aggregate.stats {
                Some(stats) => {
                    let _ = writeln!(
                        table,
                        "| {} | {} | {:.2}s | {:.2}s | {:.2}s | {}/{}{} |",
                        entry.profile,
                        entry.input,
                        stats.mean_secs,
                        stats.min_secs,
                        stats.max_secs,
                        aggregate.success_count(),
                        total,
                        marker,
                    );
                }
                None => {
                    let _ = writeln!(
                        table,
                        "| {} | {} | - | - | - | 0/{}{} |",
                        entry.profile, entry.input, total, marker,
                    );
                }
            }
        }

        table
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON
    ///
    /// # Errors
    /// Returns error if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Sequential measurement driver
pub struct Harness {
    config: HarnessConfig,
}

impl Harness {
    /// Create a harness with the given run parameters
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Harness with default parameters (single repeat, no delay)
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(HarnessConfig::default())
    }

    /// Drive every (adapter, input) pair for the configured repeat count.
    ///
    /// Calls are strictly sequential across the whole run. Individual
    /// failures are recorded in the aggregates and never abort the run; the
    /// returned table always holds one entry per pair.
    #[must_use]
    pub fn run(&self, adapters: &[Box<dyn Adapter>], inputs: &[NamedInput]) -> ComparisonTable {
        let mut table = ComparisonTable::new();
        let mut first_call = true;

        for adapter in adapters {
            let profile_name = adapter.profile().name.clone();
            if self.config.verbose {
                println!("--- {profile_name} ---");
            }

            for named in inputs {
                let mut invocations = Vec::with_capacity(self.config.repeats);

                for run in 0..self.config.repeats {
                    if let (false, Some(delay)) = (first_call, self.config.inter_call_delay) {
                        std::thread::sleep(delay);
                    }
                    first_call = false;

                    if self.config.verbose && self.config.repeats > 1 {
                        println!(
                            "{}: run {}/{}...",
                            named.name,
                            run + 1,
                            self.config.repeats
                        );
                    }

                    let invocation = adapter.invoke(&named.input);

                    if self.config.verbose {
                        match invocation.error() {
                            None => {
                                println!("{}: {:.2}s", named.name, invocation.duration_secs);
                            }
                            Some(error) => {
                                println!(
                                    "{}: failed after {:.2}s ({error})",
                                    named.name, invocation.duration_secs
                                );
                            }
                        }
                    }

                    invocations.push(invocation);
                }

                table.add_entry(ComparisonEntry {
                    profile: profile_name.clone(),
                    input: named.name.clone(),
                    aggregate: AggregateResult::from_invocations(
                        invocations,
                        self.config.repeats,
                    ),
                });
            }
        }

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{ErrorKind, MockAdapter, MockStep};
    use crate::config::ProfileConfig;
    use crate::input::Input;

    fn named(name: &str) -> NamedInput {
        NamedInput::new(name, Input::text("question"))
    }

    #[test]
    fn test_three_repeats_known_durations() {
        let adapter = MockAdapter::with_durations(ProfileConfig::standard(), &[1.0, 2.0, 3.0]);
        let harness = Harness::new(HarnessConfig::default().with_repeats(3));

        let table = harness.run(&[Box::new(adapter)], &[named("q1")]);

        let entry = table.get("standard", "q1").expect("entry");
        assert_eq!(entry.aggregate.invocations.len(), 3);
        assert!(!entry.aggregate.truncated);

        let stats = entry.aggregate.stats.expect("stats");
        assert_eq!(stats.mean_secs, 2.0);
        assert_eq!(stats.min_secs, 1.0);
        assert_eq!(stats.max_secs, 3.0);
        assert_eq!(stats.samples, 3);
    }

    #[test]
    fn test_timeout_then_success() {
        let adapter = MockAdapter::new(
            ProfileConfig::standard(),
            vec![
                MockStep::failed(60.0, ErrorKind::ReadTimeout),
                MockStep::ok(1.5),
            ],
        );
        let harness = Harness::new(HarnessConfig::default().with_repeats(2));

        let table = harness.run(&[Box::new(adapter)], &[named("q1")]);

        let aggregate = &table.get("standard", "q1").expect("entry").aggregate;
        assert_eq!(aggregate.invocations.len(), 2);
        assert_eq!(aggregate.success_count(), 1);
        assert!(!aggregate.fully_failed());

        // Statistics cover the single success only
        let stats = aggregate.stats.expect("stats");
        assert_eq!(stats.mean_secs, 1.5);
        assert_eq!(stats.min_secs, 1.5);
        assert_eq!(stats.max_secs, 1.5);
        assert_eq!(stats.samples, 1);
    }

    #[test]
    fn test_two_by_two_grid() {
        let a = MockAdapter::with_durations(ProfileConfig::standard(), &[1.0]);
        let b = MockAdapter::with_durations(ProfileConfig::cached(), &[0.5]);
        let adapters: Vec<Box<dyn crate::adapter::Adapter>> = vec![Box::new(a), Box::new(b)];
        let inputs = vec![named("q1"), named("q2")];

        let table = Harness::with_defaults().run(&adapters, &inputs);

        assert_eq!(table.entries.len(), 4);
        for profile in ["standard", "cached"] {
            for input in ["q1", "q2"] {
                let entry = table.get(profile, input).expect("entry");
                assert_eq!(entry.aggregate.invocations.len(), 1);
            }
        }
        assert_eq!(table.profiles(), vec!["standard", "cached"]);
        assert_eq!(table.inputs(), vec!["q1", "q2"]);
    }

    #[test]
    fn test_fully_failed_pair_has_no_stats() {
        let adapter =
            MockAdapter::always_failing(ProfileConfig::standard(), ErrorKind::RateLimited);
        let harness = Harness::new(HarnessConfig::default().with_repeats(3));

        let table = harness.run(&[Box::new(adapter)], &[named("q1")]);

        let aggregate = &table.get("standard", "q1").expect("entry").aggregate;
        assert_eq!(aggregate.invocations.len(), 3);
        assert!(aggregate.fully_failed());
        assert!(aggregate.stats.is_none());
    }

    #[test]
    fn test_repeats_clamped_to_one() {
        let config = HarnessConfig::default().with_repeats(0);
        assert_eq!(config.repeats, 1);
    }

    #[test]
    fn test_aggregate_truncation_recorded() {
        let invocations = vec![Invocation::success(1.0, "ok".to_string(), None)];
        let aggregate = AggregateResult::from_invocations(invocations, 3);
        assert!(aggregate.truncated);
        assert_eq!(aggregate.invocations.len(), 1);
    }

    #[test]
    fn test_markdown_table_renders_failed_pairs_with_dashes() {
        let failing =
            MockAdapter::always_failing(ProfileConfig::standard(), ErrorKind::Connection);
        let table = Harness::with_defaults().run(&[Box::new(failing)], &[named("q1")]);

        let markdown = table.to_markdown_table();
        assert!(markdown.contains("| Profile |"));
        assert!(markdown.contains("| standard | q1 | - | - | - | 0/1 |"));
    }

    #[test]
    fn test_inter_call_delay_sleeps_without_skewing_durations() {
        let adapter = MockAdapter::with_durations(ProfileConfig::standard(), &[0.25]);
        let harness = Harness::new(
            HarnessConfig::default()
                .with_repeats(3)
                .with_delay(Duration::from_millis(40)),
        );

        let started = std::time::Instant::now();
        let table = harness.run(&[Box::new(adapter)], &[named("q1")]);
        let elapsed = started.elapsed();

        // No sleep before the first call, so two gaps between three calls
        assert!(elapsed >= Duration::from_millis(80));

        // The sleep sits outside the measured window
        let aggregate = &table.get("standard", "q1").expect("entry").aggregate;
        assert_eq!(aggregate.invocations.len(), 3);
        assert!(aggregate
            .invocations
            .iter()
            .all(|inv| inv.duration_secs == 0.25));
    }

    #[test]
    fn test_markdown_table_marks_truncated_pairs() {
        let mut table = ComparisonTable::new();
        table.add_entry(ComparisonEntry {
            profile: "standard".to_string(),
            input: "q1".to_string(),
            aggregate: AggregateResult::from_invocations(
                vec![Invocation::success(1.0, "ok".to_string(), None)],
                3,
            ),
        });

        let markdown = table.to_markdown_table();
        assert!(markdown.contains("| standard | q1 | 1.00s | 1.00s | 1.00s | 1/1 (truncated) |"));
    }

    #[test]
    fn test_table_json_round_trip() {
        let adapter = MockAdapter::with_durations(ProfileConfig::standard(), &[1.0, 2.0]);
        let harness = Harness::new(HarnessConfig::default().with_repeats(2));
        let table = harness.run(&[Box::new(adapter)], &[named("q1")]);

        let json = table.to_json().expect("serialize");
        let back = ComparisonTable::from_json(&json).expect("deserialize");
        assert_eq!(back, table);
    }

    #[test]
    fn test_add_entry_replaces_same_pair() {
        let mut table = ComparisonTable::new();
        let aggregate = AggregateResult::from_invocations(
            vec![Invocation::success(1.0, String::new(), None)],
            1,
        );
        table.add_entry(ComparisonEntry {
            profile: "p".to_string(),
            input: "i".to_string(),
            aggregate: aggregate.clone(),
        });
        table.add_entry(ComparisonEntry {
            profile: "p".to_string(),
            input: "i".to_string(),
            aggregate,
        });
        assert_eq!(table.entries.len(), 1);
    }
}
