//! # Medir
//!
//! Medir (Spanish: "to measure") compares latency characteristics of a hosted
//! LLM inference endpoint under different configuration knobs: reasoning-effort
//! token budgets, prompt caching, temperature, output limits, and request
//! timeouts.
//!
//! The crate has two collaborating pieces:
//!
//! - **Invocation adapters** ([`adapter`]): each adapter wraps one named
//!   configuration of the endpoint behind a uniform
//!   `invoke(input) -> Invocation` operation. Transport failures never
//!   escape an adapter; they are recorded as failed invocations carrying
//!   the elapsed time up to the failure.
//! - **Comparison harness** ([`harness`]): drives N adapters across M inputs
//!   for R repeats each, strictly sequentially, and aggregates per-pair
//!   timing statistics into a [`harness::ComparisonTable`].
//!
//! ## Example
//!
//! ```rust
//! use medir::adapter::MockAdapter;
//! use medir::config::ProfileConfig;
//! use medir::harness::{Harness, HarnessConfig};
//! use medir::input::{Input, NamedInput};
//!
//! let adapter = MockAdapter::with_durations(ProfileConfig::standard(), &[1.0, 2.0, 3.0]);
//! let inputs = vec![NamedInput::new("greeting", Input::text("Hello"))];
//!
//! let harness = Harness::new(HarnessConfig::default().with_repeats(3));
//! let table = harness.run(&[Box::new(adapter)], &inputs);
//!
//! let entry = table.get("standard", "greeting").unwrap();
//! let stats = entry.aggregate.stats.as_ref().unwrap();
//! assert_eq!(stats.mean_secs, 2.0);
//! ```
//!
//! ## Design constraints
//!
//! - Execution is single-threaded and strictly sequential: one outbound call
//!   in flight at a time, so repeated measurements stay comparable and the
//!   remote service is not pushed into rate limiting.
//! - No retry policy and no adaptive backoff; an optional fixed inter-call
//!   delay is the only throttling mitigation.
//! - Configuration records are immutable once constructed and passed by
//!   value into adapter construction.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)] // usize -> f64 for statistics
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)] // Prefer explicit format args
#![allow(clippy::float_cmp)] // Allow float comparisons in tests

/// Invocation adapters: uniform call interface over one endpoint configuration
pub mod adapter;
/// Bounded agentic tool loop (explicit iteration cap, one call per iteration)
pub mod agent;
/// Immutable configuration records and preset profiles
pub mod config;
/// Error type for fatal, setup-time failures
pub mod error;
/// Sample prompts and documents used as benchmark fixtures
pub mod fixtures;
/// Comparison harness and result table
pub mod harness;
/// Tagged input variants (plain text or structured cacheable segments)
pub mod input;
/// Latency statistics over successful invocations
pub mod stats;
/// Request/response body shapes for the messages endpoint
pub mod wire;

pub use adapter::{Adapter, ErrorKind, Invocation, InvocationError, MessageAdapter, MockAdapter};
pub use config::{ConfigWarning, ProfileConfig};
pub use error::{MedirError, Result};
pub use harness::{AggregateResult, ComparisonEntry, ComparisonTable, Harness, HarnessConfig};
pub use input::{Input, NamedInput, Segment};
pub use stats::LatencyStats;
