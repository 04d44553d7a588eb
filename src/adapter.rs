//! Invocation adapters: one uniform call operation per endpoint configuration.
//!
//! An adapter owns one [`ProfileConfig`] and its own HTTP client, and exposes
//! a single operation: send an input under that configuration, return the
//! elapsed time and outcome. Network, timeout, and API failures are caught
//! here and converted into failed [`Invocation`] records carrying the elapsed
//! time up to the failure; they never abort a comparison run. Each invocation
//! issues exactly one outbound call — retries are not performed at this layer.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigWarning, ProfileConfig};
use crate::error::{MedirError, Result};
use crate::input::Input;
use crate::wire::{MessageRequest, MessageResponse, Usage};

/// Classification of a failed invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Connection could not be established within the connect timeout
    ConnectTimeout,
    /// Response did not arrive within the read timeout
    ReadTimeout,
    /// Connection-level failure (refused, reset, DNS)
    Connection,
    /// Endpoint rejected the request due to rate limiting (HTTP 429)
    RateLimited,
    /// Endpoint returned a non-success status
    Api,
    /// Response body could not be parsed
    MalformedResponse,
}

impl ErrorKind {
    /// Short string form used in table output
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectTimeout => "connect-timeout",
            Self::ReadTimeout => "read-timeout",
            Self::Connection => "connection",
            Self::RateLimited => "rate-limited",
            Self::Api => "api",
            Self::MalformedResponse => "malformed-response",
        }
    }
}

/// Structured description of a failed invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationError {
    /// Failure classification
    pub kind: ErrorKind,
    /// Human-readable detail
    pub message: String,
}

impl std::fmt::Display for InvocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

/// Outcome of one invocation attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// The call completed and returned content
    Success {
        /// Generated text
        text: String,
        /// Usage counters, when the endpoint reported them
        usage: Option<Usage>,
    },
    /// The call failed; the run continues
    Failed {
        /// What went wrong
        error: InvocationError,
    },
}

/// One attempt's result: elapsed wall-clock time plus outcome.
///
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    /// Elapsed wall-clock time in seconds (up to the failure, if any)
    pub duration_secs: f64,
    /// Success or failure
    pub outcome: Outcome,
}

impl Invocation {
    /// Successful invocation
    #[must_use]
    pub fn success(duration_secs: f64, text: String, usage: Option<Usage>) -> Self {
        Self {
            duration_secs,
            outcome: Outcome::Success { text, usage },
        }
    }

    /// Failed invocation
    #[must_use]
    pub fn failure(duration_secs: f64, kind: ErrorKind, message: String) -> Self {
        Self {
            duration_secs,
            outcome: Outcome::Failed {
                error: InvocationError { kind, message },
            },
        }
    }

    /// Whether this attempt succeeded
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// Generated text, if successful
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success { text, .. } => Some(text),
            Outcome::Failed { .. } => None,
        }
    }

    /// Usage counters, if reported
    #[must_use]
    pub fn usage(&self) -> Option<&Usage> {
        match &self.outcome {
            Outcome::Success { usage, .. } => usage.as_ref(),
            Outcome::Failed { .. } => None,
        }
    }

    /// Failure description, if failed
    #[must_use]
    pub fn error(&self) -> Option<&InvocationError> {
        match &self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Failed { error } => Some(error),
        }
    }
}

/// Uniform call interface over one endpoint configuration.
///
/// Implementations never panic and never return an error from `invoke`:
/// failures become failed [`Invocation`] records so a comparison run always
/// continues.
pub trait Adapter: Send + Sync {
    /// The configuration this adapter calls under
    fn profile(&self) -> &ProfileConfig;

    /// Send one input, returning elapsed time and outcome.
    ///
    /// Exactly one outbound call per invocation; no retries.
    fn invoke(&self, input: &Input) -> Invocation;
}

/// Blocking HTTP client for the messages endpoint.
///
/// Owns the connection pool and the per-profile timeouts; credentials are
/// resolved once at construction. No SDK-level retries.
pub struct EndpointClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl EndpointClient {
    /// Build a client with the profile's timeouts.
    ///
    /// # Errors
    /// Returns [`MedirError::MissingCredentials`] for an empty API key and
    /// [`MedirError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, api_key: &str, profile: &ProfileConfig) -> Result<Self> {
        if api_key.is_empty() {
            return Err(MedirError::MissingCredentials(
                "API key must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(profile.timeout_secs))
            .connect_timeout(Duration::from_secs(profile.connect_timeout_secs))
            .build()
            .map_err(|e| MedirError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// POST one message request, classifying failures.
    ///
    /// # Errors
    /// Returns an [`InvocationError`] describing the transport, status, or
    /// parse failure.
    pub fn post_message(
        &self,
        request: &MessageRequest,
    ) -> std::result::Result<MessageResponse, InvocationError> {
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .map_err(classify_transport_error)?;

        let status = response.status();
        if status.as_u16() == 429 {
            let body = response.text().unwrap_or_default();
            return Err(InvocationError {
                kind: ErrorKind::RateLimited,
                message: format!("HTTP 429 from {url}: {body}"),
            });
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(InvocationError {
                kind: ErrorKind::Api,
                message: format!("HTTP {status} from {url}: {body}"),
            });
        }

        response.json().map_err(|e| InvocationError {
            kind: ErrorKind::MalformedResponse,
            message: format!("failed to parse response body: {e}"),
        })
    }
}

fn classify_transport_error(e: reqwest::Error) -> InvocationError {
    let kind = if e.is_timeout() {
        if e.is_connect() {
            ErrorKind::ConnectTimeout
        } else {
            ErrorKind::ReadTimeout
        }
    } else {
        ErrorKind::Connection
    };
    InvocationError {
        kind,
        message: format!("request failed: {e}"),
    }
}

/// HTTP adapter for the messages endpoint.
///
/// The profile is normalized at construction; corrections are kept as
/// warnings for the caller to surface.
pub struct MessageAdapter {
    profile: ProfileConfig,
    warnings: Vec<ConfigWarning>,
    client: EndpointClient,
}

impl MessageAdapter {
    /// Build an adapter for one profile.
    ///
    /// # Errors
    /// Returns an error only for setup-time problems (empty credentials,
    /// unusable HTTP client).
    pub fn new(profile: ProfileConfig, base_url: &str, api_key: &str) -> Result<Self> {
        let (normalized, warnings) = profile.normalize();
        let client = EndpointClient::new(base_url, api_key, &normalized)?;
        Ok(Self {
            profile: normalized,
            warnings,
            client,
        })
    }

    /// Corrections applied when the profile was normalized
    #[must_use]
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }
}

impl Adapter for MessageAdapter {
    fn profile(&self) -> &ProfileConfig {
        &self.profile
    }

    fn invoke(&self, input: &Input) -> Invocation {
        let request = MessageRequest::from_profile(&self.profile, input);
        let start = Instant::now();

        match self.client.post_message(&request) {
            Ok(response) => {
                let elapsed = start.elapsed().as_secs_f64();
                Invocation::success(elapsed, response.text(), response.usage)
            }
            Err(error) => {
                let elapsed = start.elapsed().as_secs_f64();
                Invocation {
                    duration_secs: elapsed,
                    outcome: Outcome::Failed { error },
                }
            }
        }
    }
}

/// One scripted step for [`MockAdapter`]
#[derive(Debug, Clone)]
pub struct MockStep {
    /// Reported duration in seconds
    pub duration_secs: f64,
    /// Failure to report instead of success
    pub error: Option<InvocationError>,
    /// Reported text on success
    pub text: String,
    /// Reported usage counters on success
    pub usage: Option<Usage>,
}

impl MockStep {
    /// Successful step with the given duration
    #[must_use]
    pub fn ok(duration_secs: f64) -> Self {
        Self {
            duration_secs,
            error: None,
            text: "mock response".to_string(),
            usage: None,
        }
    }

    /// Successful step with a fixed response text
    #[must_use]
    pub fn ok_with_text(duration_secs: f64, text: &str) -> Self {
        Self {
            duration_secs,
            error: None,
            text: text.to_string(),
            usage: None,
        }
    }

    /// Failed step with the given classification
    #[must_use]
    pub fn failed(duration_secs: f64, kind: ErrorKind) -> Self {
        Self {
            duration_secs,
            error: Some(InvocationError {
                kind,
                message: format!("mock {}", kind.as_str()),
            }),
            text: String::new(),
            usage: None,
        }
    }

    /// Attach usage counters to a successful step
    #[must_use]
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Scripted adapter for tests: replays a fixed sequence of outcomes.
///
/// Steps are consumed in order; when the script runs out, the last step
/// repeats.
pub struct MockAdapter {
    profile: ProfileConfig,
    steps: Vec<MockStep>,
    cursor: Mutex<usize>,
}

impl MockAdapter {
    /// Adapter replaying the given steps
    #[must_use]
    pub fn new(profile: ProfileConfig, steps: Vec<MockStep>) -> Self {
        Self {
            profile,
            steps,
            cursor: Mutex::new(0),
        }
    }

    /// Adapter that always succeeds with the given durations
    #[must_use]
    pub fn with_durations(profile: ProfileConfig, durations: &[f64]) -> Self {
        let steps = durations.iter().map(|&d| MockStep::ok(d)).collect();
        Self::new(profile, steps)
    }

    /// Adapter that fails every call with the given kind
    #[must_use]
    pub fn always_failing(profile: ProfileConfig, kind: ErrorKind) -> Self {
        Self::new(profile, vec![MockStep::failed(0.1, kind)])
    }
}

impl Adapter for MockAdapter {
    fn profile(&self) -> &ProfileConfig {
        &self.profile
    }

    fn invoke(&self, _input: &Input) -> Invocation {
        let mut cursor = self.cursor.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let index = (*cursor).min(self.steps.len().saturating_sub(1));
        *cursor += 1;

        // An empty script still honors the no-panic contract
        let Some(step) = self.steps.get(index) else {
            return Invocation::failure(
                0.0,
                ErrorKind::Connection,
                "mock script is empty".to_string(),
            );
        };
        match &step.error {
            Some(error) => Invocation {
                duration_secs: step.duration_secs,
                outcome: Outcome::Failed {
                    error: error.clone(),
                },
            },
            None => Invocation::success(step.duration_secs, step.text.clone(), step.usage),
        }
    }
}
