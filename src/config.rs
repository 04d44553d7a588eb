//! Immutable configuration records for endpoint invocations.
//!
//! A [`ProfileConfig`] is a named, immutable description of how to call the
//! endpoint: reasoning (thinking) budget, prompt caching, temperature, output
//! limit, and timeouts. Profiles are created once at setup and passed by value
//! into adapter construction; nothing mutates them afterwards.
//!
//! [`ProfileConfig::normalize`] applies the endpoint's parameter rules where a
//! safe correction exists (clamp output limit above the thinking budget, force
//! temperature to 1.0 in thinking mode) and reports each correction as a
//! [`ConfigWarning`] instead of failing.

use serde::{Deserialize, Serialize};

/// Minimal thinking budget for fast responses
pub const BUDGET_MINIMAL: u32 = 1024;
/// Balanced thinking budget (speed vs. quality)
pub const BUDGET_BALANCED: u32 = 2500;
/// Deep thinking budget for in-depth analysis
pub const BUDGET_DEEP: u32 = 5000;

/// Smallest thinking budget the endpoint accepts
pub const MIN_THINKING_BUDGET: u32 = 1024;
/// Output-token headroom added on top of the thinking budget when clamping
pub const THINKING_OUTPUT_HEADROOM: u32 = 1024;

/// Default read timeout in seconds (60 minutes; thinking-mode responses are slow)
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;
/// Default connection timeout in seconds
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default model identifier
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";

/// Warning produced when a profile value was corrected during normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigWarning {
    /// Field that was corrected
    pub field: String,
    /// Human-readable description of the correction
    pub message: String,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Named, immutable configuration of one endpoint call shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Profile name used as the row key in comparison tables
    pub name: String,
    /// Model identifier
    pub model: String,
    /// Token budget for internal reasoning; `None` disables thinking mode
    pub thinking_budget: Option<u32>,
    /// Whether cacheable input segments request prompt caching
    pub enable_caching: bool,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum output tokens
    pub max_tokens: u32,
    /// Read timeout in seconds
    pub timeout_secs: u64,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl ProfileConfig {
    /// Create a profile with default call parameters
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            model: DEFAULT_MODEL.to_string(),
            thinking_budget: None,
            enable_caching: false,
            temperature: 0.0,
            max_tokens: 1024,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
        }
    }

    /// Standard mode: no reasoning, no caching
    #[must_use]
    pub fn standard() -> Self {
        Self::new("standard")
    }

    /// Minimal reasoning budget for fast responses
    #[must_use]
    pub fn fast_thinking() -> Self {
        Self::new("fast-thinking")
            .with_thinking_budget(BUDGET_MINIMAL)
            .with_max_tokens(BUDGET_MINIMAL + THINKING_OUTPUT_HEADROOM)
    }

    /// Balanced reasoning budget
    #[must_use]
    pub fn balanced_thinking() -> Self {
        Self::new("balanced-thinking")
            .with_thinking_budget(BUDGET_BALANCED)
            .with_max_tokens(BUDGET_BALANCED + THINKING_OUTPUT_HEADROOM)
    }

    /// Deep reasoning budget for in-depth analysis
    #[must_use]
    pub fn deep_thinking() -> Self {
        Self::new("deep-thinking")
            .with_thinking_budget(BUDGET_DEEP)
            .with_max_tokens(BUDGET_DEEP + THINKING_OUTPUT_HEADROOM)
    }

    /// Prompt caching enabled, no reasoning
    #[must_use]
    pub fn cached() -> Self {
        Self::new("cached").with_caching(true)
    }

    /// Balanced reasoning plus prompt caching
    #[must_use]
    pub fn optimal() -> Self {
        Self::new("optimal")
            .with_thinking_budget(BUDGET_BALANCED)
            .with_caching(true)
    }

    /// Set the profile name
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set the model identifier
    #[must_use]
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Set the thinking budget
    #[must_use]
    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }

    /// Enable or disable prompt caching
    #[must_use]
    pub fn with_caching(mut self, enabled: bool) -> Self {
        self.enable_caching = enabled;
        self
    }

    /// Set the sampling temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum output tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the read timeout in seconds
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Apply the endpoint's parameter rules, correcting values where a safe
    /// default exists.
    ///
    /// Corrections applied when a thinking budget is set:
    /// - budget below [`MIN_THINKING_BUDGET`] is raised to the minimum
    /// - `max_tokens` must exceed the budget; if not, it is raised to
    ///   `budget + THINKING_OUTPUT_HEADROOM`
    /// - the endpoint requires `temperature == 1.0` in thinking mode
    ///
    /// Returns the corrected profile and one warning per correction. Never
    /// fails: configuration problems without a safe correction do not exist
    /// at this layer.
    #[must_use]
    pub fn normalize(&self) -> (Self, Vec<ConfigWarning>) {
        let mut normalized = self.clone();
        let mut warnings = Vec::new();

        if let Some(budget) = normalized.thinking_budget {
            if budget < MIN_THINKING_BUDGET {
                warnings.push(ConfigWarning {
                    field: "thinking_budget".to_string(),
                    message: format!(
                        "raised thinking budget from {budget} to minimum {MIN_THINKING_BUDGET}"
                    ),
                });
                normalized.thinking_budget = Some(MIN_THINKING_BUDGET);
            }

            let budget = normalized.thinking_budget.unwrap_or(MIN_THINKING_BUDGET);
            if normalized.max_tokens <= budget {
                let adjusted = budget + THINKING_OUTPUT_HEADROOM;
                warnings.push(ConfigWarning {
                    field: "max_tokens".to_string(),
                    message: format!(
                        "raised max_tokens from {} to {adjusted} to exceed thinking budget",
                        normalized.max_tokens
                    ),
                });
                normalized.max_tokens = adjusted;
            }

            if (normalized.temperature - 1.0).abs() > f32::EPSILON {
                warnings.push(ConfigWarning {
                    field: "temperature".to_string(),
                    message: "set temperature to 1.0 as required in thinking mode".to_string(),
                });
                normalized.temperature = 1.0;
            }
        }

        (normalized, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_profile_defaults() {
        let profile = ProfileConfig::standard();
        assert_eq!(profile.name, "standard");
        assert_eq!(profile.thinking_budget, None);
        assert!(!profile.enable_caching);
        assert_eq!(profile.temperature, 0.0);
        assert_eq!(profile.max_tokens, 1024);
        assert_eq!(profile.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_preset_budgets() {
        assert_eq!(
            ProfileConfig::fast_thinking().thinking_budget,
            Some(BUDGET_MINIMAL)
        );
        assert_eq!(
            ProfileConfig::balanced_thinking().thinking_budget,
            Some(BUDGET_BALANCED)
        );
        assert_eq!(
            ProfileConfig::deep_thinking().thinking_budget,
            Some(BUDGET_DEEP)
        );
        assert!(ProfileConfig::cached().enable_caching);

        let optimal = ProfileConfig::optimal();
        assert_eq!(optimal.thinking_budget, Some(BUDGET_BALANCED));
        assert!(optimal.enable_caching);
    }

    #[test]
    fn test_normalize_clamps_max_tokens_above_budget() {
        let profile = ProfileConfig::new("test")
            .with_thinking_budget(3000)
            .with_max_tokens(1024);
        let (normalized, warnings) = profile.normalize();

        assert_eq!(normalized.max_tokens, 3000 + THINKING_OUTPUT_HEADROOM);
        assert!(warnings.iter().any(|w| w.field == "max_tokens"));
    }

    #[test]
    fn test_normalize_forces_temperature_in_thinking_mode() {
        let profile = ProfileConfig::new("test")
            .with_thinking_budget(BUDGET_BALANCED)
            .with_max_tokens(8192)
            .with_temperature(0.0);
        let (normalized, warnings) = profile.normalize();

        assert_eq!(normalized.temperature, 1.0);
        assert!(warnings.iter().any(|w| w.field == "temperature"));
    }

    #[test]
    fn test_normalize_raises_tiny_budget() {
        let profile = ProfileConfig::new("test").with_thinking_budget(100);
        let (normalized, warnings) = profile.normalize();

        assert_eq!(normalized.thinking_budget, Some(MIN_THINKING_BUDGET));
        assert!(warnings.iter().any(|w| w.field == "thinking_budget"));
        // max_tokens was also below the corrected budget
        assert_eq!(
            normalized.max_tokens,
            MIN_THINKING_BUDGET + THINKING_OUTPUT_HEADROOM
        );
    }

    #[test]
    fn test_normalize_no_thinking_is_identity() {
        let profile = ProfileConfig::standard().with_temperature(0.7);
        let (normalized, warnings) = profile.normalize();

        assert_eq!(normalized, profile);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_normalize_already_valid_emits_no_warnings() {
        let profile = ProfileConfig::new("test")
            .with_thinking_budget(2048)
            .with_max_tokens(4096)
            .with_temperature(1.0);
        let (normalized, warnings) = profile.normalize();

        assert_eq!(normalized, profile);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_warning_display() {
        let warning = ConfigWarning {
            field: "max_tokens".to_string(),
            message: "raised".to_string(),
        };
        assert_eq!(warning.to_string(), "max_tokens: raised");
    }

    #[test]
    fn test_profile_serde_round_trip() {
        let profile = ProfileConfig::optimal();
        let json = serde_json::to_string(&profile).expect("serialize");
        let back: ProfileConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, profile);
    }
}
