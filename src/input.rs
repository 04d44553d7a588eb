//! Tagged input variants sent to the endpoint.
//!
//! An input is either plain text or an ordered sequence of typed segments,
//! each optionally marked cacheable. Structured segments let the static part
//! of a prompt (a long document) carry a cache marker while the dynamic part
//! (the question) stays uncached.

use serde::{Deserialize, Serialize};

/// One typed segment of a structured input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment text
    pub text: String,
    /// Whether this segment may be cached by the endpoint
    pub cacheable: bool,
}

impl Segment {
    /// Create an uncached segment
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cacheable: false,
        }
    }

    /// Create a cacheable segment
    #[must_use]
    pub fn cacheable(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cacheable: true,
        }
    }
}

/// Input to a single invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Input {
    /// A single plain-text block
    Text(String),
    /// An ordered sequence of typed segments
    Segments(Vec<Segment>),
}

impl Input {
    /// Create a plain-text input
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self::Text(text.to_string())
    }

    /// Create a structured input from segments
    #[must_use]
    pub fn segments(segments: Vec<Segment>) -> Self {
        Self::Segments(segments)
    }

    /// Total character length across all text
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Segments(segments) => segments.iter().map(|s| s.text.len()).sum(),
        }
    }

    /// Whether the input carries no text at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An input paired with the identifier used as the column key in comparison
/// tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedInput {
    /// Input identifier
    pub name: String,
    /// The input itself
    pub input: Input,
}

impl NamedInput {
    /// Create a named input
    #[must_use]
    pub fn new(name: &str, input: Input) -> Self {
        Self {
            name: name.to_string(),
            input,
        }
    }

    /// Name an ordered sequence of inputs positionally ("prompt-1", ...)
    #[must_use]
    pub fn sequence(inputs: Vec<Input>) -> Vec<Self> {
        inputs
            .into_iter()
            .enumerate()
            .map(|(i, input)| Self {
                name: format!("prompt-{}", i + 1),
                input,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_constructors() {
        let plain = Segment::text("hello");
        assert!(!plain.cacheable);

        let cached = Segment::cacheable("document");
        assert!(cached.cacheable);
    }

    #[test]
    fn test_input_len() {
        assert_eq!(Input::text("abc").len(), 3);
        assert!(Input::text("").is_empty());

        let structured = Input::segments(vec![Segment::cacheable("abcd"), Segment::text("ef")]);
        assert_eq!(structured.len(), 6);
        assert!(!structured.is_empty());
    }

    #[test]
    fn test_positional_naming() {
        let named = NamedInput::sequence(vec![Input::text("a"), Input::text("b")]);
        assert_eq!(named.len(), 2);
        assert_eq!(named[0].name, "prompt-1");
        assert_eq!(named[1].name, "prompt-2");
    }

    #[test]
    fn test_input_serde_round_trip() {
        let input = Input::segments(vec![Segment::cacheable("doc"), Segment::text("q")]);
        let json = serde_json::to_string(&input).expect("serialize");
        let back: Input = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, input);
    }
}
