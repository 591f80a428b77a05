//! Classification of free-text console responses
//!
//! The console reports results as prose ("Successfully added Group [g1]",
//! "Error: ...", "Unknown User: ..."). Matching is by literal substring and
//! is only as good as the phrasings listed here. Anything that matches
//! neither list is reported as [`Outcome::Ambiguous`] rather than guessed.

use std::fmt;

/// Substring that marks a successful command
pub const SUCCESS_MARKER: &str = "Successfully";

/// Substrings that mark a rejected command
pub const ERROR_MARKERS: [&str; 2] = ["Error", "Unknown"];

/// Classified result of a console response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The console confirmed the change
    Success {
        /// Identifier from the first `[...]` following the success marker
        identifier: Option<String>,
        /// Trimmed response text
        message: String,
    },
    /// The console rejected the command
    Failure {
        /// Trimmed response text, verbatim
        message: String,
    },
    /// The response matched no known phrasing
    Ambiguous {
        /// Trimmed response text
        text: String,
    },
}

impl Outcome {
    /// Whether the console confirmed the change
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// The response text this outcome was classified from
    pub fn text(&self) -> &str {
        match self {
            Outcome::Success { message, .. } => message,
            Outcome::Failure { message } => message,
            Outcome::Ambiguous { text } => text,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success {
                identifier: Some(id),
                ..
            } => write!(f, "success [{}]", id),
            Outcome::Success { .. } => write!(f, "success"),
            Outcome::Failure { .. } => write!(f, "failure"),
            Outcome::Ambiguous { .. } => write!(f, "ambiguous"),
        }
    }
}

/// Classify the text a command produced
pub fn classify(text: &str) -> Outcome {
    let message = text.trim().to_string();

    if let Some(pos) = message.find(SUCCESS_MARKER) {
        let identifier = bracketed(&message[pos..]);
        return Outcome::Success {
            identifier,
            message,
        };
    }

    if has_error_marker(&message) {
        return Outcome::Failure { message };
    }

    Outcome::Ambiguous { text: message }
}

/// Whether the text contains one of the error markers
pub fn has_error_marker(text: &str) -> bool {
    ERROR_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Content of the first non-empty `[...]` in `text`
fn bracketed(text: &str) -> Option<String> {
    let start = text.find('[')? + 1;
    let len = text[start..].find(']')?;
    let inner = text[start..start + len].trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner.to_string())
    }
}
