//! Conversion diagnostics
//!
//! Problems found while converting a document are collected as
//! [`ConversionError`] values instead of aborting the run. Every question
//! that fails still produces a placeholder result.

use serde::{Deserialize, Serialize};

/// A problem found during conversion
///
/// # Example
///
/// ```
/// use quizdoc_core::diagnostics::{ConversionError, Severity};
///
/// let err = ConversionError::error("Sai format header: [a,b]");
/// assert_eq!(err.severity, Severity::Error);
/// assert_eq!(err.to_string(), "error: Sai format header: [a,b]");
///
/// let err = ConversionError::warning("Chỉ được 1 link TTS").with_question(3);
/// assert_eq!(err.to_string(), "warning[câu 3]: Chỉ được 1 link TTS");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionError {
    /// Global index of the affected question, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_index: Option<usize>,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,
}

/// Severity level of a conversion problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Item dropped, conversion otherwise unaffected
    Warning,

    /// Item skipped or replaced by a placeholder
    Error,

    /// The input could not be read at all
    Fatal,
}

impl ConversionError {
    /// Create a new conversion error
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            question_index: None,
            severity,
            message: message.into(),
        }
    }

    /// Create a warning
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create an error
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a fatal error
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, message)
    }

    /// Attach the affected question index
    pub fn with_question(mut self, index: usize) -> Self {
        self.question_index = Some(index);
        self
    }

    /// Check if this is an error-level problem
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error | Severity::Fatal)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

impl std::fmt::Display for ConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: severity[câu N]: message
        write!(f, "{}", self.severity)?;
        if let Some(index) = self.question_index {
            write!(f, "[câu {}]", index)?;
        }
        write!(f, ": {}", self.message)
    }
}
