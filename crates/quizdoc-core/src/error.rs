//! Error types for question classification

use thiserror::Error;

/// Failures that turn a question into a placeholder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// No "Lời giải" marker after the statement
    #[error("Thiếu 'Lời giải' trong câu: {0}")]
    MissingSolution(String),

    /// Single-choice question without any option paragraph
    #[error("Không tìm thấy phương án nào (A., B., ...)")]
    NoOptions,

    /// Answer key selects none of the options
    #[error("Đáp án '{key}' không khớp phương án nào trong {options} phương án")]
    NoCorrectOption { key: String, options: usize },

    /// True/false question without statements
    #[error("Không đúng dạng Đúng/Sai")]
    NoStatements,

    /// True/false key length differs from the statement count
    #[error("Số đáp án không khớp: {key} vs {statements}")]
    AnswerCountMismatch { key: usize, statements: usize },

    /// Fill-in question without any `[[...]]` blank
    #[error("Không tìm thấy ô trống [[...]]")]
    NoBlanks,

    /// Failure reported by a specialized classifier
    #[error("{0}")]
    Specialized(String),
}

/// Result type for classification
pub type Result<T> = std::result::Result<T, ClassifyError>;
