//! Error types for markup analysis
//!
//! Every failure is terminal for the run that raised it. The orchestrator
//! turns these into a failure response using the `Display` text verbatim.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyzeError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("Input is empty. Please provide HTML or JSX code.")]
    EmptyInput,

    #[error("Unsupported language: {0}")]
    UnsupportedDialect(String),

    #[error("No valid HTML elements found. Please provide valid HTML markup.")]
    NoElementsFound,

    #[error("JSX/TSX parse error: {0}")]
    ParseSyntax(String),

    #[error("No JSX elements found in the code.")]
    NoJsxFound,

    #[error("Markup is nested deeper than the supported limit of {limit} levels.")]
    NestingTooDeep { limit: usize },

    #[error("Markup has sibling runs too long to encode; the binary tree is limited to {limit} levels.")]
    EncodingTooDeep { limit: usize },

    #[error("Failed to load {dialect} grammar: {message}")]
    Grammar { dialect: String, message: String },
}
