//! # Pipeline Error Types
//!
//! This module defines the error types used throughout the ingredient
//! resolution pipeline. Fatal conditions carry enough context (document name,
//! ingredient name, requested unit) to produce an actionable message.

use std::fmt;

/// General pipeline error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Configuration loading/validation errors
    Config(String),
    /// No ingredients detected in a document after heading-guided and
    /// fallback scanning; fatal for that document
    ParseFailure { document: String },
    /// No source (override, mix panel, external database) resolved a
    /// profile for an ingredient; fatal for the whole recipe
    MissingNutritionData { ingredient: String },
    /// A non-gram unit could not be converted to grams because no
    /// density/size table matched; fatal for the whole recipe
    MissingConversionData { ingredient: String, unit: String },
    /// A nutrition-facts panel's serving size could not be located
    PanelParseFailure(String),
    /// File system errors
    FileSystem(String),
    /// Internal pipeline errors
    Internal(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            PipelineError::ParseFailure { document } => write!(
                f,
                "[PARSE] No ingredients detected in {}. Ensure headings 'Ingredients'/'Instructions' exist.",
                document
            ),
            PipelineError::MissingNutritionData { ingredient } => write!(
                f,
                "[NUTRITION] Missing nutrition data for '{}'. Add an override/mix entry or provide an FDC API key.",
                ingredient
            ),
            PipelineError::MissingConversionData { ingredient, unit } => write!(
                f,
                "[CONVERSION] Need density for '{}' to convert unit '{}' to grams",
                ingredient, unit
            ),
            PipelineError::PanelParseFailure(msg) => write!(f, "[PANEL] {}", msg),
            PipelineError::FileSystem(msg) => write!(f, "[FILESYSTEM] {}", msg),
            PipelineError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        PipelineError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::FileSystem(err.to_string())
    }
}

/// Result type alias for convenience
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offender() {
        let err = PipelineError::MissingNutritionData {
            ingredient: "almond flour".to_string(),
        };
        assert!(err.to_string().contains("almond flour"));

        let err = PipelineError::MissingConversionData {
            ingredient: "coconut flour".to_string(),
            unit: "cup".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("coconut flour"));
        assert!(msg.contains("cup"));

        let err = PipelineError::ParseFailure {
            document: "brownies.pdf".to_string(),
        };
        assert!(err.to_string().contains("brownies.pdf"));
    }
}
