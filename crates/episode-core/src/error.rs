//! Error types for episode statistics
//!
//! Provides a unified error type for all episode-stats crates. None of these
//! errors are retried internally; they propagate to the dataset-build caller,
//! which decides whether to skip the offending episode or abort.

use thiserror::Error;

/// Core error type for statistics computation and aggregation
#[derive(Error, Debug)]
pub enum Error {
    /// Statistics were requested before enough samples were observed
    #[error("Insufficient samples: expected at least {expected}, got {actual}")]
    InsufficientSamples { expected: usize, actual: usize },

    /// A later batch has a different feature width than the first one
    #[error("Dimension mismatch: estimator was initialized with width {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Reduction axes outside the supported set
    #[error("Unsupported axis configuration: {0:?}")]
    UnsupportedAxis(Vec<usize>),

    /// A statistics tensor has the wrong shape
    #[error("Shape mismatch for '{key}' of feature '{feature}': expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        feature: String,
        key: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A statistics value has the wrong kind
    #[error("Type mismatch for '{key}' of feature '{feature}': {reason}")]
    TypeMismatch {
        feature: String,
        key: String,
        reason: String,
    },

    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Episode data references a feature the schema does not describe
    #[error("Feature '{0}' is not described by the feature schema")]
    MissingFeature(String),

    /// Frame decoding failure
    #[error("Failed to load image '{path}': {message}")]
    Image { path: String, message: String },
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for an invalid quantile probability
    pub fn invalid_quantile(p: f64) -> Self {
        Self::InvalidParameter(format!("Quantile {p} must be in [0, 1]"))
    }

    /// Create an error for NaN/Inf values
    pub fn non_finite(context: &str) -> Self {
        Self::InvalidInput(format!("{context} contains NaN or infinite values"))
    }

    /// Create a shape mismatch error for one statistic of one feature
    pub fn shape_mismatch(feature: &str, key: &str, expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            feature: feature.to_string(),
            key: key.to_string(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Create a type mismatch error for one statistic of one feature
    pub fn type_mismatch(feature: &str, key: &str, reason: impl Into<String>) -> Self {
        Self::TypeMismatch {
            feature: feature.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error describes data that can never be merged
    pub fn is_aggregation_precondition(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. } | Self::TypeMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InsufficientSamples { expected: 2, actual: 1 };
        assert_eq!(err.to_string(), "Insufficient samples: expected at least 2, got 1");

        let err = Error::DimensionMismatch { expected: 3, actual: 4 };
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: estimator was initialized with width 3, got 4"
        );

        let err = Error::UnsupportedAxis(vec![0, 1]);
        assert_eq!(err.to_string(), "Unsupported axis configuration: [0, 1]");

        let err = Error::MissingFeature("observation.state".to_string());
        assert_eq!(
            err.to_string(),
            "Feature 'observation.state' is not described by the feature schema"
        );
    }

    #[test]
    fn test_error_helper_functions() {
        let err = Error::invalid_quantile(1.5);
        assert_eq!(err.to_string(), "Invalid parameter: Quantile 1.5 must be in [0, 1]");

        let err = Error::shape_mismatch("observation.image", "mean", &[3, 1, 1], &[3]);
        assert_eq!(
            err.to_string(),
            "Shape mismatch for 'mean' of feature 'observation.image': expected [3, 1, 1], got [3]"
        );
        assert!(err.is_aggregation_precondition());

        let err = Error::type_mismatch("action", "count", "must be a positive integer");
        assert!(err.to_string().contains("must be a positive integer"));
        assert!(err.is_aggregation_precondition());
        assert!(!Error::InvalidInput(String::new()).is_aggregation_precondition());
    }
}
