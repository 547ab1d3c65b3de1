//! Mask generation error types

use ndarray::ShapeError;
use thiserror::Error;

/// Result type for mask generation
pub type MaskResult<T> = Result<T, MaskError>;

/// Errors reported at the generation call boundary
///
/// Every variant is a defect in the caller's input. Validation runs before any
/// randomness is drawn, so an error never comes with partial output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaskError {
    /// Method selector is not one of the recognised names
    #[error("Invalid method '{0}': must be one of \"phase_randomized\" or \"appearance_probability\"")]
    InvalidMethod(String),

    /// Number of weights differs from number of basis fields
    #[error("Weights must have the same number of elements as fields: {weights} weights, {fields} fields")]
    ShapeMismatch { weights: usize, fields: usize },

    /// Nothing to generate from, or nothing to generate
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    /// Weight is negative or not finite
    #[error("Invalid weight at index {index}: {value} (weights must be finite and non-negative)")]
    InvalidWeight { index: usize, value: f64 },

    /// Weights sum to zero so no selection probability can be formed
    #[error("Weights sum to zero; appearance probabilities are undefined")]
    NonPositiveWeightSum,

    /// A stacked mode does not share the shape of the first one
    #[error("Field {index} has shape {actual:?}, expected {expected:?}")]
    FieldShapeMismatch {
        index: usize,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Array reshape failed
    #[error("Reshape failed: {0}")]
    Reshape(#[from] ShapeError),
}
