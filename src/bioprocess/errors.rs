//! Errors for the hybrid bioprocess stack (trajectory validation, options
//! checks, integration, estimation and ensemble prediction failures).
//!
//! This module defines the model error type, [`HybridError`], used across the
//! kinetic model, the discrepancy estimator and the hybrid simulator. It
//! implements `Display`/`Error` and absorbs optimizer errors through
//! `From<OptError>`.
//!
//! ## Conventions
//! - **Indices are 0-based**: `row` and `step` refer to trajectory rows,
//!   `realization` to the ensemble member (0 is deterministic).
//! - `IntegrationFailure` and `PredictionDivergence` are fatal for the
//!   trajectory being processed.
//! - `OptimizerNonConvergence` is recoverable: the estimator records it as a
//!   warning value and keeps going.
use crate::optimization::errors::OptError;

/// Crate-wide result alias for bioprocess operations that may produce
/// [`HybridError`].
pub type HybridResult<T> = Result<T, HybridError>;

/// Unified error type for the hybrid kinetic stack.
#[derive(Debug, Clone, PartialEq)]
pub enum HybridError {
    // ---- Input/data validation ----
    /// Trajectory has no rows.
    EmptyTrajectory,

    /// Trajectory matrix has the wrong number of columns.
    InvalidShape { rows: usize, cols: usize, expected_cols: usize },

    /// An entry is NaN/±inf.
    NonFiniteEntry { row: usize, col: usize, value: f64 },

    /// Time channel decreases between consecutive rows.
    DecreasingTime { row: usize, previous: f64, current: f64 },

    /// Time grid is empty.
    EmptyTimeGrid,

    /// Time grid is not strictly increasing (or not finite).
    InvalidTimeGrid { index: usize, previous: f64, current: f64 },

    /// Two inputs that must agree in length do not.
    LengthMismatch { expected: usize, actual: usize },

    /// Channel name does not match any known channel.
    UnknownChannel { name: String },

    // ---- Parameters / options ----
    /// Kinetic parameter is non-finite or out of its domain.
    InvalidKineticParam { name: &'static str, value: f64, reason: &'static str },

    /// Kinetic parameter map lacks a required key.
    MissingKineticParam { name: &'static str },

    /// ODE option is non-finite or out of its domain.
    InvalidOdeOption { name: &'static str, value: f64, reason: &'static str },

    /// zero_floor must be finite and ≥ 0.
    InvalidZeroFloor { value: f64 },

    /// trim_fraction must be ≥ 1.
    InvalidTrimFraction { value: usize },

    /// Standardizer mean/scale entry is invalid.
    InvalidStandardizer { index: usize, value: f64, reason: &'static str },

    /// Metric window start is past the end of the data.
    InvalidSkip { skip: usize, len: usize },

    // ---- Numerical core ----
    /// ODE solver failed to produce a finite trajectory.
    IntegrationFailure { time: f64, reason: String },

    /// Discrepancy optimizer hit its iteration cap (recoverable).
    OptimizerNonConvergence { interval: usize, iterations: usize, status: String },

    /// Optimizer backend or configuration failure.
    OptimizerFailed { status: String },

    /// Error predictor returned unusable output.
    PredictionDivergence { step: usize, realization: usize, reason: String },
}

impl std::error::Error for HybridError {}

impl std::fmt::Display for HybridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input/data validation ----
            HybridError::EmptyTrajectory => {
                write!(f, "Trajectory is empty.")
            }
            HybridError::InvalidShape { rows, cols, expected_cols } => {
                write!(
                    f,
                    "Trajectory has shape ({rows}, {cols}); expected {expected_cols} columns."
                )
            }
            HybridError::NonFiniteEntry { row, col, value } => {
                write!(f, "Entry at row {row}, column {col} is non-finite: {value}")
            }
            HybridError::DecreasingTime { row, previous, current } => {
                write!(f, "Time decreases at row {row}: {previous} -> {current}")
            }
            HybridError::EmptyTimeGrid => {
                write!(f, "Time grid is empty.")
            }
            HybridError::InvalidTimeGrid { index, previous, current } => {
                write!(
                    f,
                    "Time grid must be finite and strictly increasing; index {index}: {previous} -> {current}"
                )
            }
            HybridError::LengthMismatch { expected, actual } => {
                write!(f, "Length mismatch: expected {expected}, got {actual}")
            }
            HybridError::UnknownChannel { name } => {
                write!(f, "Unknown channel name: {name}")
            }
            // ---- Parameters / options ----
            HybridError::InvalidKineticParam { name, value, reason } => {
                write!(f, "Kinetic parameter {name} is invalid; got: {value}. {reason}")
            }
            HybridError::MissingKineticParam { name } => {
                write!(f, "Kinetic parameter map is missing key: {name}")
            }
            HybridError::InvalidOdeOption { name, value, reason } => {
                write!(f, "ODE option {name} is invalid; got: {value}. {reason}")
            }
            HybridError::InvalidZeroFloor { value } => {
                write!(f, "zero_floor must be finite and >= 0; got: {value}")
            }
            HybridError::InvalidTrimFraction { value } => {
                write!(f, "trim_fraction must be >= 1; got: {value}")
            }
            HybridError::InvalidStandardizer { index, value, reason } => {
                write!(f, "Standardizer entry at index {index} is invalid: {value}. {reason}")
            }
            HybridError::InvalidSkip { skip, len } => {
                write!(f, "Metric window start {skip} leaves no rows out of {len}.")
            }
            // ---- Numerical core ----
            HybridError::IntegrationFailure { time, reason } => {
                write!(f, "Integration failed at t = {time}: {reason}")
            }
            HybridError::OptimizerNonConvergence { interval, iterations, status } => {
                write!(
                    f,
                    "Optimizer did not converge on interval {interval} after {iterations} iterations: {status}"
                )
            }
            HybridError::OptimizerFailed { status } => {
                write!(f, "Optimizer failed with status: {status}")
            }
            HybridError::PredictionDivergence { step, realization, reason } => {
                write!(
                    f,
                    "Error predictor diverged at step {step}, realization {realization}: {reason}"
                )
            }
        }
    }
}

impl From<OptError> for HybridError {
    fn from(err: OptError) -> HybridError {
        HybridError::OptimizerFailed { status: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Optimizer errors are normalized into `OptimizerFailed` carrying the
    // optimizer's own message.
    fn from_opt_error_keeps_message() {
        let opt = OptError::NonFiniteCost { value: f64::NAN };
        let expected = opt.to_string();

        let err = HybridError::from(opt);

        assert_eq!(err, HybridError::OptimizerFailed { status: expected });
    }

    #[test]
    fn display_mentions_step_and_realization() {
        let err = HybridError::PredictionDivergence {
            step: 3,
            realization: 7,
            reason: "std is negative".to_string(),
        };

        let text = err.to_string();

        assert!(text.contains("step 3"));
        assert!(text.contains("realization 7"));
    }
}
