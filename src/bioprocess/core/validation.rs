//! Validation helpers shared by the bioprocess models.
use crate::bioprocess::{
    core::channels::{ErrorState, N_MEASURED},
    errors::{HybridError, HybridResult},
};
use ndarray::Array1;

/// Validate a simulation time grid.
///
/// Errors
/// ------
/// - `HybridError::EmptyTimeGrid` if `grid` is empty.
/// - `HybridError::InvalidTimeGrid` if any entry is non-finite or the grid is
///   not strictly increasing.
pub fn validate_time_grid(grid: &[f64]) -> HybridResult<()> {
    let Some(&first) = grid.first() else {
        return Err(HybridError::EmptyTimeGrid);
    };
    if !first.is_finite() {
        return Err(HybridError::InvalidTimeGrid { index: 0, previous: first, current: first });
    }
    for (index, pair) in grid.windows(2).enumerate() {
        let (previous, current) = (pair[0], pair[1]);
        if !current.is_finite() || current <= previous {
            return Err(HybridError::InvalidTimeGrid { index: index + 1, previous, current });
        }
    }
    Ok(())
}

/// Validate a measured/initial state vector.
///
/// Errors
/// ------
/// - `HybridError::NonFiniteEntry` (row 0) for the first non-finite entry.
pub fn validate_state(state: &[f64]) -> HybridResult<()> {
    match state.iter().position(|v| !v.is_finite()) {
        Some(col) => Err(HybridError::NonFiniteEntry { row: 0, col, value: state[col] }),
        None => Ok(()),
    }
}

/// Convert a fixed-length error vector, checking its length.
pub fn to_error_state(values: &Array1<f64>) -> HybridResult<ErrorState> {
    if values.len() != N_MEASURED {
        return Err(HybridError::LengthMismatch { expected: N_MEASURED, actual: values.len() });
    }
    Ok([values[0], values[1], values[2]])
}
