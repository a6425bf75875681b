//! Trajectory container for one batch run.
//!
//! Purpose
//! -------
//! Provide a small, validated `n × 7` state matrix so the kinetic model, the
//! discrepancy estimator and the hybrid simulator can assume clean inputs.
//!
//! Key behaviors
//! -------------
//! - [`Trajectory::new`] enforces the data invariants (non-empty, seven
//!   columns, finite entries, non-decreasing time).
//! - [`Trajectory::from_measured`] builds a trajectory from a time vector and
//!   an `n × 3` block of measured values, leaving the error channels at zero.
//! - Accessors return views or small fixed-size arrays; the stored matrix is
//!   never mutated by the core.
//!
//! Invariants & assumptions
//! ------------------------
//! - `rows ≥ 1` and `cols == N_CHANNELS`.
//! - Every entry is finite.
//! - `T[i] ≤ T[i + 1]` for all consecutive rows.
//!
//! Conventions
//! -----------
//! - Column order follows [`Channel::index`].
//! - Derived trajectories (estimated errors, simulated paths) are returned as
//!   new values built through [`Trajectory::new`].
use crate::bioprocess::{
    core::channels::{Channel, ERRORS, ErrorState, MEASURED, MeasuredState, N_CHANNELS},
    errors::{HybridError, HybridResult},
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// `Trajectory` — validated `n × 7` state matrix indexed by time.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    data: Array2<f64>,
}

impl Trajectory {
    /// Construct a validated trajectory from a full state matrix.
    ///
    /// Errors
    /// ------
    /// - `HybridError::EmptyTrajectory` if `data` has no rows.
    /// - `HybridError::InvalidShape` if `data` does not have 7 columns.
    /// - `HybridError::NonFiniteEntry` for the first NaN/±inf entry.
    /// - `HybridError::DecreasingTime` if the time channel decreases.
    pub fn new(data: Array2<f64>) -> HybridResult<Self> {
        let (rows, cols) = data.dim();
        if rows == 0 {
            return Err(HybridError::EmptyTrajectory);
        }
        if cols != N_CHANNELS {
            return Err(HybridError::InvalidShape { rows, cols, expected_cols: N_CHANNELS });
        }
        for ((row, col), &value) in data.indexed_iter() {
            if !value.is_finite() {
                return Err(HybridError::NonFiniteEntry { row, col, value });
            }
        }
        let time = data.column(Channel::T.index());
        for row in 1..rows {
            if time[row] < time[row - 1] {
                return Err(HybridError::DecreasingTime {
                    row,
                    previous: time[row - 1],
                    current: time[row],
                });
            }
        }
        Ok(Self { data })
    }

    /// Construct a trajectory from time stamps and measured channels.
    ///
    /// `measured` is `n × 3` in `[CX, CS, CP]` order; error channels start at
    /// zero.
    ///
    /// Errors
    /// ------
    /// - `HybridError::LengthMismatch` if `measured` does not have
    ///   `time.len()` rows and 3 columns.
    /// - Any error from [`Trajectory::new`].
    pub fn from_measured(
        time: ArrayView1<f64>, measured: ArrayView2<f64>,
    ) -> HybridResult<Self> {
        if measured.nrows() != time.len() {
            return Err(HybridError::LengthMismatch {
                expected: time.len(),
                actual: measured.nrows(),
            });
        }
        if measured.ncols() != MEASURED.len() {
            return Err(HybridError::LengthMismatch {
                expected: MEASURED.len(),
                actual: measured.ncols(),
            });
        }
        let mut data = Array2::zeros((time.len(), N_CHANNELS));
        data.column_mut(Channel::T.index()).assign(&time);
        for (k, channel) in MEASURED.iter().enumerate() {
            data.column_mut(channel.index()).assign(&measured.column(k));
        }
        Self::new(data)
    }

    /// Number of time points.
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    /// Always `false` for a validated trajectory.
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Read-only view of the full state matrix.
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Consume the trajectory and return its state matrix.
    pub fn into_inner(self) -> Array2<f64> {
        self.data
    }

    /// Time channel.
    pub fn times(&self) -> ArrayView1<'_, f64> {
        self.data.column(Channel::T.index())
    }

    /// Time stamp of row `i`.
    ///
    /// Panics if `i` is out of bounds.
    pub fn time(&self, i: usize) -> f64 {
        self.data[[i, Channel::T.index()]]
    }

    /// Column for a single channel.
    pub fn channel(&self, channel: Channel) -> ArrayView1<'_, f64> {
        self.data.column(channel.index())
    }

    /// Full state row `i`.
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.data.row(i)
    }

    /// Measured channels of row `i`.
    pub fn measured(&self, i: usize) -> MeasuredState {
        MEASURED.map(|c| self.data[[i, c.index()]])
    }

    /// Error channels of row `i`.
    pub fn errors(&self, i: usize) -> ErrorState {
        ERRORS.map(|c| self.data[[i, c.index()]])
    }

    /// Measured block as an owned `n × 3` matrix.
    pub fn measured_matrix(&self) -> Array2<f64> {
        let columns: Vec<usize> = MEASURED.iter().map(|c| c.index()).collect();
        self.data.select(Axis(1), &columns)
    }

    /// New trajectory with the given error rows written into the error
    /// channels; everything else is copied unchanged.
    ///
    /// Errors
    /// ------
    /// - `HybridError::LengthMismatch` if `errors.len() != self.len()`.
    /// - Any error from [`Trajectory::new`] (e.g., non-finite errors).
    pub fn with_errors(&self, errors: &[ErrorState]) -> HybridResult<Self> {
        if errors.len() != self.len() {
            return Err(HybridError::LengthMismatch { expected: self.len(), actual: errors.len() });
        }
        let mut data = self.data.clone();
        for (i, row_errors) in errors.iter().enumerate() {
            for (channel, value) in ERRORS.iter().zip(row_errors.iter()) {
                data[[i, channel.index()]] = *value;
            }
        }
        Self::new(data)
    }
}

/// Build a state row from its parts.
pub(crate) fn state_row(time: f64, measured: &MeasuredState, errors: &ErrorState) -> Array1<f64> {
    let mut row = Array1::zeros(N_CHANNELS);
    row[Channel::T.index()] = time;
    for (k, channel) in MEASURED.iter().enumerate() {
        row[channel.index()] = measured[k];
    }
    for (k, channel) in ERRORS.iter().enumerate() {
        row[channel.index()] = errors[k];
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // `from_measured` places each measured column under its channel index and
    // leaves the error channels at zero.
    //
    // Given
    // -----
    // - Two time points and a 2 × 3 measured block.
    //
    // Expect
    // ------
    // - `measured(i)` returns the input rows; `errors(i)` is all zeros.
    fn from_measured_places_columns_by_channel() {
        // Arrange
        let time = array![0.0, 1.5];
        let measured = array![[0.1, 10.0, 0.0], [0.2, 9.5, 0.3]];

        // Act
        let traj = Trajectory::from_measured(time.view(), measured.view()).expect("valid");

        // Assert
        assert_eq!(traj.len(), 2);
        assert_eq!(traj.measured(1), [0.2, 9.5, 0.3]);
        assert_eq!(traj.errors(0), [0.0; 3]);
        assert_eq!(traj.time(1), 1.5);
        assert_eq!(traj.measured_matrix(), measured);
    }

    #[test]
    fn new_rejects_empty_and_wrong_width() {
        assert_eq!(Trajectory::new(Array2::zeros((0, 7))), Err(HybridError::EmptyTrajectory));
        assert!(matches!(
            Trajectory::new(Array2::zeros((2, 4))),
            Err(HybridError::InvalidShape { cols: 4, .. })
        ));
    }

    #[test]
    fn new_rejects_non_finite_entries() {
        let mut data = Array2::zeros((2, 7));
        data[[1, 3]] = f64::NAN;

        let result = Trajectory::new(data);

        assert!(matches!(result, Err(HybridError::NonFiniteEntry { row: 1, col: 3, .. })));
    }

    #[test]
    // Purpose
    // -------
    // Equal consecutive time stamps are allowed, decreasing ones are not.
    fn new_accepts_repeated_times_but_rejects_decreasing_ones() {
        let mut data = Array2::zeros((3, 7));
        data[[1, 0]] = 1.0;
        data[[2, 0]] = 1.0;
        assert!(Trajectory::new(data.clone()).is_ok());

        data[[2, 0]] = 0.5;
        assert!(matches!(Trajectory::new(data), Err(HybridError::DecreasingTime { row: 2, .. })));
    }

    #[test]
    fn with_errors_writes_only_error_channels() {
        let traj = Trajectory::from_measured(
            array![0.0, 1.0].view(),
            array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]].view(),
        )
        .expect("valid");

        let augmented = traj.with_errors(&[[0.1, -0.2, 0.3], [0.0; 3]]).expect("valid errors");

        assert_eq!(augmented.errors(0), [0.1, -0.2, 0.3]);
        assert_eq!(augmented.measured(0), traj.measured(0));
        assert!(traj.with_errors(&[[0.0; 3]]).is_err());
    }

    #[test]
    fn state_row_follows_channel_layout() {
        let row = state_row(2.0, &[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);

        assert_eq!(row, array![2.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
