//! Ensemble forecast summaries — deterministic path plus trimmed-mean bands.
//!
//! Purpose
//! -------
//! Represent the result of a Monte Carlo multi-step-ahead prediction: the
//! deterministic realization's full state and, per measured channel, a lower
//! and an upper band built from the stochastic realizations.
//!
//! Key behaviors
//! -------------
//! - [`trimmed_bands`] sorts the samples of one (time, channel) cell and
//!   averages the bottom `k` (lower band) and the top `k` (upper band).
//! - [`ForecastSummary::new`] clips every negative measured or band value to
//!   zero after assembly.
//! - [`ForecastSummary::to_flat`] returns the 13-column layout
//!   `[T, CX, CS, CP, eX, eS, eP, lo_CX, lo_CS, lo_CP, hi_CX, hi_CS, hi_CP]`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `lower` and `upper` are `n × 3` with `n = deterministic.len()`.
//! - Band ordering relative to the deterministic path is a statistical
//!   property, not a pointwise guarantee.
//!
//! Conventions
//! -----------
//! - Band columns follow the measured channel order `[CX, CS, CP]`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover band averaging, the empty-sample fallback and the
//!   post-assembly clip.
use crate::bioprocess::{
    core::{
        channels::{Channel, MEASURED, N_CHANNELS, N_MEASURED},
        trajectory::Trajectory,
    },
    errors::{HybridError, HybridResult},
};
use ndarray::{Array2, ArrayView1, ArrayView2, s};

/// Number of columns in the flattened summary layout.
pub const FLAT_COLUMNS: usize = N_CHANNELS + 2 * N_MEASURED;

/// ForecastSummary — deterministic realization plus lower/upper bands.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSummary {
    deterministic: Trajectory,
    lower: Array2<f64>,
    upper: Array2<f64>,
}

impl ForecastSummary {
    /// Assemble a summary and clip negative measured/band values to zero.
    ///
    /// Errors
    /// ------
    /// - `HybridError::InvalidShape` if a band matrix is not `n × 3`.
    /// - Any error from [`Trajectory::new`] when rebuilding the clipped
    ///   deterministic path.
    pub fn new(
        deterministic: Trajectory, mut lower: Array2<f64>, mut upper: Array2<f64>,
    ) -> HybridResult<Self> {
        let rows = deterministic.len();
        for band in [&lower, &upper] {
            if band.dim() != (rows, N_MEASURED) {
                return Err(HybridError::InvalidShape {
                    rows: band.nrows(),
                    cols: band.ncols(),
                    expected_cols: N_MEASURED,
                });
            }
        }
        let mut state = deterministic.into_inner();
        for channel in MEASURED {
            state.column_mut(channel.index()).mapv_inplace(clip_negative);
        }
        lower.mapv_inplace(clip_negative);
        upper.mapv_inplace(clip_negative);
        Ok(Self { deterministic: Trajectory::new(state)?, lower, upper })
    }

    /// Deterministic realization (realization 0).
    pub fn deterministic(&self) -> &Trajectory {
        &self.deterministic
    }

    /// Lower band, `n × 3`.
    pub fn lower(&self) -> ArrayView2<'_, f64> {
        self.lower.view()
    }

    /// Upper band, `n × 3`.
    pub fn upper(&self) -> ArrayView2<'_, f64> {
        self.upper.view()
    }

    /// Number of time points.
    pub fn len(&self) -> usize {
        self.deterministic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deterministic.is_empty()
    }

    /// Lower band for one measured channel.
    ///
    /// Returns `None` for the time or error channels.
    pub fn lower_channel(&self, channel: Channel) -> Option<ArrayView1<'_, f64>> {
        band_column(&self.lower, channel)
    }

    /// Upper band for one measured channel.
    pub fn upper_channel(&self, channel: Channel) -> Option<ArrayView1<'_, f64>> {
        band_column(&self.upper, channel)
    }

    /// Flatten into the 13-column `[state, lower, upper]` layout.
    pub fn to_flat(&self) -> Array2<f64> {
        let rows = self.len();
        let mut flat = Array2::zeros((rows, FLAT_COLUMNS));
        flat.slice_mut(s![.., ..N_CHANNELS]).assign(&self.deterministic.view());
        flat.slice_mut(s![.., N_CHANNELS..N_CHANNELS + N_MEASURED]).assign(&self.lower);
        flat.slice_mut(s![.., N_CHANNELS + N_MEASURED..]).assign(&self.upper);
        flat
    }
}

/// Trimmed-mean lower and upper bands of one sample set.
///
/// Parameters
/// ----------
/// - `samples`: values of one (time, channel) cell across the stochastic
///   realizations; reordered in place.
/// - `k`: number of samples averaged on each side, clamped to
///   `samples.len()`.
/// - `fallback`: returned for both bands when `samples` is empty or `k == 0`.
///
/// Returns
/// -------
/// `(lower, upper)` = (mean of the `k` smallest, mean of the `k` largest).
pub fn trimmed_bands(samples: &mut [f64], k: usize, fallback: f64) -> (f64, f64) {
    let k = k.min(samples.len());
    if k == 0 {
        return (fallback, fallback);
    }
    samples.sort_by(f64::total_cmp);
    let n = samples.len();
    let lower = samples[..k].iter().sum::<f64>() / k as f64;
    let upper = samples[n - k..].iter().sum::<f64>() / k as f64;
    (lower, upper)
}

// ---- Helper Methods ----

fn clip_negative(value: f64) -> f64 {
    if value < 0.0 { 0.0 } else { value }
}

fn band_column(band: &Array2<f64>, channel: Channel) -> Option<ArrayView1<'_, f64>> {
    MEASURED.iter().position(|c| *c == channel).map(|k| band.column(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_point_path(cs_end: f64) -> Trajectory {
        Trajectory::from_measured(
            array![0.0, 1.0].view(),
            array![[1.0, 5.0, 0.0], [2.0, cs_end, 0.5]].view(),
        )
        .expect("valid")
    }

    #[test]
    // Purpose
    // -------
    // Bands average the k smallest and the k largest samples.
    //
    // Given
    // -----
    // - Samples {5, 1, 4, 2, 3, 10}, k = 2.
    //
    // Expect
    // ------
    // - lower = (1 + 2) / 2, upper = (5 + 10) / 2.
    fn trimmed_bands_average_extremes() {
        // Arrange
        let mut samples = vec![5.0, 1.0, 4.0, 2.0, 3.0, 10.0];

        // Act
        let (lower, upper) = trimmed_bands(&mut samples, 2, 0.0);

        // Assert
        assert_eq!(lower, 1.5);
        assert_eq!(upper, 7.5);
    }

    #[test]
    fn trimmed_bands_fall_back_without_samples() {
        assert_eq!(trimmed_bands(&mut [], 3, 4.2), (4.2, 4.2));
        assert_eq!(trimmed_bands(&mut [1.0, 2.0], 0, 4.2), (4.2, 4.2));
    }

    #[test]
    // Purpose
    // -------
    // Negative measured and band values are clipped after assembly, and the
    // flat layout places the bands after the seven state columns.
    fn new_clips_negatives_and_flattens() {
        // Arrange
        let path = two_point_path(-0.1);
        let lower = array![[1.0, 5.0, 0.0], [1.5, -0.3, 0.4]];
        let upper = array![[1.0, 5.0, 0.0], [2.5, 0.2, 0.6]];

        // Act
        let summary = ForecastSummary::new(path, lower, upper).expect("valid shapes");
        let flat = summary.to_flat();

        // Assert
        assert_eq!(summary.deterministic().measured(1)[1], 0.0);
        assert_eq!(summary.lower()[[1, 1]], 0.0);
        assert_eq!(flat.ncols(), FLAT_COLUMNS);
        assert_eq!(flat[[1, 7]], 1.5);
        assert_eq!(flat[[1, 12]], 0.6);
        assert_eq!(summary.upper_channel(Channel::CX).map(|c| c[1]), Some(2.5));
        assert!(summary.lower_channel(Channel::T).is_none());
    }

    #[test]
    fn new_rejects_band_shape_mismatch() {
        let result = ForecastSummary::new(two_point_path(1.0), Array2::zeros((1, 3)), Array2::zeros((2, 3)));

        assert!(matches!(result, Err(HybridError::InvalidShape { .. })));
    }
}
