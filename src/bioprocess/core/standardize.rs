//! Per-channel affine standardization.
//!
//! Purpose
//! -------
//! Hold the mean and scale of every channel and map values between raw and
//! standardized units. The hybrid simulator standardizes measured channels
//! before querying the error predictor and de-standardizes the predicted
//! errors before injecting them.
//!
//! Key behaviors
//! -------------
//! - `forward(v, channels) = (v − mean[c]) / scale[c]`, `inverse` undoes it.
//! - [`Standardizer::fit`] pools every row of every trajectory and uses the
//!   population standard deviation; a zero scale is replaced by 1.
//!
//! Invariants & assumptions
//! ------------------------
//! - `mean` and `scale` have one entry per channel (`N_CHANNELS`).
//! - All entries are finite and every scale is strictly positive.
use crate::bioprocess::{
    core::{
        channels::{Channel, ExperimentId, N_CHANNELS},
        trajectory::Trajectory,
    },
    errors::{HybridError, HybridResult},
};
use ndarray::{Array1, ArrayView1};
use statrs::statistics::Statistics;

/// `Standardizer` — per-channel mean and scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl Standardizer {
    /// Construct from explicit per-channel statistics.
    ///
    /// Errors
    /// ------
    /// - `HybridError::LengthMismatch` if either vector is not `N_CHANNELS`
    ///   long.
    /// - `HybridError::InvalidStandardizer` for a non-finite mean or a
    ///   non-finite / non-positive scale.
    pub fn new(mean: Array1<f64>, scale: Array1<f64>) -> HybridResult<Self> {
        for values in [&mean, &scale] {
            if values.len() != N_CHANNELS {
                return Err(HybridError::LengthMismatch {
                    expected: N_CHANNELS,
                    actual: values.len(),
                });
            }
        }
        for (index, &value) in mean.iter().enumerate() {
            if !value.is_finite() {
                return Err(HybridError::InvalidStandardizer {
                    index,
                    value,
                    reason: "Mean must be finite.",
                });
            }
        }
        for (index, &value) in scale.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                return Err(HybridError::InvalidStandardizer {
                    index,
                    value,
                    reason: "Scale must be finite and > 0.",
                });
            }
        }
        Ok(Self { mean, scale })
    }

    /// Identity transform (mean 0, scale 1 on every channel).
    pub fn identity() -> Self {
        Self { mean: Array1::zeros(N_CHANNELS), scale: Array1::ones(N_CHANNELS) }
    }

    /// Fit pooled statistics over all rows of all trajectories.
    ///
    /// Errors
    /// ------
    /// - `HybridError::EmptyTrajectory` if `trajectories` is empty.
    pub fn fit(trajectories: &[(ExperimentId, Trajectory)]) -> HybridResult<Self> {
        if trajectories.is_empty() {
            return Err(HybridError::EmptyTrajectory);
        }
        let mut mean = Array1::zeros(N_CHANNELS);
        let mut scale = Array1::ones(N_CHANNELS);
        for col in 0..N_CHANNELS {
            let pooled: Vec<f64> = trajectories
                .iter()
                .flat_map(|(_, traj)| traj.view().column(col).to_vec())
                .collect();
            mean[col] = pooled.iter().mean();
            let sd = pooled.iter().population_std_dev();
            scale[col] = if sd > 0.0 { sd } else { 1.0 };
        }
        Self::new(mean, scale)
    }

    pub fn mean(&self) -> ArrayView1<'_, f64> {
        self.mean.view()
    }

    pub fn scale(&self) -> ArrayView1<'_, f64> {
        self.scale.view()
    }

    /// Standardize `values`, where `values[k]` belongs to `channels[k]`.
    ///
    /// Errors
    /// ------
    /// - `HybridError::LengthMismatch` if the lengths differ.
    pub fn forward(&self, values: ArrayView1<f64>, channels: &[Channel]) -> HybridResult<Array1<f64>> {
        self.map(values, channels, |v, m, s| (v - m) / s)
    }

    /// Exact inverse of [`Standardizer::forward`].
    pub fn inverse(&self, values: ArrayView1<f64>, channels: &[Channel]) -> HybridResult<Array1<f64>> {
        self.map(values, channels, |v, m, s| v * s + m)
    }

    fn map(
        &self, values: ArrayView1<f64>, channels: &[Channel], f: impl Fn(f64, f64, f64) -> f64,
    ) -> HybridResult<Array1<f64>> {
        if values.len() != channels.len() {
            return Err(HybridError::LengthMismatch {
                expected: channels.len(),
                actual: values.len(),
            });
        }
        Ok(values
            .iter()
            .zip(channels.iter())
            .map(|(&v, c)| f(v, self.mean[c.index()], self.scale[c.index()]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bioprocess::core::channels::{ERRORS, MEASURED};
    use approx::assert_relative_eq;
    use ndarray::array;

    fn sample_set() -> Vec<(ExperimentId, Trajectory)> {
        let a = Trajectory::from_measured(
            array![0.0, 1.0].view(),
            array![[1.0, 10.0, 0.0], [3.0, 6.0, 2.0]].view(),
        )
        .expect("valid");
        let b = Trajectory::from_measured(
            array![0.0, 1.0].view(),
            array![[1.0, 10.0, 0.0], [3.0, 6.0, 2.0]].view(),
        )
        .expect("valid");
        vec![("a".to_string(), a), ("b".to_string(), b)]
    }

    #[test]
    // Purpose
    // -------
    // `fit` uses pooled means and population standard deviations, replacing
    // the zero spread of the all-zero error channels by 1.
    //
    // Given
    // -----
    // - Two identical runs with CX ∈ {1, 3}, CS ∈ {10, 6}, CP ∈ {0, 2}.
    //
    // Expect
    // ------
    // - mean CX = 2, scale CX = 1; mean CS = 8, scale CS = 2; error scales 1.
    fn fit_uses_pooled_population_statistics() {
        // Arrange
        let data = sample_set();

        // Act
        let standardizer = Standardizer::fit(&data).expect("fit succeeds");

        // Assert
        assert_relative_eq!(standardizer.mean()[Channel::CX.index()], 2.0, epsilon = 1e-12);
        assert_relative_eq!(standardizer.scale()[Channel::CX.index()], 1.0, epsilon = 1e-12);
        assert_relative_eq!(standardizer.mean()[Channel::CS.index()], 8.0, epsilon = 1e-12);
        assert_relative_eq!(standardizer.scale()[Channel::CS.index()], 2.0, epsilon = 1e-12);
        for channel in ERRORS {
            assert_eq!(standardizer.scale()[channel.index()], 1.0);
        }
    }

    #[test]
    fn inverse_undoes_forward() {
        let standardizer = Standardizer::new(
            array![0.0, 2.0, 8.0, 1.0, 0.1, -0.2, 0.0],
            array![1.0, 1.0, 2.0, 0.5, 3.0, 0.25, 4.0],
        )
        .expect("valid");
        let raw = array![2.5, 7.0, 0.3];

        let z = standardizer.forward(raw.view(), &MEASURED).expect("lengths agree");
        let back = standardizer.inverse(z.view(), &MEASURED).expect("lengths agree");

        assert_relative_eq!(z[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(z[1], -0.5, epsilon = 1e-12);
        for k in 0..3 {
            assert_relative_eq!(back[k], raw[k], epsilon = 1e-12);
        }
    }

    #[test]
    fn new_rejects_bad_scale_and_length() {
        assert!(matches!(
            Standardizer::new(Array1::zeros(7), Array1::zeros(7)),
            Err(HybridError::InvalidStandardizer { index: 0, .. })
        ));
        assert!(matches!(
            Standardizer::new(Array1::zeros(3), Array1::ones(3)),
            Err(HybridError::LengthMismatch { expected: 7, actual: 3 })
        ));
    }

    #[test]
    fn forward_rejects_length_mismatch() {
        let standardizer = Standardizer::identity();

        let result = standardizer.forward(array![1.0, 2.0].view(), &MEASURED);

        assert!(matches!(result, Err(HybridError::LengthMismatch { .. })));
    }
}
