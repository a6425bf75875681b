//! Hybrid simulator — Monte Carlo multi-step-ahead prediction.
//!
//! Purpose
//! -------
//! Combine the kinetic model with a learned error predictor to forecast a
//! trajectory from its initial state, together with uncertainty bands built
//! from an ensemble of stochastic realizations.
//!
//! Key behaviors
//! -------------
//! - Replicate the input into `ensemble_size + 1` realizations. Realization 0
//!   uses the predicted mean; realizations `1..=N` draw
//!   `mean + std · z`, `z ~ N(0, 1)`, from the simulator's own RNG.
//! - Advance column-major: every realization finishes step `i` before any
//!   realization starts step `i + 1`. Together with the owned RNG this makes
//!   the whole ensemble reproducible for a given seed.
//! - At each step: standardize the measured channels, query the predictor,
//!   de-standardize the errors into the current row, integrate one interval
//!   with that constant forcing, then clip the new substrate value at zero.
//! - Summarize with trimmed-mean bands over realizations `1..=N` and clip
//!   negative measured/band values after assembly.
//!
//! Invariants & assumptions
//! ------------------------
//! - Only the time channel and the first row's measured values of the input
//!   are used; later measured values are overwritten by the simulation.
//! - The last row's error channels are zero padding.
//! - A non-finite predictor output, a negative std, a wrong output length or
//!   a sampled error that overflows after de-standardization aborts the
//!   ensemble with `HybridError::PredictionDivergence`.
//! - Only realizations `1..=N` consume normal draws, three per step.
//!
//! Downstream usage
//! ----------------
//! - Build with [`HybridSimulator::with_seed`] (or `new` with any `Rng`),
//!   then call [`HybridSimulator::predict`] per trajectory or
//!   [`HybridSimulator::predict_batch`] for a list of runs.
use crate::bioprocess::{
    core::{
        channels::{ERRORS, ErrorState, ExperimentId, MEASURED, N_MEASURED},
        forecasts::{ForecastSummary, trimmed_bands},
        options::EnsembleOptions,
        params::KineticParams,
        propagate::propagate_interval,
        rates::RateLaw,
        report::BatchReport,
        standardize::Standardizer,
        trajectory::Trajectory,
        validation::to_error_state,
    },
    errors::{HybridError, HybridResult},
    models::{
        kinetic::KineticModel,
        predictor::{ErrorDistribution, ErrorPredictor},
    },
};
use log::{debug, warn};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;

/// Kinetic model, error predictor and the RNG that drives the ensemble.
#[derive(Debug, Clone)]
pub struct HybridSimulator<P: ErrorPredictor, L: RateLaw = KineticParams, R: Rng = StdRng> {
    model: KineticModel<L>,
    predictor: P,
    standardizer: Standardizer,
    rng: R,
}

impl<P: ErrorPredictor, L: RateLaw> HybridSimulator<P, L, StdRng> {
    /// Construct with a `StdRng` seeded from `seed`.
    pub fn with_seed(model: KineticModel<L>, predictor: P, standardizer: Standardizer, seed: u64) -> Self {
        Self::new(model, predictor, standardizer, StdRng::seed_from_u64(seed))
    }
}

impl<P: ErrorPredictor, L: RateLaw, R: Rng> HybridSimulator<P, L, R> {
    pub fn new(model: KineticModel<L>, predictor: P, standardizer: Standardizer, rng: R) -> Self {
        Self { model, predictor, standardizer, rng }
    }

    pub fn model(&self) -> &KineticModel<L> {
        &self.model
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    pub fn standardizer(&self) -> &Standardizer {
        &self.standardizer
    }

    /// Multi-step-ahead ensemble forecast of `trajectory`.
    ///
    /// Parameters
    /// ----------
    /// - `trajectory`: supplies the time grid and the initial measured state.
    /// - `options`: ensemble size and trim fraction.
    ///
    /// Returns
    /// -------
    /// [`ForecastSummary`] with the deterministic realization and the
    /// trimmed-mean bands. With `ensemble_size == 0` both bands equal the
    /// deterministic measured values.
    ///
    /// Errors
    /// ------
    /// - `HybridError::PredictionDivergence` for unusable predictor output.
    /// - `HybridError::IntegrationFailure` if an interval cannot be
    ///   integrated.
    pub fn predict(&mut self, trajectory: &Trajectory, options: &EnsembleOptions) -> HybridResult<ForecastSummary> {
        let n = trajectory.len();
        let members = options.ensemble_size + 1;
        let mut ensemble = vec![initial_realization(trajectory); members];

        for i in 0..n.saturating_sub(1) {
            let (t0, t1) = (trajectory.time(i), trajectory.time(i + 1));
            for (j, realization) in ensemble.iter_mut().enumerate() {
                let current = measured_row(realization, i);
                let standardized = self.standardizer.forward(Array1::from(current.to_vec()).view(), &MEASURED)?;
                let distribution = self.predictor.predict(standardized.view());
                validate_distribution(&distribution, i, j)?;

                let sampled: Array1<f64> = if j == 0 {
                    distribution.mean.clone()
                } else {
                    let z: Array1<f64> = (0..N_MEASURED).map(|_| self.rng.sample(StandardNormal)).collect();
                    &distribution.mean + &(&distribution.std * &z)
                };
                let errors = to_error_state(&self.standardizer.inverse(sampled.view(), &ERRORS)?)?;
                check_errors_finite(&errors, i, j)?;
                write_errors(realization, i, &errors);

                let mut next = propagate_interval(self.model.law(), &current, &errors, t0, t1, self.model.ode_options())?;
                next[1] = next[1].max(0.0);
                write_measured(realization, i + 1, &next);
            }
        }
        debug!("simulated {members} realizations over {n} time points");
        summarize(ensemble, options)
    }

    /// Forecast many trajectories with the same RNG stream, in input order.
    ///
    /// A failing trajectory is recorded in `failures` and does not stop the
    /// batch.
    pub fn predict_batch(
        &mut self, trajectories: &[(ExperimentId, Trajectory)], options: &EnsembleOptions,
    ) -> BatchReport<ForecastSummary> {
        let mut report = BatchReport::new();
        for (id, trajectory) in trajectories {
            match self.predict(trajectory, options) {
                Ok(summary) => report.outputs.push((id.clone(), summary)),
                Err(err) => {
                    warn!("experiment {id}: prediction failed ({err})");
                    report.failures.push((id.clone(), err));
                }
            }
        }
        report
    }
}

// ---- Helper Methods ----

// Input copy with zeroed error channels; rows past 0 are overwritten.
fn initial_realization(trajectory: &Trajectory) -> Array2<f64> {
    let mut data = trajectory.view().to_owned();
    for channel in ERRORS {
        data.column_mut(channel.index()).fill(0.0);
    }
    data
}

fn measured_row(data: &Array2<f64>, i: usize) -> [f64; N_MEASURED] {
    MEASURED.map(|c| data[[i, c.index()]])
}

fn write_measured(data: &mut Array2<f64>, i: usize, values: &[f64; N_MEASURED]) {
    for (channel, value) in MEASURED.iter().zip(values.iter()) {
        data[[i, channel.index()]] = *value;
    }
}

fn write_errors(data: &mut Array2<f64>, i: usize, values: &ErrorState) {
    for (channel, value) in ERRORS.iter().zip(values.iter()) {
        data[[i, channel.index()]] = *value;
    }
}

fn divergence(step: usize, realization: usize, reason: String) -> HybridError {
    warn!("predictor diverged at step {step}, realization {realization}: {reason}");
    HybridError::PredictionDivergence { step, realization, reason }
}

// Sampled errors in physical units; a huge std can overflow here.
fn check_errors_finite(errors: &ErrorState, step: usize, realization: usize) -> HybridResult<()> {
    match errors.iter().find(|v| !v.is_finite()) {
        Some(value) => Err(divergence(step, realization, format!("non-finite sampled error {value}"))),
        None => Ok(()),
    }
}

fn validate_distribution(distribution: &ErrorDistribution, step: usize, realization: usize) -> HybridResult<()> {
    let diverged = |reason: String| -> HybridResult<()> { Err(divergence(step, realization, reason)) };
    if distribution.mean.len() != N_MEASURED || distribution.std.len() != N_MEASURED {
        return diverged(format!(
            "expected {N_MEASURED} means and stds, got {} and {}",
            distribution.mean.len(),
            distribution.std.len()
        ));
    }
    if let Some(value) = distribution.mean.iter().find(|v| !v.is_finite()) {
        return diverged(format!("non-finite mean {value}"));
    }
    if let Some(value) = distribution.std.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return diverged(format!("invalid std {value}"));
    }
    Ok(())
}

fn summarize(ensemble: Vec<Array2<f64>>, options: &EnsembleOptions) -> HybridResult<ForecastSummary> {
    let mut members = ensemble.into_iter();
    let Some(deterministic) = members.next() else {
        return Err(HybridError::EmptyTrajectory);
    };
    let stochastic: Vec<Array2<f64>> = members.collect();
    let rows = deterministic.nrows();
    let k = options.band_size();
    let mut lower = Array2::zeros((rows, N_MEASURED));
    let mut upper = Array2::zeros((rows, N_MEASURED));
    let mut samples = Vec::with_capacity(stochastic.len());
    for i in 0..rows {
        for (c, channel) in MEASURED.iter().enumerate() {
            samples.clear();
            samples.extend(stochastic.iter().map(|r| r[[i, channel.index()]]));
            let (lo, hi) = trimmed_bands(&mut samples, k, deterministic[[i, channel.index()]]);
            lower[[i, c]] = lo;
            upper[[i, c]] = hi;
        }
    }
    ForecastSummary::new(Trajectory::new(deterministic)?, lower, upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bioprocess::core::{channels::Channel, ode::OdeOptions};
    use crate::bioprocess::models::predictor::ConstantPredictor;
    use ndarray::{ArrayView1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Degenerate ensembles (size 0, zero spread).
    // - Reproducibility for equal seeds.
    // - Substrate clipping and predictor divergence.
    // -------------------------------------------------------------------------

    fn model() -> KineticModel {
        KineticModel::new(KineticParams::new(0.3, 1.5, 0.5, 0.02).expect("valid"), OdeOptions::default())
    }

    fn observed() -> Trajectory {
        Trajectory::from_measured(
            array![0.0, 1.0, 2.0, 4.0].view(),
            array![[0.5, 10.0, 0.1], [0.6, 9.7, 0.12], [0.75, 9.4, 0.15], [1.1, 8.6, 0.2]].view(),
        )
        .expect("valid")
    }

    fn simulator<P: ErrorPredictor>(predictor: P, seed: u64) -> HybridSimulator<P> {
        HybridSimulator::with_seed(model(), predictor, Standardizer::identity(), seed)
    }

    struct NanPredictor;

    impl ErrorPredictor for NanPredictor {
        fn predict(&self, _standardized_measured: ArrayView1<f64>) -> ErrorDistribution {
            ErrorDistribution::new(array![0.0, f64::NAN, 0.0], array![0.1, 0.1, 0.1])
        }
    }

    struct ShortPredictor;

    impl ErrorPredictor for ShortPredictor {
        fn predict(&self, _standardized_measured: ArrayView1<f64>) -> ErrorDistribution {
            ErrorDistribution::new(array![0.0, 0.0], array![0.1, 0.1])
        }
    }

    #[test]
    // Purpose
    // -------
    // With no stochastic realizations the bands equal the deterministic
    // values and nothing divides by zero.
    fn empty_ensemble_bands_equal_deterministic() {
        // Arrange
        let mut sim = simulator(ConstantPredictor::new([0.01, -0.1, 0.0], [0.5, 0.5, 0.5]), 7);
        let options = EnsembleOptions::new(0, 10).expect("valid");

        // Act
        let summary = sim.predict(&observed(), &options).expect("predicts");

        // Assert
        assert_eq!(summary.lower(), summary.deterministic().measured_matrix());
        assert_eq!(summary.upper(), summary.deterministic().measured_matrix());
    }

    #[test]
    // Purpose
    // -------
    // Zero predicted spread collapses every realization onto the
    // deterministic path, giving zero-width bands.
    fn zero_std_collapses_bands() {
        // Arrange
        let mut sim = simulator(ConstantPredictor::new([0.02, -0.2, 0.01], [0.0; 3]), 11);
        let options = EnsembleOptions::new(40, 10).expect("valid");

        // Act
        let summary = sim.predict(&observed(), &options).expect("predicts");

        // Assert
        let det = summary.deterministic().measured_matrix();
        assert_eq!(summary.lower(), det);
        assert_eq!(summary.upper(), det);
    }

    #[test]
    // Purpose
    // -------
    // Equal seeds, inputs and predictor give identical summaries; a
    // different seed changes the bands but not the deterministic path.
    fn equal_seeds_reproduce_the_forecast() {
        // Arrange
        let predictor = ConstantPredictor::new([0.02, -0.2, 0.01], [0.05, 0.1, 0.01]);
        let options = EnsembleOptions::new(30, 10).expect("valid");

        // Act
        let a = simulator(predictor.clone(), 3).predict(&observed(), &options).expect("predicts");
        let b = simulator(predictor.clone(), 3).predict(&observed(), &options).expect("predicts");
        let c = simulator(predictor, 4).predict(&observed(), &options).expect("predicts");

        // Assert
        assert_eq!(a, b);
        assert_eq!(a.deterministic(), c.deterministic());
        assert_ne!(a.upper(), c.upper());
    }

    #[test]
    // Purpose
    // -------
    // A strongly negative substrate error drives the substrate below zero;
    // the per-step clip keeps it at zero in every output column.
    fn substrate_is_never_negative() {
        // Arrange
        let inert = KineticModel::new(KineticParams::new(0.0, 1.5, 0.5, 0.02).expect("valid"), OdeOptions::default());
        let predictor = ConstantPredictor::new([0.0, -20.0, 0.0], [0.0, 5.0, 0.0]);
        let mut sim = HybridSimulator::with_seed(inert, predictor, Standardizer::identity(), 5);
        let options = EnsembleOptions::new(20, 10).expect("valid");

        // Act
        let summary = sim.predict(&observed(), &options).expect("predicts");

        // Assert
        let flat = summary.to_flat();
        assert!(summary.deterministic().channel(Channel::CS).iter().all(|&s| s >= 0.0));
        assert_eq!(summary.deterministic().measured(1)[1], 0.0);
        assert!(flat.column(8).iter().all(|&s| s >= 0.0));
        assert!(flat.column(11).iter().all(|&s| s >= 0.0));
    }

    #[test]
    fn deterministic_path_carries_errors_and_pads_last_row() {
        let mut sim = simulator(ConstantPredictor::new([0.02, -0.2, 0.01], [0.1; 3]), 1);
        let options = EnsembleOptions::new(5, 10).expect("valid");

        let summary = sim.predict(&observed(), &options).expect("predicts");

        let det = summary.deterministic();
        assert_eq!(det.errors(0), [0.02, -0.2, 0.01]);
        assert_eq!(det.errors(3), [0.0; 3]);
        assert_eq!(det.measured(0), observed().measured(0));
        assert_eq!(det.times(), observed().times());
    }

    #[test]
    fn non_finite_prediction_aborts_with_divergence() {
        let mut sim = simulator(NanPredictor, 1);

        let result = sim.predict(&observed(), &EnsembleOptions::new(3, 10).expect("valid"));

        assert!(matches!(
            result,
            Err(HybridError::PredictionDivergence { step: 0, realization: 0, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Errors that overflow when mapped back to physical units are a
    // predictor fault, reported before any integration is attempted.
    //
    // Given
    // -----
    // - Error-channel scale 1e300 and a predicted mean of 1e10.
    //
    // Expect
    // ------
    // - `PredictionDivergence` at step 0, realization 0.
    fn overflowing_sampled_errors_abort_with_divergence() {
        // Arrange
        let mut scale = Array1::ones(7);
        for channel in ERRORS {
            scale[channel.index()] = 1e300;
        }
        let standardizer = Standardizer::new(Array1::zeros(7), scale).expect("valid");
        let predictor = ConstantPredictor::new([1e10, 0.0, 0.0], [0.0; 3]);
        let mut sim = HybridSimulator::with_seed(model(), predictor, standardizer, 1);

        // Act
        let result = sim.predict(&observed(), &EnsembleOptions::new(3, 10).expect("valid"));

        // Assert
        assert!(matches!(
            result,
            Err(HybridError::PredictionDivergence { step: 0, realization: 0, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // The deterministic realization draws nothing from the RNG, so an
    // ensemble of one stochastic member reproduces a hand-driven stream of
    // three normals per step.
    fn only_stochastic_realizations_consume_normal_draws() {
        // Arrange
        let spread = [0.01, 0.05, 0.002];
        let mean = [0.02, -0.1, 0.004];
        let mut sim = simulator(ConstantPredictor::new(mean, spread), 21);
        let mut rng = StdRng::seed_from_u64(21);
        let traj = observed();

        // Act
        let summary = sim.predict(&traj, &EnsembleOptions::new(1, 10).expect("valid")).expect("predicts");

        // Assert
        let mut state = traj.measured(0);
        for i in 0..traj.len() - 1 {
            let errors: ErrorState = std::array::from_fn(|k| {
                let z: f64 = rng.sample(StandardNormal);
                mean[k] + spread[k] * z
            });
            let (t0, t1) = (traj.time(i), traj.time(i + 1));
            state = propagate_interval(model().law(), &state, &errors, t0, t1, &OdeOptions::default())
                .expect("integrates");
            state[1] = state[1].max(0.0);
            let lower = summary.lower();
            for k in 0..N_MEASURED {
                assert_eq!(lower[[i + 1, k]], state[k].max(0.0));
            }
        }
    }

    #[test]
    fn wrong_prediction_length_aborts_with_divergence() {
        let mut sim = simulator(ShortPredictor, 1);

        let result = sim.predict(&observed(), &EnsembleOptions::new(3, 10).expect("valid"));

        assert!(matches!(result, Err(HybridError::PredictionDivergence { .. })));
    }

    #[test]
    fn batch_contains_divergent_runs() {
        let mut good = simulator(ConstantPredictor::zero(), 2);
        let runs = vec![("a".to_string(), observed()), ("b".to_string(), observed())];

        let report = good.predict_batch(&runs, &EnsembleOptions::new(4, 2).expect("valid"));
        let mut bad = simulator(NanPredictor, 2);
        let failed = bad.predict_batch(&runs, &EnsembleOptions::new(4, 2).expect("valid"));

        assert_eq!(report.outputs.len(), 2);
        assert!(report.is_complete());
        assert_eq!(failed.failures.len(), 2);
        assert!(failed.outputs.is_empty());
    }
}
