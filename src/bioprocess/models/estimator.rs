//! Discrepancy estimation — back-solve per-interval constant errors.
//!
//! Purpose
//! -------
//! For every consecutive pair of observed states, find the constant error
//! vector `[eX, eS, eP]` that makes the error-forced mechanistic model,
//! integrated from the first state, reproduce the second. The resulting
//! augmented trajectory is the supervised target for the external error
//! predictor.
//!
//! Key behaviors
//! -------------
//! - Minimize the relative squared deviation
//!   `Σ_c ((obs_c − pred_c) / obs_c)²` with the crate's Nelder–Mead layer;
//!   channels whose observation is below `zero_floor` in magnitude use the
//!   absolute squared deviation instead.
//! - Run intervals sequentially, warm-starting each from the previous
//!   accepted solution ([`DiscrepancyEstimator::estimate_interval`] receives
//!   the guess explicitly and returns the next one).
//! - Treat hitting the iteration cap as recoverable: log a warning, record
//!   `HybridError::OptimizerNonConvergence`, and accept the best vertex. A
//!   backend failure falls back to the warm start with the same warning.
//! - Give trial points whose integration fails a large finite penalty;
//!   integration failure at the accepted solution is fatal.
//! - Process many trajectories in parallel with `rayon`
//!   ([`DiscrepancyEstimator::estimate_batch`]); intervals of one trajectory
//!   never run concurrently.
//!
//! Invariants & assumptions
//! ------------------------
//! - Output rows `0..n−1` hold the interval estimates; the final row's error
//!   channels are zero padding.
//! - Measured channels of the output are the observed values, unchanged.
use crate::{
    bioprocess::{
        core::{
            channels::{ErrorState, ExperimentId, MeasuredState},
            ode::OdeOptions,
            options::EstimatorOptions,
            params::KineticParams,
            propagate::propagate_interval,
            rates::RateLaw,
            report::BatchReport,
            trajectory::Trajectory,
            validation::to_error_state,
        },
        errors::{HybridError, HybridResult},
    },
    optimization::{
        errors::{OptError, OptResult},
        simplex_optimizer::{Cost, Objective, Theta, minimize},
    },
};
use log::{debug, trace, warn};
use ndarray::Array1;
use rayon::prelude::*;

/// Cost assigned to trial points whose interval integration fails.
pub const INTEGRATION_PENALTY: f64 = 1e12;

/// Observed transition for one interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalData {
    pub start: MeasuredState,
    pub target: MeasuredState,
    pub t0: f64,
    pub t1: f64,
}

/// Result of one interval estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalEstimate {
    pub interval: usize,
    /// Accepted constant errors; also the warm start for the next interval.
    pub errors: ErrorState,
    /// Objective value at `errors`.
    pub cost: f64,
    pub converged: bool,
    pub iterations: usize,
    /// `OptimizerNonConvergence` when the optimizer did not converge.
    pub warning: Option<HybridError>,
}

/// Full result of estimating one trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationOutcome {
    pub trajectory: Trajectory,
    pub intervals: Vec<IntervalEstimate>,
    pub warnings: Vec<HybridError>,
}

/// Relative squared deviation over the measured channels.
///
/// Channels with `|observed| < zero_floor` contribute `(observed − predicted)²`.
pub fn relative_squared_error(observed: &MeasuredState, predicted: &MeasuredState, zero_floor: f64) -> f64 {
    observed
        .iter()
        .zip(predicted.iter())
        .map(|(&obs, &pred)| {
            let denominator = if obs.abs() < zero_floor { 1.0 } else { obs };
            let r = (obs - pred) / denominator;
            r * r
        })
        .sum()
}

struct IntervalObjective<'a, L: RateLaw> {
    law: &'a L,
    ode: &'a OdeOptions,
    zero_floor: f64,
}

impl<'a, L: RateLaw> IntervalObjective<'a, L> {
    fn predict(&self, forcing: &ErrorState, data: &IntervalData) -> HybridResult<MeasuredState> {
        propagate_interval(self.law, &data.start, forcing, data.t0, data.t1, self.ode)
    }
}

impl<'a, L: RateLaw> Objective for IntervalObjective<'a, L> {
    type Data = IntervalData;

    fn value(&self, theta: &Theta, data: &IntervalData) -> OptResult<Cost> {
        let forcing = [theta[0], theta[1], theta[2]];
        match self.predict(&forcing, data) {
            Ok(predicted) => Ok(relative_squared_error(&data.target, &predicted, self.zero_floor)),
            Err(err) => {
                trace!("penalizing trial errors {forcing:?}: {err}");
                Ok(INTEGRATION_PENALTY)
            }
        }
    }

    fn check(&self, theta: &Theta, data: &IntervalData) -> OptResult<()> {
        if theta.len() != 3 {
            return Err(OptError::ObjectiveFailed {
                text: format!("expected 3 error terms, got {}", theta.len()),
            });
        }
        if data.t1 < data.t0 {
            return Err(OptError::ObjectiveFailed {
                text: format!("interval end {} precedes start {}", data.t1, data.t0),
            });
        }
        Ok(())
    }
}

/// DiscrepancyEstimator — per-interval constant-error back-solver.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscrepancyEstimator<L: RateLaw = KineticParams> {
    law: L,
    opts: EstimatorOptions,
}

impl<L: RateLaw> DiscrepancyEstimator<L> {
    pub fn new(law: L, opts: EstimatorOptions) -> Self {
        Self { law, opts }
    }

    pub fn options(&self) -> &EstimatorOptions {
        &self.opts
    }

    /// Estimate the constant errors of interval `interval` (rows `interval`
    /// and `interval + 1`), starting the search at `warm_start`.
    ///
    /// Errors
    /// ------
    /// - `HybridError::LengthMismatch` if the trajectory has no row
    ///   `interval + 1`.
    /// - `HybridError::IntegrationFailure` if integration fails at the
    ///   accepted solution.
    pub fn estimate_interval(
        &self, trajectory: &Trajectory, interval: usize, warm_start: ErrorState,
    ) -> HybridResult<IntervalEstimate> {
        if interval + 1 >= trajectory.len() {
            return Err(HybridError::LengthMismatch {
                expected: interval + 2,
                actual: trajectory.len(),
            });
        }
        let data = IntervalData {
            start: trajectory.measured(interval),
            target: trajectory.measured(interval + 1),
            t0: trajectory.time(interval),
            t1: trajectory.time(interval + 1),
        };
        let objective =
            IntervalObjective { law: &self.law, ode: &self.opts.ode, zero_floor: self.opts.zero_floor };
        let theta0 = Array1::from(warm_start.to_vec());

        let (errors, converged, iterations, warning) =
            match minimize(&objective, theta0, &data, &self.opts.simplex) {
                Ok(outcome) => {
                    let errors = to_error_state(&outcome.theta_hat)?;
                    let warning = (!outcome.converged).then(|| {
                        warn!(
                            "interval {interval}: optimizer stopped without converging ({}); accepting best vertex",
                            outcome.status
                        );
                        HybridError::OptimizerNonConvergence {
                            interval,
                            iterations: outcome.iterations,
                            status: outcome.status.clone(),
                        }
                    });
                    (errors, outcome.converged, outcome.iterations, warning)
                }
                Err(err) => {
                    warn!("interval {interval}: optimizer failed ({err}); keeping warm start");
                    let warning = HybridError::OptimizerNonConvergence {
                        interval,
                        iterations: 0,
                        status: err.to_string(),
                    };
                    (warm_start, false, 0, Some(warning))
                }
            };

        let predicted = objective.predict(&errors, &data)?;
        let cost = relative_squared_error(&data.target, &predicted, self.opts.zero_floor);
        trace!("interval {interval}: errors = {errors:?}, cost = {cost:.3e}");
        Ok(IntervalEstimate { interval, errors, cost, converged, iterations, warning })
    }

    /// Estimate every interval of `trajectory` and return the augmented
    /// trajectory.
    pub fn estimate(&self, trajectory: &Trajectory) -> HybridResult<Trajectory> {
        self.estimate_detailed(trajectory).map(|outcome| outcome.trajectory)
    }

    /// Like [`DiscrepancyEstimator::estimate`], also returning per-interval
    /// diagnostics and non-convergence warnings.
    pub fn estimate_detailed(&self, trajectory: &Trajectory) -> HybridResult<EstimationOutcome> {
        let n = trajectory.len();
        let mut rows: Vec<ErrorState> = vec![[0.0; 3]; n];
        let mut intervals = Vec::with_capacity(n.saturating_sub(1));
        let mut warnings = Vec::new();
        let mut guess = [0.0; 3];
        for i in 0..n.saturating_sub(1) {
            let estimate = self.estimate_interval(trajectory, i, guess)?;
            guess = estimate.errors;
            rows[i] = estimate.errors;
            if let Some(warning) = &estimate.warning {
                warnings.push(warning.clone());
            }
            intervals.push(estimate);
        }
        debug!("estimated {} intervals ({} warnings)", intervals.len(), warnings.len());
        Ok(EstimationOutcome { trajectory: trajectory.with_errors(&rows)?, intervals, warnings })
    }

    /// Estimate many trajectories in parallel.
    ///
    /// Failures are contained per trajectory; warnings are tagged with the
    /// experiment they came from. Output order follows the input order.
    pub fn estimate_batch(&self, trajectories: &[(ExperimentId, Trajectory)]) -> BatchReport<Trajectory>
    where
        L: Sync,
    {
        let results: Vec<(ExperimentId, HybridResult<EstimationOutcome>)> = trajectories
            .par_iter()
            .map(|(id, trajectory)| (id.clone(), self.estimate_detailed(trajectory)))
            .collect();

        let mut report = BatchReport::new();
        for (id, result) in results {
            match result {
                Ok(outcome) => {
                    report.warnings.extend(outcome.warnings.into_iter().map(|w| (id.clone(), w)));
                    report.outputs.push((id, outcome.trajectory));
                }
                Err(err) => {
                    warn!("experiment {id}: estimation failed ({err})");
                    report.failures.push((id, err));
                }
            }
        }
        report
    }
}
