//! Mechanistic-only kinetic model.
//!
//! Purpose
//! -------
//! Integrate the clean mechanistic rate law (no error injection, no
//! clipping) across a time grid, and produce the no-learning multi-step
//! baseline used for comparison against the hybrid model.
//!
//! Key behaviors
//! -------------
//! - [`KineticModel::simulate`] integrates from an initial measured state
//!   over a strictly increasing grid; a single-point grid returns the initial
//!   state unchanged.
//! - [`KineticModel::simulate_baseline`] starts from a trajectory's first
//!   measured state and integrates over either the observed time stamps or a
//!   uniform `BASELINE_RESOLUTION`-point grid spanning the observations.
//!
//! Invariants & assumptions
//! ------------------------
//! - The model is stateless and deterministic given its rate law and
//!   solver options.
//! - Output trajectories carry zero error channels.
use crate::bioprocess::{
    core::{
        channels::{MeasuredState, N_CHANNELS},
        ode::{OdeOptions, integrate_grid},
        params::KineticParams,
        propagate::{MechanisticKinetics, to_measured},
        rates::RateLaw,
        trajectory::{Trajectory, state_row},
        validation::{validate_state, validate_time_grid},
    },
    errors::HybridResult,
};
use ndarray::Array2;

/// Number of points in the high-resolution baseline grid.
pub const BASELINE_RESOLUTION: usize = 100;

/// Clean mechanistic simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct KineticModel<L: RateLaw = KineticParams> {
    law: L,
    ode: OdeOptions,
}

impl<L: RateLaw> KineticModel<L> {
    pub fn new(law: L, ode: OdeOptions) -> Self {
        Self { law, ode }
    }

    pub fn law(&self) -> &L {
        &self.law
    }

    pub fn ode_options(&self) -> &OdeOptions {
        &self.ode
    }

    /// Integrate the mechanistic model over `time_grid`.
    ///
    /// Parameters
    /// ----------
    /// - `initial_state`: measured state `[CX, CS, CP]` at `time_grid[0]`.
    /// - `time_grid`: strictly increasing, finite, length ≥ 1.
    ///
    /// Returns
    /// -------
    /// Trajectory with one row per grid point and zero error channels.
    ///
    /// Errors
    /// ------
    /// - `HybridError::EmptyTimeGrid` / `InvalidTimeGrid` for a bad grid.
    /// - `HybridError::NonFiniteEntry` for a non-finite initial state.
    /// - `HybridError::IntegrationFailure` if the solver diverges.
    pub fn simulate(&self, initial_state: &MeasuredState, time_grid: &[f64]) -> HybridResult<Trajectory> {
        validate_time_grid(time_grid)?;
        validate_state(initial_state)?;
        self.integrate(initial_state, time_grid)
    }

    /// Mechanistic multi-step-ahead baseline for an observed trajectory.
    ///
    /// With `high_resolution` the grid has `BASELINE_RESOLUTION` uniformly
    /// spaced points between the first and last observed time; otherwise the
    /// observed time stamps are reused. A trajectory whose first and last
    /// time coincide yields the initial state only.
    ///
    /// Errors
    /// ------
    /// - `HybridError::IntegrationFailure` if the solver diverges.
    pub fn simulate_baseline(&self, trajectory: &Trajectory, high_resolution: bool) -> HybridResult<Trajectory> {
        let initial = trajectory.measured(0);
        let first = trajectory.time(0);
        let last = trajectory.time(trajectory.len() - 1);
        if last == first {
            return self.integrate(&initial, &[first]);
        }
        let grid: Vec<f64> = if high_resolution {
            uniform_grid(first, last, BASELINE_RESOLUTION)
        } else {
            trajectory.times().to_vec()
        };
        self.integrate(&initial, &grid)
    }

    // Grid may repeat time stamps (observed grids are only non-decreasing).
    fn integrate(&self, initial_state: &MeasuredState, grid: &[f64]) -> HybridResult<Trajectory> {
        let sys = MechanisticKinetics { law: &self.law };
        let states = integrate_grid(&sys, initial_state, grid, &self.ode)?;
        let mut data = Array2::zeros((grid.len(), N_CHANNELS));
        for (i, (state, &t)) in states.iter().zip(grid.iter()).enumerate() {
            let measured = to_measured(state, t)?;
            data.row_mut(i).assign(&state_row(t, &measured, &[0.0; 3]));
        }
        Trajectory::new(data)
    }
}

// ---- Helper Methods ----

fn uniform_grid(first: f64, last: f64, points: usize) -> Vec<f64> {
    let step = (last - first) / (points - 1) as f64;
    (0..points).map(|i| if i + 1 == points { last } else { first + step * i as f64 }).collect()
}
