//! propagate — one-interval integration of the measured channels.
//!
//! Purpose
//! -------
//! Provide the single integration routine shared by the discrepancy
//! estimator (inside its objective) and the hybrid simulator (once per
//! realization and step), plus the clean mechanistic system used by the
//! kinetic model.
//!
//! Key behaviors
//! -------------
//! - [`ForcedKinetics`] adds a constant error vector to the mechanistic rates:
//!   `dX = eX + fX`, `dS = min(0, eS + fS)`, `dP = eP + fP`. The substrate
//!   clip keeps the model from producing substrate.
//! - [`MechanisticKinetics`] integrates the bare rate law with no forcing and
//!   no clipping.
//! - [`propagate_interval`] integrates a forced system from `t0` to `t1` and
//!   returns the measured state at `t1`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The forcing is constant within an interval.
//! - Integration failures are returned as `HybridError::IntegrationFailure`;
//!   callers decide whether they are fatal.
use crate::bioprocess::{
    core::{
        channels::{ErrorState, MeasuredState, N_MEASURED},
        ode::{OdeOptions, OdeSystem, rk45},
        rates::RateLaw,
    },
    errors::{HybridError, HybridResult},
};

/// Mechanistic rates with a constant additive error forcing.
#[derive(Debug, Clone, Copy)]
pub struct ForcedKinetics<'a, L: RateLaw> {
    pub law: &'a L,
    pub forcing: ErrorState,
}

impl<'a, L: RateLaw> OdeSystem for ForcedKinetics<'a, L> {
    fn ndim(&self) -> usize {
        N_MEASURED
    }

    fn rhs(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        let [fx, fs, fp] = self.law.rates(&[y[0], y[1], y[2]]);
        let [ex, es, ep] = self.forcing;
        dydt[0] = ex + fx;
        dydt[1] = (es + fs).min(0.0);
        dydt[2] = ep + fp;
    }
}

/// Bare mechanistic rates.
#[derive(Debug, Clone, Copy)]
pub struct MechanisticKinetics<'a, L: RateLaw> {
    pub law: &'a L,
}

impl<'a, L: RateLaw> OdeSystem for MechanisticKinetics<'a, L> {
    fn ndim(&self) -> usize {
        N_MEASURED
    }

    fn rhs(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        let rates = self.law.rates(&[y[0], y[1], y[2]]);
        dydt.copy_from_slice(&rates);
    }
}

/// Integrate the error-forced kinetics over `[t0, t1]`.
///
/// Parameters
/// ----------
/// - `law`: mechanistic rate law.
/// - `start`: measured state at `t0`.
/// - `forcing`: constant error vector `[eX, eS, eP]` for the interval.
/// - `t0`, `t1`: interval bounds, `t1 ≥ t0`.
/// - `opts`: solver options.
///
/// Returns
/// -------
/// Measured state at `t1`. A zero-length interval returns `start`.
///
/// Errors
/// ------
/// - `HybridError::IntegrationFailure` if the solver diverges.
/// - `HybridError::InvalidTimeGrid` if `t1 < t0`.
pub fn propagate_interval<L: RateLaw>(
    law: &L, start: &MeasuredState, forcing: &ErrorState, t0: f64, t1: f64, opts: &OdeOptions,
) -> HybridResult<MeasuredState> {
    let sys = ForcedKinetics { law, forcing: *forcing };
    let end = rk45(&sys, start, t0, t1, opts)?;
    to_measured(&end, t1)
}

pub(crate) fn to_measured(values: &[f64], time: f64) -> HybridResult<MeasuredState> {
    match values {
        [x, s, p] if x.is_finite() && s.is_finite() && p.is_finite() => Ok([*x, *s, *p]),
        [_, _, _] => Err(HybridError::IntegrationFailure {
            time,
            reason: "integrated state is non-finite".to_string(),
        }),
        _ => Err(HybridError::LengthMismatch { expected: N_MEASURED, actual: values.len() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bioprocess::core::params::KineticParams;
    use approx::assert_relative_eq;

    // Linear test law: every rate is a fixed constant.
    struct ConstantRates([f64; 3]);

    impl RateLaw for ConstantRates {
        fn rates(&self, _state: &MeasuredState) -> MeasuredState {
            self.0
        }
    }

    #[test]
    // Purpose
    // -------
    // Constant forcing adds linearly to constant mechanistic rates.
    //
    // Given
    // -----
    // - Rates [0.5, -1.0, 0.2], forcing [0.1, -0.5, 0.3], interval [0, 2].
    //
    // Expect
    // ------
    // - end = start + 2 · (rates + forcing).
    fn forcing_adds_to_mechanistic_rates() {
        // Arrange
        let law = ConstantRates([0.5, -1.0, 0.2]);
        let start = [1.0, 10.0, 0.0];

        // Act
        let end = propagate_interval(&law, &start, &[0.1, -0.5, 0.3], 0.0, 2.0, &OdeOptions::default())
            .expect("integrates");

        // Assert
        assert_relative_eq!(end[0], 2.2, epsilon = 1e-10);
        assert_relative_eq!(end[1], 7.0, epsilon = 1e-10);
        assert_relative_eq!(end[2], 1.0, epsilon = 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // A positive substrate error large enough to overturn consumption is
    // clipped so the substrate never increases.
    fn substrate_rate_is_clipped_at_zero() {
        let law = ConstantRates([0.0, -1.0, 0.0]);

        let end = propagate_interval(&law, &[1.0, 5.0, 0.0], &[0.0, 3.0, 0.0], 0.0, 1.0, &OdeOptions::default())
            .expect("integrates");

        assert_relative_eq!(end[1], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_forcing_on_contois_matches_mechanistic_system() {
        let params = KineticParams::new(0.4, 1.5, 0.5, 0.05).expect("valid");
        let opts = OdeOptions::default();
        let start = [0.5, 20.0, 0.0];

        let forced = propagate_interval(&params, &start, &[0.0; 3], 0.0, 5.0, &opts).expect("ok");
        let clean = rk45(&MechanisticKinetics { law: &params }, &start, 0.0, 5.0, &opts).expect("ok");

        for k in 0..3 {
            assert_relative_eq!(forced[k], clean[k], max_relative = 1e-9);
        }
    }
}
