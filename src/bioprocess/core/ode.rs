//! Adaptive explicit ODE integration for the mechanistic core.
//!
//! Purpose
//! -------
//! Integrate small non-stiff systems `dy/dt = f(t, y)` between grid points
//! with a Dormand–Prince 4(5) pair and a step-size controller. Every interval
//! propagation in the crate (clean kinetics, error-forced kinetics) goes
//! through [`rk45`] or [`integrate_grid`].
//!
//! Key behaviors
//! -------------
//! - Advance with the 5th-order solution (local extrapolation) and use the
//!   embedded 4th-order solution for the error estimate.
//! - Reuse the last stage as the first stage of the next step (FSAL).
//! - Report divergence instead of returning non-finite values: exceeding
//!   `max_steps`, shrinking the step below `h_min`, or producing a non-finite
//!   state all surface as `HybridError::IntegrationFailure`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `t1 ≥ t0`; a zero-length span returns `y0` unchanged.
//! - Grids passed to [`integrate_grid`] are finite and non-decreasing;
//!   repeated time stamps copy the previous state.
//!
//! Conventions
//! -----------
//! - The error norm is the RMS of `e_i / (atol + rtol · max(|y_i|, |y_new_i|))`;
//!   a step is accepted when the norm is ≤ 1.
use crate::bioprocess::errors::{HybridError, HybridResult};

/// Right-hand side of an ODE system `dy/dt = f(t, y)`.
pub trait OdeSystem {
    /// Number of state variables.
    fn ndim(&self) -> usize;

    /// Evaluate `f(t, y)` into `dydt`; both slices have length `ndim()`.
    fn rhs(&self, t: f64, y: &[f64], dydt: &mut [f64]);
}

/// Configuration for the adaptive solver.
///
/// Default:
/// - `rtol = 1e-8`, `atol = 1e-10`
/// - `h_min = 1e-14`
/// - `max_steps = 100_000` (per call to [`rk45`])
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OdeOptions {
    pub rtol: f64,
    pub atol: f64,
    pub h_min: f64,
    pub max_steps: usize,
}

impl OdeOptions {
    /// Construct validated solver options.
    ///
    /// # Errors
    /// - [`HybridError::InvalidOdeOption`] if a tolerance or `h_min` is
    ///   non-finite or ≤ 0, or if `max_steps == 0`.
    pub fn new(rtol: f64, atol: f64, h_min: f64, max_steps: usize) -> HybridResult<Self> {
        validate_positive("rtol", rtol)?;
        validate_positive("atol", atol)?;
        validate_positive("h_min", h_min)?;
        if max_steps == 0 {
            return Err(HybridError::InvalidOdeOption {
                name: "max_steps",
                value: 0.0,
                reason: "Maximum steps must be greater than zero.",
            });
        }
        Ok(Self { rtol, atol, h_min, max_steps })
    }

    fn initial_step(&self, span: f64) -> f64 {
        (span * 1e-3).max(self.h_min).min(span)
    }
}

impl Default for OdeOptions {
    fn default() -> Self {
        Self { rtol: 1e-8, atol: 1e-10, h_min: 1e-14, max_steps: 100_000 }
    }
}

// Dormand–Prince tableau.
const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights (advancing solution).
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// y5 - y4 error weights.
const E1: f64 = B1 - 5179.0 / 57600.0;
const E3: f64 = B3 - 7571.0 / 16695.0;
const E4: f64 = B4 - 393.0 / 640.0;
const E5: f64 = B5 - (-92097.0 / 339200.0);
const E6: f64 = B6 - 187.0 / 2100.0;
const E7: f64 = -1.0 / 40.0;

/// Integrate `sys` from `t0` to `t1` and return the state at `t1`.
///
/// Parameters
/// ----------
/// - `sys`: system right-hand side.
/// - `y0`: initial state of length `sys.ndim()`.
/// - `t0`, `t1`: finite interval bounds with `t1 ≥ t0`.
/// - `opts`: tolerances and step limits.
///
/// Errors
/// ------
/// - `HybridError::LengthMismatch` if `y0.len() != sys.ndim()`.
/// - `HybridError::InvalidTimeGrid` if the bounds are non-finite or reversed.
/// - `HybridError::IntegrationFailure` on step underflow, a non-finite state,
///   or when `max_steps` is exhausted before reaching `t1`.
pub fn rk45<S: OdeSystem>(sys: &S, y0: &[f64], t0: f64, t1: f64, opts: &OdeOptions) -> HybridResult<Vec<f64>> {
    let n = sys.ndim();
    if y0.len() != n {
        return Err(HybridError::LengthMismatch { expected: n, actual: y0.len() });
    }
    if !t0.is_finite() || !t1.is_finite() || t1 < t0 {
        return Err(HybridError::InvalidTimeGrid { index: 1, previous: t0, current: t1 });
    }
    if let Some(value) = y0.iter().find(|v| !v.is_finite()) {
        return Err(HybridError::IntegrationFailure {
            time: t0,
            reason: format!("initial state is non-finite ({value})"),
        });
    }
    let span = t1 - t0;
    if span == 0.0 {
        return Ok(y0.to_vec());
    }

    let mut t = t0;
    let mut y = y0.to_vec();
    let mut h = opts.initial_step(span);

    let mut k1 = vec![0.0; n];
    let mut k2 = vec![0.0; n];
    let mut k3 = vec![0.0; n];
    let mut k4 = vec![0.0; n];
    let mut k5 = vec![0.0; n];
    let mut k6 = vec![0.0; n];
    let mut k7 = vec![0.0; n];
    let mut y_tmp = vec![0.0; n];
    let mut y_new = vec![0.0; n];

    sys.rhs(t, &y, &mut k1);

    for _ in 0..opts.max_steps {
        if t >= t1 {
            break;
        }
        let remaining = t1 - t;
        let last = h >= remaining;
        if last {
            h = remaining;
        }

        for i in 0..n {
            y_tmp[i] = y[i] + h * A21 * k1[i];
        }
        sys.rhs(t + h / 5.0, &y_tmp, &mut k2);

        for i in 0..n {
            y_tmp[i] = y[i] + h * (A31 * k1[i] + A32 * k2[i]);
        }
        sys.rhs(t + 3.0 * h / 10.0, &y_tmp, &mut k3);

        for i in 0..n {
            y_tmp[i] = y[i] + h * (A41 * k1[i] + A42 * k2[i] + A43 * k3[i]);
        }
        sys.rhs(t + 4.0 * h / 5.0, &y_tmp, &mut k4);

        for i in 0..n {
            y_tmp[i] = y[i] + h * (A51 * k1[i] + A52 * k2[i] + A53 * k3[i] + A54 * k4[i]);
        }
        sys.rhs(t + 8.0 * h / 9.0, &y_tmp, &mut k5);

        for i in 0..n {
            y_tmp[i] =
                y[i] + h * (A61 * k1[i] + A62 * k2[i] + A63 * k3[i] + A64 * k4[i] + A65 * k5[i]);
        }
        sys.rhs(t + h, &y_tmp, &mut k6);

        for i in 0..n {
            y_new[i] = y[i] + h * (B1 * k1[i] + B3 * k3[i] + B4 * k4[i] + B5 * k5[i] + B6 * k6[i]);
        }
        sys.rhs(t + h, &y_new, &mut k7);

        let mut err_norm = 0.0;
        for i in 0..n {
            let ei =
                h * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i] + E7 * k7[i]);
            let sc = opts.atol + opts.rtol * y[i].abs().max(y_new[i].abs());
            err_norm += (ei / sc) * (ei / sc);
        }
        err_norm = (err_norm / n as f64).sqrt();

        if !err_norm.is_finite() {
            if h <= opts.h_min {
                return Err(HybridError::IntegrationFailure {
                    time: t,
                    reason: "state became non-finite".to_string(),
                });
            }
            h = (h * 0.2).max(opts.h_min);
            continue;
        }

        if err_norm <= 1.0 {
            t = if last { t1 } else { t + h };
            y.copy_from_slice(&y_new);
            k1.copy_from_slice(&k7);
            if t >= t1 {
                break;
            }
        } else if h <= opts.h_min {
            return Err(HybridError::IntegrationFailure {
                time: t,
                reason: format!("step size underflow (h = {h:.3e}, error norm = {err_norm:.3e})"),
            });
        }

        let factor = if err_norm == 0.0 { 5.0 } else { (0.9 * err_norm.powf(-0.2)).clamp(0.2, 5.0) };
        h = (h * factor).max(opts.h_min);
    }

    if t < t1 {
        return Err(HybridError::IntegrationFailure {
            time: t,
            reason: format!("exceeded max_steps = {} before reaching t = {t1:.6e}", opts.max_steps),
        });
    }
    Ok(y)
}

/// Integrate `sys` across a non-decreasing grid, returning the state at every
/// grid point (the first entry is `y0`).
///
/// Errors
/// ------
/// - `HybridError::EmptyTimeGrid` for an empty grid.
/// - Any error from [`rk45`] on the first failing interval.
pub fn integrate_grid<S: OdeSystem>(
    sys: &S, y0: &[f64], grid: &[f64], opts: &OdeOptions,
) -> HybridResult<Vec<Vec<f64>>> {
    let Some((&first, rest)) = grid.split_first() else {
        return Err(HybridError::EmptyTimeGrid);
    };
    let mut states = Vec::with_capacity(grid.len());
    states.push(y0.to_vec());
    let mut t_prev = first;
    for &t_next in rest {
        let next = match states.last() {
            Some(current) => rk45(sys, current, t_prev, t_next, opts)?,
            None => return Err(HybridError::EmptyTimeGrid),
        };
        states.push(next);
        t_prev = t_next;
    }
    Ok(states)
}

// ---- Helper Methods ----

fn validate_positive(name: &'static str, value: f64) -> HybridResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(HybridError::InvalidOdeOption {
            name,
            value,
            reason: "Value must be finite and > 0.",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Decay {
        rate: f64,
    }

    impl OdeSystem for Decay {
        fn ndim(&self) -> usize {
            1
        }

        fn rhs(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
            dydt[0] = -self.rate * y[0];
        }
    }

    struct Oscillator;

    impl OdeSystem for Oscillator {
        fn ndim(&self) -> usize {
            2
        }

        fn rhs(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
            dydt[0] = y[1];
            dydt[1] = -y[0];
        }
    }

    struct Blowup;

    impl OdeSystem for Blowup {
        fn ndim(&self) -> usize {
            1
        }

        fn rhs(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
            dydt[0] = y[0] * y[0];
        }
    }

    #[test]
    // Purpose
    // -------
    // Exponential decay is integrated to the default tolerances.
    //
    // Given
    // -----
    // - dy/dt = -0.7 y, y(0) = 2, integrate to t = 3.
    //
    // Expect
    // ------
    // - y(3) = 2 exp(-2.1) within 1e-7 relative.
    fn rk45_matches_exponential_decay() {
        // Arrange
        let sys = Decay { rate: 0.7 };

        // Act
        let y = rk45(&sys, &[2.0], 0.0, 3.0, &OdeOptions::default()).expect("integrates");

        // Assert
        assert_relative_eq!(y[0], 2.0 * (-2.1f64).exp(), max_relative = 1e-7);
    }

    #[test]
    fn integrate_grid_returns_state_per_grid_point() {
        let grid = [0.0, 0.5, 0.5, std::f64::consts::PI];

        let states =
            integrate_grid(&Oscillator, &[1.0, 0.0], &grid, &OdeOptions::default()).expect("ok");

        assert_eq!(states.len(), 4);
        assert_eq!(states[0], vec![1.0, 0.0]);
        assert_eq!(states[1], states[2]);
        assert_relative_eq!(states[3][0], -1.0, epsilon = 1e-7);
        assert_relative_eq!(states[3][1], 0.0, epsilon = 1e-7);
    }

    #[test]
    fn zero_span_returns_initial_state() {
        let y = rk45(&Decay { rate: 1.0 }, &[4.0], 1.0, 1.0, &OdeOptions::default()).expect("ok");

        assert_eq!(y, vec![4.0]);
    }

    #[test]
    // Purpose
    // -------
    // A finite-time blow-up (y' = y², y(0) = 1 explodes at t = 1) is reported
    // as an integration failure, never as a non-finite value.
    fn finite_time_blowup_is_integration_failure() {
        let result = rk45(&Blowup, &[1.0], 0.0, 2.0, &OdeOptions::default());

        assert!(matches!(result, Err(HybridError::IntegrationFailure { .. })));
    }

    #[test]
    fn step_cap_is_integration_failure() {
        let opts = OdeOptions::new(1e-12, 1e-14, 1e-14, 3).expect("valid options");

        let result = rk45(&Oscillator, &[1.0, 0.0], 0.0, 100.0, &opts);

        assert!(matches!(result, Err(HybridError::IntegrationFailure { .. })));
    }

    #[test]
    fn options_reject_invalid_values() {
        assert!(OdeOptions::new(0.0, 1e-10, 1e-14, 10).is_err());
        assert!(OdeOptions::new(1e-8, f64::NAN, 1e-14, 10).is_err());
        assert!(OdeOptions::new(1e-8, 1e-10, 1e-14, 0).is_err());
        assert!(OdeOptions::new(1e-8, 1e-10, 1e-14, 10).is_ok());
    }

    #[test]
    fn empty_grid_is_rejected() {
        let result = integrate_grid(&Decay { rate: 1.0 }, &[1.0], &[], &OdeOptions::default());

        assert_eq!(result, Err(HybridError::EmptyTimeGrid));
    }
}
