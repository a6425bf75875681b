//! High-level entry point for minimizing a user-provided `Objective`.
//!
//! Builds the initial simplex around the starting vector, wraps the objective
//! in an `ArgMinAdapter`, and delegates the run to `run_nelder_mead`.
use crate::optimization::{
    errors::OptResult,
    simplex_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::build_simplex_solver,
        run::run_nelder_mead,
        traits::{Objective, SimplexOptions},
        validation::validate_theta0,
    },
};

/// Minimize an objective `c(θ)` using the Nelder–Mead simplex method.
///
/// # Behavior
/// - Validates the starting vector (non-empty, finite).
/// - Validates the initial guess against the data via `f.check(theta0, data)`.
/// - Builds the initial simplex and solver from `opts`.
/// - Calls `run_nelder_mead`, which applies the iteration cap and returns an
///   `OptimOutcome`.
///
/// # Errors
/// - Propagates any error from `validate_theta0` or `f.check`.
/// - Propagates builder errors from `build_simplex_solver`.
/// - Propagates runtime errors from `run_nelder_mead` (e.g., objective errors).
///
/// # Returns
/// An [`OptimOutcome`] whose `converged` flag is `false` when the iteration
/// cap stopped the run; callers decide whether that is fatal.
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use hybrid_kinetics::optimization::errors::OptResult;
/// use hybrid_kinetics::optimization::simplex_optimizer::{
///     minimize, Objective, SimplexOptions, Theta,
/// };
///
/// struct Bowl;
/// impl Objective for Bowl {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = minimize(&Bowl, array![0.5, -0.2], &(), &SimplexOptions::default())?;
/// println!("θ̂ = {:?}", out.theta_hat);
/// # Ok::<(), hybrid_kinetics::optimization::errors::OptError>(())
/// ```
pub fn minimize<F: Objective>(
    f: &F, theta0: Theta, data: &F::Data, opts: &SimplexOptions,
) -> OptResult<OptimOutcome> {
    validate_theta0(&theta0)?;
    f.check(&theta0, data)?;
    let solver = build_simplex_solver(&theta0, opts)?;
    let problem = ArgMinAdapter::new(f, data);
    run_nelder_mead(&theta0, opts, problem, solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::{OptError, OptResult},
        simplex_optimizer::traits::Tolerances,
    };
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - End-to-end minimization of smooth toy objectives.
    // - Reporting of non-convergence when the iteration cap is hit.
    // - Propagation of `check` failures.
    // -------------------------------------------------------------------------

    struct ShiftedBowl;

    impl Objective for ShiftedBowl {
        type Data = Theta;

        fn value(&self, theta: &Theta, center: &Theta) -> OptResult<f64> {
            Ok((theta - center).mapv(|d| d * d).sum())
        }

        fn check(&self, theta: &Theta, center: &Theta) -> OptResult<()> {
            if theta.len() != center.len() {
                return Err(OptError::ObjectiveFailed { text: "length mismatch".to_string() });
            }
            Ok(())
        }
    }

    struct Rosenbrock;

    impl Objective for Rosenbrock {
        type Data = ();

        fn value(&self, theta: &Theta, _data: &()) -> OptResult<f64> {
            let (x, y) = (theta[0], theta[1]);
            Ok((1.0 - x).powi(2) + 100.0 * (y - x * x).powi(2))
        }

        fn check(&self, _theta: &Theta, _data: &()) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // Minimizing a shifted quadratic bowl recovers its center.
    //
    // Given
    // -----
    // - Center `[1.5, -0.5, 3.0]`, start at zero.
    // - Tight spread tolerance and a generous iteration cap.
    //
    // Expect
    // ------
    // - `converged == true` and `theta_hat` within 1e-3 of the center.
    fn minimize_recovers_quadratic_center() {
        // Arrange
        let center = array![1.5, -0.5, 3.0];
        let tols = Tolerances::new(Some(1e-14), Some(5_000)).expect("valid tolerances");
        let opts = SimplexOptions { tols, ..SimplexOptions::default() };

        // Act
        let out = minimize(&ShiftedBowl, Theta::zeros(3), &center, &opts)
            .expect("minimization should succeed");

        // Assert
        assert!(out.converged, "status: {}", out.status);
        for (est, truth) in out.theta_hat.iter().zip(center.iter()) {
            assert_abs_diff_eq!(*est, *truth, epsilon = 1e-3);
        }
    }

    #[test]
    // Purpose
    // -------
    // A tiny iteration cap on a curved valley is reported as
    // non-convergence, while the best vertex seen so far is still returned.
    fn minimize_reports_iteration_cap_as_not_converged() {
        // Arrange
        let tols = Tolerances::new(Some(1e-14), Some(3)).expect("valid tolerances");
        let opts = SimplexOptions { tols, ..SimplexOptions::default() };
        let start = array![-1.2, 1.0];
        let start_cost = Rosenbrock.value(&start, &()).expect("finite");

        // Act
        let out = minimize(&Rosenbrock, start, &(), &opts).expect("run should complete");

        // Assert
        assert!(!out.converged);
        assert_eq!(out.iterations, 3);
        assert!(out.value <= start_cost);
    }

    #[test]
    fn minimize_propagates_check_failure() {
        let center = array![1.0, 2.0];

        let result =
            minimize(&ShiftedBowl, Theta::zeros(3), &center, &SimplexOptions::default());

        assert!(matches!(result, Err(OptError::ObjectiveFailed { .. })));
    }
}
