//! Public API surface for derivative-free minimization.
//!
//! - [`Objective`]: trait users implement for the function to minimize.
//! - [`SimplexOptions`] and [`Tolerances`]: configuration for the optimizer.
//! - [`OptimOutcome`]: normalized result returned by the high-level `minimize` API.
//!
//! Convention: the optimizer *minimizes* `c(θ)` directly. No gradient is ever
//! requested from the user.
use crate::optimization::{
    errors::{OptError, OptResult},
    simplex_optimizer::{
        Cost, FnEvalMap, Theta,
        types::{DEFAULT_NONZERO_STEP, DEFAULT_ZERO_STEP},
        validation::{validate_theta_hat, validate_value, verify_simplex_step, verify_sd_tol},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};

/// User-implemented objective interface.
///
/// - `type Data`: per-problem data carried into `value`/`check`.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `c(θ)`.
///   - Errors: return a descriptive `OptError` for invalid inputs or model failures.
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook to reject
///   obviously invalid `θ`/`data` pairs. Called once before optimization.
pub trait Objective {
    type Data;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols: Tolerances` — simplex spread tolerance and iteration cap.
/// - `verbose: bool` — if `true`, attaches an observer (behind the `obs_slog`
///   feature) and prints progress.
/// - `nonzero_step` — relative perturbation for building the initial simplex
///   around a non-zero coordinate.
/// - `zero_step` — absolute offset for coordinates that are exactly zero.
///
/// Default:
/// - `tols`: `sd_tolerance = 1e-4`, `max_iter = 600`
/// - `verbose`: `false`
/// - `nonzero_step = 0.05`, `zero_step = 0.00025`
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexOptions {
    pub tols: Tolerances,
    pub verbose: bool,
    pub nonzero_step: f64,
    pub zero_step: f64,
}

impl SimplexOptions {
    /// Create a new set of optimizer options.
    ///
    /// # Errors
    /// - [`OptError::InvalidSimplexStep`] if either step is non-finite or ≤ 0.
    pub fn new(
        tols: Tolerances, verbose: bool, nonzero_step: f64, zero_step: f64,
    ) -> OptResult<Self> {
        verify_simplex_step(nonzero_step)?;
        verify_simplex_step(zero_step)?;
        Ok(Self { tols, verbose, nonzero_step, zero_step })
    }
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { sd_tolerance: Some(1e-4), max_iter: Some(600) },
            verbose: false,
            nonzero_step: DEFAULT_NONZERO_STEP,
            zero_step: DEFAULT_ZERO_STEP,
        }
    }
}

/// Numerical tolerances and iteration limits used by the optimizer.
///
/// - `sd_tolerance`: terminate when the standard deviation of the cost over
///   the simplex vertices falls below this threshold.
/// - `max_iter`: hard cap on the number of iterations.
///
/// Either field can be `None` but **at least one** must be provided
/// (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub sd_tolerance: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Rules
    /// - At least one of `sd_tolerance` or `max_iter` must be `Some`.
    /// - If provided, `sd_tolerance` must be **finite and strictly positive**.
    /// - If provided, `max_iter` must be `> 0`.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if both are `None`.
    /// - [`OptError::InvalidSdTolerance`] for non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(sd_tolerance: Option<f64>, max_iter: Option<usize>) -> OptResult<Self> {
        if sd_tolerance.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_sd_tol(sd_tolerance)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { sd_tolerance, max_iter })
    }
}

/// Canonical result returned by `minimize`.
///
/// - `theta_hat`: best vertex found.
/// - `value`: objective value at `theta_hat`.
/// - `converged`: `true` if the solver stopped on its own tolerance rather
///   than by hitting the iteration cap.
/// - `status`: human-readable termination status string.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// Performs:
    /// - `theta_hat` check via `validate_theta_hat` (present and all finite).
    /// - `value` check via `validate_value` (finite).
    /// - Maps `TerminationStatus` into `(converged, status)`; hitting the
    ///   iteration cap (or never terminating) counts as not converged.
    ///
    /// # Errors
    /// - Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let converged = match &termination {
            TerminationStatus::NotTerminated => false,
            TerminationStatus::Terminated(TerminationReason::MaxItersReached) => false,
            TerminationStatus::Terminated(_) => true,
        };
        let status = match &termination {
            TerminationStatus::NotTerminated => "Not terminated".to_string(),
            _ => format!("{termination:?}"),
        };
        let iterations = iterations as usize;
        Ok(Self { theta_hat, value, converged, status, iterations, fn_evals })
    }
}
