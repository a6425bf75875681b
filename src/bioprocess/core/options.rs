//! Estimation and ensemble options.
//!
//! Purpose
//! -------
//! Collect the configuration knobs for discrepancy estimation and ensemble
//! prediction in one place so call sites pass explicit, validated values
//! instead of ad-hoc arguments.
//!
//! Key behaviors
//! -------------
//! - [`EstimatorOptions`] bundles the simplex optimizer settings, the ODE
//!   solver settings used inside the objective, and the zero-observation
//!   floor of the relative-error objective.
//! - [`EnsembleOptions`] carries the Monte Carlo ensemble size and the trim
//!   fraction that sets the band size `k = ensemble_size / trim_fraction`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Component options (`SimplexOptions`, `OdeOptions`) are validated by
//!   their own constructors; these types only check their own fields.
//! - `trim_fraction ≥ 1`; `ensemble_size` may be zero.
use crate::{
    bioprocess::{
        core::ode::OdeOptions,
        errors::{HybridError, HybridResult},
    },
    optimization::simplex_optimizer::{SimplexOptions, Tolerances},
};

/// Default relative-error floor below which an observation counts as zero.
pub const DEFAULT_ZERO_FLOOR: f64 = 1e-12;

/// Default simplex cost-spread tolerance for interval estimation.
pub const DEFAULT_ESTIMATOR_SD_TOLERANCE: f64 = 1e-12;

/// Default iteration cap for interval estimation.
pub const DEFAULT_ESTIMATOR_MAX_ITER: usize = 2000;

/// Default number of stochastic realizations.
pub const DEFAULT_ENSEMBLE_SIZE: usize = 500;

/// Default trim fraction (bands average the outer tenth).
pub const DEFAULT_TRIM_FRACTION: usize = 10;

/// EstimatorOptions — configuration for per-interval discrepancy estimation.
///
/// Fields
/// ------
/// - `simplex`: [`SimplexOptions`]
///   Nelder–Mead tolerances, iteration cap and initial simplex steps.
/// - `ode`: [`OdeOptions`]
///   Solver settings for the interval integrations inside the objective.
/// - `zero_floor`: `f64`
///   Observations with `|obs| < zero_floor` contribute an absolute squared
///   deviation instead of a relative one.
///
/// Default
/// -------
/// `SimplexOptions::default()` with the tolerances replaced by
/// `sd_tolerance = DEFAULT_ESTIMATOR_SD_TOLERANCE` and
/// `max_iter = DEFAULT_ESTIMATOR_MAX_ITER`, `OdeOptions::default()`,
/// `zero_floor = 1e-12`.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorOptions {
    pub simplex: SimplexOptions,
    pub ode: OdeOptions,
    pub zero_floor: f64,
}

impl EstimatorOptions {
    /// Construct estimator options from validated components.
    ///
    /// Errors
    /// ------
    /// - `HybridError::InvalidZeroFloor` if `zero_floor` is non-finite or
    ///   negative.
    pub fn new(simplex: SimplexOptions, ode: OdeOptions, zero_floor: f64) -> HybridResult<Self> {
        if !zero_floor.is_finite() || zero_floor < 0.0 {
            return Err(HybridError::InvalidZeroFloor { value: zero_floor });
        }
        Ok(Self { simplex, ode, zero_floor })
    }
}

impl Default for EstimatorOptions {
    fn default() -> Self {
        Self {
            simplex: SimplexOptions {
                tols: Tolerances {
                    sd_tolerance: Some(DEFAULT_ESTIMATOR_SD_TOLERANCE),
                    max_iter: Some(DEFAULT_ESTIMATOR_MAX_ITER),
                },
                ..SimplexOptions::default()
            },
            ode: OdeOptions::default(),
            zero_floor: DEFAULT_ZERO_FLOOR,
        }
    }
}

/// Monte Carlo ensemble configuration.
///
/// `ensemble_size` counts stochastic realizations only; the deterministic
/// realization is always added on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsembleOptions {
    pub ensemble_size: usize,
    pub trim_fraction: usize,
}

impl EnsembleOptions {
    /// Errors
    /// ------
    /// - `HybridError::InvalidTrimFraction` if `trim_fraction == 0`.
    pub fn new(ensemble_size: usize, trim_fraction: usize) -> HybridResult<Self> {
        if trim_fraction == 0 {
            return Err(HybridError::InvalidTrimFraction { value: trim_fraction });
        }
        Ok(Self { ensemble_size, trim_fraction })
    }

    /// Number of samples averaged into each band.
    ///
    /// `ensemble_size / trim_fraction` rounded down, raised to 1 whenever at
    /// least one stochastic realization exists; 0 for an empty ensemble.
    pub fn band_size(&self) -> usize {
        if self.ensemble_size == 0 {
            return 0;
        }
        (self.ensemble_size / self.trim_fraction.max(1)).max(1)
    }
}

impl Default for EnsembleOptions {
    fn default() -> Self {
        Self { ensemble_size: DEFAULT_ENSEMBLE_SIZE, trim_fraction: DEFAULT_TRIM_FRACTION }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Band size follows floor(N / trim) with a floor of one sample whenever
    // the ensemble is non-empty.
    fn band_size_rounds_down_and_never_hits_zero_for_non_empty_ensembles() {
        let size = |n, trim| EnsembleOptions::new(n, trim).expect("valid").band_size();

        assert_eq!(size(500, 10), 50);
        assert_eq!(size(19, 10), 1);
        assert_eq!(size(5, 10), 1);
        assert_eq!(size(0, 10), 0);
    }

    #[test]
    fn zero_trim_fraction_is_rejected() {
        assert_eq!(EnsembleOptions::new(10, 0), Err(HybridError::InvalidTrimFraction { value: 0 }));
    }

    #[test]
    fn estimator_options_validate_zero_floor() {
        let simplex = SimplexOptions::default();
        let ode = OdeOptions::default();

        assert!(EstimatorOptions::new(simplex.clone(), ode, 0.0).is_ok());
        assert!(matches!(
            EstimatorOptions::new(simplex, ode, -1.0),
            Err(HybridError::InvalidZeroFloor { .. })
        ));
        assert_eq!(EstimatorOptions::default().zero_floor, DEFAULT_ZERO_FLOOR);
    }

    #[test]
    fn estimator_defaults_use_tight_simplex_tolerances() {
        let tols = EstimatorOptions::default().simplex.tols;

        assert_eq!(tols.sd_tolerance, Some(DEFAULT_ESTIMATOR_SD_TOLERANCE));
        assert_eq!(tols.max_iter, Some(DEFAULT_ESTIMATOR_MAX_ITER));
        assert!(Tolerances::new(tols.sd_tolerance, tols.max_iter).is_ok());
    }
}
