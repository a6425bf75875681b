//! hybrid_kinetics — hybrid mechanistic/learned bioprocess trajectory models.
//!
//! Purpose
//! -------
//! Provide the numerical core of a hybrid bioprocess model: a Contois kinetic
//! simulator, a Nelder–Mead back-solver for the per-interval discrepancy
//! between model and data, and a Monte Carlo simulator that propagates a
//! learned error predictor's uncertainty into forecast bands.
//!
//! Key behaviors
//! -------------
//! - `bioprocess`: trajectories, kinetics, integration, estimation,
//!   prediction and metrics.
//! - `optimization`: the Argmin-backed simplex minimizer used by the
//!   estimator, with its own error surface.
//!
//! Conventions
//! -----------
//! - Fallible operations return `Result` (`HybridResult` / `OptResult`);
//!   nothing in the public surface panics on bad input.
//! - Logging goes through the `log` facade; install any logger to see
//!   progress and warnings.
//!
//! ```no_run
//! use hybrid_kinetics::bioprocess::prelude::*;
//!
//! # fn main() -> Result<(), HybridError> {
//! let params = KineticParams::new(0.4, 2.0, 0.5, 0.05)?;
//! let model = KineticModel::new(params, OdeOptions::default());
//! let path = model.simulate(&[0.5, 20.0, 0.0], &[0.0, 1.0, 2.0, 4.0])?;
//! let mut sim = HybridSimulator::with_seed(model, ConstantPredictor::zero(), Standardizer::identity(), 42);
//! let summary = sim.predict(&path, &EnsembleOptions::default())?;
//! assert_eq!(summary.len(), 4);
//! # Ok(())
//! # }
//! ```

pub mod bioprocess;
pub mod optimization;
