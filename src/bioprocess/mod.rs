//! bioprocess — hybrid mechanistic/learned trajectory models.
//!
//! Purpose
//! -------
//! Simulate fed-batch style bioprocess trajectories (biomass `X`, substrate
//! `S`, product `P`) with a mechanistic Contois model augmented by additive
//! error terms. The errors are back-solved from data by the discrepancy
//! estimator and, at prediction time, supplied by a learned predictor whose
//! uncertainty is propagated by Monte Carlo.
//!
//! Key behaviors
//! -------------
//! - `core`: channel layout, trajectories, rate laws, adaptive integration,
//!   standardization, options and forecast summaries.
//! - `models`: [`KineticModel`](models::KineticModel),
//!   [`DiscrepancyEstimator`](models::DiscrepancyEstimator) and
//!   [`HybridSimulator`](models::HybridSimulator).
//! - `metrics`: accuracy and band-spread scores for forecasts.
//! - `errors`: the shared [`HybridError`](errors::HybridError) surface.
//!
//! Invariants & assumptions
//! ------------------------
//! - Time is the first column and is non-decreasing in every trajectory.
//! - Error channels hold constant forcing per interval; the last row's
//!   errors are zero padding.
//! - Only the substrate is clipped at zero (its rate and its per-step value
//!   in the hybrid simulator); summaries clip all measured channels after
//!   assembly.
//!
//! Conventions
//! -----------
//! - Progress and recoverable problems go through the `log` facade; nothing
//!   in this module installs a logger.
//! - Batch entry points return a [`BatchReport`](core::BatchReport) rather
//!   than failing on the first bad experiment.

pub mod core;
pub mod errors;
pub mod metrics;
pub mod models;

pub mod prelude {
    pub use super::core::prelude::*;
    pub use super::errors::{HybridError, HybridResult};
    pub use super::metrics::{
        DEFAULT_SKIP, mean_absolute_error, mean_band_spread, symmetric_relative_error,
    };
    pub use super::models::prelude::*;
}
