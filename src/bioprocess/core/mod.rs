//! core — shared bioprocess data, kinetics, integration, and summaries.
//!
//! Purpose
//! -------
//! Collect the building blocks for hybrid mechanistic/learned trajectory
//! models: the channel layout, validated trajectories, kinetic parameters and
//! rate laws, the adaptive ODE integrator, the error-forced interval
//! propagation, standardization, options, forecast summaries and batch
//! reports. The models in `bioprocess::models` are built on top of these
//! primitives.
//!
//! Key behaviors
//! -------------
//! - Fix the column layout (`T, CX, CS, CP, eX, eS, eP`) in [`channels`] and
//!   enforce trajectory invariants in [`Trajectory::new`].
//! - Express the Contois kinetics through the [`RateLaw`] trait
//!   ([`KineticParams`] is the canonical implementation).
//! - Integrate with an adaptive Dormand–Prince pair ([`rk45`],
//!   [`integrate_grid`]) that reports divergence as an error.
//! - Propagate one interval under constant error forcing with the substrate
//!   rate clipped at zero ([`propagate_interval`]).
//! - Summarize ensembles into trimmed-mean bands ([`ForecastSummary`],
//!   [`trimmed_bands`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Trajectories are non-empty, seven columns wide, finite and
//!   non-decreasing in time; everything downstream relies on this.
//! - Integration failures are never turned into NaNs; they surface as
//!   `HybridError::IntegrationFailure`.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; measured and error triples are `[f64; 3]` in
//!   `[X, S, P]` order.
//! - This module avoids I/O and logging; the models report progress and
//!   warnings through the `log` facade.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its local behavior; end-to-end
//!   estimation and prediction flows are covered in `tests/`.

pub mod channels;
pub mod forecasts;
pub mod ode;
pub mod options;
pub mod params;
pub mod propagate;
pub mod rates;
pub mod report;
pub mod standardize;
pub mod trajectory;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::channels::{
    Channel, ERRORS, ErrorState, ExperimentId, MEASURED, MeasuredState, N_CHANNELS, N_MEASURED,
};
pub use self::forecasts::{ForecastSummary, trimmed_bands};
pub use self::ode::{OdeOptions, OdeSystem, integrate_grid, rk45};
pub use self::options::{EnsembleOptions, EstimatorOptions};
pub use self::params::KineticParams;
pub use self::propagate::{ForcedKinetics, MechanisticKinetics, propagate_interval};
pub use self::rates::RateLaw;
pub use self::report::BatchReport;
pub use self::standardize::Standardizer;
pub use self::trajectory::Trajectory;

pub mod prelude {
    pub use super::channels::{Channel, ExperimentId, MEASURED, ERRORS};
    pub use super::forecasts::ForecastSummary;
    pub use super::ode::OdeOptions;
    pub use super::options::{EnsembleOptions, EstimatorOptions};
    pub use super::params::KineticParams;
    pub use super::rates::RateLaw;
    pub use super::report::BatchReport;
    pub use super::standardize::Standardizer;
    pub use super::trajectory::Trajectory;
}
