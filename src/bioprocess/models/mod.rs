//! models — mechanistic, estimation and hybrid simulators.
//!
//! Purpose
//! -------
//! Implement the three workflows of the hybrid stack on top of
//! `bioprocess::core`:
//! - [`KineticModel`]: clean mechanistic simulation and the no-learning
//!   baseline.
//! - [`DiscrepancyEstimator`]: back-solve the per-interval error forcing that
//!   reproduces observed data.
//! - [`HybridSimulator`]: Monte Carlo multi-step-ahead prediction driven by
//!   an [`ErrorPredictor`].
//!
//! Conventions
//! -----------
//! - All three are generic over the [`RateLaw`](crate::bioprocess::core::RateLaw)
//!   and default to the Contois [`KineticParams`](crate::bioprocess::core::KineticParams).
//! - Recoverable problems (optimizer non-convergence) are logged with
//!   `warn!` and returned as values; fatal ones are `Err`.

pub mod estimator;
pub mod hybrid;
pub mod kinetic;
pub mod predictor;

pub use self::estimator::{DiscrepancyEstimator, EstimationOutcome, IntervalEstimate, relative_squared_error};
pub use self::hybrid::HybridSimulator;
pub use self::kinetic::{BASELINE_RESOLUTION, KineticModel};
pub use self::predictor::{ConstantPredictor, ErrorDistribution, ErrorPredictor};

pub mod prelude {
    pub use super::estimator::{DiscrepancyEstimator, EstimationOutcome};
    pub use super::hybrid::HybridSimulator;
    pub use super::kinetic::KineticModel;
    pub use super::predictor::{ConstantPredictor, ErrorDistribution, ErrorPredictor};
}
