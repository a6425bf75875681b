//! simplex_optimizer — derivative-free, argmin-powered minimizer.
//!
//! Purpose
//! -------
//! Provide a small Argmin-backed layer for **minimizing** scalar objectives
//! `c(θ)` without gradients. Callers implement a single trait,
//! [`Objective`], and invoke [`minimize`] to run Nelder–Mead with a
//! configurable spread tolerance, iteration cap, and initial simplex.
//!
//! Key behaviors
//! -------------
//! - Convert user objectives into Argmin cost functions via
//!   [`adapter::ArgMinAdapter`], rejecting non-finite costs.
//! - Build the initial simplex around a starting vector in [`builders`].
//! - Execute the solver via [`run::run_nelder_mead`] and normalize results
//!   into an [`OptimOutcome`] whose `converged` flag distinguishes a
//!   tolerance stop from hitting the iteration cap.
//! - Centralize configuration ([`Tolerances`], [`SimplexOptions`]) and
//!   validation logic ([`validation`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - [`Objective::value`] must treat invalid inputs as recoverable
//!   [`OptError`](crate::optimization::errors::OptError) values, not panics.
//! - Hitting the iteration cap is **not** an error at this layer; it is
//!   reported through `OptimOutcome::converged` so model code can decide to
//!   warn and continue.
//!
//! Downstream usage
//! ----------------
//! - The discrepancy estimator implements [`Objective`] for a single
//!   observed interval and calls [`minimize`] once per interval, warm-started
//!   from the previous interval's solution.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::minimize;
pub use self::traits::{Objective, OptimOutcome, SimplexOptions, Tolerances};
pub use self::types::{Cost, FnEvalMap, Theta};

pub mod prelude {
    pub use super::api::minimize;
    pub use super::traits::{Objective, OptimOutcome, SimplexOptions, Tolerances};
    pub use super::types::{Cost, Theta};
}
