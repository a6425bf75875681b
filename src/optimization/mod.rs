//! optimization — derivative-free minimizer and unified error surface.
//!
//! Purpose
//! -------
//! Provide the optimization layer used to back-solve per-interval
//! discrepancies: an Argmin-backed Nelder–Mead minimizer and a single
//! error/result surface. Callers implement an objective, choose tolerances,
//! and obtain the best vertex plus diagnostics without touching backend
//! solver details.
//!
//! Key behaviors
//! -------------
//! - Expose a high-level API for **minimizing** scalar costs `c(θ)`
//!   (`simplex_optimizer`), including configuration of the initial simplex
//!   and stopping criteria.
//! - Normalize configuration issues, numerical failures, and backend solver
//!   errors into a single enum (`errors::OptError`) with a common result
//!   alias (`OptResult<T>`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives are expected to return finite costs; non-finite costs are
//!   reported as `OptError::NonFiniteCost`, not panics.
//! - Reaching the iteration cap is reported through
//!   `OptimOutcome::converged` rather than as an error.
//!
//! Conventions
//! -----------
//! - Parameters are represented as `ndarray` vectors (`Theta`).
//! - Public entrypoints that can fail return `OptResult<T>`; callers never
//!   see raw Argmin errors.
//! - Apart from the optional `obs_slog` observer, this layer performs no
//!   logging; model code decides how to report non-convergence.
//!
//! Testing notes
//! -------------
//! - `simplex_optimizer`: simplex construction, tolerance validation, and
//!   end-to-end minimization of toy objectives.
//! - `errors`: conversions from backend errors into `OptError`.

pub mod errors;
pub mod simplex_optimizer;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use hybrid_kinetics::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::simplex_optimizer::prelude::*;
}
