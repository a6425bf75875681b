//! simplex_optimizer::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the numeric types and the solver alias used by the
//! derivative-free optimizer so the rest of the optimization code stays
//! agnostic to `ndarray` and argmin generics.
//!
//! Conventions
//! -----------
//! - `Theta` is the candidate vector; `Cost` is the scalar objective being
//!   **minimized** (no sign flips anywhere in this layer).
//! - The simplex has `theta.len() + 1` vertices.
use argmin::solver::neldermead::NelderMead;
use ndarray::Array1;
use std::collections::HashMap;

/// Candidate vector `θ` handed to the objective.
pub type Theta = Array1<f64>;

/// Scalar objective value (minimized).
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps human-readable counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Nelder–Mead solver specialized to this crate's numeric types.
pub type SimplexSolver = NelderMead<Theta, Cost>;

/// Default relative perturbation used to build the initial simplex from a
/// non-zero coordinate.
pub const DEFAULT_NONZERO_STEP: f64 = 0.05;

/// Default absolute offset used for coordinates that are exactly zero.
pub const DEFAULT_ZERO_STEP: f64 = 0.00025;
