//! simplex_optimizer::builders — Nelder–Mead solver construction helpers.
//!
//! Purpose
//! -------
//! Build the initial simplex around a starting vector and wrap it in a
//! configured [`SimplexSolver`], hiding argmin's generic wiring from the
//! model layer.
//!
//! Key behaviors
//! -------------
//! - Construct `n + 1` vertices from an `n`-dimensional start: the start
//!   itself plus one vertex per coordinate, where that coordinate is scaled
//!   by `1 + nonzero_step` or, if it is exactly zero, replaced by
//!   `zero_step`.
//! - Apply the optional simplex-spread tolerance from [`SimplexOptions`].
//! - Leave the iteration cap to the runner, keeping these builders side-effect
//!   free.
//!
//! Invariants & assumptions
//! ------------------------
//! - `theta0` has been validated (non-empty, finite) by the caller.
//! - Any tolerance rejected by argmin surfaces as an [`OptError`] through the
//!   crate's `From<Error>` conversion.
use crate::optimization::{
    errors::OptResult,
    simplex_optimizer::{
        traits::SimplexOptions,
        types::{SimplexSolver, Theta},
    },
};

/// initial_simplex — vertices for a Nelder–Mead run started at `theta0`.
///
/// Parameters
/// ----------
/// - `theta0`: `&Theta`
///   Starting vector; it becomes the first vertex.
/// - `opts`: `&SimplexOptions`
///   Source of `nonzero_step` and `zero_step`.
///
/// Returns
/// -------
/// `Vec<Theta>` of length `theta0.len() + 1`.
///
/// Notes
/// -----
/// - Vertex `k + 1` differs from `theta0` only in coordinate `k`.
pub fn initial_simplex(theta0: &Theta, opts: &SimplexOptions) -> Vec<Theta> {
    let mut vertices = Vec::with_capacity(theta0.len() + 1);
    vertices.push(theta0.clone());
    for k in 0..theta0.len() {
        let mut vertex = theta0.clone();
        vertex[k] = if vertex[k] != 0.0 {
            (1.0 + opts.nonzero_step) * vertex[k]
        } else {
            opts.zero_step
        };
        vertices.push(vertex);
    }
    vertices
}

/// build_simplex_solver — construct a Nelder–Mead solver around `theta0`.
///
/// Returns
/// -------
/// `OptResult<SimplexSolver>`
///   - `Ok(solver)` with the initial simplex and optional spread tolerance.
///   - `Err(e)` if argmin rejects the tolerance.
///
/// Errors
/// ------
/// - `OptError` (via `From<argmin::core::Error>`) when
///   `with_sd_tolerance` rejects the configured value.
pub fn build_simplex_solver(theta0: &Theta, opts: &SimplexOptions) -> OptResult<SimplexSolver> {
    let solver = SimplexSolver::new(initial_simplex(theta0, opts));
    match opts.tols.sd_tolerance {
        Some(tol) => Ok(solver.with_sd_tolerance(tol)?),
        None => Ok(solver),
    }
}
