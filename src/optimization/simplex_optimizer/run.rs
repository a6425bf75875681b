//! Drive the Nelder–Mead executor and collect its final state.
use crate::optimization::{
    errors::OptResult,
    simplex_optimizer::{
        Objective, OptimOutcome, SimplexOptions, Theta, adapter::ArgMinAdapter,
        types::SimplexSolver,
    },
};
use argmin::core::{CostFunction, Executor, State};
use log::trace;

/// Run the prepared simplex `solver` on `problem` and summarize the result.
///
/// `theta0` is only used for the initial-cost trace line; the starting
/// vertices are already embedded in `solver`. The iteration cap from
/// `opts.tols.max_iter` is applied to the executor state. With the
/// `obs_slog` feature and `opts.verbose`, argmin's terminal observer reports
/// every iteration.
///
/// # Errors
/// - Backend failures, including errors raised inside the objective, come
///   back through `From<argmin::core::Error> for OptError`.
/// - Invalid best parameters are rejected by [`OptimOutcome::new`].
pub fn run_nelder_mead<F: Objective>(
    theta0: &Theta, opts: &SimplexOptions, problem: ArgMinAdapter<'_, F>, solver: SimplexSolver,
) -> OptResult<OptimOutcome> {
    if log::log_enabled!(log::Level::Trace) {
        trace!("simplex start: cost(theta0) = {:.6e}", problem.cost(theta0)?);
    }

    let max_iters = opts.tols.max_iter.map(|m| m as u64);
    let executor = Executor::new(problem, solver).configure(|state| match max_iters {
        Some(cap) => state.max_iters(cap),
        None => state,
    });
    #[cfg(feature = "obs_slog")]
    let executor = if opts.verbose {
        executor.add_observer(
            argmin_observer_slog::SlogLogger::term_noblock(),
            argmin::core::observers::ObserverMode::Always,
        )
    } else {
        executor
    };

    let mut state = executor.run()?.state().clone();
    OptimOutcome::new(
        state.take_best_param(),
        state.get_best_cost(),
        state.get_termination_status().clone(),
        state.get_iter(),
        state.get_func_counts().clone(),
    )
}
