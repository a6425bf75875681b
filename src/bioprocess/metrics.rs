//! Forecast accuracy and spread metrics.
//!
//! All metrics skip the first `skip` rows of each trajectory (the initial
//! rows are copied from the observations and would flatter every score) and
//! are computed per measured channel `[X, S, P]`. The conventional skip is
//! [`DEFAULT_SKIP`].
use crate::bioprocess::{
    core::{
        channels::{MEASURED, N_MEASURED},
        forecasts::ForecastSummary,
        trajectory::Trajectory,
    },
    errors::{HybridError, HybridResult},
};
use statrs::statistics::Statistics;

/// Leading rows excluded from every metric by convention.
pub const DEFAULT_SKIP: usize = 2;

/// Mean absolute error of the deterministic forecast against observations.
///
/// Errors
/// ------
/// - `HybridError::LengthMismatch` if the trajectories differ in length.
/// - `HybridError::InvalidSkip` if `skip` leaves no rows.
pub fn mean_absolute_error(
    observed: &Trajectory, forecast: &ForecastSummary, skip: usize,
) -> HybridResult<[f64; N_MEASURED]> {
    let simulated = forecast.deterministic();
    check_rows(observed.len(), simulated.len(), skip)?;
    Ok(MEASURED.map(|channel| {
        let obs = observed.channel(channel);
        let sim = simulated.channel(channel);
        obs.iter().zip(sim.iter()).skip(skip).map(|(o, s)| (o - s).abs()).mean()
    }))
}

/// Mean half-width-over-two of the bands: `mean((upper − lower) / 4)`.
///
/// For approximately normal ensembles with a 10% trim this is close to the
/// ensemble standard deviation.
pub fn mean_band_spread(forecast: &ForecastSummary, skip: usize) -> HybridResult<[f64; N_MEASURED]> {
    check_rows(forecast.len(), forecast.len(), skip)?;
    let (lower, upper) = (forecast.lower(), forecast.upper());
    let mut spread = [0.0; N_MEASURED];
    for (c, value) in spread.iter_mut().enumerate() {
        *value = lower
            .column(c)
            .iter()
            .zip(upper.column(c).iter())
            .skip(skip)
            .map(|(lo, hi)| (hi - lo) / 4.0)
            .mean();
    }
    Ok(spread)
}

/// Symmetric relative error in percent: `200 · mean(|o − s| / (o + s))`.
///
/// Pairs with `o + s == 0` are left out; a channel with no usable pair scores
/// `0`.
pub fn symmetric_relative_error(
    observed: &Trajectory, simulated: &Trajectory, skip: usize,
) -> HybridResult<[f64; N_MEASURED]> {
    check_rows(observed.len(), simulated.len(), skip)?;
    Ok(MEASURED.map(|channel| {
        let ratios: Vec<f64> = observed
            .channel(channel)
            .iter()
            .zip(simulated.channel(channel).iter())
            .skip(skip)
            .filter(|(o, s)| *o + *s != 0.0)
            .map(|(o, s)| (o - s).abs() / (o + s))
            .collect();
        if ratios.is_empty() { 0.0 } else { 200.0 * ratios.mean() }
    }))
}

// ---- Helper Methods ----

fn check_rows(expected: usize, actual: usize, skip: usize) -> HybridResult<()> {
    if expected != actual {
        return Err(HybridError::LengthMismatch { expected, actual });
    }
    if skip >= expected {
        return Err(HybridError::InvalidSkip { skip, len: expected });
    }
    Ok(())
}
