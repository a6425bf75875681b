//! Mechanistic parameter set for Contois growth kinetics.
//!
//! Purpose
//! -------
//! Hold the four kinetic constants shared by the clean kinetic model and the
//! error-forced interval propagation, validated once at construction.
//!
//! Invariants & assumptions
//! ------------------------
//! - All values are finite.
//! - `k_c > 0` and `y_sx > 0` (they appear in denominators).
//! - `mu_m` and `beta` may be zero (used by closed-form checks) but not
//!   negative.
//!
//! Conventions
//! -----------
//! - Map keys follow the short names `"mu_m"`, `"k_c"`, `"y_sx"`, `"beta"`.
use crate::bioprocess::errors::{HybridError, HybridResult};
use std::collections::HashMap;

/// Immutable Contois kinetic constants.
///
/// Fields
/// ------
/// - `mu_m`: maximum specific growth rate.
/// - `k_c`: Contois saturation constant.
/// - `y_sx`: biomass-on-substrate yield.
/// - `beta`: non-growth-associated production rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KineticParams {
    mu_m: f64,
    k_c: f64,
    y_sx: f64,
    beta: f64,
}

impl KineticParams {
    /// Construct a validated parameter set.
    ///
    /// Errors
    /// ------
    /// - `HybridError::InvalidKineticParam` if any value is non-finite,
    ///   `mu_m`/`beta` is negative, or `k_c`/`y_sx` is not strictly positive.
    pub fn new(mu_m: f64, k_c: f64, y_sx: f64, beta: f64) -> HybridResult<Self> {
        validate_non_negative("mu_m", mu_m)?;
        validate_positive("k_c", k_c)?;
        validate_positive("y_sx", y_sx)?;
        validate_non_negative("beta", beta)?;
        Ok(Self { mu_m, k_c, y_sx, beta })
    }

    /// Construct from a name→value map with keys `mu_m`, `k_c`, `y_sx`,
    /// `beta`. Extra keys are ignored.
    ///
    /// Errors
    /// ------
    /// - `HybridError::MissingKineticParam` for the first absent key.
    /// - Any error from [`KineticParams::new`].
    pub fn from_map(map: &HashMap<String, f64>) -> HybridResult<Self> {
        let get = |name: &'static str| {
            map.get(name).copied().ok_or(HybridError::MissingKineticParam { name })
        };
        Self::new(get("mu_m")?, get("k_c")?, get("y_sx")?, get("beta")?)
    }

    pub fn mu_m(&self) -> f64 {
        self.mu_m
    }

    pub fn k_c(&self) -> f64 {
        self.k_c
    }

    pub fn y_sx(&self) -> f64 {
        self.y_sx
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }
}

// ---- Helper Methods ----

fn validate_positive(name: &'static str, value: f64) -> HybridResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(HybridError::InvalidKineticParam {
            name,
            value,
            reason: "Value must be finite and > 0.",
        });
    }
    Ok(())
}

fn validate_non_negative(name: &'static str, value: f64) -> HybridResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(HybridError::InvalidKineticParam {
            name,
            value,
            reason: "Value must be finite and >= 0.",
        });
    }
    Ok(())
}
