//! Mechanistic rate laws.
//!
//! A [`RateLaw`] maps the measured state `[CX, CS, CP]` to its time
//! derivative. [`KineticParams`] implements the Contois law:
//!
//! ```text
//! mu    = mu_m * CS / (CS + k_c * CX)     (0 when the denominator is 0)
//! dX/dt = mu * CX
//! dS/dt = -(1 / y_sx) * mu * CX
//! dP/dt = beta * CX
//! ```
use crate::bioprocess::core::{channels::MeasuredState, params::KineticParams};

/// Autonomous mechanistic rate law `d[CX, CS, CP]/dt = f(state)`.
pub trait RateLaw {
    fn rates(&self, state: &MeasuredState) -> MeasuredState;
}

impl<L: RateLaw + ?Sized> RateLaw for &L {
    fn rates(&self, state: &MeasuredState) -> MeasuredState {
        (**self).rates(state)
    }
}

impl KineticParams {
    /// Contois specific growth rate.
    pub fn specific_growth_rate(&self, biomass: f64, substrate: f64) -> f64 {
        let denominator = substrate + self.k_c() * biomass;
        if denominator == 0.0 { 0.0 } else { self.mu_m() * substrate / denominator }
    }

    pub fn biomass_rate(&self, biomass: f64, substrate: f64) -> f64 {
        self.specific_growth_rate(biomass, substrate) * biomass
    }

    pub fn substrate_rate(&self, biomass: f64, substrate: f64) -> f64 {
        -self.biomass_rate(biomass, substrate) / self.y_sx()
    }

    pub fn product_rate(&self, biomass: f64) -> f64 {
        self.beta() * biomass
    }
}

impl RateLaw for KineticParams {
    fn rates(&self, state: &MeasuredState) -> MeasuredState {
        let [biomass, substrate, _product] = *state;
        [
            self.biomass_rate(biomass, substrate),
            self.substrate_rate(biomass, substrate),
            self.product_rate(biomass),
        ]
    }
}
