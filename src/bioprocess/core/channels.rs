//! Channel layout shared by every trajectory in the crate.
//!
//! A state row has seven columns in a fixed order: the time channel, the three
//! measured process channels and the three latent error channels. Error
//! channel `k` corrects measured channel `k`.
use crate::bioprocess::errors::{HybridError, HybridResult};
use std::str::FromStr;

/// Number of columns in a state row.
pub const N_CHANNELS: usize = 7;

/// Number of measured (and error) channels.
pub const N_MEASURED: usize = 3;

/// Values of the measured channels `[CX, CS, CP]` at one time point.
pub type MeasuredState = [f64; N_MEASURED];

/// Values of the error channels `[eX, eS, eP]` at one time point.
pub type ErrorState = [f64; N_MEASURED];

/// Identifier attached to each experimental run.
pub type ExperimentId = String;

/// Named column of a state row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Time.
    T,
    /// Biomass concentration.
    CX,
    /// Substrate concentration.
    CS,
    /// Product concentration.
    CP,
    /// Biomass discrepancy.
    EX,
    /// Substrate discrepancy.
    ES,
    /// Product discrepancy.
    EP,
}

/// Measured channels in column order.
pub const MEASURED: [Channel; N_MEASURED] = [Channel::CX, Channel::CS, Channel::CP];

/// Error channels in column order, paired one-to-one with [`MEASURED`].
pub const ERRORS: [Channel; N_MEASURED] = [Channel::EX, Channel::ES, Channel::EP];

/// All channels in column order.
pub const ALL: [Channel; N_CHANNELS] =
    [Channel::T, Channel::CX, Channel::CS, Channel::CP, Channel::EX, Channel::ES, Channel::EP];

impl Channel {
    /// Column index of this channel in a state row.
    pub const fn index(self) -> usize {
        match self {
            Channel::T => 0,
            Channel::CX => 1,
            Channel::CS => 2,
            Channel::CP => 3,
            Channel::EX => 4,
            Channel::ES => 5,
            Channel::EP => 6,
        }
    }

    /// Canonical short name (`"T"`, `"CX"`, …, `"eP"`).
    pub const fn name(self) -> &'static str {
        match self {
            Channel::T => "T",
            Channel::CX => "CX",
            Channel::CS => "CS",
            Channel::CP => "CP",
            Channel::EX => "eX",
            Channel::ES => "eS",
            Channel::EP => "eP",
        }
    }

    /// Error channel paired with a measured channel, and vice versa.
    ///
    /// Returns `None` for the time channel.
    pub const fn partner(self) -> Option<Channel> {
        match self {
            Channel::T => None,
            Channel::CX => Some(Channel::EX),
            Channel::CS => Some(Channel::ES),
            Channel::CP => Some(Channel::EP),
            Channel::EX => Some(Channel::CX),
            Channel::ES => Some(Channel::CS),
            Channel::EP => Some(Channel::CP),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Channel {
    type Err = HybridError;

    fn from_str(name: &str) -> HybridResult<Self> {
        ALL.iter()
            .copied()
            .find(|channel| channel.name() == name)
            .ok_or_else(|| HybridError::UnknownChannel { name: name.to_string() })
    }
}
