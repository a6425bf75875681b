//! Aggregate results of multi-trajectory runs.
//!
//! A batch keeps going when one trajectory fails: successes, fatal
//! per-trajectory failures and recoverable warnings are collected side by
//! side, each tagged with the experiment it came from.
use crate::bioprocess::{core::channels::ExperimentId, errors::HybridError};

/// Per-trajectory outputs, failures and warnings of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport<T> {
    /// Successful outputs in input order.
    pub outputs: Vec<(ExperimentId, T)>,
    /// Trajectories whose processing failed, with the fatal error.
    pub failures: Vec<(ExperimentId, HybridError)>,
    /// Recoverable issues (e.g., `OptimizerNonConvergence`).
    pub warnings: Vec<(ExperimentId, HybridError)>,
}

impl<T> BatchReport<T> {
    pub fn new() -> Self {
        Self { outputs: Vec::new(), failures: Vec::new(), warnings: Vec::new() }
    }

    /// `true` when no trajectory failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Output for one experiment, if it succeeded.
    pub fn output(&self, id: &str) -> Option<&T> {
        self.outputs.iter().find(|(key, _)| key == id).map(|(_, value)| value)
    }
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_looks_up_by_experiment_id() {
        let mut report: BatchReport<u8> = BatchReport::new();
        report.outputs.push(("run-1".to_string(), 7));
        report.failures.push(("run-2".to_string(), HybridError::EmptyTrajectory));

        assert_eq!(report.output("run-1"), Some(&7));
        assert_eq!(report.output("run-2"), None);
        assert!(!report.is_complete());
    }
}
