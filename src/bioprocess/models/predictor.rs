//! Error predictor contract.
//!
//! The learned correction term is trained outside this crate; the hybrid
//! simulator only needs its inference contract: given the standardized
//! measured state `[CX, CS, CP]`, return a mean and a standard deviation for
//! each error channel `[eX, eS, eP]`, in standardized units.
//!
//! Implementations are called once per realization and step, so `predict`
//! should be cheap and free of I/O. The simulator validates every output
//! (length 3, finite, `std ≥ 0`) and aborts the ensemble with
//! `HybridError::PredictionDivergence` otherwise.
use ndarray::{Array1, ArrayView1};

/// Predicted distribution over the three error channels.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDistribution {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl ErrorDistribution {
    pub fn new(mean: Array1<f64>, std: Array1<f64>) -> Self {
        Self { mean, std }
    }
}

/// Inference contract of the learned error model.
pub trait ErrorPredictor {
    fn predict(&self, standardized_measured: ArrayView1<f64>) -> ErrorDistribution;
}

impl<P: ErrorPredictor + ?Sized> ErrorPredictor for &P {
    fn predict(&self, standardized_measured: ArrayView1<f64>) -> ErrorDistribution {
        (**self).predict(standardized_measured)
    }
}

impl<P: ErrorPredictor + ?Sized> ErrorPredictor for Box<P> {
    fn predict(&self, standardized_measured: ArrayView1<f64>) -> ErrorDistribution {
        (**self).predict(standardized_measured)
    }
}

/// Predictor that ignores the state and returns a fixed distribution.
///
/// With a zero mean and zero spread the hybrid simulator reduces to the
/// mechanistic model with substrate clipping.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantPredictor {
    distribution: ErrorDistribution,
}

impl ConstantPredictor {
    pub fn new(mean: [f64; 3], std: [f64; 3]) -> Self {
        Self {
            distribution: ErrorDistribution::new(Array1::from(mean.to_vec()), Array1::from(std.to_vec())),
        }
    }

    pub fn zero() -> Self {
        Self::new([0.0; 3], [0.0; 3])
    }
}

impl ErrorPredictor for ConstantPredictor {
    fn predict(&self, _standardized_measured: ArrayView1<f64>) -> ErrorDistribution {
        self.distribution.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn constant_predictor_ignores_state() {
        let predictor = ConstantPredictor::new([0.1, -0.2, 0.3], [1.0, 0.0, 2.0]);

        let a = predictor.predict(array![0.0, 0.0, 0.0].view());
        let b = (&predictor).predict(array![5.0, -1.0, 2.0].view());

        assert_eq!(a, b);
        assert_eq!(a.mean, array![0.1, -0.2, 0.3]);
        assert_eq!(a.std, array![1.0, 0.0, 2.0]);
    }
}
