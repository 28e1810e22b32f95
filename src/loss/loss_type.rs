use serde::{Serialize, Deserialize};

use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::loss::mse::MseLoss;
use crate::math::Tensor;

/// Selects which loss function a network is trained against.
///
/// - `Mse`          — Mean-squared error; pair with Sigmoid/Tanh/ReLU output.
/// - `CrossEntropy` — Categorical cross-entropy against a one-hot target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    #[default]
    Mse,
    CrossEntropy,
}

impl LossType {
    pub fn loss(&self, predicted: &Tensor, expected: &Tensor) -> f32 {
        match self {
            LossType::Mse => MseLoss::loss(predicted, expected),
            LossType::CrossEntropy => CrossEntropyLoss::loss(predicted, expected),
        }
    }

    /// Writes ∂L/∂predicted into `delta`.
    pub fn derivative_into(&self, predicted: &Tensor, expected: &Tensor, delta: &mut Tensor) {
        match self {
            LossType::Mse => MseLoss::derivative_into(predicted, expected, delta),
            LossType::CrossEntropy => CrossEntropyLoss::derivative_into(predicted, expected, delta),
        }
    }
}
